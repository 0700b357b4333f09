use floorkit_core::event_bus::{
    CollectionChange, FurnitureProperty, PlanEvent, PlanEventBus, RoomProperty, WallProperty,
};
use floorkit_core::model::{Furniture, Level, Room, Wall};
use floorkit_core::{ItemKind, PlanModel, Point};
use floorkit_plan::{PlanView, TextMetrics, ViewServices};
use floorkit_settings::Config;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Harness {
    view: PlanView,
    bus: PlanEventBus,
    repaints: Arc<AtomicUsize>,
}

fn harness(model: PlanModel) -> Harness {
    let repaints = Arc::new(AtomicUsize::new(0));
    let counter = repaints.clone();
    let services = ViewServices {
        repaint: Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
        ..ViewServices::default()
    };
    let mut view = PlanView::new(Arc::new(model), &Config::default(), services)
        .with_text_metrics(TextMetrics::approximate());
    view.prepare();
    Harness {
        view,
        bus: PlanEventBus::new(),
        repaints,
    }
}

fn furnished() -> PlanModel {
    let mut model = PlanModel::new();
    model.walls.push(Wall::new(0.0, 0.0, 300.0, 0.0, 10.0));
    model.rooms.push(Room::new(vec![
        Point::new(0.0, 0.0),
        Point::new(300.0, 0.0),
        Point::new(300.0, 200.0),
        Point::new(0.0, 200.0),
    ]));
    model
        .furniture
        .push(Furniture::new("Bed", 150.0, 100.0, 140.0, 200.0, 50.0));
    model
}

#[test]
fn test_event_burst_recomputes_each_tier_once() {
    let mut h = harness(furnished());
    let _subscription = h.view.attach(&h.bus);
    let wall = h.view.model().walls[0].id;
    let room = h.view.model().rooms[0].id;
    let piece = h.view.model().furniture[0].id;
    let before = h.view.cache().stats();

    for _ in 0..10 {
        h.bus
            .publish(PlanEvent::Wall {
                id: wall,
                property: WallProperty::XEnd,
            })
            .unwrap();
        h.bus
            .publish(PlanEvent::Room {
                id: room,
                property: RoomProperty::Points,
            })
            .unwrap();
        h.bus
            .publish(PlanEvent::Furniture {
                id: piece,
                property: FurnitureProperty::Elevation,
            })
            .unwrap();
    }
    assert!(h.view.has_pending_changes());
    assert_eq!(h.repaints.load(Ordering::SeqCst), 30);

    h.view.prepare();
    let after = h.view.cache().stats();
    assert_eq!(after.wall_areas, before.wall_areas + 1);
    assert_eq!(after.room_order, before.room_order + 1);
    assert_eq!(after.furniture_order, before.furniture_order + 1);
    assert_eq!(after.bounds, before.bounds + 1);
    assert!(!h.view.has_pending_changes());
}

#[test]
fn test_cosmetic_change_repaints_without_recompute() {
    let mut h = harness(furnished());
    let _subscription = h.view.attach(&h.bus);
    let wall = h.view.model().walls[0].id;
    let before = h.view.cache().stats();

    h.bus
        .publish(PlanEvent::Wall {
            id: wall,
            property: WallProperty::Color,
        })
        .unwrap();
    assert_eq!(h.repaints.load(Ordering::SeqCst), 1);
    let recomputed = h.view.prepare();
    assert!(!recomputed.any());
    assert_eq!(h.view.cache().stats().recomputes(), before.recomputes());
}

#[test]
fn test_added_wall_grows_bounds() {
    let mut h = harness(furnished());
    let _subscription = h.view.attach(&h.bus);
    assert!(h.view.cache().plan_bounds().max_x < 1000.0);

    let mut model = (**h.view.model()).clone();
    let wall = Wall::new(1500.0, 0.0, 1500.0, 400.0, 10.0);
    let id = wall.id;
    model.walls.push(wall);
    h.view.set_model(Arc::new(model));
    h.bus
        .publish(PlanEvent::Collection {
            kind: ItemKind::Wall,
            id,
            change: CollectionChange::Added,
        })
        .unwrap();

    let recomputed = h.view.prepare();
    assert!(recomputed.wall_areas && recomputed.bounds);
    assert!(h.view.cache().plan_bounds().max_x >= 1505.0);
    assert!(h.view.transform().plan_bounds().max_x >= 1505.0);
}

#[test]
fn test_selected_level_rebuilds_ghost() {
    let ground = Level::new("Ground", 0.0, 12.0, 250.0);
    let upper = Level::new("Upper", 262.0, 12.0, 250.0);
    let (ground_id, upper_id) = (ground.id, upper.id);
    let mut model = PlanModel::new();
    model.levels.push(ground);
    model.levels.push(upper);
    model.selected_level = Some(upper_id);
    model
        .walls
        .push(Wall::new(0.0, 0.0, 300.0, 0.0, 10.0).at_level(ground_id));

    let mut h = harness(model);
    let _subscription = h.view.attach(&h.bus);
    let ghost = h.view.cache().ghost().expect("ground floor below");
    assert_eq!(ghost.level, ground_id);
    assert!(!ghost.walls.is_empty());

    let mut model = (**h.view.model()).clone();
    model.selected_level = Some(ground_id);
    h.view.set_model(Arc::new(model));
    h.bus.publish(PlanEvent::SelectedLevel).unwrap();
    h.view.prepare();
    assert!(h.view.cache().ghost().is_none());
    assert_eq!(h.view.cache().wall_areas().len(), 1);
}

#[test]
fn test_dropped_subscription_stops_recording() {
    let mut h = harness(furnished());
    let wall = h.view.model().walls[0].id;
    let subscription = h.view.attach(&h.bus);
    drop(subscription);

    let published = h.bus.publish(PlanEvent::Wall {
        id: wall,
        property: WallProperty::Thickness,
    });
    assert!(published.is_err());
    assert!(!h.view.has_pending_changes());
    assert_eq!(h.repaints.load(Ordering::SeqCst), 0);
    assert!(!h.view.prepare().any());
}
