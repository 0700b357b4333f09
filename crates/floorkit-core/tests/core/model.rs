use floorkit_core::model::{Furniture, Level, PlanModel, Room, Wall, WallPattern};
use floorkit_core::ItemKind;

#[test]
fn test_plan_round_trips_through_json() {
    let level = Level::new("ground", 0.0, 12.0, 250.0);
    let mut plan = PlanModel::new();
    plan.selected_level = Some(level.id);
    plan.walls
        .push(Wall::new(0.0, 0.0, 400.0, 0.0, 15.0).with_pattern(WallPattern::CrossHatch).at_level(level.id));
    plan.rooms.push(Room::rectangle(0.0, 0.0, 400.0, 300.0).with_name("Living").at_level(level.id));
    plan.furniture
        .push(Furniture::new("sofa", 200.0, 150.0, 180.0, 90.0, 80.0).at_level(level.id));
    plan.levels.push(level);

    let json = plan.to_json().unwrap();
    let back = PlanModel::from_json(&json).unwrap();
    assert_eq!(back.walls, plan.walls);
    assert_eq!(back.rooms, plan.rooms);
    assert_eq!(back.furniture, plan.furniture);
    assert_eq!(back.items_at_level(back.selected_level).len(), 3);
}

#[test]
fn test_minimal_json_fixture_uses_defaults() {
    let json = r#"{
        "rooms": [{
            "id": "6f1c2b7e-8d4a-4f0e-9a51-3c2d1b0a9f8e",
            "points": [{"x": 0, "y": 0}, {"x": 100, "y": 0}, {"x": 100, "y": 100}]
        }]
    }"#;
    let plan = PlanModel::from_json(json).unwrap();
    let room = &plan.rooms[0];
    assert!(room.floor_visible && room.ceiling_visible && room.area_visible);
    assert_eq!(room.area(), 5000.0);
    assert_eq!(plan.items()[0].kind(), ItemKind::Room);
}

#[test]
fn test_joined_wall_points_resolve_neighbours() {
    let mut a = Wall::new(0.0, 0.0, 100.0, 0.0, 10.0);
    let mut b = Wall::new(100.0, 0.0, 100.0, 100.0, 10.0);
    a.wall_at_end = Some(b.id);
    b.wall_at_start = Some(a.id);
    let (a_id, b_id) = (a.id, b.id);
    let mut plan = PlanModel::new();
    plan.walls = vec![a, b];

    let pa = plan.wall_points(a_id).unwrap();
    let pb = plan.wall_points(b_id).unwrap();
    // both walls share the outer corner
    assert!(pa[1].distance(&pb[0]) < 1e-3, "{:?} {:?}", pa, pb);
}
