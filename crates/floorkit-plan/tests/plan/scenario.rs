use floorkit_core::model::{Furniture, Level, Room, Wall};
use floorkit_core::{Color, ItemId, PlanModel, Point};
use floorkit_plan::export::{export_bounds, ExportScope};
use floorkit_plan::transform::MARGIN;
use floorkit_plan::{
    CacheInputs, Exportable, Layer, PaintMode, Paintable, PlanView, PrintRequest, Printable,
    RecordingSurface, TextMetrics, ViewServices,
};
use floorkit_settings::{Config, PrintSettings};
use std::sync::Arc;

struct Scenario {
    model: PlanModel,
    room: ItemId,
    wall: ItemId,
    piece: ItemId,
}

/// One level holding a coloured square room, a wall along its top edge and
/// a piece of furniture inside, all selected.
fn scenario() -> Scenario {
    let level = Level::new("Ground", 0.0, 12.0, 250.0);
    let level_id = level.id;
    let room = Room::new(vec![
        Point::new(0.0, 0.0),
        Point::new(500.0, 0.0),
        Point::new(500.0, 500.0),
        Point::new(0.0, 500.0),
    ])
    .with_floor_color(Color::rgb(200, 180, 140))
    .at_level(level_id);
    let wall = Wall::new(0.0, 0.0, 500.0, 0.0, 15.0).at_level(level_id);
    let piece = Furniture::new("Table", 250.0, 250.0, 120.0, 80.0, 75.0).at_level(level_id);

    let mut model = PlanModel::new();
    model.levels.push(level);
    model.selected_level = Some(level_id);
    let ids = (room.id, wall.id, piece.id);
    model.rooms.push(room);
    model.walls.push(wall);
    model.furniture.push(piece);
    for id in [ids.0, ids.1, ids.2] {
        model.selection.insert(id);
    }
    Scenario {
        model,
        room: ids.0,
        wall: ids.1,
        piece: ids.2,
    }
}

fn view(model: PlanModel) -> PlanView {
    PlanView::new(Arc::new(model), &Config::default(), ViewServices::default())
        .with_text_metrics(TextMetrics::approximate())
}

#[test]
fn test_clipboard_image_covers_padded_selection() {
    let scenario = scenario();
    let config = Config::default();
    let text = TextMetrics::approximate();
    let inputs = CacheInputs {
        wall_pattern: config.plan.wall_pattern,
        unit: config.plan.unit,
        text_styles: &config.plan.text_styles,
        text: &text,
        background_bounds: &[],
    };
    let bounds = export_bounds(&scenario.model, &inputs, ExportScope::CLIPBOARD).unwrap();

    let mut view = view(scenario.model);
    let image = view.export_clipboard_image().unwrap();
    assert_eq!(
        image.dimensions(),
        (
            (bounds.width() + 2.0 * MARGIN).ceil() as u32,
            (bounds.height() + 2.0 * MARGIN).ceil() as u32,
        )
    );
    // Opaque white in the margin
    assert_eq!(image.get_pixel(0, 0).0, [255, 255, 255, 255]);
}

#[test]
fn test_selection_prints_on_one_page() {
    let mut view = view(scenario().model);
    let request = PrintRequest {
        selection_only: true,
        ..PrintRequest::from_settings(&PrintSettings::default())
    };
    assert_eq!(view.page_count(&request), 1);
}

#[test]
fn test_selection_print_skips_unselected_items() {
    let mut scenario = scenario();
    scenario.model.selection.remove(&scenario.piece);
    let mut view = view(scenario.model);
    let selection = PrintRequest {
        selection_only: true,
        ..PrintRequest::from_settings(&PrintSettings::default())
    };

    let mut surface = RecordingSurface::new();
    view.print_page(&mut surface, &selection, 0).unwrap();
    let items = surface.items();
    assert!(items.contains(&scenario.room));
    assert!(items.contains(&scenario.wall));
    assert!(!items.contains(&scenario.piece));

    // A full print still paints the unselected piece
    let mut surface = RecordingSurface::new();
    let everything = PrintRequest::from_settings(&PrintSettings::default());
    view.print_page(&mut surface, &everything, 0).unwrap();
    assert!(surface.items().contains(&scenario.piece));
}

#[test]
fn test_fixed_scale_prints_on_several_pages() {
    let mut view = view(scenario().model);
    let request = PrintRequest {
        scale: Some(0.2),
        ..PrintRequest::from_settings(&PrintSettings::default())
    };
    // 580 cm at 1:5 is 116 cm of paper
    assert!(view.page_count(&request) > 1);
}

#[test]
fn test_walls_painted_after_rooms() {
    let scenario = scenario();
    let mut view = view(scenario.model);
    let mut surface = RecordingSurface::new();
    view.paint(&mut surface, PaintMode::Interactive).unwrap();

    let layers = surface.layers();
    let position = |layer| layers.iter().position(|l| *l == layer).unwrap();
    assert!(position(Layer::Rooms) < position(Layer::Walls));
    assert!(position(Layer::Walls) < position(Layer::Furniture));

    let items = surface.items();
    let first = |id| items.iter().position(|i| *i == id).unwrap();
    assert!(first(scenario.room) < first(scenario.wall));
    assert!(first(scenario.wall) < first(scenario.piece));
}

#[test]
fn test_floor_only_rooms_painted_first() {
    let mut model = PlanModel::new();
    let square = |x: f32| {
        vec![
            Point::new(x, 0.0),
            Point::new(x + 100.0, 0.0),
            Point::new(x + 100.0, 100.0),
            Point::new(x, 100.0),
        ]
    };
    let ceiling = Room::new(square(0.0)).with_visibility(false, true);
    let both = Room::new(square(200.0)).with_visibility(true, true);
    let floor = Room::new(square(400.0)).with_visibility(true, false);
    let expected = vec![floor.id, both.id, ceiling.id];
    model.rooms = vec![ceiling, both, floor];

    let mut view = view(model);
    let mut surface = RecordingSurface::new();
    view.paint(&mut surface, PaintMode::Print).unwrap();
    assert_eq!(surface.items_in_layer(Layer::Rooms), expected);
}

#[test]
fn test_clipboard_paints_selection_only() {
    let mut scenario = scenario();
    let extra = Wall::new(0.0, 600.0, 500.0, 600.0, 15.0);
    let extra_id = extra.id;
    scenario.model.walls.push(extra);

    let mut view = view(scenario.model);
    let mut surface = RecordingSurface::new();
    view.paint(&mut surface, PaintMode::Clipboard).unwrap();
    let items = surface.items();
    assert!(items.contains(&scenario.wall));
    assert!(!items.contains(&extra_id));
    assert!(!surface.layers().contains(&Layer::Grid));
    assert!(!surface.layers().contains(&Layer::Selection));
}
