//! # Floorkit
//!
//! A two dimensional floor plan renderer and editor core:
//! - Walls, rooms, furniture, dimension lines, labels, compass and camera
//! - Zoom, scroll and snapping feedback for interactive editing
//! - Printing, clipboard images and SVG export
//!
//! ## Architecture
//!
//! Floorkit is organized as a workspace with multiple crates:
//!
//! 1. **floorkit-core** - Plan model, geometry, units, change events
//! 2. **floorkit-settings** - User preferences and configuration files
//! 3. **floorkit-plan** - Caches, painter, icons, exporters and the plan view
//! 4. **floorkit** - Command line exporter that integrates all crates

pub use floorkit_core::{
    event_bus, model, Color, Error, ExportError, ItemId, ItemKind, LengthUnit, PlanModel, Point,
    Rect, Result,
};
pub use floorkit_plan::{
    CancellationToken, Exportable, PageFormat, PaintMode, Paintable, PlanController, PlanView,
    PrintRequest, Printable, RasterSurface, RecordingSurface, SvgSurface, ViewServices,
};
pub use floorkit_settings::{Config, PlanPreferences, PrintSettings, RenderSettings};

use floorkit_core::model::{DimensionLine, Furniture, Label, Room, Wall};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// A furnished two room flat, every item selected.
pub fn sample_plan() -> PlanModel {
    let mut model = PlanModel::new();
    let outline = [
        (0.0, 0.0, 800.0, 0.0),
        (800.0, 0.0, 800.0, 500.0),
        (800.0, 500.0, 0.0, 500.0),
        (0.0, 500.0, 0.0, 0.0),
        (450.0, 0.0, 450.0, 500.0),
    ];
    for (xs, ys, xe, ye) in outline {
        model.walls.push(Wall::new(xs, ys, xe, ye, 15.0));
    }
    let room = |x0: f32, x1: f32, name: &str| {
        let mut room = Room::new(vec![
            Point::new(x0, 0.0),
            Point::new(x1, 0.0),
            Point::new(x1, 500.0),
            Point::new(x0, 500.0),
        ])
        .with_floor_color(Color::rgb(222, 205, 170));
        room.name = Some(name.to_string());
        room
    };
    model.rooms.push(room(0.0, 450.0, "Living room"));
    model.rooms.push(room(450.0, 800.0, "Bedroom"));
    model
        .furniture
        .push(Furniture::new("Sofa", 220.0, 420.0, 200.0, 90.0, 85.0));
    model
        .furniture
        .push(Furniture::new("Bed", 625.0, 250.0, 160.0, 200.0, 50.0));
    model
        .dimension_lines
        .push(DimensionLine::new(0.0, 560.0, 800.0, 560.0, 20.0));
    model.labels.push(Label::new("Ground floor", 400.0, -60.0));

    let ids: Vec<ItemId> = model.items().iter().map(|item| item.id()).collect();
    for id in ids {
        model.selection.insert(id);
    }
    model
}
