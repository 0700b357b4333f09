//! # floorkit plan
//!
//! Two dimensional floor plan renderer and editor core.
//!
//! ## Components
//!
//! - **Transform**: model, pixel and screen coordinates, zoom and scroll
//! - **Cache**: unioned wall areas, ghost of the level below, plan bounds
//!   and paint orders, recomputed lazily after change events
//! - **Snapping**: alignment guides, angle arcs and magnetized dimension
//!   feedback
//! - **Icons**: recoloured plan icons and asynchronously baked top views
//! - **Paint**: the layer by layer painter drawing onto a [`PlanSurface`]
//! - **Export**: print pages, clipboard raster and SVG documents
//!
//! ## Usage
//!
//! ```rust,ignore
//! use floorkit_plan::{Paintable, PaintMode, PlanView, RasterSurface, ViewServices};
//!
//! let mut view = PlanView::new(model, &config, ViewServices::default());
//! let subscription = view.attach(&bus);
//! let mut surface = RasterSurface::new(800, 600)?;
//! view.paint(&mut surface, PaintMode::Interactive)?;
//! ```

pub mod area;
pub mod background;
pub mod cache;
pub mod export;
pub mod grid;
pub mod icons;
pub mod imaging;
pub mod paint;
pub mod shapes;
pub mod snapping;
pub mod surface;
pub mod tasks;
pub mod text;
pub mod transform;
pub mod view;

pub use area::PlanArea;
pub use background::BackgroundLoader;
pub use cache::{CacheInputs, DirtyTiers, GeometryCache, Invalidation, PendingInvalidations};
pub use export::{ExportScope, PageFormat, PrintLayout};
pub use icons::{IconRenderer, IconState, NoRenderer, TopViewIconProvider};
pub use imaging::ImageCache;
pub use paint::{paint_plan, PaintColors, PaintContext, PaintMode};
pub use snapping::{Alignment, AlignmentFeedback, AngleFeedback, FeedbackState};
pub use surface::{Layer, PlanSurface, RasterSurface, RecordingSurface, SvgSurface};
pub use tasks::{CancellationToken, InlineSpawner, RepaintRequest, TaskSpawner, TokioSpawner};
pub use text::TextMetrics;
pub use transform::{CoordinateTransform, ScrollState};
pub use view::{
    EditableProperty, Exportable, Modifiers, NoOpPlanController, Paintable, PlanController,
    PlanView, PrintRequest, Printable, ViewServices,
};
