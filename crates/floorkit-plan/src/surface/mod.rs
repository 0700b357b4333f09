//! Drawing surfaces
//!
//! The paint pipeline draws through the [`PlanSurface`] trait, a small 2D
//! graphics context working in model coordinates:
//!
//! - [`RasterSurface`] renders into a `tiny_skia::Pixmap` for the screen,
//!   print and clipboard targets
//! - [`SvgSurface`] streams a deterministic SVG document to any `io::Write`
//! - [`RecordingSurface`] keeps the ordered list of drawing operations
//!
//! Paths are `lyon` paths. Every surface keeps a state stack holding the
//! current transform, global alpha and clip.

mod pattern;
mod raster;
mod recording;
mod svg;

pub use pattern::{pattern_tile, PATTERN_TILE_PIXELS};
pub use raster::{image_from_pixmap, pixmap_from_image, RasterSurface};
pub use recording::{DrawOp, RecordingSurface};
pub use svg::SvgSurface;

use floorkit_core::model::{TextStyle, WallPattern};
use floorkit_core::{Color, ItemId, Rect};
use image::RgbaImage;
use lyon::math::point;
use lyon::path::{Event, Path};
use std::sync::Arc;

/// Paint pipeline layers, in painting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    Background,
    BackgroundImage,
    OtherLevel,
    Grid,
    Rooms,
    Walls,
    Furniture,
    DimensionLines,
    RoomTexts,
    FurnitureNames,
    Labels,
    Compass,
    Camera,
    Selection,
    DraggedItems,
    Feedback,
}

/// Fill paint.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    /// Repeating wall pattern, `tile` model units wide.
    Pattern {
        pattern: WallPattern,
        foreground: Color,
        background: Color,
        tile: f32,
    },
    /// Repeating image covering `width` x `height` model units.
    Texture {
        image: Arc<RgbaImage>,
        width: f32,
        height: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// Stroke attributes, widths in model units.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    pub cap: LineCap,
    pub join: LineJoin,
    pub dash: Option<Vec<f32>>,
}

impl StrokeStyle {
    pub fn new(width: f32) -> Self {
        Self {
            width,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            dash: None,
        }
    }

    pub fn round(width: f32) -> Self {
        Self {
            width,
            cap: LineCap::Round,
            join: LineJoin::Round,
            dash: None,
        }
    }

    pub fn with_join(mut self, join: LineJoin) -> Self {
        self.join = join;
        self
    }

    pub fn with_dash(mut self, dash: Vec<f32>) -> Self {
        self.dash = Some(dash);
        self
    }
}

/// 2D drawing context used by the paint pipeline.
pub trait PlanSurface {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, dx: f32, dy: f32);
    /// Rotates by `angle` radians, clockwise on screen.
    fn rotate(&mut self, angle: f32);
    fn scale(&mut self, sx: f32, sy: f32);
    /// Sets the global alpha, in `[0, 1]`.
    fn set_alpha(&mut self, alpha: f32);
    fn fill_path(&mut self, path: &Path, paint: &Paint);
    fn stroke_path(&mut self, path: &Path, color: Color, style: &StrokeStyle);
    /// Intersects the current clip with `path`.
    fn clip_path(&mut self, path: &Path);
    /// Draws `image` stretched over the model rectangle `dest`.
    fn draw_image(&mut self, image: &RgbaImage, dest: Rect);
    /// Draws `text` centred on `x` with its baseline at `y`.
    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle, color: Color);

    /// Marks the start of a pipeline layer.
    fn begin_layer(&mut self, _layer: Layer) {}

    /// Marks the start of the drawing of one item.
    fn begin_item(&mut self, _id: ItemId) {}
}

/// Closed polygon path through `points`.
pub fn polygon_path(points: &[floorkit_core::Point]) -> Path {
    polyline(points, true)
}

/// Open or closed path through `points`.
pub fn polyline(points: &[floorkit_core::Point], closed: bool) -> Path {
    let mut builder = Path::builder();
    let mut iter = points.iter();
    if let Some(first) = iter.next() {
        builder.begin(point(first.x, first.y));
        for p in iter {
            builder.line_to(point(p.x, p.y));
        }
        builder.end(closed);
    }
    builder.build()
}

/// Single segment path.
pub fn line_path(x1: f32, y1: f32, x2: f32, y2: f32) -> Path {
    let mut builder = Path::builder();
    builder.begin(point(x1, y1));
    builder.line_to(point(x2, y2));
    builder.end(false);
    builder.build()
}

/// Converts a lyon path to a tiny-skia path.
pub(crate) fn to_skia_path(path: &Path) -> Option<tiny_skia::Path> {
    let mut pb = tiny_skia::PathBuilder::new();
    for event in path.iter() {
        match event {
            Event::Begin { at } => pb.move_to(at.x, at.y),
            Event::Line { to, .. } => pb.line_to(to.x, to.y),
            Event::Quadratic { ctrl, to, .. } => pb.quad_to(ctrl.x, ctrl.y, to.x, to.y),
            Event::Cubic {
                ctrl1, ctrl2, to, ..
            } => pb.cubic_to(ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y),
            Event::End { close, .. } => {
                if close {
                    pb.close();
                }
            }
        }
    }
    pb.finish()
}
