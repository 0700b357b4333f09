use floorkit_core::model::TextStyle;
use floorkit_core::{Color, ItemId, Rect};
use image::RgbaImage;
use lyon::path::Path;

use super::{Layer, Paint, PlanSurface, StrokeStyle};

/// One recorded drawing operation.
#[derive(Debug, Clone)]
pub enum DrawOp {
    Save,
    Restore,
    Translate(f32, f32),
    Rotate(f32),
    Scale(f32, f32),
    Alpha(f32),
    Fill { path: Path, paint: Paint },
    Stroke { path: Path, color: Color, style: StrokeStyle },
    Clip(Path),
    Image { width: u32, height: u32, dest: Rect },
    Text { text: String, x: f32, y: f32, style: TextStyle, color: Color },
    Layer(Layer),
    Item(ItemId),
}

/// Surface that only records what is drawn.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<DrawOp> {
        self.ops
    }

    /// Layers in the order they were started.
    pub fn layers(&self) -> Vec<Layer> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Layer(layer) => Some(*layer),
                _ => None,
            })
            .collect()
    }

    /// Items in the order they were drawn, repeats included.
    pub fn items(&self) -> Vec<ItemId> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Item(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Items drawn while `layer` was the current layer.
    pub fn items_in_layer(&self, layer: Layer) -> Vec<ItemId> {
        let mut current = None;
        let mut items = Vec::new();
        for op in &self.ops {
            match op {
                DrawOp::Layer(l) => current = Some(*l),
                DrawOp::Item(id) if current == Some(layer) => items.push(*id),
                _ => {}
            }
        }
        items
    }

    /// Texts drawn, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl PlanSurface for RecordingSurface {
    fn save(&mut self) {
        self.ops.push(DrawOp::Save);
    }

    fn restore(&mut self) {
        self.ops.push(DrawOp::Restore);
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.ops.push(DrawOp::Translate(dx, dy));
    }

    fn rotate(&mut self, angle: f32) {
        self.ops.push(DrawOp::Rotate(angle));
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.ops.push(DrawOp::Scale(sx, sy));
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.ops.push(DrawOp::Alpha(alpha));
    }

    fn fill_path(&mut self, path: &Path, paint: &Paint) {
        self.ops.push(DrawOp::Fill {
            path: path.clone(),
            paint: paint.clone(),
        });
    }

    fn stroke_path(&mut self, path: &Path, color: Color, style: &StrokeStyle) {
        self.ops.push(DrawOp::Stroke {
            path: path.clone(),
            color,
            style: style.clone(),
        });
    }

    fn clip_path(&mut self, path: &Path) {
        self.ops.push(DrawOp::Clip(path.clone()));
    }

    fn draw_image(&mut self, image: &RgbaImage, dest: Rect) {
        self.ops.push(DrawOp::Image {
            width: image.width(),
            height: image.height(),
            dest,
        });
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle, color: Color) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            style: *style,
            color,
        });
    }

    fn begin_layer(&mut self, layer: Layer) {
        self.ops.push(DrawOp::Layer(layer));
    }

    fn begin_item(&mut self, id: ItemId) {
        self.ops.push(DrawOp::Item(id));
    }
}
