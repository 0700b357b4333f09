use floorkit_core::model::TextStyle;
use floorkit_core::{Color, ExportError, Rect};
use image::RgbaImage;
use lyon::path::Path;
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, Mask, Pattern, Pixmap, PixmapPaint, SpreadMode, Stroke,
    StrokeDash, Transform,
};

use super::pattern::{pattern_tile, skia_color, PATTERN_TILE_PIXELS};
use super::{to_skia_path, LineCap, LineJoin, Paint, PlanSurface, StrokeStyle};
use crate::text::TextMetrics;

#[derive(Clone)]
struct State {
    transform: Transform,
    alpha: f32,
    clip: Option<Mask>,
}

/// Surface rendering into a tiny-skia pixmap.
pub struct RasterSurface {
    pixmap: Pixmap,
    state: State,
    stack: Vec<State>,
    text: TextMetrics,
    anti_alias: bool,
}

impl RasterSurface {
    /// Creates a transparent `width` x `height` surface.
    pub fn new(width: u32, height: u32) -> Result<Self, ExportError> {
        let pixmap = Pixmap::new(width, height)
            .ok_or(ExportError::SurfaceAllocation { width, height })?;
        Ok(Self {
            pixmap,
            state: State {
                transform: Transform::identity(),
                alpha: 1.0,
                clip: None,
            },
            stack: Vec::new(),
            text: TextMetrics::default(),
            anti_alias: true,
        })
    }

    pub fn with_text_metrics(mut self, text: TextMetrics) -> Self {
        self.text = text;
        self
    }

    pub fn with_anti_alias(mut self, anti_alias: bool) -> Self {
        self.anti_alias = anti_alias;
        self
    }

    /// Replaces the current transform.
    pub fn set_transform(&mut self, transform: Transform) {
        self.state.transform = transform;
    }

    pub fn transform(&self) -> Transform {
        self.state.transform
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Fills the whole pixmap, ignoring transform, alpha and clip.
    pub fn clear(&mut self, color: Color) {
        self.pixmap.fill(skia_color(color));
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }

    /// Copy of the pixels as a straight alpha image.
    pub fn to_image(&self) -> RgbaImage {
        image_from_pixmap(&self.pixmap)
    }

    fn paint_for_color(&self, color: Color) -> tiny_skia::Paint<'static> {
        let mut paint = tiny_skia::Paint::default();
        let alpha = (color.a as f32 * self.state.alpha).round().clamp(0.0, 255.0) as u8;
        paint.set_color(skia_color(color.with_alpha(alpha)));
        paint.anti_alias = self.anti_alias;
        paint
    }

    fn fill_with_pixmap(&mut self, path: &tiny_skia::Path, pixmap: &Pixmap, transform: Transform) {
        let shader = Pattern::new(
            pixmap.as_ref(),
            SpreadMode::Repeat,
            FilterQuality::Bilinear,
            self.state.alpha,
            transform,
        );
        let paint = tiny_skia::Paint {
            shader,
            anti_alias: self.anti_alias,
            ..Default::default()
        };
        self.pixmap.fill_path(
            path,
            &paint,
            FillRule::EvenOdd,
            self.state.transform,
            self.state.clip.as_ref(),
        );
    }
}

impl PlanSurface for RasterSurface {
    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.state.transform = self.state.transform.pre_translate(dx, dy);
    }

    fn rotate(&mut self, angle: f32) {
        self.state.transform = self
            .state
            .transform
            .pre_concat(Transform::from_rotate(angle.to_degrees()));
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.state.transform = self.state.transform.pre_scale(sx, sy);
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    fn fill_path(&mut self, path: &Path, paint: &Paint) {
        let Some(path) = to_skia_path(path) else {
            return;
        };
        match paint {
            Paint::Solid(color) => {
                let paint = self.paint_for_color(*color);
                self.pixmap.fill_path(
                    &path,
                    &paint,
                    FillRule::EvenOdd,
                    self.state.transform,
                    self.state.clip.as_ref(),
                );
            }
            Paint::Pattern {
                pattern,
                foreground,
                background,
                tile,
            } => {
                let Some(tile_pixmap) = pattern_tile(*pattern, *foreground, *background) else {
                    return;
                };
                let ratio = tile / PATTERN_TILE_PIXELS as f32;
                self.fill_with_pixmap(&path, &tile_pixmap, Transform::from_scale(ratio, ratio));
            }
            Paint::Texture {
                image,
                width,
                height,
            } => {
                let Some(texture) = pixmap_from_image(image) else {
                    return;
                };
                let sx = width / texture.width() as f32;
                let sy = height / texture.height() as f32;
                self.fill_with_pixmap(&path, &texture, Transform::from_scale(sx, sy));
            }
        }
    }

    fn stroke_path(&mut self, path: &Path, color: Color, style: &StrokeStyle) {
        let Some(path) = to_skia_path(path) else {
            return;
        };
        let paint = self.paint_for_color(color);
        let stroke = Stroke {
            width: style.width,
            miter_limit: 10.0,
            line_cap: match style.cap {
                LineCap::Butt => tiny_skia::LineCap::Butt,
                LineCap::Round => tiny_skia::LineCap::Round,
                LineCap::Square => tiny_skia::LineCap::Square,
            },
            line_join: match style.join {
                LineJoin::Miter => tiny_skia::LineJoin::Miter,
                LineJoin::Round => tiny_skia::LineJoin::Round,
                LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
            },
            dash: style
                .dash
                .as_ref()
                .and_then(|dash| StrokeDash::new(dash.clone(), 0.0)),
        };
        self.pixmap.stroke_path(
            &path,
            &paint,
            &stroke,
            self.state.transform,
            self.state.clip.as_ref(),
        );
    }

    fn clip_path(&mut self, path: &Path) {
        let Some(path) = to_skia_path(path) else {
            return;
        };
        let transform = self.state.transform;
        match self.state.clip.as_mut() {
            Some(mask) => mask.intersect_path(&path, FillRule::EvenOdd, self.anti_alias, transform),
            None => {
                if let Some(mut mask) = Mask::new(self.pixmap.width(), self.pixmap.height()) {
                    mask.fill_path(&path, FillRule::EvenOdd, self.anti_alias, transform);
                    self.state.clip = Some(mask);
                }
            }
        }
    }

    fn draw_image(&mut self, image: &RgbaImage, dest: Rect) {
        let Some(source) = pixmap_from_image(image) else {
            return;
        };
        let transform = self
            .state
            .transform
            .pre_translate(dest.min_x, dest.min_y)
            .pre_scale(
                dest.width() / source.width() as f32,
                dest.height() / source.height() as f32,
            );
        let paint = PixmapPaint {
            opacity: self.state.alpha,
            quality: FilterQuality::Bilinear,
            ..Default::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, source.as_ref(), &paint, transform, self.state.clip.as_ref());
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle, color: Color) {
        let anchor = floorkit_core::Point::new(x, y);
        if let Some(outline) = self.text.outline(text, style, anchor) {
            self.fill_path(&outline, &Paint::Solid(color));
        }
    }
}

/// Converts a straight alpha image to a premultiplied pixmap.
pub fn pixmap_from_image(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
    }
    Some(pixmap)
}

/// Converts a premultiplied pixmap to a straight alpha image.
pub fn image_from_pixmap(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::polygon_path;
    use floorkit_core::model::WallPattern;

    fn square() -> Path {
        polygon_path(&Rect::new(2.0, 2.0, 6.0, 6.0).corners())
    }

    #[test]
    fn test_fill_with_transform() {
        let mut surface = RasterSurface::new(20, 20).unwrap();
        surface.scale(2.0, 2.0);
        surface.fill_path(&square(), &Paint::Solid(Color::BLACK));
        let image = surface.to_image();
        assert_eq!(image.get_pixel(10, 10)[3], 255);
        assert_eq!(image.get_pixel(2, 2)[3], 0);
    }

    #[test]
    fn test_save_restore_alpha() {
        let mut surface = RasterSurface::new(10, 10).unwrap();
        surface.save();
        surface.set_alpha(0.5);
        surface.fill_path(&square(), &Paint::Solid(Color::BLACK));
        surface.restore();
        let alpha = surface.to_image().get_pixel(5, 5)[3];
        assert!((126..=129).contains(&alpha), "{alpha}");
    }

    #[test]
    fn test_clip_limits_fill() {
        let mut surface = RasterSurface::new(10, 10).unwrap();
        surface.clip_path(&polygon_path(&Rect::new(0.0, 0.0, 5.0, 10.0).corners()));
        surface.fill_path(&square(), &Paint::Solid(Color::BLACK));
        let image = surface.to_image();
        assert_eq!(image.get_pixel(3, 5)[3], 255);
        assert_eq!(image.get_pixel(7, 5)[3], 0);
    }

    #[test]
    fn test_pattern_fill_mixes_colors() {
        let mut surface = RasterSurface::new(64, 64).unwrap();
        let paint = Paint::Pattern {
            pattern: WallPattern::Hatch,
            foreground: Color::BLACK,
            background: Color::WHITE,
            tile: 16.0,
        };
        surface.fill_path(&polygon_path(&Rect::new(0.0, 0.0, 64.0, 64.0).corners()), &paint);
        let image = surface.to_image();
        assert!(image.pixels().any(|p| p[0] > 200));
        assert!(image.pixels().any(|p| p[0] < 60));
    }

    #[test]
    fn test_draw_image_stretches() {
        let mut surface = RasterSurface::new(10, 10).unwrap();
        let mut source = RgbaImage::new(1, 1);
        source.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        surface.draw_image(&source, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(surface.to_image().get_pixel(9, 9)[0], 255);
    }

    #[test]
    fn test_allocation_failure() {
        assert!(matches!(
            RasterSurface::new(0, 10),
            Err(ExportError::SurfaceAllocation { width: 0, height: 10 })
        ));
    }
}
