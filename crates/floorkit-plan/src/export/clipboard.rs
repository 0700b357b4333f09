use floorkit_core::{Color, ExportError, Rect};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use std::io::Write;
use tiny_skia::Transform;
use tracing::info;

use crate::paint::{paint_plan, PaintContext, PaintMode};
use crate::surface::RasterSurface;
use crate::transform::MARGIN;

/// Size in pixels of a 1:1 raster of `bounds` with [`MARGIN`] on every side.
pub fn raster_size(bounds: &Rect) -> (u32, u32) {
    (
        (bounds.width() + 2.0 * MARGIN).ceil().max(1.0) as u32,
        (bounds.height() + 2.0 * MARGIN).ceil().max(1.0) as u32,
    )
}

/// Renders the selected items at scale 1 on opaque white.
///
/// `bounds` are the padded bounds of the selection.
pub fn render_clipboard(
    mut ctx: PaintContext<'_>,
    bounds: Rect,
    anti_alias: bool,
) -> Result<RgbaImage, ExportError> {
    if ctx.model.selection.is_empty() {
        return Err(ExportError::EmptySelection);
    }
    let (width, height) = raster_size(&bounds);
    let mut surface = RasterSurface::new(width, height)?
        .with_text_metrics(ctx.text.clone())
        .with_anti_alias(anti_alias);
    surface.clear(Color::WHITE);
    surface.set_transform(Transform::from_translate(
        MARGIN - bounds.min_x,
        MARGIN - bounds.min_y,
    ));

    ctx.mode = PaintMode::Clipboard;
    ctx.scale = 1.0;
    ctx.area = Rect::new(bounds.min_x - MARGIN, bounds.min_y - MARGIN, width as f32, height as f32);
    paint_plan(&mut surface, &ctx, None)?;
    info!("Rendered {}x{} clipboard image", width, height);
    Ok(surface.to_image())
}

/// Encodes `image` as PNG into `out`.
pub fn write_png<W: Write>(image: &RgbaImage, out: W) -> Result<(), ExportError> {
    PngEncoder::new(out)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| match e {
            image::ImageError::IoError(err) => ExportError::Io(err),
            other => ExportError::Image(other.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::GeometryCache;
    use crate::imaging::ImageCache;
    use crate::text::TextMetrics;
    use floorkit_core::model::Wall;
    use floorkit_core::PlanModel;
    use floorkit_settings::PlanPreferences;

    #[test]
    fn test_raster_size_adds_margins() {
        assert_eq!(raster_size(&Rect::new(0.0, 0.0, 10.2, 5.0)), (91, 85));
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let model = PlanModel::new();
        let cache = GeometryCache::new();
        let preferences = PlanPreferences::default();
        let text = TextMetrics::approximate();
        let images = ImageCache::new();
        let ctx = PaintContext::new(&model, &cache, &preferences, &text, &images, PaintMode::Clipboard, 1.0);
        let result = render_clipboard(ctx, Rect::new(0.0, 0.0, 10.0, 10.0), true);
        assert!(matches!(result, Err(ExportError::EmptySelection)));
    }

    #[test]
    fn test_clipboard_is_opaque_white_around_selection() {
        let mut model = PlanModel::new();
        let wall = Wall::new(0.0, 0.0, 100.0, 0.0, 10.0);
        model.selection.insert(wall.id);
        model.walls.push(wall);
        let cache = GeometryCache::new();
        let preferences = PlanPreferences::default();
        let text = TextMetrics::approximate();
        let images = ImageCache::new();
        let ctx = PaintContext::new(&model, &cache, &preferences, &text, &images, PaintMode::Clipboard, 1.0);
        let bounds = Rect::from_ltrb(0.0, -5.0, 100.0, 5.0);
        let image = render_clipboard(ctx, bounds, false).unwrap();
        assert_eq!(image.dimensions(), (180, 90));
        assert_eq!(image.get_pixel(1, 1).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_png_starts_with_signature() {
        let mut out = Vec::new();
        write_png(&RgbaImage::new(3, 2), &mut out).unwrap();
        assert_eq!(&out[..8], b"\x89PNG\r\n\x1a\n");
    }
}
