use floorkit_core::{ExportError, Rect};
use floorkit_settings::{Orientation, PaperSize, PrintSettings};
use tracing::debug;

use crate::paint::{paint_plan, PaintContext, PaintMode};
use crate::surface::{polygon_path, PlanSurface};
use crate::transform::MARGIN;

/// Points (1/72 inch) per centimetre.
pub const POINTS_PER_CM: f32 = 72.0 / 2.54;

/// Paper size and printable area, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFormat {
    pub width: f32,
    pub height: f32,
    pub imageable_x: f32,
    pub imageable_y: f32,
    pub imageable_width: f32,
    pub imageable_height: f32,
}

impl PageFormat {
    /// Page of `width` x `height` points with the same `margin` on every side.
    pub fn new(width: f32, height: f32, margin: f32) -> Self {
        Self {
            width,
            height,
            imageable_x: margin,
            imageable_y: margin,
            imageable_width: (width - 2.0 * margin).max(0.0),
            imageable_height: (height - 2.0 * margin).max(0.0),
        }
    }

    pub fn a4(orientation: Orientation) -> Self {
        Self::oriented(595.28, 841.89, 36.0, orientation)
    }

    pub fn letter(orientation: Orientation) -> Self {
        Self::oriented(612.0, 792.0, 36.0, orientation)
    }

    pub fn from_settings(settings: &PrintSettings) -> Self {
        let (width, height) = match settings.paper {
            PaperSize::A4 => (595.28, 841.89),
            PaperSize::Letter => (612.0, 792.0),
        };
        Self::oriented(width, height, settings.margin_inches * 72.0, settings.orientation)
    }

    fn oriented(width: f32, height: f32, margin: f32, orientation: Orientation) -> Self {
        match orientation {
            Orientation::Portrait => Self::new(width, height, margin),
            Orientation::Landscape => Self::new(height, width, margin),
        }
    }

    pub fn imageable_width_cm(&self) -> f32 {
        self.imageable_width / POINTS_PER_CM
    }

    pub fn imageable_height_cm(&self) -> f32 {
        self.imageable_height / POINTS_PER_CM
    }
}

/// How content is spread over pages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrintLayout {
    /// Paper centimetres per model centimetre.
    pub scale: f32,
    pub columns: usize,
    pub rows: usize,
    /// Printed model area, [`MARGIN`] included.
    pub content: Rect,
}

impl PrintLayout {
    pub fn page_count(&self) -> usize {
        self.columns * self.rows
    }

    /// Points per model unit.
    pub fn points_per_unit(&self) -> f32 {
        self.scale * POINTS_PER_CM
    }
}

/// Lays out the padded `bounds` on `format` pages.
///
/// Without `requested_scale`, the largest scale of the form `1/n` that fits
/// the content on one page is used.
pub fn print_layout(bounds: Rect, format: &PageFormat, requested_scale: Option<f32>) -> PrintLayout {
    let content = bounds.expanded(MARGIN);
    let page_width = format.imageable_width_cm();
    let page_height = format.imageable_height_cm();

    match requested_scale.filter(|s| s.is_finite() && *s > 0.0) {
        Some(scale) => PrintLayout {
            scale,
            columns: tiles(content.width() * scale, page_width),
            rows: tiles(content.height() * scale, page_height),
            content,
        },
        None => {
            let ratio = (content.width() / page_width).max(content.height() / page_height);
            let divisor = if ratio.is_finite() { ratio.ceil().max(1.0) } else { 1.0 };
            PrintLayout {
                scale: 1.0 / divisor,
                columns: 1,
                rows: 1,
                content,
            }
        }
    }
}

fn tiles(length: f32, page: f32) -> usize {
    if page <= 0.0 {
        return 1;
    }
    // Rounding noise must not add an empty page
    ((length / page) - 1e-4).ceil().max(1.0) as usize
}

/// Paints page `index` of `layout` onto a surface measured in points.
///
/// Content narrower than one page is centred along that axis.
pub fn print_page(
    surface: &mut dyn PlanSurface,
    mut ctx: PaintContext<'_>,
    layout: &PrintLayout,
    format: &PageFormat,
    index: usize,
) -> Result<(), ExportError> {
    let count = layout.page_count();
    if index >= count {
        return Err(ExportError::InvalidPage { index, count });
    }
    let (column, row) = (index % layout.columns, index / layout.columns);
    let unit = layout.points_per_unit();
    let tile_width = format.imageable_width / unit;
    let tile_height = format.imageable_height / unit;
    let content = layout.content;

    let x = if layout.columns == 1 {
        content.min_x - (tile_width - content.width()) / 2.0
    } else {
        content.min_x + column as f32 * tile_width
    };
    let y = if layout.rows == 1 {
        content.min_y - (tile_height - content.height()) / 2.0
    } else {
        content.min_y + row as f32 * tile_height
    };
    debug!("Printing page {} of {} at scale 1:{:.0}", index + 1, count, 1.0 / layout.scale);

    let imageable = Rect::new(
        format.imageable_x,
        format.imageable_y,
        format.imageable_width,
        format.imageable_height,
    );
    surface.save();
    surface.clip_path(&polygon_path(&imageable.corners()));
    surface.translate(format.imageable_x, format.imageable_y);
    surface.scale(unit, unit);
    surface.translate(-x, -y);

    ctx.mode = PaintMode::Print;
    ctx.scale = unit;
    ctx.area = Rect::new(x, y, tile_width, tile_height);
    let result = paint_plan(surface, &ctx, None);
    surface.restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::GeometryCache;
    use crate::imaging::ImageCache;
    use crate::surface::{DrawOp, RecordingSurface};
    use crate::text::TextMetrics;
    use floorkit_core::PlanModel;
    use floorkit_settings::PlanPreferences;

    #[test]
    fn test_a4_has_half_inch_margins() {
        let format = PageFormat::a4(Orientation::Portrait);
        assert_eq!(format.imageable_x, 36.0);
        assert!((format.imageable_width - 523.28).abs() < 1e-3);
        let landscape = PageFormat::a4(Orientation::Landscape);
        assert_eq!(landscape.width, format.height);
    }

    #[test]
    fn test_settings_select_paper() {
        let settings = PrintSettings {
            paper: PaperSize::Letter,
            margin_inches: 1.0,
            ..Default::default()
        };
        let format = PageFormat::from_settings(&settings);
        assert_eq!(format.imageable_width, 612.0 - 144.0);
    }

    #[test]
    fn test_auto_fit_is_one_page() {
        let format = PageFormat::a4(Orientation::Portrait);
        let small = print_layout(Rect::new(0.0, 0.0, 10.0, 10.0), &format, None);
        assert_eq!(small.scale, 1.0);
        assert_eq!(small.page_count(), 1);

        // 2080 cm wide with margins, about 113 A4 widths
        let large = print_layout(Rect::new(0.0, 0.0, 2000.0, 100.0), &format, None);
        assert_eq!(large.page_count(), 1);
        assert!(large.content.width() * large.scale <= format.imageable_width_cm());
        assert!(large.scale < 0.01);
    }

    #[test]
    fn test_explicit_scale_tiles_pages() {
        let format = PageFormat::a4(Orientation::Portrait);
        let page_width = format.imageable_width_cm();
        let bounds = Rect::new(0.0, 0.0, 3.0 * page_width - 2.0 * MARGIN, 10.0);
        let layout = print_layout(bounds, &format, Some(1.0));
        assert_eq!(layout.columns, 3);
        assert_eq!(layout.rows, 1);
        assert_eq!(layout.page_count(), 3);
    }

    #[test]
    fn test_page_out_of_range() {
        let model = PlanModel::new();
        let cache = GeometryCache::new();
        let preferences = PlanPreferences::default();
        let text = TextMetrics::approximate();
        let images = ImageCache::new();
        let ctx = PaintContext::new(&model, &cache, &preferences, &text, &images, PaintMode::Print, 1.0);
        let format = PageFormat::letter(Orientation::Portrait);
        let layout = print_layout(Rect::new(0.0, 0.0, 10.0, 10.0), &format, None);
        let mut surface = RecordingSurface::new();
        let err = print_page(&mut surface, ctx, &layout, &format, 1).unwrap_err();
        assert!(matches!(err, ExportError::InvalidPage { index: 1, count: 1 }));
        assert!(surface.ops().is_empty());
    }

    #[test]
    fn test_page_is_clipped_and_balanced() {
        let model = PlanModel::new();
        let cache = GeometryCache::new();
        let preferences = PlanPreferences::default();
        let text = TextMetrics::approximate();
        let images = ImageCache::new();
        let ctx = PaintContext::new(&model, &cache, &preferences, &text, &images, PaintMode::Print, 1.0);
        let format = PageFormat::a4(Orientation::Portrait);
        let layout = print_layout(Rect::new(0.0, 0.0, 10.0, 10.0), &format, None);
        let mut surface = RecordingSurface::new();
        print_page(&mut surface, ctx, &layout, &format, 0).unwrap();

        let ops = surface.ops();
        assert!(matches!(ops[0], DrawOp::Save));
        assert!(matches!(ops[1], DrawOp::Clip(_)));
        assert!(matches!(ops[3], DrawOp::Scale(s, _) if (s - POINTS_PER_CM).abs() < 1e-4));
        assert!(matches!(ops.last(), Some(DrawOp::Restore)));
    }
}
