use floorkit_core::model::WallPattern;
use floorkit_core::Color;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Stroke, Transform};

/// Side of a raster pattern tile.
pub const PATTERN_TILE_PIXELS: u32 = 16;

const LINE_WIDTH: f32 = 0.1;
const DOT_RADIUS: f32 = 0.12;

/// Mark drawn in a unit pattern tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum TileMark {
    Line { x1: f32, y1: f32, x2: f32, y2: f32 },
    Dot { x: f32, y: f32, r: f32 },
}

fn line(x1: f32, y1: f32, x2: f32, y2: f32) -> TileMark {
    TileMark::Line { x1, y1, x2, y2 }
}

/// Marks of `pattern` in a unit tile; lines crossing a corner are repeated
/// on the opposite corner so tiles join seamlessly.
pub(crate) fn tile_marks(pattern: WallPattern) -> Vec<TileMark> {
    let rising = [
        line(0.0, 1.0, 1.0, 0.0),
        line(-0.1, 0.1, 0.1, -0.1),
        line(0.9, 1.1, 1.1, 0.9),
    ];
    let falling = [
        line(0.0, 0.0, 1.0, 1.0),
        line(-0.1, 0.9, 0.1, 1.1),
        line(0.9, -0.1, 1.1, 0.1),
    ];
    match pattern {
        WallPattern::Hatch => rising.to_vec(),
        WallPattern::CrossHatch => rising.iter().chain(falling.iter()).copied().collect(),
        WallPattern::Dots => vec![TileMark::Dot {
            x: 0.5,
            y: 0.5,
            r: DOT_RADIUS,
        }],
        WallPattern::Solid | WallPattern::Empty => Vec::new(),
    }
}

pub(crate) const fn tile_line_width() -> f32 {
    LINE_WIDTH
}

/// Renders one tile of `pattern` for a repeating raster shader.
pub fn pattern_tile(pattern: WallPattern, foreground: Color, background: Color) -> Option<Pixmap> {
    let size = PATTERN_TILE_PIXELS;
    let mut pixmap = Pixmap::new(size, size)?;
    let fill = match pattern {
        WallPattern::Solid => foreground,
        _ => background,
    };
    pixmap.fill(skia_color(fill));

    let mut paint = Paint::default();
    paint.set_color(skia_color(foreground));
    paint.anti_alias = true;
    let transform = Transform::from_scale(size as f32, size as f32);
    let stroke = Stroke {
        width: LINE_WIDTH,
        ..Default::default()
    };
    for mark in tile_marks(pattern) {
        match mark {
            TileMark::Line { x1, y1, x2, y2 } => {
                let mut pb = PathBuilder::new();
                pb.move_to(x1, y1);
                pb.line_to(x2, y2);
                if let Some(path) = pb.finish() {
                    pixmap.stroke_path(&path, &paint, &stroke, transform, None);
                }
            }
            TileMark::Dot { x, y, r } => {
                if let Some(path) = PathBuilder::from_circle(x, y, r) {
                    pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
                }
            }
        }
    }
    Some(pixmap)
}

pub(crate) fn skia_color(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_tile_is_foreground() {
        let tile = pattern_tile(WallPattern::Solid, Color::BLACK, Color::WHITE).unwrap();
        let px = tile.pixel(8, 8).unwrap();
        assert_eq!((px.red(), px.green(), px.blue()), (0, 0, 0));
    }

    #[test]
    fn test_hatch_tile_has_both_colors() {
        let tile = pattern_tile(WallPattern::Hatch, Color::BLACK, Color::WHITE).unwrap();
        assert!(tile.pixels().iter().any(|p| p.red() == 255));
        assert!(tile.pixels().iter().any(|p| p.red() < 128));
    }

    #[test]
    fn test_empty_tile_has_no_marks() {
        assert!(tile_marks(WallPattern::Empty).is_empty());
        let tile = pattern_tile(WallPattern::Empty, Color::BLACK, Color::WHITE).unwrap();
        assert!(tile.pixels().iter().all(|p| p.red() == 255));
    }
}
