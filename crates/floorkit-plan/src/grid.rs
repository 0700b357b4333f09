//! Adaptive grid and ruler spacing.
//!
//! Grid sizes follow a fixed progression per unit system. The minor size is
//! the first tier spaced at least `min_minor_px` on screen; the major size is
//! the first tier, from the unit's main size up, spaced at least
//! `min_major_px` and holding a whole number of minor cells.

use floorkit_core::units::{centimeter_to_foot, format_decimal};
use floorkit_core::LengthUnit;

/// Upper bound on generated tiers, reached only at absurdly small scales.
const MAX_TIERS: usize = 64;

/// Upper bound on lines returned for one axis.
const MAX_LINES: usize = 10_000;

/// Minor and major grid sizes, in centimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpacing {
    pub minor: f32,
    pub major: f32,
}

/// Tick positions of a ruler along one axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RulerTicks {
    /// Labelled ticks and their text.
    pub major: Vec<(f32, String)>,
    pub minor: Vec<f32>,
}

/// Grid size progression of `unit`, smallest first.
pub fn grid_tiers(unit: LengthUnit) -> impl Iterator<Item = f32> {
    let base = unit.grid_sizes();
    let main = match unit {
        LengthUnit::Centimeter => 1.0,
        LengthUnit::Inch => unit.main_grid_size(),
    };
    // Past the base sizes the progression continues in 2, 5, 10 decades
    // of the main size
    let extension = (0..).flat_map(move |decade: i32| {
        let factor = 10f32.powi(decade);
        let multipliers: &[f32] = match unit {
            LengthUnit::Centimeter => &[200.0, 500.0, 1000.0],
            LengthUnit::Inch => &[2.0, 5.0, 10.0],
        };
        multipliers.iter().map(move |m| m * factor * main)
    });
    base.iter().copied().chain(extension).take(MAX_TIERS)
}

/// Picks the grid sizes to use at `scale`.
pub fn grid_spacing(unit: LengthUnit, scale: f32, min_minor_px: f32, min_major_px: f32) -> GridSpacing {
    let mut minor = 0.0;
    for size in grid_tiers(unit) {
        minor = size;
        if size * scale >= min_minor_px {
            break;
        }
    }

    let main = unit.main_grid_size();
    let mut major = minor;
    for size in grid_tiers(unit).filter(|s| *s >= main - 1e-3 && *s >= minor - 1e-3) {
        major = size;
        if size * scale >= min_major_px && is_multiple(size, minor) {
            break;
        }
    }
    GridSpacing { minor, major }
}

fn is_multiple(size: f32, step: f32) -> bool {
    let ratio = size / step;
    ratio >= 1.0 - 1e-4 && (ratio - ratio.round()).abs() < 1e-3
}

/// Grid line positions covering `[min, max)`, starting on a multiple of `size`.
pub fn grid_lines(min: f32, max: f32, size: f32) -> Vec<f32> {
    if size <= 0.0 || !size.is_finite() || !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    let start = (min / size).floor() * size;
    (0..MAX_LINES)
        .map(|i| start + i as f32 * size)
        .take_while(|x| *x < max)
        .collect()
}

/// Ticks of a ruler spanning `[min, max)` model units.
pub fn ruler_ticks(
    min: f32,
    max: f32,
    scale: f32,
    unit: LengthUnit,
    min_minor_px: f32,
    min_major_px: f32,
) -> RulerTicks {
    let spacing = grid_spacing(unit, scale, min_minor_px, min_major_px);
    let mut ticks = RulerTicks::default();
    for x in grid_lines(min, max, spacing.minor) {
        if is_multiple_position(x, spacing.major) {
            ticks.major.push((x, tick_text(unit, x)));
        } else {
            ticks.minor.push(x);
        }
    }
    ticks
}

fn is_multiple_position(x: f32, step: f32) -> bool {
    let ratio = x / step;
    (ratio - ratio.round()).abs() < 1e-3
}

/// Ruler label: metres for metric units, feet for imperial ones.
fn tick_text(unit: LengthUnit, value: f32) -> String {
    let value = if value.abs() < 1e-5 { 0.0 } else { value };
    match unit {
        LengthUnit::Inch => format!("{}'", format_decimal(centimeter_to_foot(value) as f64, 1, true)),
        LengthUnit::Centimeter => {
            let text = format_decimal(value as f64 / 100.0, 2, true);
            if value == 0.0 {
                format!("{text}m")
            } else {
                text
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_tiers_extend() {
        let tiers: Vec<f32> = grid_tiers(LengthUnit::Centimeter).take(13).collect();
        assert_eq!(
            tiers,
            vec![1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0, 200.0, 500.0, 1000.0, 2000.0, 5000.0, 10000.0]
        );
    }

    #[test]
    fn test_imperial_tiers_extend_in_feet() {
        let tiers: Vec<f32> = grid_tiers(LengthUnit::Inch).take(8).collect();
        assert_eq!(tiers[4], 30.48);
        assert!((tiers[5] - 60.96).abs() < 1e-3);
        assert!((tiers[6] - 152.4).abs() < 1e-3);
        assert!((tiers[7] - 304.8).abs() < 1e-3);
    }

    #[test]
    fn test_default_scale_spacing() {
        let spacing = grid_spacing(LengthUnit::Centimeter, 0.5, 10.0, 50.0);
        assert_eq!(spacing, GridSpacing { minor: 20.0, major: 100.0 });
    }

    #[test]
    fn test_small_scale_uses_extended_tiers() {
        let spacing = grid_spacing(LengthUnit::Centimeter, 0.001, 10.0, 50.0);
        assert_eq!(spacing.minor, 10000.0);
        assert!(spacing.major * 0.001 >= 50.0);
        assert!(is_multiple(spacing.major, spacing.minor));
    }

    #[test]
    fn test_major_skips_non_multiples() {
        // 5 feet is wide enough on screen but holds 2.5 cells of 2 feet
        let spacing = grid_spacing(LengthUnit::Inch, 0.35, 15.0, 50.0);
        assert!((spacing.minor - 60.96).abs() < 1e-3);
        assert!((spacing.major - 304.8).abs() < 1e-2, "{spacing:?}");
    }

    #[test]
    fn test_grid_lines_start_on_multiple() {
        assert_eq!(grid_lines(-25.0, 30.0, 20.0), vec![-40.0, -20.0, 0.0, 20.0]);
        assert!(grid_lines(0.0, 10.0, 0.0).is_empty());
    }

    #[test]
    fn test_ruler_labels() {
        let ticks = ruler_ticks(-40.0, 250.0, 0.5, LengthUnit::Centimeter, 10.0, 50.0);
        let labels: Vec<_> = ticks.major.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(labels, vec!["0m", "1", "2"]);
        assert!(ticks.minor.contains(&20.0));

        let ticks = ruler_ticks(0.0, 400.0, 0.5, LengthUnit::Inch, 10.0, 50.0);
        assert_eq!(ticks.major[0].1, "0'");
        assert_eq!(ticks.major[1].1, "5'");
    }
}
