use floorkit_core::{LengthUnit, Point};
use floorkit_plan::grid::grid_spacing;
use floorkit_plan::snapping::{align, ALIGNMENT_PIXEL_MARGIN};
use floorkit_plan::{CoordinateTransform, PlanArea};
use proptest::prelude::*;

fn rectangle(x: f32, y: f32, w: f32, h: f32) -> Vec<Point> {
    vec![
        Point::new(x, y),
        Point::new(x + w, y),
        Point::new(x + w, y + h),
        Point::new(x, y + h),
    ]
}

proptest! {
    #[test]
    fn union_is_commutative(
        ax in -500.0f32..500.0, ay in -500.0f32..500.0, aw in 1.0f32..300.0, ah in 1.0f32..300.0,
        bx in -500.0f32..500.0, by in -500.0f32..500.0, bw in 1.0f32..300.0, bh in 1.0f32..300.0,
    ) {
        let a = PlanArea::from_polygon(&rectangle(ax, ay, aw, ah)).unwrap();
        let b = PlanArea::from_polygon(&rectangle(bx, by, bw, bh)).unwrap();
        let ab = a.union(&b);
        let ba = b.union(&a);
        let tolerance = 1e-3 * (aw * ah + bw * bh);
        prop_assert!((ab.area() - ba.area()).abs() <= tolerance);
        prop_assert!(ab.area() + tolerance >= (aw * ah).max(bw * bh));
        prop_assert!(ab.area() <= aw * ah + bw * bh + tolerance);

        let (r1, r2) = (ab.bounds().unwrap(), ba.bounds().unwrap());
        prop_assert!((r1.min_x - r2.min_x).abs() < 1e-2);
        prop_assert!((r1.max_y - r2.max_y).abs() < 1e-2);
    }

    #[test]
    fn scale_round_trips(scale in 0.01f32..10.0, x in -2000.0f32..2000.0) {
        let mut transform = CoordinateTransform::new();
        transform.set_scale(scale).unwrap();
        prop_assert_eq!(transform.scale(), scale);
        let back = transform.pixel_to_model_x(transform.model_to_pixel_x(x));
        prop_assert!((back - x).abs() <= 0.5 / scale + 1e-2);
    }

    #[test]
    fn minor_grid_respects_minimum(scale in 0.01f32..10.0) {
        let spacing = grid_spacing(LengthUnit::Centimeter, scale, 10.0, 50.0);
        prop_assert!(spacing.minor * scale >= 10.0 - 1e-3);
        prop_assert!(spacing.major >= spacing.minor);
    }

    #[test]
    fn grid_never_shrinks_when_zooming_out(s1 in 0.01f32..10.0, s2 in 0.01f32..10.0) {
        let (low, high) = if s1 < s2 { (s1, s2) } else { (s2, s1) };
        let coarse = grid_spacing(LengthUnit::Inch, low, 10.0, 50.0);
        let fine = grid_spacing(LengthUnit::Inch, high, 10.0, 50.0);
        prop_assert!(coarse.minor >= fine.minor);
    }

    #[test]
    fn alignment_follows_margin(scale in 0.05f32..5.0, fraction in 0.0f32..3.0) {
        prop_assume!((fraction - 1.0).abs() > 1e-3);
        let margin = ALIGNMENT_PIXEL_MARGIN / scale;
        let candidate = Point::new(0.0, 100.0);
        let moved = Point::new(10.0 * margin + 300.0, 100.0 + fraction * margin);
        let alignment = align(moved, &[candidate], scale);
        prop_assert_eq!(alignment.horizontal.is_some(), fraction < 1.0);
        prop_assert!(alignment.vertical.is_none());
    }
}
