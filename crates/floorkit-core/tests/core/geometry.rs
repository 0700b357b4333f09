use floorkit_core::geometry::{polygon_contains, polygon_signed_area, rotated_rectangle, Point, Rect};
use proptest::prelude::*;

#[test]
fn test_rect_union_and_intersection() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(5.0, 5.0, 10.0, 10.0);
    let c = Rect::new(20.0, 20.0, 1.0, 1.0);
    assert_eq!(a.union(&b), Rect::from_ltrb(0.0, 0.0, 15.0, 15.0));
    assert!(a.intersects(&b));
    assert!(!a.intersects(&c));
    assert!(a.expanded(1.0).contains(&Point::new(-0.5, 10.5)));
}

proptest! {
    #[test]
    fn rotated_rectangle_keeps_area(
        w in 1.0f32..500.0,
        d in 1.0f32..500.0,
        angle in -6.3f32..6.3,
    ) {
        let pts = rotated_rectangle(100.0, 50.0, w, d, angle);
        let area = polygon_signed_area(&pts).abs();
        prop_assert!((area - w * d).abs() <= w * d * 1e-3);
        prop_assert!(polygon_contains(&pts, &Point::new(100.0, 50.0)));
    }
}
