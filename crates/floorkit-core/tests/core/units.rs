use floorkit_core::units::{centimeter_to_inch, format_decimal, LengthUnit};
use proptest::prelude::*;

#[test]
fn test_grid_sizes_are_increasing() {
    for unit in [LengthUnit::Centimeter, LengthUnit::Inch] {
        let sizes = unit.grid_sizes();
        assert!(sizes.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*sizes.last().unwrap(), unit.main_grid_size());
    }
}

#[test]
fn test_area_in_square_feet() {
    assert_eq!(LengthUnit::Inch.format_area(929.0304 * 12.0), "12 sq ft");
}

#[test]
fn test_unit_serde_names() {
    let json = serde_json::to_string(&LengthUnit::Inch).unwrap();
    assert_eq!(json, "\"inch\"");
}

proptest! {
    #[test]
    fn magnetized_centimeter_length_stays_close(length in 0.0f32..10_000.0, delta in 0.01f32..200.0) {
        let magnetized = LengthUnit::Centimeter.magnetized_length(length, delta);
        // precision never exceeds the doubled delta tier above 100
        prop_assert!((magnetized - length).abs() <= 50.0 + 1e-2);
    }

    #[test]
    fn magnetized_inch_length_is_an_eighth_multiple(length in 0.0f32..3_000.0, delta in 0.01f32..2.0) {
        let magnetized = centimeter_to_inch(LengthUnit::Inch.magnetized_length(length, delta));
        let eighths = magnetized * 8.0;
        prop_assert!((eighths - eighths.round()).abs() < 1e-2);
    }

    #[test]
    fn format_decimal_uses_dot_and_commas_only(value in -1.0e7f64..1.0e7) {
        let text = format_decimal(value, 3, true);
        prop_assert!(text.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',' || c == '-'));
        let parsed: f64 = text.replace(',', "").parse().unwrap();
        prop_assert!((parsed - value).abs() <= 0.0005 + value.abs() * 1e-12);
    }
}
