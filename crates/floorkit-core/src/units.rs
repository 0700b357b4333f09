//! Length unit handling
//!
//! Model lengths are always stored in centimetres. A [`LengthUnit`] decides
//! how they are displayed, magnetized and gridded.
//!
//! Formatting never consults the host locale: decimals use `.`, thousands
//! use `,`, so exported documents are identical on every machine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length unit used for display, grid spacing and magnetism
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    /// Centimetres, areas in square metres
    Centimeter,
    /// Feet and inches, areas in square feet
    Inch,
}

impl Default for LengthUnit {
    fn default() -> Self {
        Self::Centimeter
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Centimeter => write!(f, "cm"),
            Self::Inch => write!(f, "inch"),
        }
    }
}

impl FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "centimeter" | "centimetre" | "cm" | "metric" => Ok(Self::Centimeter),
            "inch" | "in" | "imperial" => Ok(Self::Inch),
            _ => Err(format!("Unknown length unit: {}", s)),
        }
    }
}

const FRACTION_CHARACTERS: [char; 7] = [
    '\u{215b}', '\u{00bc}', '\u{215c}', '\u{00bd}', '\u{215d}', '\u{00be}', '\u{215e}',
];

pub fn centimeter_to_inch(length: f32) -> f32 {
    length / 2.54
}

pub fn centimeter_to_foot(length: f32) -> f32 {
    length / 2.54 / 12.0
}

pub fn inch_to_centimeter(length: f32) -> f32 {
    length * 2.54
}

pub fn foot_to_centimeter(length: f32) -> f32 {
    length * 2.54 * 12.0
}

impl LengthUnit {
    /// Formats a length given in centimetres, without unit suffix for centimetres.
    pub fn format_length(&self, length_cm: f32) -> String {
        match self {
            Self::Centimeter => format_decimal(length_cm as f64, 1, true),
            Self::Inch => format_feet_inches(length_cm),
        }
    }

    /// Formats a length with its unit name appended.
    pub fn format_length_with_unit(&self, length_cm: f32) -> String {
        match self {
            Self::Centimeter => format!("{} cm", format_decimal(length_cm as f64, 1, true)),
            Self::Inch => format_feet_inches(length_cm),
        }
    }

    /// Formats an area given in square centimetres.
    pub fn format_area(&self, area_cm2: f32) -> String {
        match self {
            Self::Centimeter => {
                format!("{} m\u{00b2}", format_decimal(area_cm2 as f64 / 10000.0, 2, true))
            }
            Self::Inch => format!(
                "{} sq ft",
                format_decimal(area_cm2 as f64 / 929.0304, 2, true)
            ),
        }
    }

    /// Rounds `length` to a precision that depends on how far the pointer
    /// may be from the exact position (`max_delta`, in centimetres).
    pub fn magnetized_length(&self, length: f32, max_delta: f32) -> f32 {
        match self {
            Self::Centimeter => {
                let max_delta = max_delta * 2.0;
                let precision = if max_delta > 100.0 {
                    100.0
                } else if max_delta > 10.0 {
                    10.0
                } else if max_delta > 5.0 {
                    5.0
                } else if max_delta > 1.0 {
                    1.0
                } else if max_delta > 0.5 {
                    0.5
                } else {
                    0.1
                };
                (length / precision).round() * precision
            }
            Self::Inch => {
                let max_delta = centimeter_to_inch(max_delta) * 2.0;
                let precision = if max_delta > 6.0 {
                    6.0
                } else if max_delta > 3.0 {
                    3.0
                } else if max_delta > 1.0 {
                    1.0
                } else if max_delta > 0.5 {
                    0.5
                } else if max_delta > 0.25 {
                    0.25
                } else {
                    0.125
                };
                inch_to_centimeter((centimeter_to_inch(length) / precision).round() * precision)
            }
        }
    }

    /// Smallest length a user can enter in this unit.
    pub fn minimum_length(&self) -> f32 {
        match self {
            Self::Centimeter => 0.1,
            Self::Inch => inch_to_centimeter(0.125),
        }
    }

    /// Base grid progression, in centimetres.
    pub fn grid_sizes(&self) -> &'static [f32] {
        match self {
            Self::Centimeter => &[1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0],
            Self::Inch => &[2.54, 5.08, 7.62, 15.24, 30.48],
        }
    }

    /// Size of the main grid cell (1 m or 1 ft), in centimetres.
    pub fn main_grid_size(&self) -> f32 {
        match self {
            Self::Centimeter => 100.0,
            Self::Inch => 30.48,
        }
    }
}

fn format_feet_inches(length_cm: f32) -> String {
    let negative = length_cm < 0.0;
    let length_cm = length_cm.abs();
    let mut feet = centimeter_to_foot(length_cm).floor();
    let mut remaining_inches = centimeter_to_inch(length_cm - foot_to_centimeter(feet));
    if remaining_inches >= 11.9995 {
        feet += 1.0;
        remaining_inches -= 12.0;
    }
    let mut result = String::new();
    if negative {
        result.push('-');
    }
    result.push_str(&format_decimal(feet as f64, 0, true));
    result.push('\'');
    if remaining_inches >= 0.0005 {
        let integer_part = remaining_inches.floor();
        let fraction_part = remaining_inches - integer_part;
        let remainder_to_eighth = fraction_part % 0.125;
        if remainder_to_eighth <= 0.0005 || remainder_to_eighth >= 0.1245 {
            let eighth = (fraction_part * 8.0).round() as usize;
            if eighth == 0 || eighth == 8 {
                result.push_str(&format!("{}\"", remaining_inches.round() as i64));
            } else {
                result.push_str(&format!(
                    "{}{}\"",
                    integer_part as i64,
                    FRACTION_CHARACTERS[eighth - 1]
                ));
            }
        } else {
            result.push_str(&format!("{:.3}\"", remaining_inches));
        }
    }
    result
}

/// Locale independent decimal formatting with `max_fraction_digits` digits
/// at most, trailing zeros removed, and optional `,` thousands grouping.
pub fn format_decimal(value: f64, max_fraction_digits: usize, grouping: bool) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let formatted = format!("{:.*}", max_fraction_digits, value);
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i.to_string(), f.trim_end_matches('0').to_string()),
        None => (formatted.clone(), String::new()),
    };
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(d) => ("-", d.to_string()),
        None => ("", int_part.clone()),
    };
    let digits = if grouping {
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        grouped
    } else {
        digits
    };
    let negative_zero = sign == "-" && digits.chars().all(|c| c == '0' || c == ',') && frac_part.is_empty();
    let sign = if negative_zero { "" } else { sign };
    if frac_part.is_empty() {
        format!("{}{}", sign, digits)
    } else {
        format!("{}{}.{}", sign, digits, frac_part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_unit_from_str() {
        assert_eq!("cm".parse::<LengthUnit>().unwrap(), LengthUnit::Centimeter);
        assert_eq!("INCH".parse::<LengthUnit>().unwrap(), LengthUnit::Inch);
        assert!("furlong".parse::<LengthUnit>().is_err());
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(1234.56, 1, true), "1,234.6");
        assert_eq!(format_decimal(1234.0, 1, true), "1,234");
        assert_eq!(format_decimal(-0.01, 1, true), "0");
        assert_eq!(format_decimal(1234567.125, 3, false), "1234567.125");
        assert_eq!(format_decimal(-1500.5, 2, true), "-1,500.5");
    }

    #[test]
    fn test_format_centimeter_length_and_area() {
        let unit = LengthUnit::Centimeter;
        assert_eq!(unit.format_length(250.24), "250.2");
        assert_eq!(unit.format_length_with_unit(1000.0), "1,000 cm");
        assert_eq!(unit.format_area(125_000.0), "12.5 m\u{00b2}");
    }

    #[test]
    fn test_format_feet_and_inches() {
        let unit = LengthUnit::Inch;
        assert_eq!(unit.format_length(foot_to_centimeter(3.0)), "3'");
        assert_eq!(
            unit.format_length(foot_to_centimeter(2.0) + inch_to_centimeter(6.5)),
            "2'6\u{00bd}\""
        );
        assert_eq!(unit.format_length(inch_to_centimeter(4.0)), "0'4\"");
    }

    #[test]
    fn test_magnetized_length_centimeter() {
        let unit = LengthUnit::Centimeter;
        assert_eq!(unit.magnetized_length(123.4, 3.0), 125.0);
        assert_eq!(unit.magnetized_length(123.4, 0.6), 123.0);
        assert!((unit.magnetized_length(123.44, 0.1) - 123.4).abs() < 1e-3);
    }

    #[test]
    fn test_magnetized_length_inch() {
        let unit = LengthUnit::Inch;
        // max_delta of 4 inches doubles to 8 -> 6 inch precision
        let m = unit.magnetized_length(inch_to_centimeter(20.0), inch_to_centimeter(4.0));
        assert!((centimeter_to_inch(m) - 18.0).abs() < 1e-3);
    }
}
