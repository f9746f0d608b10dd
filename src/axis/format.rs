// =============================================================================
// Adaptive Formatter — magnitude-aware number labels
// =============================================================================
//
// Indicator values range from sub-cent distance metrics to multi-thousand
// dollar prices, so precision is picked per value from |v|:
//
//   |v|                   axis        tooltip
//   0 < x < 0.001         exp, 2      exp, 3
//   x >= 1_000_000        exp, 2      exp, 3
//   1_000 <= x < 1e6      fixed, 1    fixed, 2
//   1 <= x < 1_000        fixed, 2    fixed, 4
//   0 <= x < 1            fixed, 4    fixed, 6
//
// Exponential output has a fixed number of fraction digits in the mantissa and
// an explicitly signed exponent (`4.00e-4`, `1.50e+6`).  Non-finite input
// renders as "0".
// =============================================================================

use serde::{Deserialize, Serialize};

/// Precision profile: compact axis ticks or detailed tooltips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatProfile {
    #[default]
    Axis,
    Tooltip,
}

/// Digits after the decimal point for each magnitude tier.
struct Precision {
    exponential: usize,
    thousands: usize,
    units: usize,
    fraction: usize,
}

impl FormatProfile {
    fn precision(self) -> Precision {
        match self {
            Self::Axis => Precision {
                exponential: 2,
                thousands: 1,
                units: 2,
                fraction: 4,
            },
            Self::Tooltip => Precision {
                exponential: 3,
                thousands: 2,
                units: 4,
                fraction: 6,
            },
        }
    }

    /// Render `value` with this profile.
    pub fn format(self, value: f64) -> String {
        if !value.is_finite() {
            return "0".to_string();
        }
        // Avoid "-0.0000".
        let value = if value == 0.0 { 0.0 } else { value };

        let p = self.precision();
        let abs = value.abs();

        if (abs > 0.0 && abs < 0.001) || abs >= 1_000_000.0 {
            format_exponential(value, p.exponential)
        } else if abs >= 1_000.0 {
            format_fixed(value, p.thousands)
        } else if abs >= 1.0 {
            format_fixed(value, p.units)
        } else {
            format_fixed(value, p.fraction)
        }
    }
}

/// Axis tick label.
pub fn format_axis_value(value: f64) -> String {
    FormatProfile::Axis.format(value)
}

/// Tooltip label; one step more precise than the axis at every tier.
pub fn format_tooltip_value(value: f64) -> String {
    FormatProfile::Tooltip.format(value)
}

/// Fixed-point with `digits` decimals; ties round away from zero (1500.25 ->
/// "1500.3"), unlike `{:.N}` which rounds them to even.
fn format_fixed(value: f64, digits: usize) -> String {
    let scale = 10f64.powi(digits as i32);
    let rounded = (value.abs() * scale).round() / scale;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded.copysign(value) };
    format!("{rounded:.digits$}")
}

/// `d.ddde±x` with `digits` fraction digits in the mantissa.
fn format_exponential(value: f64, digits: usize) -> String {
    let raw = format!("{value:.digits$e}");
    match raw.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => raw,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_is_zero() {
        for v in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(format_axis_value(v), "0");
            assert_eq!(format_tooltip_value(v), "0");
        }
    }

    #[test]
    fn tiny_values_use_exponential() {
        assert_eq!(format_axis_value(0.0004), "4.00e-4");
        assert_eq!(format_tooltip_value(0.0004), "4.000e-4");
        assert_eq!(format_axis_value(-0.000012345), "-1.23e-5");
    }

    #[test]
    fn huge_values_use_signed_exponent() {
        assert_eq!(format_axis_value(1_500_000.0), "1.50e+6");
        assert_eq!(format_tooltip_value(1_500_000.0), "1.500e+6");
        assert_eq!(format_axis_value(-2_000_000.0), "-2.00e+6");
    }

    #[test]
    fn thousands_tier() {
        assert_eq!(format_axis_value(1500.0), "1500.0");
        assert_eq!(format_tooltip_value(1500.0), "1500.00");
        assert_eq!(format_axis_value(999_999.0), "999999.0");
        assert_eq!(format_axis_value(-64_250.74), "-64250.7");
    }

    #[test]
    fn units_tier() {
        assert_eq!(format_axis_value(1.0), "1.00");
        assert_eq!(format_tooltip_value(42.123456), "42.1235");
        assert_eq!(format_axis_value(-3.14259), "-3.14");
    }

    #[test]
    fn fraction_tier() {
        assert_eq!(format_axis_value(0.001), "0.0010");
        assert_eq!(format_tooltip_value(0.123456789), "0.123457");
        assert_eq!(format_axis_value(-0.5), "-0.5000");
    }

    #[test]
    fn ties_round_away_from_zero() {
        assert_eq!(format_axis_value(1500.25), "1500.3");
        assert_eq!(format_axis_value(2.125), "2.13");
        assert_eq!(format_tooltip_value(1500.125), "1500.13");
        assert_eq!(format_axis_value(-1500.25), "-1500.3");
        assert_eq!(format_axis_value(0.03125), "0.0313");
    }

    #[test]
    fn zero_falls_in_fraction_tier() {
        assert_eq!(format_axis_value(0.0), "0.0000");
        assert_eq!(format_axis_value(-0.0), "0.0000");
        assert_eq!(format_tooltip_value(0.0), "0.000000");
    }

    #[test]
    fn profile_deserializes_from_query_names() {
        let p: FormatProfile = serde_json::from_str("\"tooltip\"").unwrap();
        assert_eq!(p, FormatProfile::Tooltip);
        assert_eq!(FormatProfile::default(), FormatProfile::Axis);
    }
}
