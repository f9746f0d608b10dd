// =============================================================================
// Domain Estimator — y-axis range across all visible series
// =============================================================================
//
//   pad    = (max - min) * 0.05
//   domain = [min - pad, max + pad]
//
// Absent entries and non-finite numbers are skipped.  With nothing finite to
// scan the domain is the fixed [0, 100] so the axis never degenerates before
// data arrives.
// =============================================================================

use serde::Serialize;

use crate::timeline::MergedPoint;
use crate::types::IndicatorKey;

/// Fraction of the observed span added on each side.
pub const DOMAIN_PADDING: f64 = 0.05;

/// Domain used when no finite value is visible.
pub const DEFAULT_DOMAIN: ValueDomain = ValueDomain { min: 0.0, max: 100.0 };

/// A closed numeric range `[min, max]` for axis scaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueDomain {
    pub min: f64,
    pub max: f64,
}

impl ValueDomain {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Zero-width domain (all visible values equal).
    pub fn is_degenerate(&self) -> bool {
        self.span() == 0.0
    }

    /// Widen a degenerate domain to `[v - margin, v + margin]`.
    ///
    /// Non-degenerate domains are returned unchanged.
    pub fn with_min_margin(self, margin: f64) -> Self {
        if self.is_degenerate() {
            Self {
                min: self.min - margin,
                max: self.max + margin,
            }
        } else {
            self
        }
    }
}

/// Padded range of every requested indicator value in `points`.
pub fn estimate_domain(points: &[MergedPoint], keys: &[IndicatorKey]) -> ValueDomain {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;

    for point in points {
        for &key in keys {
            match point.value(key) {
                Some(v) if v.is_finite() => {
                    lo = lo.min(v);
                    hi = hi.max(v);
                }
                _ => {}
            }
        }
    }

    if !lo.is_finite() || !hi.is_finite() {
        return DEFAULT_DOMAIN;
    }

    let pad = (hi - lo) * DOMAIN_PADDING;
    ValueDomain {
        min: lo - pad,
        max: hi + pad,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn closes(values: &[f64]) -> Vec<MergedPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let mut p = MergedPoint::new(i as i64, String::new());
                p.values.set(IndicatorKey::Close, v);
                p
            })
            .collect()
    }

    #[test]
    fn pads_five_percent_of_span() {
        let d = estimate_domain(&closes(&[10.0, 20.0, 30.0]), &[IndicatorKey::Close]);
        assert!((d.min - 9.0).abs() < 1e-12, "min = {}", d.min);
        assert!((d.max - 31.0).abs() < 1e-12, "max = {}", d.max);
    }

    #[test]
    fn no_points_gives_default() {
        assert_eq!(estimate_domain(&[], &[IndicatorKey::Close]), DEFAULT_DOMAIN);
    }

    #[test]
    fn only_non_finite_gives_default() {
        let pts = closes(&[f64::NAN, f64::INFINITY, f64::NEG_INFINITY]);
        assert_eq!(estimate_domain(&pts, &[IndicatorKey::Close]), DEFAULT_DOMAIN);
    }

    #[test]
    fn non_finite_values_are_skipped() {
        let pts = closes(&[f64::NAN, 1.0, f64::INFINITY, 3.0]);
        let d = estimate_domain(&pts, &[IndicatorKey::Close]);
        assert!((d.min - 0.9).abs() < 1e-12);
        assert!((d.max - 3.1).abs() < 1e-12);
    }

    #[test]
    fn unrequested_keys_do_not_widen() {
        let mut pts = closes(&[5.0, 6.0]);
        pts[0].values.set(IndicatorKey::Sma, 1_000.0);
        let d = estimate_domain(&pts, &[IndicatorKey::Close]);
        assert!(d.max < 10.0);
    }

    #[test]
    fn spans_several_indicators() {
        let mut pts = closes(&[100.0]);
        pts[0].values.set(IndicatorKey::Distance, -0.5);
        let d = estimate_domain(&pts, &[IndicatorKey::Close, IndicatorKey::Distance]);
        assert!(d.min < -0.5);
        assert!(d.max > 100.0);
    }

    #[test]
    fn flat_series_is_degenerate_and_can_be_widened() {
        let d = estimate_domain(&closes(&[7.0, 7.0]), &[IndicatorKey::Close]);
        assert_eq!(d, ValueDomain { min: 7.0, max: 7.0 });
        assert!(d.is_degenerate());
        let w = d.with_min_margin(1.0);
        assert_eq!(w, ValueDomain { min: 6.0, max: 8.0 });
        assert_eq!(DEFAULT_DOMAIN.with_min_margin(1.0), DEFAULT_DOMAIN);
    }
}
