//! Deterministic float ordering.
//!
//! Rankings (peak strength, nearest point) must not depend on NaN placement
//! or the sign of zero, so every float sort goes through these helpers.

use core::cmp::Ordering;

/// Canonicalize a floating-point value for deterministic ordering.
///
/// - `-0.0` becomes `0.0`
/// - all NaNs become a single canonical NaN
pub fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    canonical_f64(a).total_cmp(&canonical_f64(b))
}

#[cfg(test)]
mod tests {
    use super::{canonical_f64, stable_total_cmp_f64};
    use core::cmp::Ordering;

    #[test]
    fn canonicalizes_negative_zero() {
        assert_eq!(stable_total_cmp_f64(-0.0, 0.0), Ordering::Equal);
        assert_eq!(canonical_f64(-0.0).to_bits(), 0.0f64.to_bits());
    }

    #[test]
    fn nan_sorts_deterministically() {
        let mut v = vec![3.0, f64::NAN, 1.0];
        v.sort_by(|a, b| stable_total_cmp_f64(*a, *b));
        assert_eq!(v[0], 1.0);
        assert_eq!(v[1], 3.0);
        assert!(v[2].is_nan());
    }
}
