use crate::config::thresholds::Bounds;

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

/// Piecewise-linear map of `value` onto [0, 1].
///
/// Missing or non-finite input scores 0. Values at or below `low` give 0, at or
/// above `high` give 1; `invert` flips the result.
pub fn normalize(value: Option<f64>, low: f64, high: f64, invert: bool) -> f64 {
    let v = match value {
        Some(v) if v.is_finite() => v,
        _ => return 0.0,
    };
    let score = if v <= low {
        0.0
    } else if v >= high {
        1.0
    } else {
        (v - low) / (high - low)
    };
    if invert {
        1.0 - score
    } else {
        score
    }
}

pub fn normalize_in(value: f64, bounds: &Bounds) -> f64 {
    normalize(Some(value), bounds.low, bounds.high, false)
}

pub fn normalize_inverted_in(value: f64, bounds: &Bounds) -> f64 {
    normalize(Some(value), bounds.low, bounds.high, true)
}

/// log10 with a floor, so zero or negative inputs stay finite.
pub fn log10_floored(value: f64, floor: f64) -> f64 {
    value.max(floor).log10()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_missing_and_nan_score_zero() {
        assert_eq!(normalize(None, 0.0, 1.0, false), 0.0);
        assert_eq!(normalize(Some(f64::NAN), 0.0, 1.0, false), 0.0);
        assert_eq!(normalize(Some(f64::INFINITY), 0.0, 1.0, false), 0.0);
    }

    #[test]
    fn test_missing_input_is_zero_even_inverted() {
        // Absence is never promoted to a perfect inverted score.
        assert_eq!(normalize(None, 0.0, 1.0, true), 0.0);
    }

    #[test]
    fn test_interpolates_linearly() {
        assert!((normalize(Some(5.0), 0.0, 10.0, false) - 0.5).abs() < 1e-12);
        assert!((normalize(Some(-3.0), -6.0, 10.0, false) - 0.1875).abs() < 1e-12);
    }

    #[test]
    fn test_log10_floor() {
        assert_eq!(log10_floored(0.0, 1.0), 0.0);
        assert!((log10_floored(0.0, 1e-6) + 6.0).abs() < 1e-12);
    }

    fn arb_bounds() -> impl Strategy<Value = (f64, f64)> {
        (-1000.0..1000.0_f64, 0.001..500.0_f64).prop_map(|(low, width)| (low, low + width))
    }

    proptest! {
        #[test]
        fn saturates_at_or_below_low((low, high) in arb_bounds(), below in 0.0..1000.0_f64) {
            prop_assert_eq!(normalize(Some(low - below), low, high, false), 0.0);
        }

        #[test]
        fn saturates_at_or_above_high((low, high) in arb_bounds(), above in 0.0..1000.0_f64) {
            prop_assert_eq!(normalize(Some(high + above), low, high, false), 1.0);
        }

        #[test]
        fn monotonic_non_decreasing((low, high) in arb_bounds(), a in -2000.0..2000.0_f64, b in -2000.0..2000.0_f64) {
            let (x, y) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(normalize(Some(x), low, high, false) <= normalize(Some(y), low, high, false));
        }

        #[test]
        fn inverted_is_complement((low, high) in arb_bounds(), x in -2000.0..2000.0_f64) {
            let plain = normalize(Some(x), low, high, false);
            let inverted = normalize(Some(x), low, high, true);
            prop_assert!((inverted - (1.0 - plain)).abs() < 1e-12);
        }

        #[test]
        fn stays_in_unit_interval((low, high) in arb_bounds(), x in proptest::num::f64::ANY) {
            let s = normalize(Some(x), low, high, false);
            prop_assert!((0.0..=1.0).contains(&s));
        }
    }
}
