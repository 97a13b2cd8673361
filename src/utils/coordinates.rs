use crate::utils::constants::{COORD_EPSILON, MIN_GRID_STEP};

/// Round a coordinate to one decimal place.
///
/// Negative zero is folded into `0.0` so that formatted cache keys stay stable.
///
/// # Examples
/// ```
/// use warmth_grid::utils::round_tenth;
///
/// assert_eq!(round_tenth(35.04), 35.0);
/// assert_eq!(round_tenth(-0.04).to_string(), "0");
/// ```
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0 + 0.0
}

/// Inclusive float range from `start` to `stop`.
///
/// The number of values is fixed up front and each value is derived from
/// `start + i * step`, so rounding error never accumulates past the upper
/// endpoint. Steps finer than [`MIN_GRID_STEP`] would only repeat the same
/// rounded coordinates and yield an empty range, as do non-positive steps.
pub fn inclusive_steps(start: f64, stop: f64, step: f64) -> Vec<f64> {
    if !step.is_finite() || step < MIN_GRID_STEP - COORD_EPSILON {
        return Vec::new();
    }

    let span = ((stop - start) / step + COORD_EPSILON).floor();
    if !span.is_finite() || span < 0.0 {
        return Vec::new();
    }

    (0..=span as usize)
        .map(|i| round_tenth(round_to(start + i as f64 * step, 10)))
        .collect()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_tenth() {
        assert_eq!(round_tenth(35.04), 35.0);
        assert_eq!(round_tenth(35.06), 35.1);
        assert_eq!(round_tenth(139.96), 140.0);
        assert!(round_tenth(-0.01).is_sign_positive());
    }

    #[test]
    fn test_inclusive_steps_includes_both_endpoints() {
        assert_eq!(inclusive_steps(35.0, 37.0, 1.0), vec![35.0, 36.0, 37.0]);
        assert_eq!(inclusive_steps(24.0, 25.0, 0.5), vec![24.0, 24.5, 25.0]);
    }

    #[test]
    fn test_inclusive_steps_tolerates_accumulation_error() {
        // 0.1 is not representable; naive accumulation would stop at 0.9...
        let values = inclusive_steps(0.0, 1.0, 0.1);
        assert_eq!(values.len(), 11);
        assert_eq!(values.last().copied(), Some(1.0));
    }

    #[test]
    fn test_inclusive_steps_degenerate() {
        assert_eq!(inclusive_steps(10.0, 10.0, 0.5), vec![10.0]);
        assert!(inclusive_steps(11.0, 10.0, 0.5).is_empty());
        assert!(inclusive_steps(0.0, 1.0, 0.0).is_empty());
        assert!(inclusive_steps(0.0, 1.0, -0.5).is_empty());
    }

    #[test]
    fn test_inclusive_steps_rejects_sub_tenth_steps() {
        assert!(inclusive_steps(0.0, 1.0, 1e-12).is_empty());
        assert!(inclusive_steps(0.0, 1.0, 0.05).is_empty());
        assert!(inclusive_steps(0.0, 1.0, f64::NAN).is_empty());
    }

    #[test]
    fn test_inclusive_steps_full_japan_axis() {
        let lats = inclusive_steps(24.0, 46.0, 0.1);
        assert_eq!(lats.len(), 221);
        assert_eq!(lats[1], 24.1);
        assert_eq!(lats.last().copied(), Some(46.0));
    }
}
