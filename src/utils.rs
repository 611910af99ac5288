//! Shared numeric helpers and scale constants.

/// Lower bound of the ability scale.
pub const THETA_MIN: f64 = -3.0;

/// Upper bound of the ability scale.
pub const THETA_MAX: f64 = 3.0;

/// Width of the logit scale that the [0, 1] difficulty range is stretched over.
pub const DIFFICULTY_SPAN: f64 = 6.0;

/// Scaling constant of the logistic score transform.
pub const SCORE_SCALE: f64 = 1.7;

/// Magnitude below which a second derivative is treated as zero.
pub const EPSILON: f64 = 1e-10;

#[inline]
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let exp_x = x.exp();
        exp_x / (1.0 + exp_x)
    }
}

#[inline]
pub fn clip(x: f64, min: f64, max: f64) -> f64 {
    x.max(min).min(max)
}

/// Map a stored difficulty in [0, 1] onto the IRT logit scale.
///
/// 0.0 -> -3 (easiest), 0.5 -> 0, 1.0 -> +3 (hardest). Values outside [0, 1]
/// extrapolate linearly.
#[inline]
pub fn difficulty_to_logit(difficulty: f64) -> f64 {
    (difficulty - 0.5) * DIFFICULTY_SPAN
}

/// Clamp an ability onto [`THETA_MIN`, `THETA_MAX`].
#[inline]
pub fn clamp_theta(theta: f64) -> f64 {
    clip(theta, THETA_MIN, THETA_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_is_symmetric() {
        for &x in &[-40.0, -3.0, -0.5, 0.0, 0.5, 3.0, 40.0] {
            assert!((sigmoid(x) + sigmoid(-x) - 1.0).abs() < 1e-12);
        }
        assert_eq!(sigmoid(0.0), 0.5);
    }

    #[test]
    fn sigmoid_does_not_overflow() {
        assert!(sigmoid(-1000.0) >= 0.0);
        assert!(sigmoid(1000.0) <= 1.0);
        assert!(sigmoid(-1000.0).is_finite());
    }

    #[test]
    fn difficulty_mapping_endpoints() {
        assert_eq!(difficulty_to_logit(0.0), -3.0);
        assert_eq!(difficulty_to_logit(0.5), 0.0);
        assert_eq!(difficulty_to_logit(1.0), 3.0);
        assert!((difficulty_to_logit(1.5) - 6.0).abs() < 1e-12);
    }

    #[test]
    fn clamp_theta_bounds() {
        assert_eq!(clamp_theta(10.0), THETA_MAX);
        assert_eq!(clamp_theta(-10.0), THETA_MIN);
        assert_eq!(clamp_theta(1.25), 1.25);
    }
}
