//! Ability estimation (Newton-Raphson MLE) under the 1PL model.

use tracing::{debug, trace};

use crate::irt::{probability_correct, test_information};
use crate::state::{Response, INITIAL_STANDARD_ERROR};
use crate::utils::{clamp_theta, EPSILON};

pub const DEFAULT_MAX_ITER: usize = 20;
pub const DEFAULT_TOLERANCE: f64 = 0.001;

/// Newton-Raphson controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MleOptions {
    pub max_iter: usize,
    /// Convergence threshold on the magnitude of the update step.
    pub tol: f64,
}

impl Default for MleOptions {
    fn default() -> Self {
        Self {
            max_iter: DEFAULT_MAX_ITER,
            tol: DEFAULT_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MleEstimate {
    pub theta: f64,
    pub iterations: usize,
    /// `true` when the step fell below the tolerance.
    pub converged: bool,
}

/// Maximum likelihood ability estimate over a full response history.
///
/// Starts from θ = 0 and clamps θ to [-3, 3] after every step, which keeps
/// all-correct and all-incorrect histories finite. An empty history yields 0
/// without iterating. Stops early if the second derivative vanishes.
pub fn estimate_ability_mle(responses: &[Response], options: &MleOptions) -> MleEstimate {
    if responses.is_empty() {
        return MleEstimate {
            theta: 0.0,
            iterations: 0,
            converged: true,
        };
    }

    let mut theta = 0.0;
    let mut iterations = 0;
    let mut converged = false;

    for iter in 0..options.max_iter {
        iterations = iter + 1;

        let mut first_derivative = 0.0;
        let mut second_derivative = 0.0;
        for response in responses {
            let p = probability_correct(theta, response.difficulty);
            let u = if response.is_correct { 1.0 } else { 0.0 };
            first_derivative += u - p;
            second_derivative -= p * (1.0 - p);
        }

        if second_derivative.abs() < EPSILON {
            trace!(iter, theta, "second derivative vanished");
            break;
        }

        let delta = first_derivative / second_derivative;
        theta = clamp_theta(theta - delta);
        trace!(iter, theta, delta, "newton-raphson step");

        if delta.abs() < options.tol {
            converged = true;
            break;
        }
    }

    if !converged {
        debug!(
            theta,
            iterations,
            n_responses = responses.len(),
            "ability estimate did not converge"
        );
    }

    MleEstimate {
        theta,
        iterations,
        converged,
    }
}

/// Shorthand for [`estimate_ability_mle`] with default options.
pub fn estimate_ability(responses: &[Response]) -> f64 {
    estimate_ability_mle(responses, &MleOptions::default()).theta
}

/// Standard error of `theta` from the information of the answered items.
///
/// Falls back to 1.0 when the accumulated information is not positive.
pub fn standard_error(responses: &[Response], theta: f64) -> f64 {
    let information = test_information(theta, responses.iter().map(|r| r.difficulty));
    if information <= 0.0 {
        return INITIAL_STANDARD_ERROR;
    }
    1.0 / information.sqrt()
}
