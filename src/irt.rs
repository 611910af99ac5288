//! One-parameter logistic (1PL) response model.
//!
//! Items carry a single difficulty on the [0, 1] storage scale, which is
//! mapped onto the logit scale by [`difficulty_to_logit`]. Discrimination is
//! fixed at 1 and there is no guessing parameter.

use ndarray::Array1;

use crate::utils::{difficulty_to_logit, sigmoid};

/// Probability of a correct response at ability `theta`.
///
/// P(θ, b) = 1 / (1 + exp(-(θ - b)))
#[inline]
pub fn probability_correct(theta: f64, difficulty: f64) -> f64 {
    sigmoid(theta - difficulty_to_logit(difficulty))
}

/// Fisher information of one item at ability `theta`.
///
/// I = P(1 - P), maximal (0.25) when the item's logit difficulty equals `theta`.
#[inline]
pub fn item_information(theta: f64, difficulty: f64) -> f64 {
    let p = probability_correct(theta, difficulty);
    p * (1.0 - p)
}

/// Total information of a set of items at ability `theta`.
pub fn test_information<I>(theta: f64, difficulties: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    difficulties
        .into_iter()
        .map(|d| item_information(theta, d))
        .sum()
}

/// Compute Fisher information for all items at a given theta.
pub fn item_information_vector(theta: f64, difficulties: &[f64]) -> Array1<f64> {
    difficulties
        .iter()
        .map(|&d| item_information(theta, d))
        .collect()
}

/// Total pool information evaluated over a grid of abilities.
pub fn information_curve(difficulties: &[f64], thetas: &[f64]) -> Array1<f64> {
    thetas
        .iter()
        .map(|&theta| test_information(theta, difficulties.iter().copied()))
        .collect()
}

#[cfg(feature = "python")]
mod python {
    use numpy::{PyArray1, PyReadonlyArray1, ToPyArray};
    use pyo3::prelude::*;

    /// Compute Fisher information for all items at a given theta.
    #[pyfunction]
    pub fn cat_compute_item_info<'py>(
        py: Python<'py>,
        theta: f64,
        difficulty: PyReadonlyArray1<f64>,
    ) -> Bound<'py, PyArray1<f64>> {
        let diff = difficulty.as_array().to_vec();
        super::item_information_vector(theta, &diff).to_pyarray(py)
    }

    /// Total pool information over a grid of abilities.
    #[pyfunction]
    pub fn cat_information_curve<'py>(
        py: Python<'py>,
        difficulty: PyReadonlyArray1<f64>,
        thetas: PyReadonlyArray1<f64>,
    ) -> Bound<'py, PyArray1<f64>> {
        let diff = difficulty.as_array().to_vec();
        let grid = thetas.as_array().to_vec();
        super::information_curve(&diff, &grid).to_pyarray(py)
    }
}

/// Register IRT functions with the Python module.
#[cfg(feature = "python")]
pub fn register(m: &pyo3::Bound<'_, pyo3::types::PyModule>) -> pyo3::PyResult<()> {
    use pyo3::prelude::*;

    m.add_function(wrap_pyfunction!(python::cat_compute_item_info, m)?)?;
    m.add_function(wrap_pyfunction!(python::cat_information_curve, m)?)?;
    Ok(())
}
