//! Monte-Carlo simulation of adaptive sessions against a fixed item pool.
//!
//! Simulees answer according to the 1PL model at a known true ability, which
//! makes it possible to tune stopping rules and pool composition before an
//! exam goes live.

use rand::prelude::*;
use rand_distr::Normal;
use rand_pcg::Pcg64;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cat::{
    calculate_score, initialize_state, select_next_question, update_ability_with_id, Selection,
    StopReason,
};
use crate::error::{CatError, CatResult};
use crate::irt::probability_correct;
use crate::settings::CatSettings;
use crate::state::CatState;

/// Full trace of one simulated attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedSession {
    pub final_state: CatState,
    /// Pool indices in presentation order.
    pub administered: Vec<usize>,
    pub stop_reason: StopReason,
    pub score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub true_theta: f64,
    pub theta_estimate: f64,
    pub standard_error: f64,
    pub n_items: usize,
    pub stop_reason: StopReason,
}

/// Recovery statistics at one true ability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConditionalAccuracy {
    pub theta: f64,
    pub bias: f64,
    pub mse: f64,
    pub avg_items: f64,
}

/// Simulate a single CAT session.
///
/// `pool` holds item difficulties on the [0, 1] scale; each item is
/// administered at most once.
pub fn simulate_session<R: Rng>(
    true_theta: f64,
    pool: &[f64],
    settings: &CatSettings,
    rng: &mut R,
) -> SimulatedSession {
    let mut available: Vec<usize> = (0..pool.len()).collect();
    let mut administered: Vec<usize> = Vec::with_capacity(settings.max_questions.min(pool.len()));
    let mut state = initialize_state(Some(settings));

    loop {
        let candidates: Vec<f64> = available.iter().map(|&j| pool[j]).collect();
        let next_index = match select_next_question(&state, &candidates, settings) {
            Selection::Next(next) => next.index,
            Selection::Stop(stop_reason) => {
                let score = calculate_score(state.ability_estimate);
                return SimulatedSession {
                    final_state: state,
                    administered,
                    stop_reason,
                    score,
                };
            }
        };

        let item_idx = available.remove(next_index);
        let difficulty = pool[item_idx];
        let p = probability_correct(true_theta, difficulty);
        let is_correct = rng.random::<f64>() < p;

        state = update_ability_with_id(&state, format!("item_{item_idx}"), difficulty, is_correct);
        administered.push(item_idx);
    }
}

/// Run batch CAT simulations in parallel.
///
/// Every (ability, replication) pair gets its own generator seeded with
/// `seed + theta_idx * 1000 + rep`, so results do not depend on scheduling.
pub fn simulate_batch(
    true_thetas: &[f64],
    pool: &[f64],
    settings: &CatSettings,
    n_replications: usize,
    seed: u64,
) -> CatResult<Vec<SessionSummary>> {
    if n_replications == 0 {
        return Err(CatError::InvalidSimulation {
            reason: "n_replications must be positive".into(),
        });
    }

    let tasks: Vec<(usize, usize)> = (0..true_thetas.len())
        .flat_map(|t| (0..n_replications).map(move |r| (t, r)))
        .collect();

    debug!(
        n_tasks = tasks.len(),
        pool_size = pool.len(),
        "running simulation batch"
    );

    let results: Vec<SessionSummary> = tasks
        .par_iter()
        .map(|&(theta_idx, rep)| {
            let task_seed = seed
                .wrapping_add(theta_idx as u64 * 1000)
                .wrapping_add(rep as u64);
            let mut rng = Pcg64::seed_from_u64(task_seed);

            let true_theta = true_thetas[theta_idx];
            let session = simulate_session(true_theta, pool, settings, &mut rng);

            SessionSummary {
                true_theta,
                theta_estimate: session.final_state.ability_estimate,
                standard_error: session.final_state.standard_error,
                n_items: session.administered.len(),
                stop_reason: session.stop_reason,
            }
        })
        .collect();

    Ok(results)
}

/// Compute conditional bias, MSE and mean test length at specified theta values.
pub fn conditional_accuracy(
    eval_thetas: &[f64],
    pool: &[f64],
    settings: &CatSettings,
    n_replications: usize,
    seed: u64,
) -> CatResult<Vec<ConditionalAccuracy>> {
    if n_replications == 0 {
        return Err(CatError::InvalidSimulation {
            reason: "n_replications must be positive".into(),
        });
    }

    let stats: Vec<ConditionalAccuracy> = eval_thetas
        .par_iter()
        .enumerate()
        .map(|(t_idx, &true_theta)| {
            let mut estimates = Vec::with_capacity(n_replications);
            let mut n_items_sum = 0.0;

            for rep in 0..n_replications {
                let task_seed = seed
                    .wrapping_add(t_idx as u64 * 10000)
                    .wrapping_add(rep as u64);
                let mut rng = Pcg64::seed_from_u64(task_seed);

                let session = simulate_session(true_theta, pool, settings, &mut rng);
                estimates.push(session.final_state.ability_estimate);
                n_items_sum += session.administered.len() as f64;
            }

            let n = n_replications as f64;
            let mean_est: f64 = estimates.iter().sum::<f64>() / n;
            let mse: f64 = estimates
                .iter()
                .map(|&e| (e - true_theta).powi(2))
                .sum::<f64>()
                / n;

            ConditionalAccuracy {
                theta: true_theta,
                bias: mean_est - true_theta,
                mse,
                avg_items: n_items_sum / n,
            }
        })
        .collect();

    Ok(stats)
}

/// Draw `n` true abilities from N(mean, sd²).
pub fn sample_abilities(n: usize, mean: f64, sd: f64, seed: u64) -> CatResult<Vec<f64>> {
    if sd.is_nan() || sd <= 0.0 {
        return Err(CatError::InvalidSimulation {
            reason: format!("ability sd must be positive, got {sd}"),
        });
    }
    let normal = Normal::new(mean, sd).map_err(|e| CatError::InvalidSimulation {
        reason: e.to_string(),
    })?;
    let mut rng = Pcg64::seed_from_u64(seed);
    Ok((0..n).map(|_| normal.sample(&mut rng)).collect())
}

#[cfg(feature = "python")]
mod python {
    use ndarray::Array1;
    use numpy::{PyArray1, PyReadonlyArray1, ToPyArray};
    use pyo3::prelude::*;

    use super::*;

    /// Run batch CAT simulations in parallel.
    ///
    /// Returns (theta_est, se_est, n_items, true_theta).
    #[pyfunction]
    #[pyo3(signature = (true_thetas, difficulty, n_replications, seed, settings_json=None))]
    #[allow(clippy::type_complexity)]
    pub fn cat_simulate_batch<'py>(
        py: Python<'py>,
        true_thetas: PyReadonlyArray1<f64>,
        difficulty: PyReadonlyArray1<f64>,
        n_replications: usize,
        seed: u64,
        settings_json: Option<&str>,
    ) -> PyResult<(
        Bound<'py, PyArray1<f64>>,
        Bound<'py, PyArray1<f64>>,
        Bound<'py, PyArray1<i32>>,
        Bound<'py, PyArray1<f64>>,
    )> {
        let thetas = true_thetas.as_array().to_vec();
        let pool = difficulty.as_array().to_vec();
        let settings = CatSettings::from_optional_json(settings_json)?;

        let results =
            py.detach(|| simulate_batch(&thetas, &pool, &settings, n_replications, seed))?;

        let n_total = results.len();
        let mut theta_est = Array1::zeros(n_total);
        let mut se_est = Array1::zeros(n_total);
        let mut n_items = Array1::zeros(n_total);
        let mut true_theta_out = Array1::zeros(n_total);

        for (i, r) in results.into_iter().enumerate() {
            theta_est[i] = r.theta_estimate;
            se_est[i] = r.standard_error;
            n_items[i] = r.n_items as i32;
            true_theta_out[i] = r.true_theta;
        }

        Ok((
            theta_est.to_pyarray(py),
            se_est.to_pyarray(py),
            n_items.to_pyarray(py),
            true_theta_out.to_pyarray(py),
        ))
    }

    /// Compute conditional MSE at specified theta values.
    ///
    /// Returns (theta, bias, mse, avg_items).
    #[pyfunction]
    #[pyo3(signature = (eval_thetas, difficulty, n_replications, seed, settings_json=None))]
    #[allow(clippy::type_complexity)]
    pub fn cat_conditional_mse<'py>(
        py: Python<'py>,
        eval_thetas: PyReadonlyArray1<f64>,
        difficulty: PyReadonlyArray1<f64>,
        n_replications: usize,
        seed: u64,
        settings_json: Option<&str>,
    ) -> PyResult<(
        Bound<'py, PyArray1<f64>>,
        Bound<'py, PyArray1<f64>>,
        Bound<'py, PyArray1<f64>>,
        Bound<'py, PyArray1<f64>>,
    )> {
        let thetas = eval_thetas.as_array().to_vec();
        let pool = difficulty.as_array().to_vec();
        let settings = CatSettings::from_optional_json(settings_json)?;

        let stats =
            py.detach(|| conditional_accuracy(&thetas, &pool, &settings, n_replications, seed))?;

        let theta: Array1<f64> = stats.iter().map(|s| s.theta).collect();
        let bias: Array1<f64> = stats.iter().map(|s| s.bias).collect();
        let mse: Array1<f64> = stats.iter().map(|s| s.mse).collect();
        let avg_items: Array1<f64> = stats.iter().map(|s| s.avg_items).collect();

        Ok((
            theta.to_pyarray(py),
            bias.to_pyarray(py),
            mse.to_pyarray(py),
            avg_items.to_pyarray(py),
        ))
    }
}

/// Register simulation functions with the Python module.
#[cfg(feature = "python")]
pub fn register(m: &pyo3::Bound<'_, pyo3::types::PyModule>) -> pyo3::PyResult<()> {
    use pyo3::prelude::*;

    m.add_function(wrap_pyfunction!(python::cat_simulate_batch, m)?)?;
    m.add_function(wrap_pyfunction!(python::cat_conditional_mse, m)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spread_pool(n: usize) -> Vec<f64> {
        (0..n).map(|j| (j as f64 + 0.5) / n as f64).collect()
    }

    #[test]
    fn session_respects_ceiling() {
        let settings = CatSettings {
            max_questions: 8,
            min_questions: 8,
            ..Default::default()
        };
        let mut rng = Pcg64::seed_from_u64(7);
        let session = simulate_session(0.3, &spread_pool(40), &settings, &mut rng);
        assert_eq!(session.administered.len(), 8);
        assert_eq!(session.stop_reason, StopReason::CeilingReached);
        assert_eq!(session.final_state.questions_administered, 8);
    }

    #[test]
    fn session_never_repeats_items() {
        let mut rng = Pcg64::seed_from_u64(11);
        let session = simulate_session(-0.5, &spread_pool(12), &CatSettings::default(), &mut rng);
        let mut seen = session.administered.clone();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), session.administered.len());
    }

    #[test]
    fn small_pool_is_exhausted() {
        let mut rng = Pcg64::seed_from_u64(3);
        let session = simulate_session(0.0, &[0.4, 0.5, 0.6], &CatSettings::default(), &mut rng);
        assert_eq!(session.stop_reason, StopReason::PoolExhausted);
        assert_eq!(session.administered.len(), 3);
    }

    #[test]
    fn batch_is_reproducible() {
        let pool = spread_pool(30);
        let settings = CatSettings::default();
        let a = simulate_batch(&[-1.0, 0.0, 1.0], &pool, &settings, 4, 42).unwrap();
        let b = simulate_batch(&[-1.0, 0.0, 1.0], &pool, &settings, 4, 42).unwrap();
        assert_eq!(a.len(), 12);
        assert_eq!(a, b);
        assert!(a.iter().all(|s| s.n_items <= settings.max_questions));
    }

    #[test]
    fn batch_rejects_zero_replications() {
        let err = simulate_batch(&[0.0], &[0.5], &CatSettings::default(), 0, 1).unwrap_err();
        assert!(matches!(err, CatError::InvalidSimulation { .. }));
    }

    #[test]
    fn conditional_accuracy_orders_estimates() {
        let pool = spread_pool(60);
        let stats =
            conditional_accuracy(&[-1.5, 1.5], &pool, &CatSettings::default(), 30, 9).unwrap();
        assert_eq!(stats.len(), 2);
        let low = stats[0].theta + stats[0].bias;
        let high = stats[1].theta + stats[1].bias;
        assert!(low < high);
        assert!(stats.iter().all(|s| s.mse >= 0.0 && s.avg_items >= 5.0));
    }

    #[test]
    fn sample_abilities_is_seeded() {
        let a = sample_abilities(100, 0.0, 1.0, 5).unwrap();
        let b = sample_abilities(100, 0.0, 1.0, 5).unwrap();
        assert_eq!(a, b);
        let mean = a.iter().sum::<f64>() / a.len() as f64;
        assert!(mean.abs() < 0.5);
    }

    #[test]
    fn sample_abilities_rejects_bad_sd() {
        assert!(sample_abilities(10, 0.0, 0.0, 1).is_err());
        assert!(sample_abilities(10, 0.0, f64::NAN, 1).is_err());
    }
}
