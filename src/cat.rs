//! Computerized Adaptive Testing (CAT) functions.
//!
//! One attempt moves through initialize -> (select -> update)* -> stop. The
//! state is a value: every update returns a new [`CatState`] and selection
//! never touches it. Only [`select_next_question`] (or [`should_continue`])
//! decides that testing is over; updating never stops on its own.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::estimation::{estimate_ability, standard_error};
use crate::irt::item_information;
use crate::item::CatItem;
use crate::settings::CatSettings;
use crate::state::{CatState, Response};
use crate::utils::{clip, sigmoid, SCORE_SCALE};

/// Why no further item is administered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// No unanswered items remain.
    PoolExhausted,
    /// `max_questions` items have been administered.
    CeilingReached,
    /// At least `min_questions` administered and the standard error is below
    /// `precision_threshold`.
    PrecisionReached,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            StopReason::PoolExhausted => "no more questions available",
            StopReason::CeilingReached => "maximum number of questions reached",
            StopReason::PrecisionReached => "sufficient precision achieved",
        };
        f.write_str(msg)
    }
}

/// The item chosen for presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct NextQuestion<'a, T> {
    pub question: &'a T,
    /// Position of `question` in the pool passed to the selector.
    pub index: usize,
    pub information: f64,
    pub reason: String,
}

/// Outcome of item selection.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<'a, T> {
    Next(NextQuestion<'a, T>),
    Stop(StopReason),
}

impl<'a, T> Selection<'a, T> {
    pub fn into_next(self) -> Option<NextQuestion<'a, T>> {
        match self {
            Selection::Next(next) => Some(next),
            Selection::Stop(_) => None,
        }
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, Selection::Stop(_))
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        match self {
            Selection::Next(_) => None,
            Selection::Stop(reason) => Some(*reason),
        }
    }

    /// Flatten to `(pool index, reason)`, with index -1 and the stop reason
    /// text when testing is over.
    pub fn into_index_reason(self) -> (i64, String) {
        match self {
            Selection::Next(next) => (next.index as i64, next.reason),
            Selection::Stop(reason) => (-1, reason.to_string()),
        }
    }
}

/// Fresh state for a new attempt.
pub fn initialize_state(settings: Option<&CatSettings>) -> CatState {
    CatState::new(settings.map_or(0.0, |s| s.initial_ability))
}

/// Record a response and re-estimate ability from the whole history.
///
/// The response is labelled `q_<n>` by its ordinal position.
pub fn update_ability(state: &CatState, difficulty: f64, is_correct: bool) -> CatState {
    let question_id = format!("q_{}", state.questions_administered);
    update_ability_with_id(state, question_id, difficulty, is_correct)
}

/// [`update_ability`] with a caller-assigned question id.
pub fn update_ability_with_id(
    state: &CatState,
    question_id: impl Into<String>,
    difficulty: f64,
    is_correct: bool,
) -> CatState {
    let mut responses = Vec::with_capacity(state.responses.len() + 1);
    responses.extend_from_slice(&state.responses);
    responses.push(Response {
        question_id: question_id.into(),
        difficulty,
        is_correct,
    });

    let ability_estimate = estimate_ability(&responses);
    let standard_error = standard_error(&responses, ability_estimate);

    CatState {
        ability_estimate,
        standard_error,
        questions_administered: state.questions_administered + 1,
        responses,
    }
}

/// Stopping rule that applies to `state`, if any.
///
/// The ceiling is checked before the minimum floor, so `max_questions` wins
/// even when `min_questions` is configured larger.
pub fn stop_reason(state: &CatState, settings: &CatSettings) -> Option<StopReason> {
    if state.questions_administered >= settings.max_questions {
        return Some(StopReason::CeilingReached);
    }
    if state.questions_administered >= settings.min_questions
        && state.standard_error < settings.precision_threshold
    {
        return Some(StopReason::PrecisionReached);
    }
    None
}

/// `true` while neither the ceiling nor the precision rule has fired.
pub fn should_continue(state: &CatState, settings: &CatSettings) -> bool {
    stop_reason(state, settings).is_none()
}

/// Select the item with maximum Fisher information from available items.
///
/// Ties go to the earliest item in `available`. The caller is responsible
/// for excluding items that were already answered.
pub fn select_next_question<'a, T: CatItem>(
    state: &CatState,
    available: &'a [T],
    settings: &CatSettings,
) -> Selection<'a, T> {
    if available.is_empty() {
        debug!(administered = state.questions_administered, "question pool exhausted");
        return Selection::Stop(StopReason::PoolExhausted);
    }

    if let Some(reason) = stop_reason(state, settings) {
        debug!(
            administered = state.questions_administered,
            standard_error = state.standard_error,
            %reason,
            "stopping adaptive test"
        );
        return Selection::Stop(reason);
    }

    let theta = state.ability_estimate;
    let mut best_item: Option<usize> = None;
    let mut best_info = f64::NEG_INFINITY;

    for (j, item) in available.iter().enumerate() {
        let info = item_information(theta, item.difficulty());
        if info > best_info {
            best_info = info;
            best_item = Some(j);
        }
    }

    // Only reachable when every information value is NaN.
    let Some(index) = best_item else {
        debug!(theta, "no comparable item information, stopping");
        return Selection::Stop(StopReason::PoolExhausted);
    };

    let question = &available[index];
    let reason = format!(
        "Selected question with difficulty {:.2} to maximize information at ability {:.2}",
        question.difficulty(),
        theta
    );
    debug!(index, information = best_info, theta, "selected next question");

    Selection::Next(NextQuestion {
        question,
        index,
        information: best_info,
        reason,
    })
}

/// Convert an ability estimate to a 0-100 score.
///
/// score = round(clamp(100 / (1 + exp(-1.7 θ)), 0, 100)); θ = 0 maps to 50.
pub fn calculate_score(ability_estimate: f64) -> u32 {
    let score = 100.0 * sigmoid(SCORE_SCALE * ability_estimate);
    clip(score, 0.0, 100.0).round() as u32
}

/// Summary statistics of a finished (or ongoing) attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// Precision gained per administered item.
    pub efficiency: f64,
    /// Reciprocal of the standard error.
    pub precision: f64,
    pub ability_estimate: f64,
    pub score: u32,
}

pub fn analyze_performance(state: &CatState) -> PerformanceSummary {
    let precision = 1.0 / state.standard_error;
    let efficiency = if state.responses.is_empty() {
        0.0
    } else {
        precision / state.responses.len() as f64
    };

    PerformanceSummary {
        efficiency,
        precision,
        ability_estimate: state.ability_estimate,
        score: calculate_score(state.ability_estimate),
    }
}

#[cfg(feature = "python")]
mod python {
    use numpy::PyReadonlyArray1;
    use pyo3::prelude::*;

    use super::*;

    /// Initialize a CAT state, returned as a JSON blob.
    #[pyfunction]
    #[pyo3(signature = (settings_json=None))]
    pub fn cat_initialize_state(settings_json: Option<&str>) -> PyResult<String> {
        let settings = settings_json.map(CatSettings::from_json).transpose()?;
        Ok(initialize_state(settings.as_ref()).to_json()?)
    }

    /// Record one response and return the updated state blob.
    #[pyfunction]
    pub fn cat_update_ability(state_json: &str, difficulty: f64, is_correct: bool) -> PyResult<String> {
        let state = CatState::from_json(state_json)?;
        Ok(update_ability(&state, difficulty, is_correct).to_json()?)
    }

    /// Select the next item; returns (-1, stop reason) when testing is over.
    #[pyfunction]
    #[pyo3(signature = (state_json, difficulty, settings_json=None))]
    pub fn cat_select_next(
        state_json: &str,
        difficulty: PyReadonlyArray1<f64>,
        settings_json: Option<&str>,
    ) -> PyResult<(i64, String)> {
        let state = CatState::from_json(state_json)?;
        let settings = CatSettings::from_optional_json(settings_json)?;
        let pool = difficulty.as_array().to_vec();

        Ok(select_next_question(&state, &pool, &settings).into_index_reason())
    }

    #[pyfunction]
    #[pyo3(signature = (state_json, settings_json=None))]
    pub fn cat_should_continue(state_json: &str, settings_json: Option<&str>) -> PyResult<bool> {
        let state = CatState::from_json(state_json)?;
        let settings = CatSettings::from_optional_json(settings_json)?;
        Ok(should_continue(&state, &settings))
    }

    #[pyfunction]
    pub fn cat_calculate_score(ability_estimate: f64) -> u32 {
        calculate_score(ability_estimate)
    }

    /// Returns (efficiency, precision, ability_estimate, score).
    #[pyfunction]
    pub fn cat_analyze_performance(state_json: &str) -> PyResult<(f64, f64, f64, u32)> {
        let state = CatState::from_json(state_json)?;
        let summary = analyze_performance(&state);
        Ok((
            summary.efficiency,
            summary.precision,
            summary.ability_estimate,
            summary.score,
        ))
    }
}

/// Register CAT functions with the Python module.
#[cfg(feature = "python")]
pub fn register(m: &pyo3::Bound<'_, pyo3::types::PyModule>) -> pyo3::PyResult<()> {
    use pyo3::prelude::*;

    m.add_function(wrap_pyfunction!(python::cat_initialize_state, m)?)?;
    m.add_function(wrap_pyfunction!(python::cat_update_ability, m)?)?;
    m.add_function(wrap_pyfunction!(python::cat_select_next, m)?)?;
    m.add_function(wrap_pyfunction!(python::cat_should_continue, m)?)?;
    m.add_function(wrap_pyfunction!(python::cat_calculate_score, m)?)?;
    m.add_function(wrap_pyfunction!(python::cat_analyze_performance, m)?)?;
    Ok(())
}
