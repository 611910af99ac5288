//! Computerized Adaptive Testing (CAT) engine.
//!
//! This crate provides the psychometric core of an adaptive exam:
//! - 1PL Item Response Theory probabilities and Fisher information
//! - Maximum likelihood ability estimation (Newton-Raphson)
//! - Maximum-information item selection with stopping rules
//! - Logistic conversion of ability to a 0-100 score
//! - Seeded Monte-Carlo simulation of adaptive sessions
//!
//! Every engine operation is a pure function of its arguments. The caller
//! owns one [`CatState`] per attempt and replaces it with the value returned
//! by [`update_ability`].
//!
//! ```
//! use cat_engine::{initialize_state, select_next_question, update_ability, CatSettings, Question};
//!
//! let settings = CatSettings::default();
//! let pool = vec![Question::new("a", 0.2), Question::new("b", 0.5), Question::new("c", 0.8)];
//!
//! let state = initialize_state(Some(&settings));
//! let next = select_next_question(&state, &pool, &settings).into_next().unwrap();
//! assert_eq!(next.question.id, "b");
//!
//! let state = update_ability(&state, next.question.difficulty, true);
//! assert!(state.ability_estimate > 0.0);
//! ```
//!
//! With the `python` feature the crate also builds the `cat_engine_rs`
//! extension module.

pub mod utils;

pub mod cat;
pub mod error;
pub mod estimation;
pub mod irt;
pub mod item;
pub mod settings;
pub mod simulation;
pub mod state;

pub use cat::{
    analyze_performance, calculate_score, initialize_state, select_next_question, should_continue,
    stop_reason, update_ability, update_ability_with_id, NextQuestion, PerformanceSummary,
    Selection, StopReason,
};
pub use error::{CatError, CatResult};
pub use item::{CatItem, Question};
pub use settings::CatSettings;
pub use state::{CatState, Response};

/// Python module for cat_engine.
#[cfg(feature = "python")]
#[pyo3::pymodule]
fn cat_engine_rs(m: &pyo3::Bound<'_, pyo3::types::PyModule>) -> pyo3::PyResult<()> {
    irt::register(m)?;
    cat::register(m)?;
    simulation::register(m)?;

    Ok(())
}
