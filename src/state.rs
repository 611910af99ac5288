//! Ability state carried by the caller between engine calls.

use serde::{Deserialize, Serialize};

use crate::error::{CatError, CatResult};

/// Standard error reported before any information has been collected.
pub const INITIAL_STANDARD_ERROR: f64 = 1.0;

/// One answered item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub question_id: String,
    pub difficulty: f64,
    pub is_correct: bool,
}

/// Adaptive testing state of a single exam attempt.
///
/// Treated as a value: engine operations take it by reference and hand back
/// a fresh instance. Persisted as an opaque JSON blob next to the attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatState {
    pub ability_estimate: f64,
    pub standard_error: f64,
    pub questions_administered: usize,
    /// Presentation order, append-only.
    pub responses: Vec<Response>,
}

impl Default for CatState {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl CatState {
    pub fn new(initial_ability: f64) -> Self {
        Self {
            ability_estimate: initial_ability,
            standard_error: INITIAL_STANDARD_ERROR,
            questions_administered: 0,
            responses: Vec::new(),
        }
    }

    pub fn check_invariants(&self) -> CatResult<()> {
        if self.responses.len() != self.questions_administered {
            return Err(CatError::InconsistentState {
                administered: self.questions_administered,
                responses: self.responses.len(),
            });
        }
        Ok(())
    }

    /// Decode a persisted blob and verify the response count.
    pub fn from_json(json: &str) -> CatResult<Self> {
        let state: Self = serde_json::from_str(json)?;
        state.check_invariants()?;
        Ok(state)
    }

    pub fn to_json(&self) -> CatResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
