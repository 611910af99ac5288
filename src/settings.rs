//! Per-attempt adaptive testing settings.

use serde::{Deserialize, Serialize};

use crate::error::{CatError, CatResult};

pub const DEFAULT_INITIAL_ABILITY: f64 = 0.0;
pub const DEFAULT_PRECISION_THRESHOLD: f64 = 0.3;
pub const DEFAULT_MIN_QUESTIONS: usize = 5;
pub const DEFAULT_MAX_QUESTIONS: usize = 30;

/// Stopping rules and starting point of one adaptive attempt.
///
/// Any field missing from a serialized form takes its default, so an exam
/// record carrying `{"max_questions": 10}` yields the stock values elsewhere.
/// Explicit zeros are kept as given and are not replaced by defaults: a zero
/// `precision_threshold` never stops on precision and a zero `max_questions`
/// stops at once. Use [`CatSettings::validate`] to reject them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatSettings {
    /// Ability reported before any item has been answered.
    pub initial_ability: f64,
    /// Stop once the standard error falls below this value.
    pub precision_threshold: f64,
    /// Items administered before the precision rule is honored.
    pub min_questions: usize,
    /// Hard ceiling on administered items.
    pub max_questions: usize,
}

impl Default for CatSettings {
    fn default() -> Self {
        Self {
            initial_ability: DEFAULT_INITIAL_ABILITY,
            precision_threshold: DEFAULT_PRECISION_THRESHOLD,
            min_questions: DEFAULT_MIN_QUESTIONS,
            max_questions: DEFAULT_MAX_QUESTIONS,
        }
    }
}

impl CatSettings {
    /// Parse settings from a JSON object, filling absent fields with defaults.
    pub fn from_json(json: &str) -> CatResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Like [`CatSettings::from_json`], with `None` meaning stock settings.
    pub fn from_optional_json(json: Option<&str>) -> CatResult<Self> {
        json.map_or_else(|| Ok(Self::default()), Self::from_json)
    }

    pub fn to_json(&self) -> CatResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Check the ranges an exam author is allowed to configure.
    ///
    /// The engine never calls this; it extrapolates on whatever it is given.
    pub fn validate(&self) -> CatResult<()> {
        if !self.initial_ability.is_finite() {
            return Err(CatError::InvalidSettings {
                field: "initial_ability",
                value: self.initial_ability,
                reason: "must be finite",
            });
        }
        if !(self.precision_threshold > 0.0 && self.precision_threshold <= 1.0) {
            return Err(CatError::InvalidSettings {
                field: "precision_threshold",
                value: self.precision_threshold,
                reason: "must be in (0, 1]",
            });
        }
        if self.min_questions == 0 {
            return Err(CatError::InvalidSettings {
                field: "min_questions",
                value: 0.0,
                reason: "must be positive",
            });
        }
        if self.max_questions == 0 {
            return Err(CatError::InvalidSettings {
                field: "max_questions",
                value: 0.0,
                reason: "must be positive",
            });
        }
        if self.min_questions > self.max_questions {
            return Err(CatError::InvalidSettings {
                field: "min_questions",
                value: self.min_questions as f64,
                reason: "must not exceed max_questions",
            });
        }
        Ok(())
    }
}
