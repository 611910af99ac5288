//! Error types for the boundary surfaces of the engine.
//!
//! The engine operations themselves are total; only settings validation,
//! state decoding and simulation inputs can fail.

use thiserror::Error;

/// Crate-wide result alias.
pub type CatResult<T> = Result<T, CatError>;

#[derive(Debug, Error)]
pub enum CatError {
    /// A settings field is outside its admissible range.
    #[error("invalid setting `{field}` = {value}: {reason}")]
    InvalidSettings {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// A decoded state violates `responses.len() == questions_administered`.
    #[error("inconsistent state: {administered} administered but {responses} responses recorded")]
    InconsistentState { administered: usize, responses: usize },

    /// Simulation inputs cannot produce a meaningful run.
    #[error("invalid simulation input: {reason}")]
    InvalidSimulation { reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(feature = "python")]
impl From<CatError> for pyo3::PyErr {
    fn from(err: CatError) -> Self {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_field() {
        let err = CatError::InvalidSettings {
            field: "precision_threshold",
            value: 1.5,
            reason: "must be in (0, 1]",
        };
        let msg = err.to_string();
        assert!(msg.contains("precision_threshold"));
        assert!(msg.contains("1.5"));
    }

    #[test]
    fn json_errors_convert() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: CatError = parse.unwrap_err().into();
        assert!(matches!(err, CatError::Json(_)));
    }
}
