//! Engine errors.
//!
//! Only caller mistakes surface as errors: submitting to a finished
//! session or handing over a malformed answer payload. Malformed rule
//! data never errors — the resolve loop degrades and logs instead.

use thiserror::Error;

/// Errors returned from [`crate::Engine`] entry points.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The session cannot accept this call in its current state.
    #[error("invalid session state: {message}")]
    InvalidState { message: String },

    /// The submitted answer payload failed validation.
    #[error("invalid answer for '{field}': {message}")]
    InvalidAnswer { field: String, message: String },

    /// The selected symptom has no entry in the ruleset.
    #[error("unknown symptom '{symptom}'")]
    UnknownSymptom { symptom: String },
}

impl EvalError {
    pub(crate) fn state(message: impl Into<String>) -> Self {
        EvalError::InvalidState {
            message: message.into(),
        }
    }

    pub(crate) fn answer(field: impl Into<String>, message: impl Into<String>) -> Self {
        EvalError::InvalidAnswer {
            field: field.into(),
            message: message.into(),
        }
    }
}
