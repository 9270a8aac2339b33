//! Ruleset loading errors.

use thiserror::Error;

/// Errors raised while loading or validating a ruleset bundle.
#[derive(Debug, Error)]
pub enum RulesetError {
    /// The JSON did not match the ruleset schema.
    #[error("ruleset parse error: {message}")]
    Parse { message: String },

    /// The same qid appears twice within one question tree.
    #[error("duplicate qid '{qid}' in {source_name} tree for symptom '{symptom}'")]
    DuplicateQid {
        source_name: String,
        symptom: String,
        qid: String,
    },
}

impl From<serde_json::Error> for RulesetError {
    fn from(err: serde_json::Error) -> Self {
        RulesetError::Parse {
            message: err.to_string(),
        }
    }
}
