//! Analysis error types.
//!
//! These errors are raised by the component that first observes malformed
//! data. Loaders wrap them in `anyhow` with file/row context; callers can
//! downcast back to [`AnalysisError`] to classify a failure.

use thiserror::Error;

use crate::model::Group;

/// Errors produced while scoring and comparing participant data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// A value is outside its valid domain (confidence not in 1..=7,
    /// correctness not 0/1, unknown group label, too many responses).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A participant is missing one or more required responses.
    #[error(
        "incomplete record for participant '{participant}': expected {expected} responses, found {found}"
    )]
    IncompleteRecord {
        participant: String,
        expected: usize,
        found: usize,
    },

    /// A group has too few participants for a variance estimate.
    #[error("insufficient sample for '{metric}': group {group} has {n} participant(s), need at least 2")]
    InsufficientSample {
        metric: String,
        group: Group,
        n: usize,
    },
}

impl AnalysisError {
    /// Shorthand for building an [`AnalysisError::InvalidInput`].
    pub fn invalid(message: impl Into<String>) -> Self {
        AnalysisError::InvalidInput(message.into())
    }

    /// Returns `true` if the error comes from malformed input values rather
    /// than from the shape of the dataset.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, AnalysisError::InvalidInput(_))
    }
}
