//! Domain error types.
//!
//! Per-platform publish failures are deliberately absent here: they are
//! recorded as data inside the aggregated publish results so that partial
//! success stays representable.

use thiserror::Error;

/// Errors produced by the scheduling and workflow engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed input: missing required field, empty platform set,
    /// unparseable schedule.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown template or content id.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A workflow action was attempted from a state that does not permit it.
    #[error("Invalid transition: cannot {action} from {from}")]
    InvalidTransition { from: String, action: String },

    /// Optimistic-concurrency mismatch, or a mutation attempted on a
    /// published item.
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl EngineError {
    /// Shorthand for an invalid-transition error.
    pub fn invalid_transition(from: impl Into<String>, action: impl Into<String>) -> Self {
        EngineError::InvalidTransition {
            from: from.into(),
            action: action.into(),
        }
    }
}
