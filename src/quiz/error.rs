use thiserror::Error;

use crate::quiz::types::QuizPhase;

/// Every engine call either applies fully or returns one of these and leaves
/// the session untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{operation} rejected in {phase}: {reason}")]
    InvalidState {
        operation: &'static str,
        phase: QuizPhase,
        reason: &'static str,
    },
}

impl QuizError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        QuizError::InvalidArgument(message.into())
    }

    pub(crate) fn invalid_state(
        operation: &'static str,
        phase: QuizPhase,
        reason: &'static str,
    ) -> Self {
        QuizError::InvalidState {
            operation,
            phase,
            reason,
        }
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, QuizError::InvalidState { .. })
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, QuizError::InvalidArgument(_))
    }
}
