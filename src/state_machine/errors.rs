use crate::services::errors::{EnrichmentError, PersistenceError};
use thiserror::Error;

/// Error types for wizard state machine operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateMachineError {
    #[error("Guard condition failed: {reason}")]
    GuardFailed { reason: String },

    #[error("Invalid state transition from {from} on {event}")]
    InvalidTransition { from: String, event: String },

    #[error("Field '{key}' is not declared by flow '{flow}'")]
    UnknownField { flow: String, key: String },

    #[error("Invalid value for field '{key}': {reason}")]
    InvalidFieldValue { key: String, reason: String },

    #[error("Enrichment failed: {0}")]
    Enrichment(#[from] EnrichmentError),

    #[error("Persistence failed: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Action execution failed: {reason}")]
    ActionFailed { reason: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Specific error type for guard condition failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[error("Step {step} gate not satisfied: '{field}' is required")]
    GateNotSatisfied { step: usize, field: String },

    #[error("Wizard is submitting; input is locked")]
    SubmissionInFlight,

    #[error("Invalid state for guard check: {state}")]
    InvalidState { state: String },
}

/// Specific error type for action execution failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("Event publishing failed: {event_name}")]
    EventPublishFailed { event_name: String },

    #[error("Invalid state for action execution: {state}")]
    InvalidState { state: String },
}

impl From<GuardError> for StateMachineError {
    fn from(err: GuardError) -> Self {
        Self::GuardFailed {
            reason: err.to_string(),
        }
    }
}

impl From<ActionError> for StateMachineError {
    fn from(err: ActionError) -> Self {
        Self::ActionFailed {
            reason: err.to_string(),
        }
    }
}

impl StateMachineError {
    /// Whether the error came from a finalize attempt that may be retried
    pub fn is_retryable_submission_failure(&self) -> bool {
        matches!(self, Self::Enrichment(_) | Self::Persistence(_))
    }

    /// Whether the error is a local rejection (disabled control) rather than a failure
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::GuardFailed { .. }
                | Self::InvalidTransition { .. }
                | Self::UnknownField { .. }
                | Self::InvalidFieldValue { .. }
        )
    }
}

/// Result type alias for state machine operations
pub type StateMachineResult<T> = Result<T, StateMachineError>;
pub type GuardResult<T> = Result<T, GuardError>;
pub type ActionResult<T> = Result<T, ActionError>;

/// Helper function to create internal errors
pub fn internal_error(msg: impl Into<String>) -> StateMachineError {
    StateMachineError::Internal(msg.into())
}

/// Helper function to create gate failures
pub fn gate_not_satisfied(step: usize, field: impl Into<String>) -> GuardError {
    GuardError::GateNotSatisfied {
        step,
        field: field.into(),
    }
}
