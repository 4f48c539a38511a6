use serde::{Deserialize, Serialize};

/// Events that can trigger wizard state transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum WizardEvent {
    /// Move to the next step
    Advance,
    /// Move to the previous step
    Retreat,
    /// Set (or toggle, for multi-select) a field value
    SetField { key: String },
    /// Restore a field to its default
    ClearField { key: String },
    /// Begin submission from the last step
    Finalize,
    /// Persistence confirmed the record
    SubmissionSucceeded,
    /// Enrichment or persistence failed with the given reason
    SubmissionFailed(String),
    /// Start over from a completed session
    Reset,
}

impl WizardEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Advance => "advance",
            Self::Retreat => "retreat",
            Self::SetField { .. } => "set_field",
            Self::ClearField { .. } => "clear_field",
            Self::Finalize => "finalize",
            Self::SubmissionSucceeded => "submission_succeeded",
            Self::SubmissionFailed(_) => "submission_failed",
            Self::Reset => "reset",
        }
    }

    /// Extract error message if this is a failure event
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::SubmissionFailed(msg) => Some(msg),
            _ => None,
        }
    }

    /// Check if this event mutates collected input
    pub fn is_input_mutation(&self) -> bool {
        matches!(self, Self::SetField { .. } | Self::ClearField { .. })
    }

    pub fn set_field(key: impl Into<String>) -> Self {
        Self::SetField { key: key.into() }
    }

    pub fn clear_field(key: impl Into<String>) -> Self {
        Self::ClearField { key: key.into() }
    }
}
