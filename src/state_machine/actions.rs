use super::errors::{ActionError, ActionResult};
use super::events::WizardEvent;
use super::session::WizardSession;
use super::states::WizardState;
use crate::constants::events::RECORD_CREATED;
use crate::events::publisher::EventPublisher;
use serde::Serialize;
use uuid::Uuid;

/// Trait for implementing state transition actions
pub trait StateAction {
    /// Execute the action after the session has moved to `to_state`
    fn execute(
        &self,
        session: &WizardSession,
        from_state: WizardState,
        to_state: WizardState,
        event: &WizardEvent,
    ) -> ActionResult<()>;

    /// Get a description of this action for logging
    fn description(&self) -> &'static str;
}

/// Action to emit a structured log line for every applied transition
pub struct LogTransitionAction;

impl StateAction for LogTransitionAction {
    fn execute(
        &self,
        session: &WizardSession,
        from_state: WizardState,
        to_state: WizardState,
        event: &WizardEvent,
    ) -> ActionResult<()> {
        let details = match event {
            WizardEvent::SetField { key } | WizardEvent::ClearField { key } => {
                Some(format!("{} {key}", event.event_type()))
            }
            WizardEvent::SubmissionFailed(reason) => Some(format!("{from_state} -> {to_state}: {reason}")),
            _ => Some(format!("{from_state} -> {to_state}")),
        };

        crate::logging::log_wizard_operation(
            event.event_type(),
            session.flow.name(),
            &session.session_id.to_string(),
            &to_state.to_string(),
            details.as_deref(),
        );

        Ok(())
    }

    fn description(&self) -> &'static str {
        "Log wizard transition"
    }
}

/// Payload of the `record-created` event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordCreated {
    pub flow: String,
    pub entity: String,
    pub record_id: String,
    pub session_id: Uuid,
}

/// Action to announce a persisted record so observers can refresh their views
pub struct PublishRecordCreatedAction {
    event_publisher: EventPublisher,
}

impl PublishRecordCreatedAction {
    pub fn new(event_publisher: EventPublisher) -> Self {
        Self { event_publisher }
    }
}

impl StateAction for PublishRecordCreatedAction {
    fn execute(
        &self,
        session: &WizardSession,
        from_state: WizardState,
        to_state: WizardState,
        _event: &WizardEvent,
    ) -> ActionResult<()> {
        if !(from_state.is_submitting() && to_state.is_terminal()) {
            return Ok(());
        }

        let record_id = session
            .record_id
            .as_ref()
            .ok_or_else(|| ActionError::InvalidState {
                state: format!("{to_state} without a record id"),
            })?;

        let payload = RecordCreated {
            flow: session.flow.name().to_string(),
            entity: session.flow.entity().to_string(),
            record_id: record_id.to_string(),
            session_id: session.session_id,
        };

        self.event_publisher
            .publish_serialized(RECORD_CREATED, &payload)
            .map_err(|_| ActionError::EventPublishFailed {
                event_name: RECORD_CREATED.to_string(),
            })
    }

    fn description(&self) -> &'static str {
        "Publish record-created event on completion"
    }
}
