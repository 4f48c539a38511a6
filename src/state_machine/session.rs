use super::states::WizardState;
use crate::flow::{FieldMap, FieldValue, FlowDefinition};
use crate::services::enrichment::Enrichment;
use crate::services::persistence::RecordId;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Ephemeral state of one wizard interaction.
///
/// Owned by exactly one [`WizardStateMachine`](super::WizardStateMachine); never persisted.
#[derive(Debug, Clone)]
pub struct WizardSession {
    pub session_id: Uuid,
    pub flow: Arc<FlowDefinition>,
    pub state: WizardState,
    pub fields: FieldMap,
    pub enrichment: Option<Enrichment>,
    pub record_id: Option<RecordId>,
    /// Finalize attempts made in this session, successful or not
    pub submission_attempts: u32,
    pub started_at: DateTime<Utc>,
}

impl WizardSession {
    /// Fresh session at step 1 with the flow's default field values
    pub fn new(flow: Arc<FlowDefinition>) -> Self {
        let fields = flow.initial_fields();
        Self {
            session_id: Uuid::new_v4(),
            flow,
            state: WizardState::default(),
            fields,
            enrichment: None,
            record_id: None,
            submission_attempts: 0,
            started_at: Utc::now(),
        }
    }

    pub fn total_steps(&self) -> usize {
        self.flow.total_steps()
    }

    /// Current 1-based step; the submitting and complete states sit on the last step
    pub fn current_step(&self) -> usize {
        self.state.step_index(self.total_steps())
    }

    pub fn is_submitting(&self) -> bool {
        self.state.is_submitting()
    }

    pub fn is_complete(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Free text that should be sent for enrichment, if the flow enriches and the text is present
    pub fn enrichment_text(&self) -> Option<&str> {
        let spec = self.flow.enrichment()?;
        self.fields
            .get(spec.text_field)
            .filter(|value| value.is_present())
            .and_then(FieldValue::as_text)
    }
}
