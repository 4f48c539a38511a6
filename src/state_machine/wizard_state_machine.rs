use super::{
    actions::{LogTransitionAction, PublishRecordCreatedAction, StateAction},
    errors::{internal_error, StateMachineError, StateMachineResult},
    events::WizardEvent,
    guards::{NotSubmittingGuard, StateGuard, StepGateGuard, TransitionGuard},
    session::WizardSession,
    states::WizardState,
};
use crate::config::{EnrichmentConfig, EnrichmentFailurePolicy};
use crate::events::publisher::EventPublisher;
use crate::flow::{FieldMap, FieldValue, FlowDefinition};
use crate::services::enrichment::{Enrichment, EnrichmentRequest, EnrichmentService};
use crate::services::persistence::{NewRecord, PersistenceService, RecordId};
use chrono::{Local, NaiveDate};
use serde_json::Map;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// External collaborators used by finalize
#[derive(Clone)]
pub struct WizardServices {
    pub enrichment: Arc<dyn EnrichmentService>,
    pub persistence: Arc<dyn PersistenceService>,
    pub events: EventPublisher,
}

impl std::fmt::Debug for WizardServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardServices")
            .field("enrichment", &self.enrichment.description())
            .field("persistence", &self.persistence.description())
            .field("subscribers", &self.events.subscriber_count())
            .finish()
    }
}

/// Per-wizard behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardOptions {
    pub enrichment_enabled: bool,
    pub failure_policy: EnrichmentFailurePolicy,
    /// Pinned "today" for date rules; `None` uses the local date
    pub today: Option<NaiveDate>,
}

impl Default for WizardOptions {
    fn default() -> Self {
        Self {
            enrichment_enabled: true,
            failure_policy: EnrichmentFailurePolicy::BestEffort,
            today: None,
        }
    }
}

impl From<&EnrichmentConfig> for WizardOptions {
    fn from(config: &EnrichmentConfig) -> Self {
        Self {
            enrichment_enabled: config.enabled,
            failure_policy: config.failure_policy,
            today: None,
        }
    }
}

/// Returns the session to the step it was submitted from if the finalize
/// future is dropped before the collaborators answer
struct InFlightSubmission<'a> {
    machine: &'a mut WizardStateMachine,
    restore_to: WizardState,
    settled: bool,
}

impl<'a> InFlightSubmission<'a> {
    fn new(machine: &'a mut WizardStateMachine, restore_to: WizardState) -> Self {
        Self {
            machine,
            restore_to,
            settled: false,
        }
    }

    fn settle(&mut self) {
        self.settled = true;
    }
}

impl Drop for InFlightSubmission<'_> {
    fn drop(&mut self) {
        if self.settled || !self.machine.session.is_submitting() {
            return;
        }
        let session = &mut self.machine.session;
        session.state = self.restore_to;
        session.enrichment = None;
        warn!(
            flow = session.flow.name(),
            session_id = %session.session_id,
            restored_to = %self.restore_to,
            "Submission abandoned before completion; session restored"
        );
    }
}

/// Step wizard controller generic over a [`FlowDefinition`].
///
/// Every operation runs the same pipeline: resolve the target state from the
/// transition table, check guards, apply the change, execute actions. A rejected
/// operation returns an error and leaves the session untouched.
#[derive(Debug)]
pub struct WizardStateMachine {
    session: WizardSession,
    services: WizardServices,
    options: WizardOptions,
}

impl WizardStateMachine {
    /// Create a new wizard at step 1 of `flow`
    pub fn new(flow: Arc<FlowDefinition>, services: WizardServices, options: WizardOptions) -> Self {
        let session = WizardSession::new(flow);
        debug!(
            flow = session.flow.name(),
            session_id = %session.session_id,
            total_steps = session.total_steps(),
            "Wizard session started"
        );
        Self {
            session,
            services,
            options,
        }
    }

    pub fn session(&self) -> &WizardSession {
        &self.session
    }

    pub fn session_id(&self) -> Uuid {
        self.session.session_id
    }

    pub fn flow(&self) -> &FlowDefinition {
        &self.session.flow
    }

    pub fn options(&self) -> WizardOptions {
        self.options
    }

    pub fn current_state(&self) -> WizardState {
        self.session.state
    }

    pub fn current_step(&self) -> usize {
        self.session.current_step()
    }

    pub fn total_steps(&self) -> usize {
        self.session.total_steps()
    }

    pub fn is_submitting(&self) -> bool {
        self.session.is_submitting()
    }

    pub fn is_complete(&self) -> bool {
        self.session.is_complete()
    }

    pub fn fields(&self) -> &FieldMap {
        &self.session.fields
    }

    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.session.field(key)
    }

    pub fn enrichment(&self) -> Option<&Enrichment> {
        self.session.enrichment.as_ref()
    }

    pub fn record_id(&self) -> Option<&RecordId> {
        self.session.record_id.as_ref()
    }

    pub fn submission_attempts(&self) -> u32 {
        self.session.submission_attempts
    }

    /// Whether `advance` would be accepted (the "next" control is enabled)
    pub fn can_advance(&self) -> bool {
        self.would_accept(&WizardEvent::Advance)
    }

    pub fn can_retreat(&self) -> bool {
        self.would_accept(&WizardEvent::Retreat)
    }

    /// Whether `finalize` would be accepted (the "submit" control is enabled)
    pub fn can_finalize(&self) -> bool {
        self.would_accept(&WizardEvent::Finalize)
    }

    /// Move to the next step; returns the new step
    pub fn advance(&mut self) -> StateMachineResult<usize> {
        let event = WizardEvent::Advance;
        let (from, to) = self.prepare(&event)?;
        self.commit(from, to, &event)?;
        Ok(self.current_step())
    }

    /// Move to the previous step; returns the new step
    pub fn retreat(&mut self) -> StateMachineResult<usize> {
        let event = WizardEvent::Retreat;
        let (from, to) = self.prepare(&event)?;
        self.commit(from, to, &event)?;
        Ok(self.current_step())
    }

    /// Set a field declared anywhere in the flow.
    ///
    /// Multi-select fields take one item per call and toggle its membership.
    pub fn set_field(&mut self, key: &str, value: impl Into<FieldValue>) -> StateMachineResult<()> {
        let event = WizardEvent::set_field(key);
        let (from, to) = self.prepare(&event)?;
        let new_value = self.resolve_field_value(key, value.into())?;
        self.session.fields.insert(key.to_string(), new_value);
        self.commit(from, to, &event)
    }

    /// Restore a field to its default, or unset it when it has none
    pub fn clear_field(&mut self, key: &str) -> StateMachineResult<()> {
        let event = WizardEvent::clear_field(key);
        let (from, to) = self.prepare(&event)?;
        let default = self.declared_field(key)?.default.clone();
        match default {
            Some(value) => {
                self.session.fields.insert(key.to_string(), value);
            }
            None => {
                self.session.fields.remove(key);
            }
        }
        self.commit(from, to, &event)
    }

    /// Submit the collected input.
    ///
    /// Runs enrichment (when the flow's free-text field is present) and then
    /// persistence, strictly in that order. On failure the session returns to
    /// the last step with its fields intact; calling `finalize` again retries
    /// from scratch.
    pub async fn finalize(&mut self) -> StateMachineResult<RecordId> {
        let event = WizardEvent::Finalize;
        let (from, to) = self.prepare(&event)?;

        self.session.submission_attempts += 1;
        self.session.enrichment = None;
        if let Err(e) = self.commit(from, to, &event) {
            self.session.state = from;
            return Err(e);
        }

        let started = Instant::now();
        let submission = {
            let mut in_flight = InFlightSubmission::new(self, from);
            let result = in_flight.machine.submit().await;
            in_flight.settle();
            result
        };

        match submission {
            Ok(record_id) => {
                self.session.record_id = Some(record_id.clone());
                let outcome = WizardEvent::SubmissionSucceeded;
                let (from, to) = self.prepare(&outcome)?;
                if let Err(e) = self.commit(from, to, &outcome) {
                    // The record exists; observers missing the event must not trigger a resubmit
                    warn!(
                        session_id = %self.session.session_id,
                        record_id = %record_id,
                        error = %e,
                        "Post-completion action failed"
                    );
                }
                info!(
                    flow = self.session.flow.name(),
                    session_id = %self.session.session_id,
                    record_id = %record_id,
                    attempts = self.session.submission_attempts,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Wizard completed"
                );
                Ok(record_id)
            }
            Err(error) => {
                let outcome = WizardEvent::SubmissionFailed(error.to_string());
                let (from, to) = self.prepare(&outcome)?;
                if let Err(e) = self.commit(from, to, &outcome) {
                    warn!(session_id = %self.session.session_id, error = %e, "Failure action failed");
                }
                crate::logging::log_error(
                    "WizardStateMachine",
                    "finalize",
                    &error.to_string(),
                    Some(self.session.flow.name()),
                );
                Err(error)
            }
        }
    }

    /// Start over from a completed session; returns the new session id
    pub fn reset(&mut self) -> StateMachineResult<Uuid> {
        let event = WizardEvent::Reset;
        let (from, to) = self.prepare(&event)?;
        self.session = WizardSession::new(Arc::clone(&self.session.flow));
        self.commit(from, to, &event)?;
        Ok(self.session.session_id)
    }

    /// Resolve the target state and check guards without touching the session
    fn prepare(&self, event: &WizardEvent) -> StateMachineResult<(WizardState, WizardState)> {
        let current_state = self.session.state;
        let target_state = TransitionGuard::determine_target_state(
            current_state,
            event,
            self.session.total_steps(),
        )?;

        self.check_guards(current_state, target_state, event)?;

        Ok((current_state, target_state))
    }

    fn would_accept(&self, event: &WizardEvent) -> bool {
        self.prepare(event).is_ok()
    }

    /// Check guard conditions for the transition
    fn check_guards(
        &self,
        current_state: WizardState,
        target_state: WizardState,
        event: &WizardEvent,
    ) -> StateMachineResult<()> {
        match (current_state, target_state, event) {
            (WizardState::AtStep(step), WizardState::AtStep(_), WizardEvent::Advance) => {
                StepGateGuard::new(step).check(&self.session)?;
            }

            // The last step's gate holds for submission too
            (WizardState::AtStep(step), WizardState::Submitting, WizardEvent::Finalize) => {
                NotSubmittingGuard.check(&self.session)?;
                StepGateGuard::new(step).check(&self.session)?;
            }

            (_, _, event) if event.is_input_mutation() => {
                NotSubmittingGuard.check(&self.session)?;
            }

            _ => {}
        }

        Ok(())
    }

    /// Apply the target state and execute actions
    fn commit(
        &mut self,
        from_state: WizardState,
        to_state: WizardState,
        event: &WizardEvent,
    ) -> StateMachineResult<()> {
        self.session.state = to_state;
        self.execute_actions(from_state, to_state, event)
    }

    /// Execute actions after successful transition
    fn execute_actions(
        &self,
        from_state: WizardState,
        to_state: WizardState,
        event: &WizardEvent,
    ) -> StateMachineResult<()> {
        let actions: Vec<Box<dyn StateAction + Send + Sync>> = vec![
            Box::new(LogTransitionAction),
            Box::new(PublishRecordCreatedAction::new(self.services.events.clone())),
        ];

        for action in actions {
            action.execute(&self.session, from_state, to_state, event)?;
        }

        Ok(())
    }

    fn declared_field(&self, key: &str) -> StateMachineResult<&crate::flow::FieldDefinition> {
        self.session
            .flow
            .field(key)
            .ok_or_else(|| StateMachineError::UnknownField {
                flow: self.session.flow.name().to_string(),
                key: key.to_string(),
            })
    }

    /// Validate a candidate value and compute what the field will hold
    fn resolve_field_value(&self, key: &str, value: FieldValue) -> StateMachineResult<FieldValue> {
        let definition = self.declared_field(key)?;
        let today = self.options.today.unwrap_or_else(|| Local::now().date_naive());

        definition
            .kind
            .check(&value, today)
            .map_err(|reason| StateMachineError::InvalidFieldValue {
                key: key.to_string(),
                reason,
            })?;

        // A whole list replaces the selection; a single item toggles membership
        if !definition.kind.is_multi_select() || value.as_list().is_some() {
            return Ok(value);
        }

        let item = value
            .as_text()
            .ok_or_else(|| internal_error(format!("multi-select item for '{key}' is not text")))?;
        let mut items = self
            .session
            .fields
            .get(key)
            .and_then(FieldValue::as_list)
            .map(<[String]>::to_vec)
            .unwrap_or_default();

        match items.iter().position(|existing| existing == item) {
            Some(index) => {
                items.remove(index);
            }
            None => items.push(item.to_string()),
        }

        Ok(FieldValue::List(items))
    }

    /// Run enrichment then persistence for the current fields
    async fn submit(&mut self) -> StateMachineResult<RecordId> {
        let enrichment = self.run_enrichment().await?;
        self.session.enrichment = enrichment.clone();

        let flow = Arc::clone(&self.session.flow);
        let record = NewRecord {
            entity: flow.entity().to_string(),
            data: flow.record_data(&self.session.fields, enrichment.as_ref()),
            enrichment,
        };

        debug!(
            flow = flow.name(),
            entity = %record.entity,
            persistence = self.services.persistence.description(),
            "Persisting wizard record"
        );

        let record_id = self.services.persistence.create(&record).await?;
        Ok(record_id)
    }

    async fn run_enrichment(&self) -> StateMachineResult<Option<Enrichment>> {
        if !self.options.enrichment_enabled {
            return Ok(None);
        }
        let Some(spec) = self.session.flow.enrichment() else {
            return Ok(None);
        };
        let Some(text) = self.session.enrichment_text() else {
            return Ok(None);
        };

        let context: Map<String, serde_json::Value> = spec
            .context_fields
            .iter()
            .filter_map(|key| {
                self.session
                    .fields
                    .get(*key)
                    .map(|value| (key.to_string(), value.to_json()))
            })
            .collect();

        let request = EnrichmentRequest {
            flow: self.session.flow.name().to_string(),
            template: spec.template,
            text: text.to_string(),
            context,
        };

        match self.services.enrichment.analyze(&request).await {
            Ok(enrichment) => Ok(Some(enrichment)),
            Err(error) => match self.options.failure_policy {
                EnrichmentFailurePolicy::BestEffort => {
                    warn!(
                        flow = %request.flow,
                        session_id = %self.session.session_id,
                        service = self.services.enrichment.description(),
                        error = %error,
                        "Enrichment failed; persisting without it"
                    );
                    Ok(None)
                }
                EnrichmentFailurePolicy::Required => Err(error.into()),
            },
        }
    }

    #[cfg(test)]
    fn force_state(&mut self, state: WizardState) {
        self.session.state = state;
    }
}
