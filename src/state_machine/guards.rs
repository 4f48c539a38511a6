use super::errors::{gate_not_satisfied, GuardError, GuardResult, StateMachineError, StateMachineResult};
use super::events::WizardEvent;
use super::session::WizardSession;
use super::states::WizardState;

/// Trait for implementing state transition guards
pub trait StateGuard {
    /// Check if a transition is allowed
    fn check(&self, session: &WizardSession) -> GuardResult<bool>;

    /// Get a description of this guard for logging
    fn description(&self) -> &'static str;
}

/// Declarative transition table shared by every flow
pub struct TransitionGuard;

impl TransitionGuard {
    /// Determine the target state for `event`, or reject it as an invalid transition.
    ///
    /// Guards are not evaluated here; a `Some` target only means the event is
    /// meaningful in the current state.
    pub fn determine_target_state(
        current_state: WizardState,
        event: &WizardEvent,
        total_steps: usize,
    ) -> StateMachineResult<WizardState> {
        let target = match (current_state, event) {
            // Navigation stays inside 1..=N
            (WizardState::AtStep(step), WizardEvent::Advance) if step < total_steps => {
                WizardState::AtStep(step + 1)
            }
            (WizardState::AtStep(step), WizardEvent::Retreat) if step > 1 => {
                WizardState::AtStep(step - 1)
            }

            // Input edits keep the current step
            (WizardState::AtStep(step), WizardEvent::SetField { .. })
            | (WizardState::AtStep(step), WizardEvent::ClearField { .. }) => {
                WizardState::AtStep(step)
            }

            // Submission only from the last step
            (WizardState::AtStep(step), WizardEvent::Finalize) if step == total_steps => {
                WizardState::Submitting
            }
            (WizardState::Submitting, WizardEvent::SubmissionSucceeded) => WizardState::Complete,
            (WizardState::Submitting, WizardEvent::SubmissionFailed(_)) => {
                WizardState::AtStep(total_steps)
            }

            (WizardState::Complete, WizardEvent::Reset) => WizardState::AtStep(1),

            (from_state, _) => {
                return Err(StateMachineError::InvalidTransition {
                    from: from_state.to_string(),
                    event: event.event_type().to_string(),
                })
            }
        };

        Ok(target)
    }
}

/// Guard requiring the gating field of a step to be present
pub struct StepGateGuard {
    step: usize,
}

impl StepGateGuard {
    pub fn new(step: usize) -> Self {
        Self { step }
    }
}

impl StateGuard for StepGateGuard {
    fn check(&self, session: &WizardSession) -> GuardResult<bool> {
        let step = session
            .flow
            .step(self.step)
            .ok_or_else(|| GuardError::InvalidState {
                state: format!("step_{}", self.step),
            })?;

        if step.is_satisfied(&session.fields) {
            Ok(true)
        } else {
            Err(gate_not_satisfied(self.step, step.gating_field))
        }
    }

    fn description(&self) -> &'static str {
        "Step gating field must be present"
    }
}

/// Guard to reject input while a submission is in flight
pub struct NotSubmittingGuard;

impl StateGuard for NotSubmittingGuard {
    fn check(&self, session: &WizardSession) -> GuardResult<bool> {
        if session.is_submitting() {
            return Err(GuardError::SubmissionInFlight);
        }
        Ok(true)
    }

    fn description(&self) -> &'static str {
        "Wizard must not be submitting"
    }
}
