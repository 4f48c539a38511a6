// State machine module for step wizards
//
// One generic controller drives every flow. States are the step indices 1..=N,
// a submitting sub-state while finalize is in flight, and the terminal Complete.

pub mod actions;
pub mod errors;
pub mod events;
pub mod guards;
pub mod session;
pub mod states;
pub mod wizard_state_machine;

// Re-export main types for convenient access
pub use errors::{ActionError, GuardError, StateMachineError, StateMachineResult};
pub use events::WizardEvent;
pub use session::WizardSession;
pub use states::WizardState;
pub use wizard_state_machine::{WizardOptions, WizardServices, WizardStateMachine};

// Common traits and utilities
pub use actions::{RecordCreated, StateAction};
pub use guards::{StateGuard, TransitionGuard};
