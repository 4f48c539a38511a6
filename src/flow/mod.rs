//! # Wizard Flow Definitions
//!
//! Declarative step tables for each wizard. Every flow runs on the same
//! [`WizardStateMachine`](crate::state_machine::WizardStateMachine); only the
//! table differs.
//!
//! - [`check_in`] - mood, intensity, activities, journal (4 steps, journal enrichment)
//! - [`booking`] - date, time slot, notes (3 steps, no enrichment)
//! - [`music_mood`] - song reflection (1 step, song enrichment)

pub mod booking;
pub mod check_in;
pub mod definition;
pub mod fields;
pub mod music_mood;

pub use booking::booking_flow;
pub use check_in::{check_in_flow, Activity, JournalType, Mood};
pub use definition::{
    EnrichmentSpec, FieldDefinition, FieldKind, FlowDefinition, FlowDefinitionError,
    StepDefinition, StepGate,
};
pub use fields::{FieldMap, FieldValue};
pub use music_mood::music_mood_flow;
