//! Anonymous professional booking: date → time slot → optional notes.

use super::definition::{
    FieldDefinition, FieldKind, FlowDefinition, FlowDefinitionError, StepDefinition,
};
use crate::constants::{self, TIME_SLOTS};

pub const DATE: &str = "date";
pub const TIME_SLOT: &str = "time_slot";
pub const NOTES: &str = "notes";

pub const EXPERT_ID: &str = "expert_id";
pub const IS_ANONYMOUS: &str = "is_anonymous";

/// Build the three-step booking flow for one expert.
///
/// Bookings are always anonymous and carry no enrichment step.
pub fn booking_flow(expert_id: &str) -> Result<FlowDefinition, FlowDefinitionError> {
    FlowDefinition::new(
        constants::flows::BOOKING,
        constants::entities::BOOKING,
        vec![
            StepDefinition::required("date", DATE)
                .field(FieldDefinition::new(DATE, FieldKind::BookableDate)),
            StepDefinition::required("time", TIME_SLOT)
                .field(FieldDefinition::new(TIME_SLOT, FieldKind::Choice(TIME_SLOTS))),
            StepDefinition::open("confirm", NOTES)
                .field(FieldDefinition::new(NOTES, FieldKind::FreeText).with_default("")),
        ],
    )?
    .with_constant(EXPERT_ID, expert_id)?
    .with_constant(IS_ANONYMOUS, true)
}
