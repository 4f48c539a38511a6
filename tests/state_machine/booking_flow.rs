//! Anonymous booking wizard scenarios

use crate::common::*;
use chrono::{Duration, NaiveDate};
use serde_json::json;
use wellness_core::flow::booking::{self, booking_flow};
use wellness_core::history::booking_confirmation_from_fields;
use wellness_core::state_machine::StateMachineError;

fn harness() -> WizardHarness {
    WizardHarness::new(
        booking_flow("expert-42").unwrap(),
        ScriptedEnrichment::succeeding(journal_enrichment()),
        RecordingPersistence::new(),
    )
}

#[tokio::test]
async fn booking_requires_date_and_time_then_persists() {
    let mut h = harness();

    assert!(h.wizard.advance().is_err());
    h.wizard.set_field(booking::DATE, next_bookable_date()).unwrap();
    assert_eq!(h.wizard.advance().unwrap(), 2);

    assert!(h.wizard.advance().is_err());
    h.wizard.set_field(booking::TIME_SLOT, "10:00 AM").unwrap();
    assert_eq!(h.wizard.advance().unwrap(), 3);

    assert_eq!(
        booking_confirmation_from_fields(h.wizard.fields()).as_deref(),
        Some("June 6, 2030 at 10:00 AM")
    );

    h.wizard.finalize().await.unwrap();
    assert!(h.wizard.is_complete());

    // Bookings carry no free-text enrichment
    assert_eq!(h.enrichment.call_count(), 0);

    let record = h.persistence.last_record().unwrap();
    assert_eq!(record.entity, "Booking");
    assert_eq!(
        serde_json::Value::Object(record.data),
        json!({
            "date": "2030-06-06",
            "time_slot": "10:00 AM",
            "notes": "",
            "expert_id": "expert-42",
            "is_anonymous": true
        })
    );
}

#[test]
fn past_today_and_sunday_dates_are_rejected() {
    let mut h = harness();
    let today = pinned_today();
    let sunday = NaiveDate::from_ymd_opt(2030, 6, 9).unwrap();

    for date in [today - Duration::days(1), today, sunday] {
        assert!(
            matches!(
                h.wizard.set_field(booking::DATE, date),
                Err(StateMachineError::InvalidFieldValue { .. })
            ),
            "{date} should not be bookable"
        );
    }
    assert!(h.wizard.field(booking::DATE).is_none());

    let saturday = NaiveDate::from_ymd_opt(2030, 6, 8).unwrap();
    assert!(h.wizard.set_field(booking::DATE, saturday).is_ok());
}

#[test]
fn unknown_time_slot_is_rejected() {
    let mut h = harness();
    assert!(matches!(
        h.wizard.set_field(booking::TIME_SLOT, "01:00 PM"),
        Err(StateMachineError::InvalidFieldValue { .. })
    ));
}

#[test]
fn deselecting_the_date_blocks_advance_again() {
    let mut h = harness();
    h.wizard.set_field(booking::DATE, next_bookable_date()).unwrap();
    assert!(h.wizard.can_advance());

    h.wizard.clear_field(booking::DATE).unwrap();
    assert!(!h.wizard.can_advance());
}

#[tokio::test]
async fn notes_are_optional_but_recorded_when_given() {
    let mut h = harness();
    h.wizard.set_field(booking::DATE, next_bookable_date()).unwrap();
    h.wizard.advance().unwrap();
    h.wizard.set_field(booking::TIME_SLOT, "04:00 PM").unwrap();
    h.wizard.advance().unwrap();
    h.wizard
        .set_field(booking::NOTES, "Would like to talk about sleep.")
        .unwrap();

    h.wizard.finalize().await.unwrap();
    let record = h.persistence.last_record().unwrap();
    assert_eq!(record.data["notes"], json!("Would like to talk about sleep."));
}
