//! `record-created` notifications for observers

use crate::common::*;
use wellness_core::constants::events::RECORD_CREATED;
use wellness_core::flow::booking::{self, booking_flow};

fn ready_booking(persistence: RecordingPersistence) -> WizardHarness {
    let mut h = WizardHarness::new(
        booking_flow("expert-9").unwrap(),
        ScriptedEnrichment::succeeding(journal_enrichment()),
        persistence,
    );
    h.wizard.set_field(booking::DATE, next_bookable_date()).unwrap();
    h.wizard.advance().unwrap();
    h.wizard.set_field(booking::TIME_SLOT, "09:00 AM").unwrap();
    h.wizard.advance().unwrap();
    h
}

#[tokio::test]
async fn successful_finalize_publishes_record_created() {
    let mut h = ready_booking(RecordingPersistence::new());
    let mut receiver = h.events.subscribe();
    let session_id = h.wizard.session_id();

    let record_id = h.wizard.finalize().await.unwrap();

    let event = receiver.recv().await.unwrap();
    assert_eq!(event.name, RECORD_CREATED);
    assert_eq!(event.context["flow"], "expert_booking");
    assert_eq!(event.context["entity"], "Booking");
    assert_eq!(event.context["record_id"], record_id.to_string().as_str());
    assert_eq!(event.context["session_id"], session_id.to_string().as_str());
    assert!(receiver.try_recv().is_err());
}

#[tokio::test]
async fn failed_finalize_publishes_nothing() {
    let mut h = ready_booking(RecordingPersistence::failing_first(1));
    let mut receiver = h.events.subscribe();

    assert!(h.wizard.finalize().await.is_err());
    assert!(receiver.try_recv().is_err());
}

#[tokio::test]
async fn finalize_without_subscribers_still_completes() {
    let mut h = ready_booking(RecordingPersistence::new());
    assert_eq!(h.events.subscriber_count(), 0);
    h.wizard.finalize().await.unwrap();
    assert!(h.wizard.is_complete());
}
