//! Check-in wizard scenarios

use crate::common::*;
use serde_json::json;
use wellness_core::flow::check_in::{self, check_in_flow};
use wellness_core::flow::FieldValue;
use wellness_core::services::EnrichmentError;
use wellness_core::state_machine::{StateMachineError, WizardState};

fn harness() -> WizardHarness {
    WizardHarness::new(
        check_in_flow().unwrap(),
        ScriptedEnrichment::succeeding(journal_enrichment()),
        RecordingPersistence::new(),
    )
}

#[tokio::test]
async fn check_in_without_journal_skips_enrichment() {
    let mut h = harness();
    assert_eq!(h.wizard.current_step(), 1);

    h.wizard.set_field(check_in::MOOD, "calm").unwrap();
    assert_eq!(h.wizard.advance().unwrap(), 2);

    // Intensity is pre-filled, so the step never blocks
    assert_eq!(h.wizard.advance().unwrap(), 3);

    h.wizard.set_field(check_in::ACTIVITIES, "exercise").unwrap();
    h.wizard.set_field(check_in::ACTIVITIES, "nature").unwrap();
    assert_eq!(h.wizard.advance().unwrap(), 4);

    assert!(h.wizard.can_finalize());
    h.wizard.finalize().await.unwrap();

    assert!(h.wizard.is_complete());
    assert!(!h.wizard.is_submitting());
    assert_eq!(h.enrichment.call_count(), 0);

    let record = h.persistence.last_record().unwrap();
    assert_eq!(record.entity, "MoodEntry");
    assert_eq!(
        serde_json::Value::Object(record.data),
        json!({
            "mood": "calm",
            "intensity": 3,
            "activities": ["exercise", "nature"],
            "journal_entry": "",
            "journal_type": "quick_note"
        })
    );
}

#[tokio::test]
async fn check_in_with_journal_enriches_before_persisting() {
    let mut h = harness();
    h.wizard.set_field(check_in::MOOD, "anxious").unwrap();
    h.wizard.advance().unwrap();
    h.wizard.set_field(check_in::INTENSITY, 4).unwrap();
    h.wizard.advance().unwrap();
    h.wizard.set_field(check_in::ACTIVITIES, "work").unwrap();
    h.wizard.advance().unwrap();
    h.wizard
        .set_field(check_in::JOURNAL_ENTRY, "Deadlines all week, finally resting.")
        .unwrap();
    h.wizard.set_field(check_in::JOURNAL_TYPE, "reflection").unwrap();

    h.wizard.finalize().await.unwrap();

    assert_eq!(h.calls.calls(), vec!["enrichment", "persistence"]);

    let request = &h.enrichment.requests()[0];
    assert_eq!(request.text, "Deadlines all week, finally resting.");
    assert_eq!(request.context["mood"], json!("anxious"));
    assert_eq!(request.context["activities"], json!(["work"]));
    assert!(request.prompt().contains("Selected mood: anxious"));

    let record = h.persistence.last_record().unwrap();
    assert_eq!(record.data["intensity"], json!(4));
    assert_eq!(record.data["journal_type"], json!("reflection"));
    assert_eq!(record.data["ai_sentiment"], json!("tender but hopeful"));
    assert_eq!(record.data["ai_themes"], json!(["rest", "work pressure"]));
    assert_eq!(h.wizard.enrichment(), Some(&journal_enrichment()));
}

#[tokio::test]
async fn whitespace_journal_does_not_trigger_enrichment() {
    let mut h = harness();
    h.wizard.set_field(check_in::MOOD, "tired").unwrap();
    for _ in 0..3 {
        h.wizard.advance().unwrap();
    }
    h.wizard.set_field(check_in::JOURNAL_ENTRY, "   ").unwrap();

    h.wizard.finalize().await.unwrap();
    assert_eq!(h.enrichment.call_count(), 0);
    assert!(h.persistence.last_record().unwrap().data.get("ai_sentiment").is_none());
}

#[tokio::test]
async fn enrichment_failure_still_persists_the_check_in() {
    let mut h = WizardHarness::new(
        check_in_flow().unwrap(),
        ScriptedEnrichment::failing(EnrichmentError::request_failed("connection reset")),
        RecordingPersistence::new(),
    );
    h.wizard.set_field(check_in::MOOD, "sad").unwrap();
    for _ in 0..3 {
        h.wizard.advance().unwrap();
    }
    h.wizard
        .set_field(check_in::JOURNAL_ENTRY, "Hard day.")
        .unwrap();

    h.wizard.finalize().await.unwrap();

    assert_eq!(h.calls.calls(), vec!["enrichment", "persistence"]);
    assert!(h.wizard.is_complete());
    assert!(h.wizard.enrichment().is_none());

    let record = h.persistence.last_record().unwrap();
    assert_eq!(record.data["journal_entry"], json!("Hard day."));
    assert!(record.data.get("ai_sentiment").is_none());
    assert!(record.enrichment.is_none());
}

#[test]
fn advance_without_mood_is_rejected() {
    let mut h = harness();
    let before = h.wizard.fields().clone();

    assert!(!h.wizard.can_advance());
    assert!(matches!(
        h.wizard.advance(),
        Err(StateMachineError::GuardFailed { .. })
    ));
    assert_eq!(h.wizard.current_state(), WizardState::AtStep(1));
    assert_eq!(h.wizard.fields(), &before);
}

#[test]
fn retreat_is_bounded_at_first_step() {
    let mut h = harness();
    assert!(!h.wizard.can_retreat());
    assert!(h.wizard.retreat().is_err());

    h.wizard.set_field(check_in::MOOD, "joyful").unwrap();
    h.wizard.advance().unwrap();
    assert!(h.wizard.can_retreat());
    assert_eq!(h.wizard.retreat().unwrap(), 1);
    assert_eq!(
        h.wizard.field(check_in::MOOD),
        Some(&FieldValue::text("joyful"))
    );
}

#[test]
fn fields_of_later_steps_can_be_set_early() {
    let mut h = harness();
    h.wizard.set_field(check_in::INTENSITY, 1).unwrap();
    assert_eq!(h.wizard.current_step(), 1);
    assert_eq!(h.wizard.field(check_in::INTENSITY), Some(&FieldValue::Integer(1)));
}

#[tokio::test]
async fn finalize_is_rejected_before_the_last_step() {
    let mut h = harness();
    h.wizard.set_field(check_in::MOOD, "calm").unwrap();

    for expected_step in 1..=3 {
        assert_eq!(h.wizard.current_step(), expected_step);
        assert!(!h.wizard.can_finalize());
        assert!(matches!(
            h.wizard.finalize().await,
            Err(StateMachineError::InvalidTransition { .. })
        ));
        h.wizard.advance().unwrap();
    }

    assert_eq!(h.persistence.attempts(), 0);
    assert!(h.wizard.can_finalize());
}

#[tokio::test]
async fn completed_wizard_is_immutable_until_reset() {
    let mut h = harness();
    h.wizard.set_field(check_in::MOOD, "hopeful").unwrap();
    for _ in 0..3 {
        h.wizard.advance().unwrap();
    }
    let record_id = h.wizard.finalize().await.unwrap();
    assert_eq!(h.wizard.record_id(), Some(&record_id));

    let snapshot = h.wizard.fields().clone();
    assert!(h.wizard.set_field(check_in::MOOD, "sad").is_err());
    assert!(h.wizard.set_field(check_in::ACTIVITIES, "rest").is_err());
    assert!(h.wizard.clear_field(check_in::MOOD).is_err());
    assert!(h.wizard.advance().is_err());
    assert!(h.wizard.retreat().is_err());
    assert!(h.wizard.finalize().await.is_err());
    assert_eq!(h.wizard.fields(), &snapshot);
    assert_eq!(h.persistence.attempts(), 1);

    h.wizard.reset().unwrap();
    assert_eq!(h.wizard.current_state(), WizardState::AtStep(1));
    assert!(h.wizard.field(check_in::MOOD).is_none());
    assert_eq!(h.wizard.field(check_in::INTENSITY), Some(&FieldValue::Integer(3)));
    assert_eq!(
        h.wizard.field(check_in::ACTIVITIES),
        Some(&FieldValue::List(Vec::new()))
    );
    assert!(h.wizard.enrichment().is_none());
}

#[test]
fn reset_is_rejected_before_completion() {
    let mut h = harness();
    assert!(matches!(
        h.wizard.reset(),
        Err(StateMachineError::InvalidTransition { .. })
    ));
}
