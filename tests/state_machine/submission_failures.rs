//! Finalize failure handling and retry

use crate::common::*;
use wellness_core::config::EnrichmentFailurePolicy;
use wellness_core::flow::check_in::{self, check_in_flow};
use wellness_core::services::{EnrichmentError, PersistenceError};
use std::time::Duration;
use wellness_core::state_machine::{StateMachineError, WizardOptions, WizardState};

fn at_journal_step(h: &mut WizardHarness) {
    h.wizard.set_field(check_in::MOOD, "overwhelmed").unwrap();
    h.wizard.advance().unwrap();
    h.wizard.advance().unwrap();
    h.wizard.set_field(check_in::ACTIVITIES, "sleep").unwrap();
    h.wizard.advance().unwrap();
    h.wizard
        .set_field(check_in::JOURNAL_ENTRY, "Too much at once.")
        .unwrap();
}

#[tokio::test]
async fn persistence_failure_preserves_fields_and_allows_retry() {
    let mut h = WizardHarness::new(
        check_in_flow().unwrap(),
        ScriptedEnrichment::succeeding(journal_enrichment()),
        RecordingPersistence::failing_first(1),
    );
    at_journal_step(&mut h);
    let fields_before = h.wizard.fields().clone();

    let err = h.wizard.finalize().await.unwrap_err();
    assert!(matches!(
        err,
        StateMachineError::Persistence(PersistenceError::Rejected { status: 503, .. })
    ));
    assert!(err.is_retryable_submission_failure());

    assert!(!h.wizard.is_submitting());
    assert!(!h.wizard.is_complete());
    assert_eq!(h.wizard.current_state(), WizardState::AtStep(4));
    assert_eq!(h.wizard.fields(), &fields_before);
    assert!(h.wizard.record_id().is_none());

    // Input is unlocked again after the failure
    assert!(h.wizard.can_retreat());
    assert!(h.wizard.can_finalize());

    h.wizard.finalize().await.unwrap();
    assert!(h.wizard.is_complete());
    assert_eq!(h.wizard.submission_attempts(), 2);

    // The retry starts from scratch and runs enrichment again
    assert_eq!(
        h.calls.calls(),
        vec!["enrichment", "persistence", "enrichment", "persistence"]
    );
    assert_eq!(h.persistence.records().len(), 1);
}

#[tokio::test]
async fn persistence_timeout_is_treated_like_any_failure() {
    struct TimingOut;

    #[async_trait::async_trait]
    impl wellness_core::PersistenceService for TimingOut {
        async fn create(
            &self,
            _record: &wellness_core::services::NewRecord,
        ) -> wellness_core::services::PersistenceResult<wellness_core::RecordId> {
            Err(PersistenceError::Timeout)
        }

        async fn list_recent(
            &self,
            _entity: &str,
            _limit: usize,
        ) -> wellness_core::services::PersistenceResult<Vec<wellness_core::services::StoredRecord>>
        {
            Ok(Vec::new())
        }

        fn description(&self) -> &'static str {
            "Timing out"
        }
    }

    let services = wellness_core::WizardServices {
        enrichment: std::sync::Arc::new(ScriptedEnrichment::succeeding(journal_enrichment())),
        persistence: std::sync::Arc::new(TimingOut),
        events: wellness_core::EventPublisher::new(4),
    };
    let mut wizard = wellness_core::WizardStateMachine::new(
        std::sync::Arc::new(check_in_flow().unwrap()),
        services,
        pinned_options(),
    );
    wizard.set_field(check_in::MOOD, "calm").unwrap();
    for _ in 0..3 {
        wizard.advance().unwrap();
    }

    assert_eq!(
        wizard.finalize().await.unwrap_err(),
        StateMachineError::Persistence(PersistenceError::Timeout)
    );
    assert_eq!(wizard.current_state(), WizardState::AtStep(4));
}

#[tokio::test]
async fn required_enrichment_policy_fails_before_persistence() {
    let mut h = WizardHarness::with_options(
        check_in_flow().unwrap(),
        ScriptedEnrichment::failing(EnrichmentError::Timeout),
        RecordingPersistence::new(),
        WizardOptions {
            failure_policy: EnrichmentFailurePolicy::Required,
            ..pinned_options()
        },
    );
    at_journal_step(&mut h);

    let err = h.wizard.finalize().await.unwrap_err();
    assert_eq!(err, StateMachineError::Enrichment(EnrichmentError::Timeout));
    assert_eq!(h.calls.calls(), vec!["enrichment"]);
    assert_eq!(h.persistence.attempts(), 0);
    assert_eq!(h.wizard.current_state(), WizardState::AtStep(4));
}

#[tokio::test]
async fn retry_after_edit_uses_current_journal_text() {
    let mut h = WizardHarness::new(
        check_in_flow().unwrap(),
        ScriptedEnrichment::succeeding(journal_enrichment()),
        RecordingPersistence::failing_first(1),
    );
    at_journal_step(&mut h);
    assert!(h.wizard.finalize().await.is_err());

    h.wizard.set_field(check_in::JOURNAL_ENTRY, "").unwrap();
    h.wizard.finalize().await.unwrap();

    // Second attempt had no journal text, so only the first attempt was enriched
    assert_eq!(h.enrichment.call_count(), 1);
    assert!(h.wizard.enrichment().is_none());
    assert!(h
        .persistence
        .last_record()
        .unwrap()
        .data
        .get("ai_sentiment")
        .is_none());
}

#[tokio::test]
async fn abandoned_finalize_returns_session_to_last_step() {
    let mut h = WizardHarness::new(
        check_in_flow().unwrap(),
        ScriptedEnrichment::succeeding(journal_enrichment()),
        RecordingPersistence::new().with_slow_calls(1, Duration::from_secs(30)),
    );
    at_journal_step(&mut h);
    let fields_before = h.wizard.fields().clone();

    let outcome = tokio::time::timeout(Duration::from_millis(50), h.wizard.finalize()).await;
    assert!(outcome.is_err(), "finalize should still be waiting on persistence");

    assert_eq!(h.wizard.current_state(), WizardState::AtStep(4));
    assert!(!h.wizard.is_submitting());
    assert!(h.wizard.enrichment().is_none());
    assert!(h.wizard.record_id().is_none());
    assert_eq!(h.wizard.fields(), &fields_before);
    assert!(h.persistence.records().is_empty());

    // Every control is usable again
    assert!(h.wizard.can_finalize());
    assert!(h.wizard.can_retreat());
    h.wizard
        .set_field(check_in::JOURNAL_ENTRY, "Still too much, but calmer.")
        .unwrap();

    h.wizard.finalize().await.unwrap();
    assert!(h.wizard.is_complete());
    assert_eq!(h.wizard.submission_attempts(), 2);
    assert_eq!(h.persistence.records().len(), 1);
}
