//! Music reflection: single-step flow whose only step is also the last

use crate::common::*;
use serde_json::json;
use wellness_core::flow::music_mood::{self, music_mood_flow};
use wellness_core::services::PromptTemplate;
use wellness_core::state_machine::StateMachineError;

#[tokio::test]
async fn song_title_gates_finalize() {
    let mut h = WizardHarness::new(
        music_mood_flow().unwrap(),
        ScriptedEnrichment::succeeding(music_enrichment()),
        RecordingPersistence::new(),
    );

    assert_eq!(h.wizard.total_steps(), 1);
    assert!(!h.wizard.can_finalize());
    assert!(matches!(
        h.wizard.finalize().await,
        Err(StateMachineError::GuardFailed { .. })
    ));
    assert_eq!(h.persistence.attempts(), 0);
    assert_eq!(h.wizard.submission_attempts(), 0);

    h.wizard.set_field(music_mood::SONG_TITLE, "Holocene").unwrap();
    h.wizard.set_field(music_mood::ARTIST, "Bon Iver").unwrap();
    h.wizard
        .set_field(music_mood::WHY_RESONATES, "It feels like winter light.")
        .unwrap();
    h.wizard.finalize().await.unwrap();

    let request = &h.enrichment.requests()[0];
    assert_eq!(request.template, PromptTemplate::MusicResonance);
    assert!(request.prompt().contains("Song: \"Holocene\" by Bon Iver"));

    let record = h.persistence.last_record().unwrap();
    assert_eq!(record.entity, "MusicMood");
    assert_eq!(record.data["detected_mood"], json!("Nostalgic"));
    assert_eq!(
        record.data["ai_insight"],
        json!("This song may hold a memory of a gentler time.")
    );
    assert_eq!(record.data["suggested_songs"][0]["title"], json!("Here Comes the Sun"));
}

#[tokio::test]
async fn disabled_enrichment_skips_the_call() {
    let mut h = WizardHarness::with_options(
        music_mood_flow().unwrap(),
        ScriptedEnrichment::succeeding(music_enrichment()),
        RecordingPersistence::new(),
        wellness_core::WizardOptions {
            enrichment_enabled: false,
            ..pinned_options()
        },
    );
    h.wizard.set_field(music_mood::SONG_TITLE, "Holocene").unwrap();
    h.wizard.finalize().await.unwrap();

    assert_eq!(h.calls.calls(), vec!["persistence"]);
    assert!(h.persistence.last_record().unwrap().data.get("detected_mood").is_none());
}
