//! SystemContext wiring and history loaders

use crate::common::*;
use chrono::{Datelike, Days, Utc, Weekday};
use serde_json::{json, Map};
use std::sync::Arc;
use wellness_core::config::{ConfigManager, WellnessConfig};
use wellness_core::constants::entities;
use wellness_core::flow::{booking, check_in, music_mood};
use wellness_core::{ExpertFilter, InMemoryRecordStore, SystemContext, WellnessError};

fn context(config: WellnessConfig) -> SystemContext {
    let manager = ConfigManager::from_config(config, "test").unwrap();
    SystemContext::in_memory(
        manager,
        Arc::new(ScriptedEnrichment::succeeding(music_enrichment())),
    )
}

#[tokio::test]
async fn completed_check_ins_show_up_in_recent_history() {
    let mut config = WellnessConfig::default();
    config.history.recent_check_ins = 2;
    let context = context(config);
    let mut created = context.event_publisher.subscribe();

    for mood in ["sad", "calm", "joyful"] {
        let mut wizard = context.check_in_wizard().unwrap();
        wizard.set_field(check_in::MOOD, mood).unwrap();
        for _ in 0..3 {
            wizard.advance().unwrap();
        }
        wizard.finalize().await.unwrap();
        assert_eq!(created.recv().await.unwrap().context["entity"], "MoodEntry");
    }

    let recent = context.recent_check_ins().await.unwrap();
    assert_eq!(recent.len(), 2);
    assert!(recent.iter().all(|summary| summary.emoji != "😐"));
}

#[tokio::test]
async fn music_history_reflects_enrichment() {
    let context = context(WellnessConfig::default());

    let mut wizard = context.music_mood_wizard().unwrap();
    wizard.set_field(music_mood::SONG_TITLE, "Holocene").unwrap();
    wizard.finalize().await.unwrap();

    let history = context.music_history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].song_title, "Holocene");
    assert_eq!(history[0].detected_mood.as_deref(), Some("Nostalgic"));
    assert_eq!(history[0].palette, "nostalgic");
}

#[test]
fn wizard_options_follow_configuration() {
    let mut config = WellnessConfig::default();
    config.enrichment.enabled = false;
    let context = context(config);

    let wizard = context.check_in_wizard().unwrap();
    assert!(!wizard.options().enrichment_enabled);
    assert_eq!(wizard.total_steps(), 4);
}

#[test]
fn booking_wizard_requires_an_expert() {
    let context = context(WellnessConfig::default());
    assert!(matches!(
        context.booking_wizard("  "),
        Err(WellnessError::ValidationError(_))
    ));

    let wizard = context.booking_wizard("expert-3").unwrap();
    assert_eq!(wizard.total_steps(), 3);
    assert_eq!(
        wizard.flow().constants().get("expert_id"),
        Some(&serde_json::json!("expert-3"))
    );
}

#[test]
fn http_backed_context_builds_from_configuration() {
    let manager = ConfigManager::from_config(WellnessConfig::default(), "test").unwrap();
    let context = SystemContext::from_config(manager).unwrap();
    assert_eq!(context.persistence.description(), "Hosted backend entities");
    assert_eq!(context.enrichment.description(), "Hosted backend LLM invocation");
}

#[tokio::test]
async fn profile_overview_reflects_completed_wizards() {
    let context = context(WellnessConfig::default());
    let empty = context.profile_overview().await.unwrap();
    assert!(empty.mood_summary.is_none());
    assert!(empty.calendar.iter().all(|day| !day.has_entry));

    for mood in ["calm", "anxious", "calm"] {
        let mut wizard = context.check_in_wizard().unwrap();
        wizard.set_field(check_in::MOOD, mood).unwrap();
        for _ in 0..3 {
            wizard.advance().unwrap();
        }
        wizard.finalize().await.unwrap();
    }

    let mut booking_date = Utc::now().date_naive() + Days::new(8);
    if booking_date.weekday() == Weekday::Sun {
        booking_date = booking_date + Days::new(1);
    }
    let mut wizard = context.booking_wizard("expert-5").unwrap();
    wizard.set_field(booking::DATE, booking_date).unwrap();
    wizard.advance().unwrap();
    wizard.set_field(booking::TIME_SLOT, "03:00 PM").unwrap();
    wizard.advance().unwrap();
    wizard.finalize().await.unwrap();

    let overview = context.profile_overview().await.unwrap();
    let summary = overview.mood_summary.unwrap();
    assert_eq!(summary.total_entries, 3);
    assert_eq!(summary.top_mood.as_deref(), Some("calm"));
    assert_eq!(summary.top_mood_label, Some("Calm"));
    assert_eq!(overview.activity.check_ins, 3);
    assert_eq!(overview.activity.bookings, 1);
    assert_eq!(overview.activity.music_moods, 0);

    // Today is the last calendar cell
    let today = overview.calendar.last().unwrap();
    assert_eq!(today.date, Utc::now().date_naive());
    assert!(today.has_entry);

    let bookings = context.booking_history().await.unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].expert_id.as_deref(), Some("expert-5"));
    assert_eq!(bookings[0].date, Some(booking_date));
    assert!(bookings[0]
        .confirmation
        .as_deref()
        .unwrap()
        .ends_with("at 03:00 PM"));
}

#[tokio::test]
async fn expert_directory_search_feeds_booking() {
    let store = Arc::new(InMemoryRecordStore::new());
    for (name, specializations) in [
        ("Dr. Amara Osei", json!(["Anxiety", "Trauma"])),
        ("Jonas Weber", json!(["Academic Pressure"])),
    ] {
        let mut data = Map::new();
        data.insert("name".to_string(), json!(name));
        data.insert("specializations".to_string(), specializations);
        store.insert_at(entities::EXPERT, data, Utc::now());
    }
    let context = SystemContext::with_services(
        ConfigManager::from_config(WellnessConfig::default(), "test").unwrap(),
        Arc::new(ScriptedEnrichment::succeeding(journal_enrichment())),
        store,
    );

    assert_eq!(context.find_experts(&ExpertFilter::new()).await.unwrap().len(), 2);

    let found = context
        .find_experts(&ExpertFilter::new().with_query("academic"))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Jonas Weber");

    let wizard = context.booking_wizard_for(&found[0]).unwrap();
    assert_eq!(
        wizard.flow().constants().get("expert_id"),
        Some(&json!(found[0].id))
    );
}
