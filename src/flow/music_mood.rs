//! Music reflection: a single step whose song title is both the gate and the
//! enrichment input.

use super::definition::{
    EnrichmentSpec, FieldDefinition, FieldKind, FlowDefinition, FlowDefinitionError,
    StepDefinition,
};
use crate::constants;
use crate::services::enrichment::PromptTemplate;

pub const SONG_TITLE: &str = "song_title";
pub const ARTIST: &str = "artist";
pub const WHY_RESONATES: &str = "why_resonates";

pub const DETECTED_MOOD: &str = "detected_mood";
pub const AI_INSIGHT: &str = "ai_insight";
pub const SUGGESTED_SONGS: &str = "suggested_songs";

pub fn music_mood_flow() -> Result<FlowDefinition, FlowDefinitionError> {
    FlowDefinition::new(
        constants::flows::MUSIC_MOOD,
        constants::entities::MUSIC_MOOD,
        vec![StepDefinition::required("song", SONG_TITLE)
            .field(FieldDefinition::new(SONG_TITLE, FieldKind::FreeText))
            .field(FieldDefinition::new(ARTIST, FieldKind::FreeText).with_default(""))
            .field(FieldDefinition::new(WHY_RESONATES, FieldKind::FreeText).with_default(""))],
    )?
    .with_enrichment(EnrichmentSpec {
        text_field: SONG_TITLE,
        template: PromptTemplate::MusicResonance,
        context_fields: vec![ARTIST, WHY_RESONATES],
        sentiment_key: DETECTED_MOOD,
        items_key: SUGGESTED_SONGS,
        insight_key: Some(AI_INSIGHT),
    })
}

/// Palette key for a detected mood, matched by substring like the history cards
pub fn mood_palette(detected_mood: &str) -> &'static str {
    const PALETTES: &[&str] = &[
        "melancholic",
        "anxious",
        "calm",
        "energetic",
        "hopeful",
        "nostalgic",
        "sad",
        "peaceful",
    ];

    let lowered = detected_mood.to_lowercase();
    PALETTES
        .iter()
        .find(|key| lowered.contains(**key))
        .copied()
        .unwrap_or("default")
}
