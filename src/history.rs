//! # History Summaries
//!
//! Read-side adapter turning stored records into the small summaries shown next
//! to each wizard: recent check-in cards, the booking confirmation line and the
//! music reflection history. Dates are labelled by their UTC day.

use crate::constants::{entities, FALLBACK_MOOD_EMOJI};
use crate::flow::booking;
use crate::flow::check_in::{self, Mood};
use crate::flow::music_mood::{self, mood_palette};
use crate::flow::FieldMap;
use crate::services::persistence::{PersistenceService, RecordId, StoredRecord};
use crate::services::PersistenceResult;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// One card in the recent check-ins strip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckInSummary {
    pub record_id: RecordId,
    pub mood: Option<Mood>,
    pub emoji: &'static str,
    /// Abbreviated month and day, e.g. `Jun 5`
    pub date_label: String,
}

impl CheckInSummary {
    pub fn from_record(record: &StoredRecord) -> Self {
        let mood = record
            .data
            .get(check_in::MOOD)
            .and_then(Value::as_str)
            .and_then(|m| m.parse::<Mood>().ok());

        Self {
            record_id: record.id.clone(),
            mood,
            emoji: mood.map_or(FALLBACK_MOOD_EMOJI, |m| m.emoji()),
            date_label: record.created_date.format("%b %-d").to_string(),
        }
    }
}

/// One row of the music reflection history
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MusicHistoryEntry {
    pub record_id: RecordId,
    pub song_title: String,
    pub artist: Option<String>,
    pub detected_mood: Option<String>,
    pub palette: &'static str,
}

impl MusicHistoryEntry {
    pub fn from_record(record: &StoredRecord) -> Self {
        let text = |key: &str| {
            record
                .data
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
        };

        let detected_mood = text(music_mood::DETECTED_MOOD);
        Self {
            record_id: record.id.clone(),
            song_title: text(music_mood::SONG_TITLE).unwrap_or_default(),
            artist: text(music_mood::ARTIST),
            palette: detected_mood.as_deref().map_or("default", mood_palette),
            detected_mood,
        }
    }
}

/// Confirmation line for a booking, e.g. `June 6, 2030 at 10:00 AM`
pub fn booking_confirmation(date: NaiveDate, time_slot: &str) -> String {
    format!("{} at {time_slot}", date.format("%B %-d, %Y"))
}

/// Confirmation line built from a booking wizard's fields, once both are chosen
pub fn booking_confirmation_from_fields(fields: &FieldMap) -> Option<String> {
    let date = fields.get(booking::DATE)?.as_date()?;
    let slot = fields.get(booking::TIME_SLOT)?.as_text()?;
    Some(booking_confirmation(date, slot))
}

/// Most recent check-ins, newest first
pub async fn recent_check_ins(
    store: &dyn PersistenceService,
    limit: usize,
) -> PersistenceResult<Vec<CheckInSummary>> {
    let records = store.list_recent(entities::MOOD_ENTRY, limit).await?;
    debug!(count = records.len(), limit, "Loaded recent check-ins");
    Ok(records.iter().map(CheckInSummary::from_record).collect())
}

/// Most recent music reflections, newest first
pub async fn music_history(
    store: &dyn PersistenceService,
    limit: usize,
) -> PersistenceResult<Vec<MusicHistoryEntry>> {
    let records = store.list_recent(entities::MUSIC_MOOD, limit).await?;
    debug!(count = records.len(), limit, "Loaded music history");
    Ok(records.iter().map(MusicHistoryEntry::from_record).collect())
}
