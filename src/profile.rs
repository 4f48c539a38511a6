//! # Profile Overview
//!
//! Aggregates over stored records for the profile page: the most frequent mood,
//! the mood calendar of the last few days, per-flow activity counts and the
//! booking history. Days are UTC days, the same as in [`crate::history`].

use crate::config::HistoryConfig;
use crate::constants::{entities, history::MOOD_CALENDAR_DAYS, FALLBACK_MOOD_EMOJI};
use crate::flow::booking;
use crate::flow::check_in::{self, Mood};
use crate::history::booking_confirmation;
use crate::services::persistence::{PersistenceService, RecordId, StoredRecord};
use crate::services::PersistenceResult;
use chrono::{Days, NaiveDate};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Mood frequencies over a window of check-ins
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoodSummary {
    /// Most frequent mood key; on a tie the most recently seen mood wins
    pub top_mood: Option<String>,
    pub top_mood_label: Option<&'static str>,
    pub top_mood_emoji: &'static str,
    /// Check-ins in the window, including ones without a mood
    pub total_entries: usize,
    /// Mood keys with their counts, most frequent first
    pub mood_counts: Vec<(String, usize)>,
}

/// One cell of the mood calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoodCalendarDay {
    pub date: NaiveDate,
    /// Abbreviated weekday, e.g. `Wed`
    pub weekday: String,
    pub has_entry: bool,
    pub mood: Option<String>,
    pub emoji: Option<&'static str>,
}

/// One booking on the profile page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingHistoryEntry {
    pub record_id: RecordId,
    pub expert_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub time_slot: Option<String>,
    pub is_anonymous: bool,
    /// `June 6, 2030 at 10:00 AM` once both date and slot are known
    pub confirmation: Option<String>,
}

/// How many records of each flow the profile loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ActivityCounts {
    pub check_ins: usize,
    pub bookings: usize,
    pub music_moods: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileOverview {
    /// `None` until the first check-in exists
    pub mood_summary: Option<MoodSummary>,
    pub calendar: Vec<MoodCalendarDay>,
    pub activity: ActivityCounts,
    pub bookings: Vec<BookingHistoryEntry>,
}

fn record_mood(record: &StoredRecord) -> Option<&str> {
    record
        .data
        .get(check_in::MOOD)
        .and_then(Value::as_str)
        .filter(|mood| !mood.is_empty())
}

fn mood_emoji(mood: Option<&str>) -> &'static str {
    mood.and_then(|m| m.parse::<Mood>().ok())
        .map_or(FALLBACK_MOOD_EMOJI, |m| m.emoji())
}

/// Summarise check-ins given newest first; `None` when there are none
pub fn mood_summary(records: &[StoredRecord]) -> Option<MoodSummary> {
    if records.is_empty() {
        return None;
    }

    let mut mood_counts: Vec<(String, usize)> = Vec::new();
    for mood in records.iter().filter_map(record_mood) {
        match mood_counts.iter_mut().find(|(key, _)| key == mood) {
            Some((_, count)) => *count += 1,
            None => mood_counts.push((mood.to_string(), 1)),
        }
    }
    // Stable, so equal counts keep first-seen order
    mood_counts.sort_by(|(_, a), (_, b)| b.cmp(a));

    let top_mood = mood_counts.first().map(|(key, _)| key.clone());
    let parsed = top_mood.as_deref().and_then(|m| m.parse::<Mood>().ok());

    Some(MoodSummary {
        top_mood_label: parsed.map(|m| m.label()),
        top_mood_emoji: mood_emoji(top_mood.as_deref()),
        top_mood,
        total_entries: records.len(),
        mood_counts,
    })
}

/// Calendar of the `days` days ending at `today`, oldest first.
///
/// A day shows the newest check-in created on it.
pub fn mood_calendar(records: &[StoredRecord], today: NaiveDate, days: usize) -> Vec<MoodCalendarDay> {
    (0..days as u64)
        .rev()
        .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
        .map(|date| {
            let entry = records
                .iter()
                .find(|record| record.created_date.date_naive() == date);
            let mood = entry.and_then(record_mood);

            MoodCalendarDay {
                date,
                weekday: date.format("%a").to_string(),
                has_entry: entry.is_some(),
                mood: mood.map(str::to_string),
                emoji: entry.map(|_| mood_emoji(mood)),
            }
        })
        .collect()
}

impl BookingHistoryEntry {
    pub fn from_record(record: &StoredRecord) -> Self {
        let text = |key: &str| {
            record
                .data
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
        };

        let date = text(booking::DATE)
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok());
        let time_slot = text(booking::TIME_SLOT);
        let confirmation = date
            .zip(time_slot.as_deref())
            .map(|(date, slot)| booking_confirmation(date, slot));

        Self {
            record_id: record.id.clone(),
            expert_id: text(booking::EXPERT_ID),
            date,
            time_slot,
            is_anonymous: record
                .data
                .get(booking::IS_ANONYMOUS)
                .and_then(Value::as_bool)
                .unwrap_or(true),
            confirmation,
        }
    }
}

/// Most recent bookings, newest first
pub async fn booking_history(
    store: &dyn PersistenceService,
    limit: usize,
) -> PersistenceResult<Vec<BookingHistoryEntry>> {
    let records = store.list_recent(entities::BOOKING, limit).await?;
    debug!(count = records.len(), limit, "Loaded booking history");
    Ok(records.iter().map(BookingHistoryEntry::from_record).collect())
}

/// Everything the profile page shows, as of `today`
pub async fn profile_overview(
    store: &dyn PersistenceService,
    limits: &HistoryConfig,
    today: NaiveDate,
) -> PersistenceResult<ProfileOverview> {
    let (check_ins, bookings, music_moods) = tokio::try_join!(
        store.list_recent(entities::MOOD_ENTRY, limits.profile_mood_entries),
        store.list_recent(entities::BOOKING, limits.bookings),
        store.list_recent(entities::MUSIC_MOOD, limits.music_history),
    )?;

    let activity = ActivityCounts {
        check_ins: check_ins.len(),
        bookings: bookings.len(),
        music_moods: music_moods.len(),
    };
    debug!(
        check_ins = activity.check_ins,
        bookings = activity.bookings,
        music_moods = activity.music_moods,
        "Loaded profile records"
    );

    Ok(ProfileOverview {
        mood_summary: mood_summary(&check_ins),
        calendar: mood_calendar(&check_ins, today, MOOD_CALENDAR_DAYS),
        activity,
        bookings: bookings.iter().map(BookingHistoryEntry::from_record).collect(),
    })
}
