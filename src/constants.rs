//! # System Constants
//!
//! Vocabularies, entity names and defaults shared by the check-in, booking and
//! music reflection flows.

/// Lifecycle events emitted by the wizard controller
pub mod events {
    /// Published once a wizard's record has been persisted
    pub const RECORD_CREATED: &str = "record-created";
}

/// Backend entity names records are created under
pub mod entities {
    pub const MOOD_ENTRY: &str = "MoodEntry";
    pub const BOOKING: &str = "Booking";
    pub const MUSIC_MOOD: &str = "MusicMood";
    /// Directory of bookable experts, read-only from this crate
    pub const EXPERT: &str = "Expert";
}

/// Flow names used in logs, events and session metadata
pub mod flows {
    pub const CHECK_IN: &str = "mood_check_in";
    pub const BOOKING: &str = "expert_booking";
    pub const MUSIC_MOOD: &str = "music_mood";
}

/// Selectable moods, in display order
pub const MOOD_KEYS: &[&str] = &[
    "joyful",
    "calm",
    "neutral",
    "anxious",
    "sad",
    "overwhelmed",
    "hopeful",
    "tired",
];

/// Activities a user can tag a check-in with, in display order
pub const ACTIVITY_KEYS: &[&str] = &[
    "exercise", "sleep", "social", "nature", "creative", "work", "rest", "music",
];

pub const JOURNAL_TYPE_KEYS: &[&str] = &["quick_note", "reflection"];

/// Bookable session slots
pub const TIME_SLOTS: &[&str] = &[
    "09:00 AM", "10:00 AM", "11:00 AM", "02:00 PM", "03:00 PM", "04:00 PM", "05:00 PM",
];

pub const MIN_INTENSITY: i64 = 1;
pub const MAX_INTENSITY: i64 = 5;
pub const DEFAULT_INTENSITY: i64 = 3;

/// Emoji shown for history entries whose mood is not recognised
pub const FALLBACK_MOOD_EMOJI: &str = "😐";

/// History defaults
pub mod history {
    pub const RECENT_CHECK_INS: usize = 7;
    pub const MUSIC_HISTORY: usize = 10;
    /// Check-ins the profile's mood summary and calendar are computed over
    pub const PROFILE_MOOD_ENTRIES: usize = 30;
    pub const BOOKINGS: usize = 10;
    pub const EXPERT_DIRECTORY: usize = 100;
    pub const MOOD_CALENDAR_DAYS: usize = 7;
}
