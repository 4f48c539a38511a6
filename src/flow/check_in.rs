//! Mood check-in: mood → intensity → activities → optional journal.

use super::definition::{
    EnrichmentSpec, FieldDefinition, FieldKind, FlowDefinition, FlowDefinitionError,
    StepDefinition,
};
use crate::constants::{
    self, ACTIVITY_KEYS, DEFAULT_INTENSITY, JOURNAL_TYPE_KEYS, MAX_INTENSITY, MIN_INTENSITY,
    MOOD_KEYS,
};
use crate::services::enrichment::PromptTemplate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MOOD: &str = "mood";
pub const INTENSITY: &str = "intensity";
pub const ACTIVITIES: &str = "activities";
pub const JOURNAL_ENTRY: &str = "journal_entry";
pub const JOURNAL_TYPE: &str = "journal_type";

pub const AI_SENTIMENT: &str = "ai_sentiment";
pub const AI_THEMES: &str = "ai_themes";

/// Build the four-step check-in flow
pub fn check_in_flow() -> Result<FlowDefinition, FlowDefinitionError> {
    FlowDefinition::new(
        constants::flows::CHECK_IN,
        constants::entities::MOOD_ENTRY,
        vec![
            StepDefinition::required("mood", MOOD)
                .field(FieldDefinition::new(MOOD, FieldKind::Choice(MOOD_KEYS))),
            StepDefinition::open("intensity", INTENSITY).field(
                FieldDefinition::new(
                    INTENSITY,
                    FieldKind::IntegerRange {
                        min: MIN_INTENSITY,
                        max: MAX_INTENSITY,
                    },
                )
                .with_default(DEFAULT_INTENSITY),
            ),
            StepDefinition::open("activities", ACTIVITIES).field(
                FieldDefinition::new(ACTIVITIES, FieldKind::MultiSelect(ACTIVITY_KEYS))
                    .with_default(super::fields::FieldValue::List(Vec::new())),
            ),
            StepDefinition::open("journal", JOURNAL_ENTRY)
                .field(FieldDefinition::new(JOURNAL_ENTRY, FieldKind::FreeText).with_default(""))
                .field(
                    FieldDefinition::new(JOURNAL_TYPE, FieldKind::Choice(JOURNAL_TYPE_KEYS))
                        .with_default(JournalType::QuickNote.to_string()),
                ),
        ],
    )?
    .with_enrichment(EnrichmentSpec {
        text_field: JOURNAL_ENTRY,
        template: PromptTemplate::JournalAnalysis,
        context_fields: vec![MOOD, ACTIVITIES],
        sentiment_key: AI_SENTIMENT,
        items_key: AI_THEMES,
        insight_key: None,
    })
}

/// Moods offered on the first check-in step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Joyful,
    Calm,
    Neutral,
    Anxious,
    Sad,
    Overwhelmed,
    Hopeful,
    Tired,
}

impl Mood {
    pub const ALL: [Mood; 8] = [
        Self::Joyful,
        Self::Calm,
        Self::Neutral,
        Self::Anxious,
        Self::Sad,
        Self::Overwhelmed,
        Self::Hopeful,
        Self::Tired,
    ];

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Joyful => "😊",
            Self::Calm => "😌",
            Self::Neutral => "😐",
            Self::Anxious => "😰",
            Self::Sad => "😢",
            Self::Overwhelmed => "😵‍💫",
            Self::Hopeful => "🌱",
            Self::Tired => "😴",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Joyful => "Joyful",
            Self::Calm => "Calm",
            Self::Neutral => "Neutral",
            Self::Anxious => "Anxious",
            Self::Sad => "Sad",
            Self::Overwhelmed => "Overwhelmed",
            Self::Hopeful => "Hopeful",
            Self::Tired => "Tired",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Joyful => write!(f, "joyful"),
            Self::Calm => write!(f, "calm"),
            Self::Neutral => write!(f, "neutral"),
            Self::Anxious => write!(f, "anxious"),
            Self::Sad => write!(f, "sad"),
            Self::Overwhelmed => write!(f, "overwhelmed"),
            Self::Hopeful => write!(f, "hopeful"),
            Self::Tired => write!(f, "tired"),
        }
    }
}

impl std::str::FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "joyful" => Ok(Self::Joyful),
            "calm" => Ok(Self::Calm),
            "neutral" => Ok(Self::Neutral),
            "anxious" => Ok(Self::Anxious),
            "sad" => Ok(Self::Sad),
            "overwhelmed" => Ok(Self::Overwhelmed),
            "hopeful" => Ok(Self::Hopeful),
            "tired" => Ok(Self::Tired),
            _ => Err(format!("Invalid mood: {s}")),
        }
    }
}

/// Activities a check-in can be tagged with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Exercise,
    Sleep,
    Social,
    Nature,
    Creative,
    Work,
    Rest,
    Music,
}

impl Activity {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Exercise => "exercise",
            Self::Sleep => "sleep",
            Self::Social => "social",
            Self::Nature => "nature",
            Self::Creative => "creative",
            Self::Work => "work",
            Self::Rest => "rest",
            Self::Music => "music",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Exercise => "🏃",
            Self::Sleep => "😴",
            Self::Social => "👥",
            Self::Nature => "🌿",
            Self::Creative => "🎨",
            Self::Work => "💼",
            Self::Rest => "🛋️",
            Self::Music => "🎵",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Exercise => "Exercise",
            Self::Sleep => "Good Sleep",
            Self::Social => "Socializing",
            Self::Nature => "Nature",
            Self::Creative => "Creative",
            Self::Work => "Work/Study",
            Self::Rest => "Rest",
            Self::Music => "Music",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Style of the optional journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalType {
    #[default]
    QuickNote,
    Reflection,
}

impl fmt::Display for JournalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QuickNote => write!(f, "quick_note"),
            Self::Reflection => write!(f, "reflection"),
        }
    }
}
