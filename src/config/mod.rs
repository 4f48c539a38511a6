//! # Wellness Core Configuration System
//!
//! Typed configuration for the wizard controller and its collaborators. Values are
//! layered by [`ConfigManager`]: compiled defaults, then `config/wellness.toml`, then
//! `config/wellness.<environment>.toml`, then `WELLNESS_*` environment variables.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use wellness_core::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//!
//! let timeout = manager.config().backend.timeout_ms;
//! let recent = manager.config().history.recent_check_ins;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::constants;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure mirroring wellness.toml
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WellnessConfig {
    /// Logging output settings
    pub logging: LoggingConfig,

    /// Hosted backend connection settings
    pub backend: BackendConfig,

    /// Enrichment (LLM analysis) behaviour during finalize
    pub enrichment: EnrichmentConfig,

    /// History listing limits
    pub history: HistoryConfig,

    /// Lifecycle event channel settings
    pub events: EventsConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the hosted backend API
    pub base_url: String,
    /// API key sent with every request; empty disables the header
    pub api_key: String,
    /// Header carrying the API key
    pub api_key_header: String,
    /// Request timeout in milliseconds, applied to entity and LLM calls alike
    pub timeout_ms: u64,
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// When false, finalize never calls the enrichment service
    pub enabled: bool,
    /// What an enrichment failure does to the finalize attempt
    pub failure_policy: EnrichmentFailurePolicy,
}

/// How the controller treats a failed enrichment call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentFailurePolicy {
    /// Log the failure and persist the record without enrichment
    BestEffort,
    /// Fail the finalize attempt; the user may retry
    Required,
}

impl fmt::Display for EnrichmentFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BestEffort => write!(f, "best_effort"),
            Self::Required => write!(f, "required"),
        }
    }
}

impl FromStr for EnrichmentFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "best_effort" => Ok(Self::BestEffort),
            "required" => Ok(Self::Required),
            _ => Err(format!("Invalid enrichment failure policy: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Number of check-ins shown under the check-in wizard
    pub recent_check_ins: usize,
    /// Number of music reflections shown in the music history
    pub music_history: usize,
    /// Check-ins the profile mood summary is computed over
    pub profile_mood_entries: usize,
    /// Number of bookings shown on the profile
    pub bookings: usize,
    /// Maximum experts loaded into the directory
    pub expert_directory: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Broadcast channel capacity for lifecycle events
    pub channel_capacity: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000/api/".to_string(),
            api_key: String::new(),
            api_key_header: "api_key".to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            failure_policy: EnrichmentFailurePolicy::BestEffort,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            recent_check_ins: constants::history::RECENT_CHECK_INS,
            music_history: constants::history::MUSIC_HISTORY,
            profile_mood_entries: constants::history::PROFILE_MOOD_ENTRIES,
            bookings: constants::history::BOOKINGS,
            expert_directory: constants::history::EXPERT_DIRECTORY,
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1000,
        }
    }
}

impl Default for WellnessConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            backend: BackendConfig::default(),
            enrichment: EnrichmentConfig::default(),
            history: HistoryConfig::default(),
            events: EventsConfig::default(),
        }
    }
}

impl WellnessConfig {
    /// Validate configuration values after loading
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.backend.base_url.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "backend.base_url",
                "backend configuration",
            ));
        }

        if reqwest::Url::parse(&self.backend.base_url).is_err() {
            return Err(ConfigurationError::invalid_value(
                "backend.base_url",
                self.backend.base_url.clone(),
                "must be an absolute URL",
            ));
        }

        if self.backend.timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "backend.timeout_ms",
                "0",
                "timeout must be greater than 0",
            ));
        }

        if !self.backend.api_key.is_empty() && self.backend.api_key_header.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "backend.api_key_header",
                "backend configuration with an api_key",
            ));
        }

        let history = &self.history;
        if [
            history.recent_check_ins,
            history.music_history,
            history.profile_mood_entries,
            history.bookings,
            history.expert_directory,
        ]
        .contains(&0)
        {
            return Err(ConfigurationError::invalid_value(
                "history",
                "0",
                "history limits must be greater than 0",
            ));
        }

        if self.events.channel_capacity == 0 {
            return Err(ConfigurationError::invalid_value(
                "events.channel_capacity",
                "0",
                "channel capacity must be greater than 0",
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "logging.level",
                "logging configuration",
            ));
        }

        Ok(())
    }
}
