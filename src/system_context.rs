use crate::config::{ConfigManager, WellnessConfig};
use crate::error::{Result, WellnessError};
use crate::events::EventPublisher;
use crate::experts::{self, filter_experts, Expert, ExpertFilter};
use crate::flow::{booking_flow, check_in_flow, music_mood_flow, FlowDefinition};
use crate::history::{self, CheckInSummary, MusicHistoryEntry};
use crate::profile::{self, BookingHistoryEntry, ProfileOverview};
use crate::services::{BackendClient, EnrichmentService, InMemoryRecordStore, PersistenceService};
use crate::state_machine::{WizardOptions, WizardServices, WizardStateMachine};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Shared dependencies for every wizard in the process
///
/// Serves as a small dependency injection container providing:
/// - Configuration manager
/// - Enrichment and persistence collaborators
/// - Event publisher observers subscribe to for `record-created`
pub struct SystemContext {
    /// System instance ID
    pub system_id: Uuid,

    /// Configuration manager with environment-aware loading
    pub config_manager: Arc<ConfigManager>,

    pub enrichment: Arc<dyn EnrichmentService>,

    pub persistence: Arc<dyn PersistenceService>,

    /// Event publisher
    pub event_publisher: EventPublisher,
}

impl std::fmt::Debug for SystemContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemContext")
            .field("system_id", &self.system_id)
            .field("environment", &self.config_manager.environment())
            .field("enrichment", &self.enrichment.description())
            .field("persistence", &self.persistence.description())
            .finish()
    }
}

impl SystemContext {
    /// Create SystemContext with environment-aware configuration loading,
    /// backed by the hosted backend
    pub fn new() -> Result<Self> {
        info!("Initializing SystemContext with auto-detected environment configuration");

        let config_manager = ConfigManager::load().map_err(|e| {
            WellnessError::ConfigurationError(format!("Failed to load configuration: {e}"))
        })?;

        Self::from_config(config_manager)
    }

    /// Create SystemContext from a loaded configuration, using the HTTP backend
    /// for both enrichment and persistence
    pub fn from_config(config_manager: Arc<ConfigManager>) -> Result<Self> {
        let client = Arc::new(BackendClient::new(config_manager.config().backend.clone())?);
        info!(base_url = client.base_url(), "Hosted backend client ready");

        Ok(Self::with_services(
            config_manager,
            client.clone(),
            client,
        ))
    }

    /// Create SystemContext over an in-memory record store; enrichment is still
    /// supplied by the caller
    pub fn in_memory(
        config_manager: Arc<ConfigManager>,
        enrichment: Arc<dyn EnrichmentService>,
    ) -> Self {
        Self::with_services(config_manager, enrichment, Arc::new(InMemoryRecordStore::new()))
    }

    /// Create SystemContext with explicit collaborators
    pub fn with_services(
        config_manager: Arc<ConfigManager>,
        enrichment: Arc<dyn EnrichmentService>,
        persistence: Arc<dyn PersistenceService>,
    ) -> Self {
        crate::logging::init_structured_logging(
            &config_manager.config().logging,
            config_manager.environment(),
        );

        let event_publisher = EventPublisher::new(config_manager.config().events.channel_capacity);
        let system_id = Uuid::new_v4();

        info!(
            system_id = %system_id,
            environment = config_manager.environment(),
            enrichment = enrichment.description(),
            persistence = persistence.description(),
            "SystemContext initialized"
        );

        Self {
            system_id,
            config_manager,
            enrichment,
            persistence,
            event_publisher,
        }
    }

    pub fn config(&self) -> &WellnessConfig {
        self.config_manager.config()
    }

    /// Collaborators handed to each new wizard
    pub fn wizard_services(&self) -> WizardServices {
        WizardServices {
            enrichment: Arc::clone(&self.enrichment),
            persistence: Arc::clone(&self.persistence),
            events: self.event_publisher.clone(),
        }
    }

    pub fn wizard_options(&self) -> WizardOptions {
        WizardOptions::from(&self.config().enrichment)
    }

    /// Start a wizard over any flow definition
    pub fn wizard_for(&self, flow: FlowDefinition) -> WizardStateMachine {
        WizardStateMachine::new(Arc::new(flow), self.wizard_services(), self.wizard_options())
    }

    pub fn check_in_wizard(&self) -> Result<WizardStateMachine> {
        Ok(self.wizard_for(check_in_flow()?))
    }

    pub fn booking_wizard(&self, expert_id: &str) -> Result<WizardStateMachine> {
        if expert_id.trim().is_empty() {
            return Err(WellnessError::ValidationError(
                "a booking needs an expert".to_string(),
            ));
        }
        Ok(self.wizard_for(booking_flow(expert_id)?))
    }

    /// Booking wizard for an expert picked from the directory
    pub fn booking_wizard_for(&self, expert: &Expert) -> Result<WizardStateMachine> {
        self.booking_wizard(&expert.id)
    }

    pub fn music_mood_wizard(&self) -> Result<WizardStateMachine> {
        Ok(self.wizard_for(music_mood_flow()?))
    }

    /// Recent check-in cards, limited by `history.recent_check_ins`
    pub async fn recent_check_ins(&self) -> Result<Vec<CheckInSummary>> {
        let limit = self.config().history.recent_check_ins;
        Ok(history::recent_check_ins(self.persistence.as_ref(), limit).await?)
    }

    /// Music reflection history, limited by `history.music_history`
    pub async fn music_history(&self) -> Result<Vec<MusicHistoryEntry>> {
        let limit = self.config().history.music_history;
        Ok(history::music_history(self.persistence.as_ref(), limit).await?)
    }

    /// Bookings shown on the profile, limited by `history.bookings`
    pub async fn booking_history(&self) -> Result<Vec<BookingHistoryEntry>> {
        let limit = self.config().history.bookings;
        Ok(profile::booking_history(self.persistence.as_ref(), limit).await?)
    }

    /// Profile page data as of the current UTC day
    pub async fn profile_overview(&self) -> Result<ProfileOverview> {
        let today = Utc::now().date_naive();
        Ok(profile::profile_overview(self.persistence.as_ref(), &self.config().history, today).await?)
    }

    /// Directory experts passing `filter`
    pub async fn find_experts(&self, filter: &ExpertFilter) -> Result<Vec<Expert>> {
        let limit = self.config().history.expert_directory;
        let directory = experts::list_experts(self.persistence.as_ref(), limit).await?;
        Ok(filter_experts(&directory, filter).into_iter().cloned().collect())
    }
}
