#![allow(dead_code)]


pub use mock_services::*;

use chrono::NaiveDate;
use std::sync::Arc;
use wellness_core::events::EventPublisher;
use wellness_core::flow::FlowDefinition;
use wellness_core::state_machine::{WizardOptions, WizardServices, WizardStateMachine};

/// Wednesday; every date rule in the integration tests is relative to it
pub fn pinned_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 6, 5).unwrap()
}

/// Thursday after [`pinned_today`]
pub fn next_bookable_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 6, 6).unwrap()
}

pub fn pinned_options() -> WizardOptions {
    WizardOptions {
        today: Some(pinned_today()),
        ..WizardOptions::default()
    }
}

/// Mocks plus the wizard wired to them
pub struct WizardHarness {
    pub wizard: WizardStateMachine,
    pub enrichment: Arc<ScriptedEnrichment>,
    pub persistence: Arc<RecordingPersistence>,
    pub events: EventPublisher,
    pub calls: CallLog,
}

impl WizardHarness {
    pub fn new(flow: FlowDefinition, enrichment: ScriptedEnrichment, persistence: RecordingPersistence) -> Self {
        Self::with_options(flow, enrichment, persistence, pinned_options())
    }

    pub fn with_options(
        flow: FlowDefinition,
        enrichment: ScriptedEnrichment,
        persistence: RecordingPersistence,
        options: WizardOptions,
    ) -> Self {
        let calls = CallLog::default();
        let enrichment = Arc::new(enrichment.with_call_log(calls.clone()));
        let persistence = Arc::new(persistence.with_call_log(calls.clone()));
        let events = EventPublisher::new(16);

        let services = WizardServices {
            enrichment: enrichment.clone(),
            persistence: persistence.clone(),
            events: events.clone(),
        };

        Self {
            wizard: WizardStateMachine::new(Arc::new(flow), services, options),
            enrichment,
            persistence,
            events,
            calls,
        }
    }
}
