#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Wellness Core
//!
//! Step wizard engine behind the wellness app's mood check-in, anonymous expert
//! booking and music reflection flows.
//!
//! ## Overview
//!
//! Each flow is a linear, step-indexed interaction: the user fills in one step at
//! a time, forward navigation is gated on the step's required field, and the
//! last step submits a single record. Submission optionally runs an LLM-backed
//! enrichment over the flow's free-text field before persisting.
//!
//! ## Architecture
//!
//! A single generic [`WizardStateMachine`] is parameterised by a declarative
//! [`FlowDefinition`]. Every operation resolves a target state from the
//! transition table, checks guards, applies the change and runs actions, the
//! same way for every flow. External effects only happen in `finalize`, through
//! the [`EnrichmentService`] and [`PersistenceService`] traits.
//!
//! ## Module Organization
//!
//! - [`state_machine`] - Wizard states, events, guards, actions and controller
//! - [`flow`] - Step tables for check-in, booking and music reflection
//! - [`services`] - Enrichment and persistence collaborators, HTTP backend adapter
//! - [`events`] - `record-created` broadcast for observers
//! - [`history`] - Summaries of recently stored records
//! - [`profile`] - Mood summary, mood calendar and booking history
//! - [`experts`] - Expert directory search ahead of booking
//! - [`system_context`] - Wiring of configuration, services and wizards
//! - [`config`] - Layered configuration loading
//! - [`logging`] - Structured logging setup
//! - [`error`] - Crate-level error type
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wellness_core::config::{ConfigManager, WellnessConfig};
//! use wellness_core::flow::check_in;
//! use wellness_core::services::BackendClient;
//! use wellness_core::system_context::SystemContext;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::from_config(WellnessConfig::default(), "development")?;
//! let enrichment = Arc::new(BackendClient::new(manager.config().backend.clone())?);
//! let context = SystemContext::in_memory(manager, enrichment);
//!
//! let mut wizard = context.check_in_wizard()?;
//! wizard.set_field(check_in::MOOD, "calm")?;
//! wizard.advance()?;
//! wizard.advance()?;
//! wizard.advance()?;
//! let record_id = wizard.finalize().await?;
//! println!("Stored check-in {record_id}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod experts;
pub mod flow;
pub mod history;
pub mod logging;
pub mod profile;
pub mod services;
pub mod state_machine;
pub mod system_context;

pub use config::{ConfigManager, EnrichmentFailurePolicy, WellnessConfig};
pub use error::{Result, WellnessError};
pub use events::{EventPublisher, PublishedEvent};
pub use experts::{Expert, ExpertFilter};
pub use flow::{FieldValue, FlowDefinition};
pub use profile::ProfileOverview;
pub use services::{
    BackendClient, Enrichment, EnrichmentService, InMemoryRecordStore, PersistenceService,
    RecordId,
};
pub use state_machine::{
    WizardEvent, WizardOptions, WizardServices, WizardState, WizardStateMachine,
};
pub use system_context::SystemContext;
