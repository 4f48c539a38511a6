use crate::config::ConfigurationError;
use crate::flow::FlowDefinitionError;
use crate::services::{EnrichmentError, PersistenceError};
use crate::state_machine::StateMachineError;
use std::fmt;

/// Crate-level error wrapping every layer's failures
#[derive(Debug, Clone, PartialEq)]
pub enum WellnessError {
    ConfigurationError(String),
    StateTransitionError(StateMachineError),
    FlowDefinitionError(String),
    EnrichmentError(EnrichmentError),
    PersistenceError(PersistenceError),
    ValidationError(String),
}

impl fmt::Display for WellnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WellnessError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
            WellnessError::StateTransitionError(err) => write!(f, "State transition error: {err}"),
            WellnessError::FlowDefinitionError(msg) => write!(f, "Flow definition error: {msg}"),
            WellnessError::EnrichmentError(err) => write!(f, "Enrichment error: {err}"),
            WellnessError::PersistenceError(err) => write!(f, "Persistence error: {err}"),
            WellnessError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
        }
    }
}

impl std::error::Error for WellnessError {}

impl From<ConfigurationError> for WellnessError {
    fn from(err: ConfigurationError) -> Self {
        WellnessError::ConfigurationError(err.to_string())
    }
}

impl From<StateMachineError> for WellnessError {
    fn from(err: StateMachineError) -> Self {
        WellnessError::StateTransitionError(err)
    }
}

impl From<FlowDefinitionError> for WellnessError {
    fn from(err: FlowDefinitionError) -> Self {
        WellnessError::FlowDefinitionError(err.to_string())
    }
}

impl From<EnrichmentError> for WellnessError {
    fn from(err: EnrichmentError) -> Self {
        WellnessError::EnrichmentError(err)
    }
}

impl From<PersistenceError> for WellnessError {
    fn from(err: PersistenceError) -> Self {
        WellnessError::PersistenceError(err)
    }
}

pub type Result<T> = std::result::Result<T, WellnessError>;
