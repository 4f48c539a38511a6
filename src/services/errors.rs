use thiserror::Error;

/// Failure of the enrichment (LLM analysis) collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentError {
    #[error("Enrichment request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("Enrichment service rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Enrichment response could not be parsed: {reason}")]
    InvalidResponse { reason: String },

    #[error("Enrichment request timed out")]
    Timeout,
}

/// Failure of the persistence collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("Failed to create {entity} record: {reason}")]
    CreateFailed { entity: String, reason: String },

    #[error("Backend rejected {entity} record with status {status}: {body}")]
    Rejected {
        entity: String,
        status: u16,
        body: String,
    },

    #[error("Failed to list {entity} records: {reason}")]
    QueryFailed { entity: String, reason: String },

    #[error("Backend response could not be parsed: {reason}")]
    InvalidResponse { reason: String },

    #[error("Persistence request timed out")]
    Timeout,
}

impl EnrichmentError {
    pub fn request_failed(reason: impl Into<String>) -> Self {
        Self::RequestFailed {
            reason: reason.into(),
        }
    }

    pub fn invalid_response(reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            reason: reason.into(),
        }
    }

    /// Classify a transport error, keeping timeouts distinguishable in logs
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::request_failed(err.to_string())
        }
    }
}

impl PersistenceError {
    pub fn create_failed(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CreateFailed {
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    pub fn from_transport(entity: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::create_failed(entity, err.to_string())
        }
    }
}

pub type EnrichmentResult<T> = Result<T, EnrichmentError>;
pub type PersistenceResult<T> = Result<T, PersistenceError>;
