//! # External Collaborators
//!
//! Narrow interfaces the wizard consumes during finalize, plus their
//! implementations: an in-memory store for local use and an HTTP adapter for the
//! hosted backend.

pub mod backend_client;
pub mod enrichment;
pub mod errors;
pub mod persistence;

pub use backend_client::BackendClient;
pub use enrichment::{Enrichment, EnrichmentRequest, EnrichmentService, PromptTemplate};
pub use errors::{EnrichmentError, EnrichmentResult, PersistenceError, PersistenceResult};
pub use persistence::{InMemoryRecordStore, NewRecord, PersistenceService, RecordId, StoredRecord};
