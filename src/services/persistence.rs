//! Persistence collaborator: create one record atomically, list recent records.

use super::enrichment::Enrichment;
use super::errors::{PersistenceError, PersistenceResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Trait for the external record store.
///
/// `create` is all-or-nothing: on error no record exists.
#[async_trait]
pub trait PersistenceService: Send + Sync {
    async fn create(&self, record: &NewRecord) -> PersistenceResult<RecordId>;

    /// Most recent records of an entity, newest first
    async fn list_recent(&self, entity: &str, limit: usize) -> PersistenceResult<Vec<StoredRecord>>;

    /// Get a description of this service for logging
    fn description(&self) -> &'static str;
}

/// Identifier assigned by the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

/// Prefix of ids minted locally for records the backend created without reporting an id
pub const UNCONFIRMED_ID_PREFIX: &str = "unconfirmed-";

impl RecordId {
    /// Whether this id was minted locally rather than assigned by the store
    pub fn is_unconfirmed(&self) -> bool {
        self.0.starts_with(UNCONFIRMED_ID_PREFIX)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Record assembled by a finalizing wizard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRecord {
    pub entity: String,
    /// Flattened payload: fields, flow constants and mapped enrichment
    pub data: Map<String, Value>,
    /// Enrichment that was folded into `data`, if any
    #[serde(skip)]
    pub enrichment: Option<Enrichment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: RecordId,
    pub entity: String,
    pub data: Map<String, Value>,
    pub created_date: DateTime<Utc>,
}

/// Process-local record store used for development and tests
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<Vec<StoredRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn find(&self, id: &RecordId) -> Option<StoredRecord> {
        self.records.read().iter().find(|r| &r.id == id).cloned()
    }

    /// Insert a record with an explicit creation time (history backfill)
    pub fn insert_at(&self, entity: &str, data: Map<String, Value>, created_date: DateTime<Utc>) -> RecordId {
        let id = RecordId(Uuid::new_v4().to_string());
        self.records.write().push(StoredRecord {
            id: id.clone(),
            entity: entity.to_string(),
            data,
            created_date,
        });
        id
    }
}

#[async_trait]
impl PersistenceService for InMemoryRecordStore {
    async fn create(&self, record: &NewRecord) -> PersistenceResult<RecordId> {
        if record.entity.trim().is_empty() {
            return Err(PersistenceError::create_failed(
                record.entity.clone(),
                "entity name is empty",
            ));
        }

        let id = self.insert_at(&record.entity, record.data.clone(), Utc::now());

        tracing::debug!(
            entity = %record.entity,
            record_id = %id,
            "Record stored in memory"
        );

        Ok(id)
    }

    async fn list_recent(&self, entity: &str, limit: usize) -> PersistenceResult<Vec<StoredRecord>> {
        let mut matching: Vec<StoredRecord> = self
            .records
            .read()
            .iter()
            .filter(|r| r.entity == entity)
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.created_date.cmp(&a.created_date));
        matching.truncate(limit);
        Ok(matching)
    }

    fn description(&self) -> &'static str {
        "In-memory record store"
    }
}
