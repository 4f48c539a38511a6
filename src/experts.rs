//! # Expert Directory
//!
//! Read-only view of the `Expert` entity and the search used to pick an expert
//! before the booking wizard starts.

use crate::constants::entities;
use crate::services::persistence::{PersistenceService, StoredRecord};
use crate::services::PersistenceResult;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Specialization filter value meaning "no filter"
pub const ALL_SPECIALIZATIONS: &str = "all";

/// A bookable professional
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expert {
    /// Store id; this is the `expert_id` a booking records
    pub id: String,
    pub name: String,
    pub specializations: Vec<String>,
    /// Remaining profile attributes, passed through untouched
    pub attributes: Map<String, Value>,
}

impl Expert {
    pub fn from_record(record: &StoredRecord) -> Self {
        let mut attributes = record.data.clone();
        attributes.remove("id");

        let name = attributes
            .remove("name")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();

        let specializations = match attributes.remove("specializations") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };

        Self {
            id: record.id.to_string(),
            name,
            specializations,
            attributes,
        }
    }
}

/// Free-text search plus an optional exact specialization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpertFilter {
    query: String,
    specialization: Option<String>,
}

impl ExpertFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring matched against name and specializations
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into().trim().to_lowercase();
        self
    }

    /// Exact specialization; [`ALL_SPECIALIZATIONS`] clears the filter
    pub fn with_specialization(mut self, specialization: impl Into<String>) -> Self {
        let specialization = specialization.into();
        self.specialization = (specialization != ALL_SPECIALIZATIONS).then_some(specialization);
        self
    }

    pub fn matches(&self, expert: &Expert) -> bool {
        let matches_query = self.query.is_empty()
            || expert.name.to_lowercase().contains(&self.query)
            || expert
                .specializations
                .iter()
                .any(|s| s.to_lowercase().contains(&self.query));

        let matches_specialization = self
            .specialization
            .as_ref()
            .map_or(true, |wanted| expert.specializations.contains(wanted));

        matches_query && matches_specialization
    }
}

/// Experts passing `filter`, in directory order
pub fn filter_experts<'a>(experts: &'a [Expert], filter: &ExpertFilter) -> Vec<&'a Expert> {
    experts.iter().filter(|expert| filter.matches(expert)).collect()
}

/// Load up to `limit` experts from the store
pub async fn list_experts(
    store: &dyn PersistenceService,
    limit: usize,
) -> PersistenceResult<Vec<Expert>> {
    let records = store.list_recent(entities::EXPERT, limit).await?;
    debug!(count = records.len(), limit, "Loaded expert directory");
    Ok(records.iter().map(Expert::from_record).collect())
}
