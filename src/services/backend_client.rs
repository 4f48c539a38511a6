//! # Hosted Backend Client
//!
//! HTTP adapter for the hosted backend-as-a-service. Implements both collaborator
//! traits: entity creation/listing for [`PersistenceService`] and the LLM invocation
//! endpoint for [`EnrichmentService`].

use super::enrichment::{Enrichment, EnrichmentRequest, EnrichmentService};
use super::errors::{EnrichmentError, EnrichmentResult, PersistenceError, PersistenceResult};
use super::persistence::{
    NewRecord, PersistenceService, RecordId, StoredRecord, UNCONFIRMED_ID_PREFIX,
};
use crate::config::{BackendConfig, ConfigurationError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{debug, error, warn};
use uuid::Uuid;

const LLM_ENDPOINT: &str = "integrations/core/invoke-llm";
const ENTITIES_SERVICE: &str = "Hosted backend entities";

/// HTTP client for the hosted backend
pub struct BackendClient {
    client: Client,
    base_url: Url,
    config: BackendConfig,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout_ms", &self.config.timeout_ms)
            .field("api_key_configured", &!self.config.api_key.is_empty())
            .finish()
    }
}

impl BackendClient {
    /// Create new backend client with the given configuration
    pub fn new(config: BackendConfig) -> Result<Self, ConfigurationError> {
        // Url::join replaces the last segment unless the base ends with '/'
        let normalized = if config.base_url.ends_with('/') {
            config.base_url.clone()
        } else {
            format!("{}/", config.base_url)
        };
        let base_url = Url::parse(&normalized).map_err(|e| {
            ConfigurationError::invalid_value("backend.base_url", config.base_url.clone(), e.to_string())
        })?;

        let mut client_builder = Client::builder()
            .timeout(config.timeout())
            .user_agent(format!("wellness-core/{}", env!("CARGO_PKG_VERSION")));

        if !config.api_key.is_empty() {
            let mut default_headers = reqwest::header::HeaderMap::new();
            default_headers.insert(
                reqwest::header::HeaderName::from_bytes(config.api_key_header.as_bytes()).map_err(
                    |e| {
                        ConfigurationError::invalid_value(
                            "backend.api_key_header",
                            config.api_key_header.clone(),
                            e.to_string(),
                        )
                    },
                )?,
                config.api_key.parse().map_err(|_| {
                    ConfigurationError::invalid_value(
                        "backend.api_key",
                        "[redacted]",
                        "not a valid header value",
                    )
                })?,
            );
            client_builder = client_builder.default_headers(default_headers);
        }

        let client = client_builder.build().map_err(|e| {
            ConfigurationError::validation_error(format!("Failed to create HTTP client: {e}"))
        })?;

        debug!(
            base_url = %base_url,
            timeout_ms = config.timeout_ms,
            "Created BackendClient"
        );

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Get the base URL of the backend API
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.config.timeout_ms
    }

    /// URL of an entity collection
    pub fn entity_url(&self, entity: &str) -> Result<Url, String> {
        self.base_url
            .join(&format!("entities/{entity}"))
            .map_err(|e| format!("Invalid entity URL for '{entity}': {e}"))
    }

    pub fn llm_url(&self) -> Result<Url, String> {
        self.base_url
            .join(LLM_ENDPOINT)
            .map_err(|e| format!("Invalid LLM URL: {e}"))
    }
}

#[async_trait]
impl PersistenceService for BackendClient {
    async fn create(&self, record: &NewRecord) -> PersistenceResult<RecordId> {
        let url = self
            .entity_url(&record.entity)
            .map_err(|e| PersistenceError::create_failed(&record.entity, e))?;
        let started = Instant::now();

        let response = self
            .client
            .post(url)
            .json(&record.data)
            .send()
            .await
            .map_err(|e| PersistenceError::from_transport(&record.entity, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(entity = %record.entity, %status, "Record creation rejected: {body}");
            return Err(PersistenceError::Rejected {
                entity: record.entity.clone(),
                status: status.as_u16(),
                body,
            });
        }

        // A 2xx means the record exists; an unusable body must not invite a resubmit
        let created: Option<Value> = match response.json().await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(entity = %record.entity, error = %e, "Created record response is not JSON");
                None
            }
        };
        let id = match created.as_ref().and_then(parse_record_id) {
            Some(id) => id,
            None => {
                let id = unconfirmed_record_id();
                warn!(
                    entity = %record.entity,
                    record_id = %id,
                    "Backend created a record without returning its id; using a local id"
                );
                id
            }
        };

        crate::logging::log_service_call(
            ENTITIES_SERVICE,
            "create",
            "ok",
            Some(started.elapsed().as_millis() as u64),
            Some(&record.entity),
        );

        Ok(id)
    }

    async fn list_recent(&self, entity: &str, limit: usize) -> PersistenceResult<Vec<StoredRecord>> {
        let url = self.entity_url(entity).map_err(|e| PersistenceError::QueryFailed {
            entity: entity.to_string(),
            reason: e,
        })?;

        let response = self
            .client
            .get(url)
            .query(&[("sort", "-created_date".to_string()), ("limit", limit.to_string())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PersistenceError::Timeout
                } else {
                    PersistenceError::QueryFailed {
                        entity: entity.to_string(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PersistenceError::Rejected {
                entity: entity.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let rows: Vec<Value> = response
            .json()
            .await
            .map_err(|e| PersistenceError::InvalidResponse {
                reason: e.to_string(),
            })?;

        rows.iter().map(|row| parse_stored_record(entity, row)).collect()
    }

    fn description(&self) -> &'static str {
        ENTITIES_SERVICE
    }
}

#[async_trait]
impl EnrichmentService for BackendClient {
    async fn analyze(&self, request: &EnrichmentRequest) -> EnrichmentResult<Enrichment> {
        let url = self
            .llm_url()
            .map_err(EnrichmentError::request_failed)?;
        let started = Instant::now();

        let body = json!({
            "prompt": request.prompt(),
            "response_json_schema": request.template.response_schema(),
        });

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| EnrichmentError::from_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(EnrichmentError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| EnrichmentError::invalid_response(e.to_string()))?;

        let enrichment = request.template.parse_response(&raw)?;

        crate::logging::log_service_call(
            "Hosted backend LLM invocation",
            "analyze",
            "ok",
            Some(started.elapsed().as_millis() as u64),
            Some(&request.flow),
        );

        Ok(enrichment)
    }

    fn description(&self) -> &'static str {
        "Hosted backend LLM invocation"
    }
}

fn unconfirmed_record_id() -> RecordId {
    RecordId(format!("{UNCONFIRMED_ID_PREFIX}{}", Uuid::new_v4()))
}

fn parse_record_id(value: &Value) -> Option<RecordId> {
    match value.get("id")? {
        Value::String(id) if !id.is_empty() => Some(RecordId(id.clone())),
        Value::Number(n) => Some(RecordId(n.to_string())),
        _ => None,
    }
}

fn parse_stored_record(entity: &str, row: &Value) -> PersistenceResult<StoredRecord> {
    let data = row
        .as_object()
        .cloned()
        .ok_or_else(|| PersistenceError::InvalidResponse {
            reason: "record is not a JSON object".to_string(),
        })?;

    let id = parse_record_id(row).ok_or_else(|| PersistenceError::InvalidResponse {
        reason: "record has no id".to_string(),
    })?;

    let created_date = data
        .get("created_date")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| PersistenceError::InvalidResponse {
            reason: format!("record {id} has no valid created_date"),
        })?;

    Ok(StoredRecord {
        id,
        entity: entity.to_string(),
        data,
        created_date,
    })
}
