//! Enrichment collaborator: free text in, structured judgment out.

use super::errors::{EnrichmentError, EnrichmentResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

/// Trait for the external analysis service called during finalize.
///
/// Implementations must not mutate stored entities.
#[async_trait]
pub trait EnrichmentService: Send + Sync {
    async fn analyze(&self, request: &EnrichmentRequest) -> EnrichmentResult<Enrichment>;

    /// Get a description of this service for logging
    fn description(&self) -> &'static str;
}

/// Input for one enrichment call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichmentRequest {
    pub flow: String,
    pub template: PromptTemplate,
    pub text: String,
    /// Already-collected structured fields
    pub context: Map<String, Value>,
}

impl EnrichmentRequest {
    pub fn prompt(&self) -> String {
        self.template.render(&self.text, &self.context)
    }
}

/// Structured result of an enrichment call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    /// Sentiment of a journal entry, or the detected mood of a song
    pub sentiment: String,
    /// Themes (strings) or suggestions (objects), depending on the template
    pub items: Vec<Value>,
    pub insight: Option<String>,
}

/// Prompt and response shape per enrichment use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptTemplate {
    /// Sentiment and themes of a check-in journal entry
    JournalAnalysis,
    /// Emotional reading of a song choice plus three suggestions
    MusicResonance,
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JournalAnalysis => write!(f, "journal_analysis"),
            Self::MusicResonance => write!(f, "music_resonance"),
        }
    }
}

impl PromptTemplate {
    /// Render the prompt text for the given input
    pub fn render(&self, text: &str, context: &Map<String, Value>) -> String {
        match self {
            Self::JournalAnalysis => {
                let mood = context_text(context, "mood").unwrap_or_else(|| "unspecified".to_string());
                let activities = context_text(context, "activities").unwrap_or_default();
                format!(
                    "Read this journal entry and describe its emotional themes and overall sentiment. \
                     Keep the analysis short, gentle and supportive.\n\n\
                     Entry: \"{text}\"\n\
                     Selected mood: {mood}\n\
                     Activities: {activities}\n\n\
                     Respond with a brief, empathetic analysis."
                )
            }
            Self::MusicResonance => {
                let mut song_line = format!("Song: \"{text}\"");
                if let Some(artist) = context_text(context, "artist") {
                    song_line.push_str(&format!(" by {artist}"));
                }
                let connection = context_text(context, "why_resonates")
                    .map(|why| format!("\nWhy it resonates for them: \"{why}\""))
                    .unwrap_or_default();
                format!(
                    "Consider the emotional resonance of this music choice in a mental wellness setting.\n\n\
                     {song_line}{connection}\n\n\
                     Provide:\n\
                     1. A warm two to three sentence insight into what the choice may reflect emotionally\n\
                     2. The detected mood\n\
                     3. Three song suggestions that fit this state, mixing validating and gently uplifting picks\n\n\
                     Stay non-judgmental and never pathologize a music choice."
                )
            }
        }
    }

    /// JSON schema the LLM response must follow
    pub fn response_schema(&self) -> Value {
        match self {
            Self::JournalAnalysis => json!({
                "type": "object",
                "properties": {
                    "sentiment": { "type": "string" },
                    "themes": { "type": "array", "items": { "type": "string" } }
                }
            }),
            Self::MusicResonance => json!({
                "type": "object",
                "properties": {
                    "insight": { "type": "string" },
                    "detected_mood": { "type": "string" },
                    "suggestions": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "title": { "type": "string" },
                                "artist": { "type": "string" },
                                "mood": { "type": "string" }
                            }
                        }
                    }
                }
            }),
        }
    }

    /// Map a raw LLM response onto [`Enrichment`]
    pub fn parse_response(&self, response: &Value) -> EnrichmentResult<Enrichment> {
        let object = response
            .as_object()
            .ok_or_else(|| EnrichmentError::invalid_response("response is not a JSON object"))?;

        let (sentiment_key, items_key, insight_key) = match self {
            Self::JournalAnalysis => ("sentiment", "themes", None),
            Self::MusicResonance => ("detected_mood", "suggestions", Some("insight")),
        };

        let sentiment = object
            .get(sentiment_key)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                EnrichmentError::invalid_response(format!("missing string field '{sentiment_key}'"))
            })?
            .to_string();

        let items = match object.get(items_key) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            Some(_) => {
                return Err(EnrichmentError::invalid_response(format!(
                    "field '{items_key}' is not an array"
                )))
            }
        };

        let insight = insight_key
            .and_then(|key| object.get(key))
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Enrichment {
            sentiment,
            items,
            insight,
        })
    }
}

/// Present context values as prompt text; empty values are treated as absent
fn context_text(context: &Map<String, Value>, key: &str) -> Option<String> {
    match context.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) if !items.is_empty() => Some(
            items
                .iter()
                .map(|item| item.as_str().map_or_else(|| item.to_string(), str::to_string))
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
