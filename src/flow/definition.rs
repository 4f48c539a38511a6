//! Declarative step tables shared by every wizard flow.
//!
//! A [`FlowDefinition`] is the only thing that differs between the check-in,
//! booking and music reflection wizards; the controller is generic over it.

use super::fields::{fields_to_json, FieldMap, FieldValue};
use crate::services::enrichment::{Enrichment, PromptTemplate};
use chrono::{Datelike, NaiveDate, Weekday};
use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised while assembling a flow definition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowDefinitionError {
    #[error("Flow '{flow}' declares no steps")]
    NoSteps { flow: String },

    #[error("Step '{step}' gates on '{field}' which it does not declare")]
    GatingFieldNotDeclared { step: String, field: String },

    #[error("Field '{field}' is declared more than once")]
    DuplicateField { field: String },

    #[error("Default for field '{field}' is invalid: {reason}")]
    InvalidDefault { field: String, reason: String },

    #[error("Enrichment text field '{field}' must be a declared free-text field")]
    InvalidEnrichmentField { field: String },

    #[error("Constant attribute '{key}' collides with a declared field")]
    ConstantCollision { key: String },
}

/// Accepted values for one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Exactly one value from the vocabulary
    Choice(&'static [&'static str]),
    /// Any subset of the vocabulary, toggled one item at a time
    MultiSelect(&'static [&'static str]),
    IntegerRange { min: i64, max: i64 },
    /// A date strictly after `today` that is not a Sunday
    BookableDate,
    FreeText,
}

impl FieldKind {
    /// Check a candidate value; the error is a human-readable reason
    pub fn check(&self, value: &FieldValue, today: NaiveDate) -> Result<(), String> {
        match (self, value) {
            (Self::Choice(options), FieldValue::Text(text))
            | (Self::MultiSelect(options), FieldValue::Text(text)) => {
                if options.contains(&text.as_str()) {
                    Ok(())
                } else {
                    Err(format!("'{text}' is not one of {options:?}"))
                }
            }
            (Self::MultiSelect(options), FieldValue::List(items)) => {
                match items.iter().find(|item| !options.contains(&item.as_str())) {
                    Some(item) => Err(format!("'{item}' is not one of {options:?}")),
                    None => Ok(()),
                }
            }
            (Self::IntegerRange { min, max }, FieldValue::Integer(v)) => {
                if (*min..=*max).contains(v) {
                    Ok(())
                } else {
                    Err(format!("{v} is outside {min}..={max}"))
                }
            }
            (Self::BookableDate, FieldValue::Date(date)) => {
                if *date <= today {
                    Err(format!("{date} is not after {today}"))
                } else if date.weekday() == Weekday::Sun {
                    Err(format!("{date} falls on a Sunday"))
                } else {
                    Ok(())
                }
            }
            (Self::FreeText, FieldValue::Text(_)) => Ok(()),
            (kind, other) => Err(format!(
                "{} value does not fit a {} field",
                other.kind_name(),
                kind.name()
            )),
        }
    }

    pub fn is_multi_select(&self) -> bool {
        matches!(self, Self::MultiSelect(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Choice(_) => "choice",
            Self::MultiSelect(_) => "multi_select",
            Self::IntegerRange { .. } => "integer_range",
            Self::BookableDate => "bookable_date",
            Self::FreeText => "free_text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub key: &'static str,
    pub kind: FieldKind,
    /// Value the field starts with (and returns to on clear/reset)
    pub default: Option<FieldValue>,
}

impl FieldDefinition {
    pub fn new(key: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            kind,
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<FieldValue>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Whether a step's gating field blocks forward navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepGate {
    /// The gating field must be present
    Required,
    /// Never blocks (optional input, or a defaulted value)
    Open,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDefinition {
    pub name: &'static str,
    pub gating_field: &'static str,
    pub gate: StepGate,
    pub fields: Vec<FieldDefinition>,
}

impl StepDefinition {
    pub fn required(name: &'static str, gating_field: &'static str) -> Self {
        Self {
            name,
            gating_field,
            gate: StepGate::Required,
            fields: Vec::new(),
        }
    }

    pub fn open(name: &'static str, gating_field: &'static str) -> Self {
        Self {
            name,
            gating_field,
            gate: StepGate::Open,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Evaluate this step's gate over the collected fields
    pub fn is_satisfied(&self, fields: &FieldMap) -> bool {
        match self.gate {
            StepGate::Open => true,
            StepGate::Required => fields
                .get(self.gating_field)
                .is_some_and(FieldValue::is_present),
        }
    }
}

/// How a flow's free-text field is analysed and where the result lands in the record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentSpec {
    /// Free-text field whose presence triggers enrichment
    pub text_field: &'static str,
    pub template: PromptTemplate,
    /// Structured fields passed along as context
    pub context_fields: Vec<&'static str>,
    pub sentiment_key: &'static str,
    pub items_key: &'static str,
    pub insight_key: Option<&'static str>,
}

/// Ordered step table plus record metadata for one wizard flow
#[derive(Debug, Clone, PartialEq)]
pub struct FlowDefinition {
    name: &'static str,
    entity: &'static str,
    steps: Vec<StepDefinition>,
    enrichment: Option<EnrichmentSpec>,
    constants: Map<String, Value>,
}

impl FlowDefinition {
    pub fn new(
        name: &'static str,
        entity: &'static str,
        steps: Vec<StepDefinition>,
    ) -> Result<Self, FlowDefinitionError> {
        if steps.is_empty() {
            return Err(FlowDefinitionError::NoSteps {
                flow: name.to_string(),
            });
        }

        let mut seen = HashSet::new();
        for step in &steps {
            if !step.fields.iter().any(|f| f.key == step.gating_field) {
                return Err(FlowDefinitionError::GatingFieldNotDeclared {
                    step: step.name.to_string(),
                    field: step.gating_field.to_string(),
                });
            }

            for field in &step.fields {
                if !seen.insert(field.key) {
                    return Err(FlowDefinitionError::DuplicateField {
                        field: field.key.to_string(),
                    });
                }
                if let Some(default) = &field.default {
                    // Defaults are checked against the far past so date rules never reject them
                    field
                        .kind
                        .check(default, NaiveDate::MIN)
                        .map_err(|reason| FlowDefinitionError::InvalidDefault {
                            field: field.key.to_string(),
                            reason,
                        })?;
                }
            }
        }

        Ok(Self {
            name,
            entity,
            steps,
            enrichment: None,
            constants: Map::new(),
        })
    }

    /// Attach the enrichment step run during finalize
    pub fn with_enrichment(mut self, spec: EnrichmentSpec) -> Result<Self, FlowDefinitionError> {
        match self.field(spec.text_field) {
            Some(field) if field.kind == FieldKind::FreeText => {}
            _ => {
                return Err(FlowDefinitionError::InvalidEnrichmentField {
                    field: spec.text_field.to_string(),
                })
            }
        }
        self.enrichment = Some(spec);
        Ok(self)
    }

    /// Attach a fixed attribute written into every record of this flow
    pub fn with_constant(
        mut self,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<Self, FlowDefinitionError> {
        if self.field(key).is_some() {
            return Err(FlowDefinitionError::ConstantCollision {
                key: key.to_string(),
            });
        }
        self.constants.insert(key.to_string(), value.into());
        Ok(self)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// Step definition by 1-based index
    pub fn step(&self, index: usize) -> Option<&StepDefinition> {
        index.checked_sub(1).and_then(|i| self.steps.get(i))
    }

    pub fn enrichment(&self) -> Option<&EnrichmentSpec> {
        self.enrichment.as_ref()
    }

    pub fn constants(&self) -> &Map<String, Value> {
        &self.constants
    }

    pub fn field(&self, key: &str) -> Option<&FieldDefinition> {
        self.steps
            .iter()
            .flat_map(|step| step.fields.iter())
            .find(|field| field.key == key)
    }

    /// Field values a fresh session starts with
    pub fn initial_fields(&self) -> FieldMap {
        self.steps
            .iter()
            .flat_map(|step| step.fields.iter())
            .filter_map(|field| {
                field
                    .default
                    .clone()
                    .map(|value| (field.key.to_string(), value))
            })
            .collect()
    }

    /// Whether the gate of the 1-based step `index` holds
    pub fn gate_satisfied(&self, index: usize, fields: &FieldMap) -> bool {
        self.step(index).is_some_and(|step| step.is_satisfied(fields))
    }

    /// Assemble the record persisted on finalize
    pub fn record_data(&self, fields: &FieldMap, enrichment: Option<&Enrichment>) -> Map<String, Value> {
        let mut data = fields_to_json(fields);

        for (key, value) in &self.constants {
            data.insert(key.clone(), value.clone());
        }

        if let (Some(spec), Some(result)) = (&self.enrichment, enrichment) {
            data.insert(
                spec.sentiment_key.to_string(),
                Value::String(result.sentiment.clone()),
            );
            data.insert(spec.items_key.to_string(), Value::Array(result.items.clone()));
            if let (Some(key), Some(insight)) = (spec.insight_key, &result.insight) {
                data.insert(key.to_string(), Value::String(insight.clone()));
            }
        }

        data
    }
}
