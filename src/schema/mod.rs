//! Validation-schema generation.
//!
//! One rule table per form feeds both the runtime validator used by the
//! preview and the zod source handed to the developer.

pub mod rules;
pub mod source;
mod validator;

use serde::Serialize;

pub use rules::{build_rules, Base, Check, FieldRule, Presence, REQUIRED_MESSAGE};
pub use validator::{is_email, is_url, matches_accept};

use crate::model::FieldDefinition;
use crate::values::{FieldValue, FormValues};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{} validation issue(s)", .issues.len())]
pub struct FieldErrors {
    pub issues: Vec<FieldIssue>,
}

impl FieldErrors {
    pub fn for_field(&self, name: &str) -> Vec<&str> {
        self.issues
            .iter()
            .filter(|i| i.field == name)
            .map(|i| i.message.as_str())
            .collect()
    }
}

/// Runtime validator paired with its zod source.
#[derive(Debug, Clone)]
pub struct SchemaArtifact {
    rules: Vec<FieldRule>,
    source: String,
}

impl SchemaArtifact {
    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn into_source(self) -> String {
        self.source
    }

    pub fn rule(&self, name: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Validate a whole record. Keys without a rule are ignored; missing keys
    /// are undefined.
    pub fn validate(&self, values: &FormValues) -> Result<(), FieldErrors> {
        let issues: Vec<FieldIssue> = self
            .rules
            .iter()
            .flat_map(|rule| {
                let value = values.get(&rule.name).unwrap_or(&FieldValue::Undefined);
                rule.evaluate(value).into_iter().map(|message| FieldIssue {
                    field: rule.name.clone(),
                    message,
                })
            })
            .collect();

        if issues.is_empty() {
            Ok(())
        } else {
            Err(FieldErrors { issues })
        }
    }

    /// Messages for a single field; empty for unknown names.
    pub fn validate_field(&self, name: &str, value: &FieldValue) -> Vec<String> {
        self.rule(name).map(|r| r.evaluate(value)).unwrap_or_default()
    }

    pub fn accepts(&self, name: &str, value: &FieldValue) -> bool {
        self.validate_field(name, value).is_empty()
    }
}

pub fn generate(fields: &[FieldDefinition]) -> SchemaArtifact {
    let rules = build_rules(fields);
    let source = source::render_module(&rules);
    log::debug!("schema: {} rules, {} bytes", rules.len(), source.len());
    SchemaArtifact { rules, source }
}
