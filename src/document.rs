//! JSON import/export document.
//!
//! ```json
//! { "version": "1.0", "components": [...], "settings": {...}, "metadata": {...} }
//! ```
//!
//! Import is all-or-nothing: the first structural problem aborts it and the
//! error names the offending component index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{FieldDefinition, FieldType, FormModel, FormSettings};
use crate::store::{check_model, ModelError};

pub const DOCUMENT_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Metadata {
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Document must be a JSON object")]
    NotAnObject,
    #[error("Document has no 'components'")]
    MissingComponents,
    #[error("'components' must be an array")]
    ComponentsNotArray,
    #[error("Component {index} is missing '{property}'")]
    MissingProperty { index: usize, property: &'static str },
    #[error("Component {index} has unknown type '{value}'")]
    UnknownType { index: usize, value: String },
    #[error("Component {index} is malformed: {reason}")]
    MalformedComponent { index: usize, reason: String },
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
    #[error("Component {index}: {source}")]
    Invalid {
        index: usize,
        #[source]
        source: ModelError,
    },
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    version: &'static str,
    components: &'a [FieldDefinition],
    settings: &'a FormSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a Metadata>,
}

pub fn export(model: &FormModel, metadata: Option<&Metadata>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&DocumentRef {
        version: DOCUMENT_VERSION,
        components: &model.fields,
        settings: &model.settings,
        metadata,
    })
}

pub fn import(input: &str) -> Result<(FormModel, Option<Metadata>), ImportError> {
    let document: Value = serde_json::from_str(input)?;
    let object = document.as_object().ok_or(ImportError::NotAnObject)?;

    match object.get("version").and_then(Value::as_str) {
        Some(DOCUMENT_VERSION) => {}
        Some(other) => log::warn!("importing document version {} as {}", other, DOCUMENT_VERSION),
        None => log::warn!("document has no version, assuming {}", DOCUMENT_VERSION),
    }

    let components = object
        .get("components")
        .ok_or(ImportError::MissingComponents)?
        .as_array()
        .ok_or(ImportError::ComponentsNotArray)?;

    let fields = components
        .iter()
        .enumerate()
        .map(|(index, component)| decode_component(index, component))
        .collect::<Result<Vec<_>, _>>()?;

    let settings = match object.get("settings") {
        None | Some(Value::Null) => FormSettings::default(),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| ImportError::InvalidSettings(e.to_string()))?,
    };

    let metadata = match object.get("metadata") {
        None | Some(Value::Null) => None,
        Some(value) => match serde_json::from_value::<Metadata>(value.clone()) {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                log::warn!("ignoring unreadable metadata: {}", e);
                None
            }
        },
    };

    let model = FormModel { fields, settings };
    check_model(&model).map_err(|(index, source)| ImportError::Invalid { index, source })?;
    Ok((model, metadata))
}

fn decode_component(index: usize, value: &Value) -> Result<FieldDefinition, ImportError> {
    let object = value.as_object().ok_or_else(|| ImportError::MalformedComponent {
        index,
        reason: "expected an object".to_string(),
    })?;

    for property in ["id", "type", "name"] {
        let present = object
            .get(property)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.is_empty());
        if !present {
            return Err(ImportError::MissingProperty { index, property });
        }
    }

    let type_name = object.get("type").and_then(Value::as_str).unwrap_or_default();
    if FieldType::from_str(type_name).is_none() {
        return Err(ImportError::UnknownType {
            index,
            value: type_name.to_string(),
        });
    }

    serde_json::from_value(value.clone()).map_err(|e| ImportError::MalformedComponent {
        index,
        reason: e.to_string(),
    })
}
