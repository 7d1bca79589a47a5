use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use serde::Serialize;
use serde_json::Value;

use crate::model::{FieldDefinition, FieldType};

/// A selected file as seen by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileValue {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: u64,
}

impl FileValue {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Undefined,
    Text(String),
    Bool(bool),
    Number(f64),
    Date(NaiveDate),
    File(FileValue),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Text(_) => "string",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Date(_) => "date",
            Self::File(_) => "file",
        }
    }

    /// Decode a JSON value for a field of the given type. Dates arrive as
    /// ISO strings and files as `{name, type, size}` objects.
    pub fn from_json(value: &Value, field_type: FieldType) -> Result<Self, ValueError> {
        Ok(match value {
            Value::Null => Self::Undefined,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) if field_type == FieldType::Date => match parse_date(s) {
                Some(d) => Self::Date(d),
                None => Self::Text(s.clone()),
            },
            Value::String(s) => Self::Text(s.clone()),
            Value::Object(map) => {
                let name = map.get("name").and_then(Value::as_str);
                let mime = map.get("type").and_then(Value::as_str);
                let size = map.get("size").and_then(Value::as_u64);
                match (name, mime, size) {
                    (Some(name), Some(mime), Some(size)) => {
                        Self::File(FileValue::new(name, mime, size))
                    }
                    _ => return Err(ValueError::Unsupported(value.to_string())),
                }
            }
            Value::Array(_) => return Err(ValueError::Unsupported(value.to_string())),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    #[error("Values must be a JSON object")]
    NotAnObject,
    #[error("Unsupported value: {0}")]
    Unsupported(String),
    #[error("Field '{field}': {source}")]
    Field {
        field: String,
        #[source]
        source: Box<ValueError>,
    },
}

/// Field name to current value. Absent keys are undefined.
pub type FormValues = BTreeMap<String, FieldValue>;

/// Decode a JSON record of form values, keyed by field name. Keys that do not
/// name a field are ignored.
pub fn values_from_json(fields: &[FieldDefinition], value: &Value) -> Result<FormValues, ValueError> {
    let record = value.as_object().ok_or(ValueError::NotAnObject)?;
    let mut values = FormValues::new();
    for field in fields {
        if let Some(raw) = record.get(&field.name) {
            let decoded = FieldValue::from_json(raw, field.field_type).map_err(|e| ValueError::Field {
                field: field.name.clone(),
                source: Box::new(e),
            })?;
            if !decoded.is_undefined() {
                values.insert(field.name.clone(), decoded);
            }
        }
    }
    Ok(values)
}

/// Parse `YYYY-MM-DD` or an RFC 3339 timestamp into a calendar date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|d| d.date_naive()))
}
