use crate::emit::{js_number, js_string};
use crate::model::{DefaultValue, FieldDefinition, FieldType};
use crate::schema::rules::numeric_bounds;
use crate::schema::source::date_literal;
use crate::values::{parse_date, FieldValue, FormValues};

pub type DefaultBuilder = fn(&FieldDefinition) -> FieldValue;

pub fn default_builder(field_type: FieldType) -> DefaultBuilder {
    match field_type {
        FieldType::Text
        | FieldType::Password
        | FieldType::Textarea
        | FieldType::Select
        | FieldType::Radio => text_default,
        FieldType::Checkbox | FieldType::Switch => boolean_default,
        FieldType::Slider => slider_default,
        FieldType::Date => date_default,
        FieldType::File => file_default,
    }
}

pub fn derive(field: &FieldDefinition) -> FieldValue {
    default_builder(field.field_type)(field)
}

fn text_default(field: &FieldDefinition) -> FieldValue {
    match &field.default_value {
        Some(DefaultValue::Text(s)) if !s.is_empty() => FieldValue::Text(s.clone()),
        Some(DefaultValue::Number(n)) => FieldValue::Text(js_number(*n)),
        _ => FieldValue::text(""),
    }
}

fn boolean_default(field: &FieldDefinition) -> FieldValue {
    match &field.default_value {
        Some(DefaultValue::Bool(b)) => FieldValue::Bool(*b),
        Some(DefaultValue::Text(s)) if s == "true" => FieldValue::Bool(true),
        _ => FieldValue::Bool(false),
    }
}

fn slider_default(field: &FieldDefinition) -> FieldValue {
    let explicit = match &field.default_value {
        Some(DefaultValue::Number(n)) => Some(*n),
        Some(DefaultValue::Text(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let (min, _) = numeric_bounds(field);
    FieldValue::Number(explicit.filter(|n| n.is_finite()).or(min).unwrap_or(0.0))
}

fn date_default(field: &FieldDefinition) -> FieldValue {
    match &field.default_value {
        Some(DefaultValue::Text(s)) => parse_date(s).map_or(FieldValue::Undefined, FieldValue::Date),
        _ => FieldValue::Undefined,
    }
}

fn file_default(_field: &FieldDefinition) -> FieldValue {
    FieldValue::Undefined
}

/// JS literal for a value as it appears in `defaultValues`.
pub fn value_literal(value: &FieldValue) -> String {
    match value {
        FieldValue::Undefined | FieldValue::File(_) => "undefined".to_string(),
        FieldValue::Text(s) => js_string(s),
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Number(n) => js_number(*n),
        FieldValue::Date(d) => date_literal(*d),
    }
}

/// Default value per field, in field order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DefaultValues {
    entries: Vec<(String, FieldValue)>,
}

impl DefaultValues {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Record form of the defaults; undefined entries are left out.
    pub fn to_form_values(&self) -> FormValues {
        self.entries
            .iter()
            .filter(|(_, v)| !v.is_undefined())
            .map(|(n, v)| (n.clone(), v.clone()))
            .collect()
    }

    /// Object literal. The opening brace is unindented; entries sit at
    /// `depth + 1` and the closing brace at `depth`.
    pub fn to_source(&self, depth: usize) -> String {
        if self.entries.is_empty() {
            return "{}".to_string();
        }
        let inner = "  ".repeat(depth + 1);
        let mut out = String::from("{\n");
        for (name, value) in &self.entries {
            out.push_str(&format!("{}{}: {},\n", inner, name, value_literal(value)));
        }
        out.push_str(&"  ".repeat(depth));
        out.push('}');
        out
    }
}

pub fn generate(fields: &[FieldDefinition]) -> DefaultValues {
    DefaultValues {
        entries: fields
            .iter()
            .map(|f| (f.name.clone(), derive(f)))
            .collect(),
    }
}
