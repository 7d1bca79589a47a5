use chrono::NaiveDate;
use regress::Regex;

use crate::emit::js_number;
use crate::model::{FieldDefinition, FieldType};
use crate::values::parse_date;

pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const CHOICE_MESSAGE: &str = "Please select a valid option";
pub const UNION_MESSAGE: &str = "Invalid input";
pub const FILE_MESSAGE: &str = "Input not instance of File";

#[derive(Debug, Clone, PartialEq)]
pub enum Base {
    String,
    /// Allowed option values, in option order.
    Enum(Vec<String>),
    Boolean,
    Number,
    Date,
    File,
}

impl Base {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::String | Self::Enum(_) => "string",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Date => "date",
            Self::File => "file",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
    /// Optional, and the empty string also passes.
    OptionalOrEmpty,
}

#[derive(Debug, Clone)]
pub enum Check {
    Email { message: String },
    Url { message: String },
    MinLength { length: usize, message: String },
    MaxLength { length: usize, message: String },
    Pattern { source: String, regex: Regex, message: String },
    MinValue { value: f64, message: String },
    MaxValue { value: f64, message: String },
    MinDate { date: NaiveDate, message: String },
    MaxDate { date: NaiveDate, message: String },
    Accept { entries: Vec<String>, message: String },
    MaxSize { bytes: u64, message: String },
    /// Required strings: at least one character.
    NonEmpty { message: String },
    /// Required booleans: must be checked.
    MustBeTrue { message: String },
}

impl Check {
    pub fn message(&self) -> &str {
        match self {
            Self::Email { message }
            | Self::Url { message }
            | Self::MinLength { message, .. }
            | Self::MaxLength { message, .. }
            | Self::Pattern { message, .. }
            | Self::MinValue { message, .. }
            | Self::MaxValue { message, .. }
            | Self::MinDate { message, .. }
            | Self::MaxDate { message, .. }
            | Self::Accept { message, .. }
            | Self::MaxSize { message, .. }
            | Self::NonEmpty { message }
            | Self::MustBeTrue { message } => message,
        }
    }
}

/// Validation rule for one field: base type, checks in application order,
/// then the presence wrapper.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub name: String,
    pub field_type: FieldType,
    pub base: Base,
    pub checks: Vec<Check>,
    pub presence: Presence,
}

pub type RuleBuilder = fn(&FieldDefinition) -> FieldRule;

pub fn rule_builder(field_type: FieldType) -> RuleBuilder {
    match field_type {
        FieldType::Text | FieldType::Password | FieldType::Textarea => text_rule,
        FieldType::Select | FieldType::Radio => choice_rule,
        FieldType::Checkbox | FieldType::Switch => boolean_rule,
        FieldType::Slider => slider_rule,
        FieldType::Date => date_rule,
        FieldType::File => file_rule,
    }
}

pub fn build_rules(fields: &[FieldDefinition]) -> Vec<FieldRule> {
    fields
        .iter()
        .map(|f| rule_builder(f.field_type)(f))
        .collect()
}

/// Compile a user pattern with ECMAScript syntax, as `new RegExp(source)`
/// would in the browser.
pub fn compile_pattern(source: &str) -> Result<Regex, regress::Error> {
    Regex::new(source)
}

/// Effective numeric bounds: validation bounds win over the control's range.
pub fn numeric_bounds(field: &FieldDefinition) -> (Option<f64>, Option<f64>) {
    (
        field.validation.min.or(field.min),
        field.validation.max.or(field.max),
    )
}

/// Entries of the accept filter, or empty when no filtering applies.
pub fn accept_entries(field: &FieldDefinition) -> Vec<String> {
    field
        .accept_filter()
        .map(|accept| {
            accept
                .split(',')
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if bytes >= MB && bytes % MB == 0 {
        format!("{}MB", bytes / MB)
    } else if bytes >= KB && bytes % KB == 0 {
        format!("{}KB", bytes / KB)
    } else {
        format!("{} bytes", bytes)
    }
}

fn message(field: &FieldDefinition, default: String) -> String {
    match field.validation.custom_message.as_deref() {
        Some(custom) if !custom.trim().is_empty() => custom.to_string(),
        _ => default,
    }
}

fn presence(field: &FieldDefinition) -> Presence {
    if field.is_required() {
        Presence::Required
    } else {
        Presence::Optional
    }
}

fn rule(field: &FieldDefinition, base: Base, checks: Vec<Check>, presence: Presence) -> FieldRule {
    FieldRule {
        name: field.name.clone(),
        field_type: field.field_type,
        base,
        checks,
        presence,
    }
}

fn text_rule(field: &FieldDefinition) -> FieldRule {
    let v = &field.validation;
    let mut checks = Vec::new();

    if v.email == Some(true) {
        checks.push(Check::Email {
            message: message(field, "Invalid email address".to_string()),
        });
    } else if v.url == Some(true) {
        checks.push(Check::Url {
            message: message(field, "Invalid URL".to_string()),
        });
    }

    if let Some(length) = v.min_length {
        checks.push(Check::MinLength {
            length,
            message: message(field, format!("Must be at least {} characters", length)),
        });
    }
    if let Some(length) = v.max_length {
        checks.push(Check::MaxLength {
            length,
            message: message(field, format!("Must be at most {} characters", length)),
        });
    }

    if let Some(source) = &v.pattern {
        match compile_pattern(source) {
            Ok(regex) => checks.push(Check::Pattern {
                source: source.clone(),
                regex,
                message: message(field, "Invalid format".to_string()),
            }),
            Err(e) => log::warn!("skipping pattern on '{}': {}", field.name, e),
        }
    }

    let presence = presence(field);
    if presence == Presence::Required {
        checks.push(Check::NonEmpty {
            message: REQUIRED_MESSAGE.to_string(),
        });
    }

    rule(field, Base::String, checks, presence)
}

fn choice_rule(field: &FieldDefinition) -> FieldRule {
    let values: Vec<String> = field.options.iter().map(|o| o.value.clone()).collect();
    let required = field.is_required();

    if values.is_empty() {
        let checks = if required {
            vec![Check::NonEmpty {
                message: REQUIRED_MESSAGE.to_string(),
            }]
        } else {
            Vec::new()
        };
        return rule(field, Base::String, checks, presence(field));
    }

    let presence = if required {
        Presence::Required
    } else {
        Presence::OptionalOrEmpty
    };
    rule(field, Base::Enum(values), Vec::new(), presence)
}

fn boolean_rule(field: &FieldDefinition) -> FieldRule {
    let checks = if field.is_required() {
        vec![Check::MustBeTrue {
            message: REQUIRED_MESSAGE.to_string(),
        }]
    } else {
        Vec::new()
    };
    rule(field, Base::Boolean, checks, presence(field))
}

fn slider_rule(field: &FieldDefinition) -> FieldRule {
    let (min, max) = numeric_bounds(field);
    let mut checks = Vec::new();
    if let Some(value) = min {
        checks.push(Check::MinValue {
            value,
            message: message(field, format!("Must be at least {}", js_number(value))),
        });
    }
    if let Some(value) = max {
        checks.push(Check::MaxValue {
            value,
            message: message(field, format!("Must be at most {}", js_number(value))),
        });
    }
    rule(field, Base::Number, checks, presence(field))
}

fn date_rule(field: &FieldDefinition) -> FieldRule {
    let v = &field.validation;
    let mut checks = Vec::new();
    if let Some(date) = v.min_date.as_deref().and_then(parse_date) {
        checks.push(Check::MinDate {
            date,
            message: message(field, format!("Date must be on or after {}", date)),
        });
    }
    if let Some(date) = v.max_date.as_deref().and_then(parse_date) {
        checks.push(Check::MaxDate {
            date,
            message: message(field, format!("Date must be on or before {}", date)),
        });
    }
    rule(field, Base::Date, checks, presence(field))
}

fn file_rule(field: &FieldDefinition) -> FieldRule {
    let mut checks = Vec::new();

    let entries = accept_entries(field);
    if !entries.is_empty() {
        let default = format!("File type must be one of: {}", entries.join(", "));
        checks.push(Check::Accept {
            entries,
            message: message(field, default),
        });
    }

    if let Some(bytes) = field.max_size {
        checks.push(Check::MaxSize {
            bytes,
            message: message(field, format!("File must be {} or smaller", format_bytes(bytes))),
        });
    }

    rule(field, Base::File, checks, presence(field))
}
