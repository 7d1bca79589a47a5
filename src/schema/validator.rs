use std::sync::OnceLock;

use regex::Regex;

use super::rules::{
    Base, Check, FieldRule, Presence, CHOICE_MESSAGE, FILE_MESSAGE, REQUIRED_MESSAGE,
    UNION_MESSAGE,
};
use crate::values::{FieldValue, FileValue};

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"(?i)^[A-Z0-9_'+\-.]*[A-Z0-9_+\-]@([A-Z0-9][A-Z0-9\-]*\.)+[A-Z]{2,}$")
            .expect("email pattern is valid")
    })
}

fn url_regex() -> &'static Regex {
    static URL: OnceLock<Regex> = OnceLock::new();
    URL.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:(//[^\s/?#]+\S*|[^\s/]\S*)$")
            .expect("url pattern is valid")
    })
}

pub fn is_email(s: &str) -> bool {
    !s.starts_with('.') && !s.contains("..") && email_regex().is_match(s)
}

pub fn is_url(s: &str) -> bool {
    url_regex().is_match(s)
}

/// Match over UTF-16 code units, like a `RegExp` without the `u` flag.
fn pattern_matches(regex: &regress::Regex, s: &str) -> bool {
    let units: Vec<u16> = s.encode_utf16().collect();
    regex.find_from_ucs2(&units, 0).next().is_some()
}

/// String length as the browser counts it (UTF-16 code units).
fn js_length(s: &str) -> usize {
    s.encode_utf16().count()
}

/// `.ext` matches the file name suffix, `type/*` the MIME prefix, anything
/// else the exact MIME type.
pub fn matches_accept(file: &FileValue, entries: &[String]) -> bool {
    entries.iter().any(|entry| {
        if entry.starts_with('.') {
            file.name.to_lowercase().ends_with(&entry.to_lowercase())
        } else if let Some(prefix) = entry.strip_suffix('*').filter(|p| p.ends_with('/')) {
            file.mime_type.starts_with(prefix)
        } else {
            file.mime_type == *entry
        }
    })
}

impl FieldRule {
    /// Messages for every failed check; empty when the value is accepted.
    pub fn evaluate(&self, value: &FieldValue) -> Vec<String> {
        if value.is_undefined() {
            return match self.presence {
                Presence::Required => vec![self.missing_message().to_string()],
                Presence::Optional | Presence::OptionalOrEmpty => Vec::new(),
            };
        }

        if self.presence == Presence::OptionalOrEmpty {
            if let FieldValue::Text(s) = value {
                if s.is_empty() {
                    return Vec::new();
                }
            }
        }

        match (&self.base, value) {
            (Base::Enum(allowed), FieldValue::Text(s)) if allowed.contains(s) => Vec::new(),
            (Base::Enum(_), _) => vec![self.choice_message().to_string()],
            (Base::String, FieldValue::Text(_))
            | (Base::Boolean, FieldValue::Bool(_))
            | (Base::Date, FieldValue::Date(_))
            | (Base::File, FieldValue::File(_)) => self.run_checks(value),
            (Base::Number, FieldValue::Number(n)) if !n.is_nan() => self.run_checks(value),
            _ => vec![self.type_message(value)],
        }
    }

    pub fn accepts(&self, value: &FieldValue) -> bool {
        self.evaluate(value).is_empty()
    }

    fn missing_message(&self) -> &'static str {
        match self.base {
            Base::Enum(_) => CHOICE_MESSAGE,
            _ => REQUIRED_MESSAGE,
        }
    }

    fn choice_message(&self) -> &'static str {
        match self.presence {
            Presence::Required => CHOICE_MESSAGE,
            Presence::Optional | Presence::OptionalOrEmpty => UNION_MESSAGE,
        }
    }

    fn type_message(&self, value: &FieldValue) -> String {
        match (&self.base, self.presence) {
            (Base::File, Presence::Required) => REQUIRED_MESSAGE.to_string(),
            (Base::File, _) => FILE_MESSAGE.to_string(),
            (Base::Number, _) => match value {
                FieldValue::Number(_) => "Expected number, received nan".to_string(),
                other => format!("Expected number, received {}", other.kind()),
            },
            (base, _) => format!("Expected {}, received {}", base.kind(), value.kind()),
        }
    }

    fn run_checks(&self, value: &FieldValue) -> Vec<String> {
        self.checks
            .iter()
            .filter(|check| !check_passes(check, value))
            .map(|check| check.message().to_string())
            .collect()
    }
}

fn check_passes(check: &Check, value: &FieldValue) -> bool {
    match (check, value) {
        (Check::Email { .. }, FieldValue::Text(s)) => is_email(s),
        (Check::Url { .. }, FieldValue::Text(s)) => is_url(s),
        (Check::MinLength { length, .. }, FieldValue::Text(s)) => js_length(s) >= *length,
        (Check::MaxLength { length, .. }, FieldValue::Text(s)) => js_length(s) <= *length,
        (Check::Pattern { regex, .. }, FieldValue::Text(s)) => pattern_matches(regex, s),
        (Check::NonEmpty { .. }, FieldValue::Text(s)) => js_length(s) >= 1,
        (Check::MinValue { value: min, .. }, FieldValue::Number(n)) => n >= min,
        (Check::MaxValue { value: max, .. }, FieldValue::Number(n)) => n <= max,
        (Check::MinDate { date, .. }, FieldValue::Date(d)) => d >= date,
        (Check::MaxDate { date, .. }, FieldValue::Date(d)) => d <= date,
        (Check::Accept { entries, .. }, FieldValue::File(f)) => matches_accept(f, entries),
        (Check::MaxSize { bytes, .. }, FieldValue::File(f)) => f.size <= *bytes,
        (Check::MustBeTrue { .. }, FieldValue::Bool(b)) => *b,
        // A check never applies to a value of another base type.
        _ => true,
    }
}
