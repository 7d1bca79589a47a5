use crate::defaults::{self, DefaultValues};
use crate::model::{FormModel, FormSettings};
use crate::schema::{self, FieldErrors, SchemaArtifact};
use crate::values::{FieldValue, FormValues};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PreviewError {
    #[error("Unknown field '{0}'")]
    UnknownField(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Rejected(FieldErrors),
    Accepted {
        values: FormValues,
        /// Success toast text, when the form shows one.
        message: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct PreviewSession {
    settings: FormSettings,
    schema: SchemaArtifact,
    defaults: DefaultValues,
    values: FormValues,
    errors: Option<FieldErrors>,
}

impl PreviewSession {
    pub fn new(model: &FormModel) -> Self {
        let defaults = defaults::generate(&model.fields);
        Self {
            settings: model.settings.clone(),
            schema: schema::generate(&model.fields),
            values: defaults.to_form_values(),
            defaults,
            errors: None,
        }
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, name: &str) -> &FieldValue {
        self.values.get(name).unwrap_or(&FieldValue::Undefined)
    }

    /// Set a field's value. After a rejected submit the form re-validates on
    /// every change, so errors clear as soon as they are fixed.
    pub fn set_value(&mut self, name: &str, value: FieldValue) -> Result<(), PreviewError> {
        if self.schema.rule(name).is_none() {
            return Err(PreviewError::UnknownField(name.to_string()));
        }
        if value.is_undefined() {
            self.values.remove(name);
        } else {
            self.values.insert(name.to_string(), value);
        }
        if self.errors.is_some() {
            self.errors = self.schema.validate(&self.values).err();
        }
        Ok(())
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        self.errors.as_ref()
    }

    pub fn errors_for(&self, name: &str) -> Vec<&str> {
        self.errors
            .as_ref()
            .map(|e| e.for_field(name))
            .unwrap_or_default()
    }

    pub fn submit(&mut self) -> SubmitOutcome {
        if let Err(errors) = self.schema.validate(&self.values) {
            log::debug!("preview submit rejected: {}", errors);
            self.errors = Some(errors.clone());
            return SubmitOutcome::Rejected(errors);
        }

        self.errors = None;
        let values = self.values.clone();
        if self.settings.reset_on_submit {
            self.reset();
        }
        let message = self
            .settings
            .show_success_message
            .then(|| self.settings.success_text().to_string());
        SubmitOutcome::Accepted { values, message }
    }

    /// Back to the default values with no errors shown.
    pub fn reset(&mut self) {
        self.values = self.defaults.to_form_values();
        self.errors = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldDefinition, FieldType};

    fn model() -> FormModel {
        let mut name = FieldDefinition::new("1", FieldType::Text, "name");
        name.validation.required = Some(true);
        let mut terms = FieldDefinition::new("2", FieldType::Checkbox, "terms");
        terms.validation.required = Some(true);
        let size = FieldDefinition::new("3", FieldType::Select, "size");
        FormModel {
            fields: vec![name, terms, size],
            settings: FormSettings::default(),
        }
    }

    #[test]
    fn test_starts_from_defaults() {
        let session = PreviewSession::new(&model());
        assert_eq!(session.value("name"), &FieldValue::text(""));
        assert_eq!(session.value("terms"), &FieldValue::Bool(false));
        assert_eq!(session.value("size"), &FieldValue::text(""));
        assert!(session.errors().is_none());
    }

    #[test]
    fn test_submit_rejects_then_revalidates() {
        let mut session = PreviewSession::new(&model());
        let SubmitOutcome::Rejected(errors) = session.submit() else {
            panic!("expected rejection");
        };
        assert_eq!(errors.for_field("name"), vec!["This field is required"]);
        assert!(errors.for_field("size").is_empty());

        session.set_value("name", FieldValue::text("Ada")).unwrap();
        assert!(session.errors_for("name").is_empty());
        assert!(!session.errors_for("terms").is_empty());

        session.set_value("terms", FieldValue::Bool(true)).unwrap();
        assert!(session.errors().is_none());
    }

    #[test]
    fn test_accepted_submit_honours_settings() {
        let mut m = model();
        m.settings.reset_on_submit = true;
        m.settings.success_message = "Thanks!".to_string();
        let mut session = PreviewSession::new(&m);
        session.set_value("name", FieldValue::text("Ada")).unwrap();
        session.set_value("terms", FieldValue::Bool(true)).unwrap();

        match session.submit() {
            SubmitOutcome::Accepted { values, message } => {
                assert_eq!(values["name"], FieldValue::text("Ada"));
                assert_eq!(message.as_deref(), Some("Thanks!"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(session.value("name"), &FieldValue::text(""));
    }

    #[test]
    fn test_no_message_when_disabled() {
        let mut m = model();
        m.fields.truncate(0);
        m.settings.show_success_message = false;
        let mut session = PreviewSession::new(&m);
        assert_eq!(
            session.submit(),
            SubmitOutcome::Accepted {
                values: FormValues::new(),
                message: None
            }
        );
    }

    #[test]
    fn test_unknown_field() {
        let mut session = PreviewSession::new(&model());
        assert_eq!(
            session.set_value("nope", FieldValue::Bool(true)),
            Err(PreviewError::UnknownField("nope".to_string()))
        );
    }
}
