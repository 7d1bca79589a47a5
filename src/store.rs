//! Editor state: the form model behind an explicit handle.
//!
//! Every mutation validates a candidate before committing it, so a rejected
//! call leaves the model exactly as it was.

use std::collections::HashSet;

use chrono::Utc;
use uuid::Uuid;

use crate::document::{self, ImportError, Metadata};
use crate::model::{FieldDefinition, FieldOption, FieldType, FormModel, FormSettings, GRID_COLUMNS};
use crate::defaults;
use crate::naming;
use crate::schema::rules::{compile_pattern, rule_builder, Check, Presence};
use crate::values::parse_date;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("Field name cannot be empty")]
    EmptyName,
    #[error("Invalid field name '{0}': use letters, digits, _ or $ and do not start with a digit")]
    InvalidName(String),
    #[error("'{0}' is a reserved word and cannot be used as a field name")]
    ReservedName(String),
    #[error("A field named '{0}' already exists")]
    DuplicateName(String),
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("Option {index} has an empty value")]
    EmptyOptionValue { index: usize },
    #[error("Duplicate option value '{0}'")]
    DuplicateOptionValue(String),
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),
    #[error("Field not found: {0}")]
    FieldNotFound(String),
    #[error("Index {index} is out of bounds for {len} fields")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("The id and type of field '{0}' cannot change")]
    ImmutableField(String),
    #[error("Duplicate field id '{0}'")]
    DuplicateId(String),
    #[error("Default value of '{name}' does not pass its own validation: {reason}")]
    InvalidDefault { name: String, reason: String },
}

/// Check one field against the model invariants. `others` must not contain
/// the field itself.
pub fn check_field(field: &FieldDefinition, others: &[FieldDefinition]) -> Result<(), ModelError> {
    naming::validate_name(&field.name)?;
    if others.iter().any(|f| f.name == field.name) {
        return Err(ModelError::DuplicateName(field.name.clone()));
    }

    if let Some(pattern) = &field.validation.pattern {
        compile_pattern(pattern).map_err(|e| ModelError::InvalidPattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;
    }

    let mut seen = HashSet::new();
    for (index, option) in field.options.iter().enumerate() {
        if option.value.is_empty() {
            return Err(ModelError::EmptyOptionValue { index });
        }
        if !seen.insert(option.value.as_str()) {
            return Err(ModelError::DuplicateOptionValue(option.value.clone()));
        }
    }

    for date in [&field.validation.min_date, &field.validation.max_date]
        .into_iter()
        .flatten()
    {
        if parse_date(date).is_none() {
            return Err(ModelError::InvalidDate(date.clone()));
        }
    }

    if let Some(layout) = &field.layout {
        if layout.x >= GRID_COLUMNS {
            return Err(ModelError::InvalidLayout(format!(
                "column {} is outside the {}-column grid",
                layout.x, GRID_COLUMNS
            )));
        }
        if layout.w == 0 || layout.w > GRID_COLUMNS {
            return Err(ModelError::InvalidLayout(format!(
                "width {} must be between 1 and {}",
                layout.w, GRID_COLUMNS
            )));
        }
        if layout.h == 0 {
            return Err(ModelError::InvalidLayout("height must be at least 1".to_string()));
        }
    }

    check_default(field)
}

/// An explicit default must pass the field's rule, apart from the
/// required check, which the user satisfies by editing the field.
fn check_default(field: &FieldDefinition) -> Result<(), ModelError> {
    if field.default_value.is_none() {
        return Ok(());
    }
    let value = defaults::derive(field);
    let implicit = defaults::derive(&FieldDefinition {
        default_value: None,
        ..field.clone()
    });
    if value == implicit {
        return Ok(());
    }

    let mut rule = rule_builder(field.field_type)(field);
    rule.checks
        .retain(|c| !matches!(c, Check::NonEmpty { .. } | Check::MustBeTrue { .. }));
    if rule.presence == Presence::Required {
        rule.presence = Presence::Optional;
    }
    match rule.evaluate(&value).into_iter().next() {
        Some(reason) => Err(ModelError::InvalidDefault {
            name: field.name.clone(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Check a whole model; the error carries the index of the first bad field.
pub fn check_model(model: &FormModel) -> Result<(), (usize, ModelError)> {
    let mut ids = HashSet::new();
    for (index, field) in model.fields.iter().enumerate() {
        if !ids.insert(field.id.as_str()) {
            return Err((index, ModelError::DuplicateId(field.id.clone())));
        }
        check_field(field, &model.fields[..index]).map_err(|e| (index, e))?;
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct FormStore {
    model: FormModel,
    metadata: Metadata,
}

impl Default for FormStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FormStore {
    pub fn new() -> Self {
        Self {
            model: FormModel::new(),
            metadata: Metadata::now(),
        }
    }

    pub fn model(&self) -> &FormModel {
        &self.model
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.model.fields
    }

    pub fn settings(&self) -> &FormSettings {
        &self.model.settings
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn field(&self, id: &str) -> Option<&FieldDefinition> {
        self.model.field_by_id(id)
    }

    /// Append a new field of the given type; returns its id.
    pub fn add_field(&mut self, field_type: FieldType) -> Result<String, ModelError> {
        let len = self.model.fields.len();
        self.insert_field(len, field_type)
    }

    pub fn insert_field(&mut self, index: usize, field_type: FieldType) -> Result<String, ModelError> {
        let len = self.model.fields.len();
        if index > len {
            return Err(ModelError::IndexOutOfBounds { index, len });
        }

        let name = naming::next_free_name(field_type.as_str(), |n| self.model.field(n).is_some());
        let field = FieldDefinition::new(self.fresh_id(), field_type, name);
        check_field(&field, &self.model.fields)?;

        let id = field.id.clone();
        log::info!("adding {} field '{}' at {}", field_type.as_str(), field.name, index);
        self.model.fields.insert(index, field);
        self.touch();
        Ok(id)
    }

    /// Copy a field right after the original, with a fresh id and name.
    pub fn duplicate_field(&mut self, id: &str) -> Result<String, ModelError> {
        let index = self.index_of(id)?;
        let mut copy = self.model.fields[index].clone();
        let prefix = format!("{}Copy", copy.name);
        copy.name = if self.model.field(&prefix).is_none() {
            prefix
        } else {
            naming::next_free_name(&prefix, |n| self.model.field(n).is_some())
        };
        copy.id = self.fresh_id();
        check_field(&copy, &self.model.fields)?;

        let new_id = copy.id.clone();
        self.model.fields.insert(index + 1, copy);
        self.touch();
        Ok(new_id)
    }

    pub fn remove_field(&mut self, id: &str) -> Result<FieldDefinition, ModelError> {
        let index = self.index_of(id)?;
        let removed = self.model.fields.remove(index);
        log::info!("removed field '{}'", removed.name);
        self.touch();
        Ok(removed)
    }

    /// Move the field at `from` so that it ends up at `to`.
    pub fn move_field(&mut self, from: usize, to: usize) -> Result<(), ModelError> {
        let len = self.model.fields.len();
        for index in [from, to] {
            if index >= len {
                return Err(ModelError::IndexOutOfBounds { index, len });
            }
        }
        if from != to {
            let field = self.model.fields.remove(from);
            self.model.fields.insert(to, field);
            self.touch();
        }
        Ok(())
    }

    pub fn rename_field(&mut self, id: &str, name: &str) -> Result<(), ModelError> {
        self.update_field(id, |f| f.name = name.to_string())
    }

    pub fn set_pattern(&mut self, id: &str, pattern: Option<String>) -> Result<(), ModelError> {
        self.update_field(id, |f| f.validation.pattern = pattern)
    }

    pub fn set_options(&mut self, id: &str, options: Vec<FieldOption>) -> Result<(), ModelError> {
        self.update_field(id, |f| f.options = options)
    }

    /// Apply `edit` to a copy of the field and commit it only if the result
    /// still satisfies every invariant.
    pub fn update_field<F>(&mut self, id: &str, edit: F) -> Result<(), ModelError>
    where
        F: FnOnce(&mut FieldDefinition),
    {
        let index = self.index_of(id)?;
        let current = &self.model.fields[index];
        let mut candidate = current.clone();
        edit(&mut candidate);

        if candidate.id != current.id || candidate.field_type != current.field_type {
            return Err(ModelError::ImmutableField(current.name.clone()));
        }

        let others: Vec<FieldDefinition> = self
            .model
            .fields
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, f)| f.clone())
            .collect();
        check_field(&candidate, &others)?;

        log::debug!("updated field '{}'", candidate.name);
        self.model.fields[index] = candidate;
        self.touch();
        Ok(())
    }

    pub fn update_settings(&mut self, settings: FormSettings) {
        self.model.settings = settings;
        self.touch();
    }

    pub fn clear(&mut self) {
        self.model.fields.clear();
        self.touch();
    }

    /// Replace the whole model. Nothing changes unless every field is valid.
    pub fn replace(&mut self, model: FormModel) -> Result<(), ModelError> {
        check_model(&model).map_err(|(_, e)| e)?;
        self.model = model;
        self.touch();
        Ok(())
    }

    pub fn import_json(&mut self, input: &str) -> Result<(), ImportError> {
        let (model, metadata) = document::import(input)?;
        log::info!("imported form with {} fields", model.fields.len());
        self.model = model;
        self.metadata = metadata.unwrap_or_else(Metadata::now);
        Ok(())
    }

    pub fn export_json(&self) -> serde_json::Result<String> {
        document::export(&self.model, Some(&self.metadata))
    }

    fn index_of(&self, id: &str) -> Result<usize, ModelError> {
        self.model
            .position(id)
            .ok_or_else(|| ModelError::FieldNotFound(id.to_string()))
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.model.field_by_id(&id).is_none() {
                return id;
            }
        }
    }

    fn touch(&mut self) {
        self.metadata.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DefaultValue;
    use proptest::prelude::*;

    fn store_with(types: &[FieldType]) -> (FormStore, Vec<String>) {
        let mut store = FormStore::new();
        let ids = types.iter().map(|t| store.add_field(*t).unwrap()).collect();
        (store, ids)
    }

    #[test]
    fn test_add_field_generates_unique_names() {
        let (store, ids) = store_with(&[FieldType::Text, FieldType::Text, FieldType::Select]);
        let names: Vec<&str> = store.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["text1", "text2", "select1"]);
        assert_eq!(ids.len(), 3);
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn test_rename_collision_leaves_model_unchanged() {
        let (mut store, ids) = store_with(&[FieldType::Text, FieldType::Text]);
        let before = store.model().clone();

        let err = store.rename_field(&ids[1], "text1").unwrap_err();
        assert_eq!(err, ModelError::DuplicateName("text1".to_string()));
        assert_eq!(store.model(), &before);
    }

    #[test]
    fn test_rename_rejects_malformed_and_reserved() {
        let (mut store, ids) = store_with(&[FieldType::Text]);
        assert!(matches!(store.rename_field(&ids[0], ""), Err(ModelError::EmptyName)));
        assert!(matches!(
            store.rename_field(&ids[0], "9lives"),
            Err(ModelError::InvalidName(_))
        ));
        assert!(matches!(
            store.rename_field(&ids[0], "return"),
            Err(ModelError::ReservedName(_))
        ));
        assert_eq!(store.fields()[0].name, "text1");

        store.rename_field(&ids[0], "firstName").unwrap();
        assert_eq!(store.fields()[0].name, "firstName");
    }

    #[test]
    fn test_rename_to_own_name_is_allowed() {
        let (mut store, ids) = store_with(&[FieldType::Text]);
        store.rename_field(&ids[0], "text1").unwrap();
    }

    #[test]
    fn test_invalid_pattern_keeps_previous() {
        let (mut store, ids) = store_with(&[FieldType::Text]);
        store.set_pattern(&ids[0], Some("^[a-z]+$".to_string())).unwrap();

        let err = store.set_pattern(&ids[0], Some("([a-z".to_string())).unwrap_err();
        assert!(matches!(err, ModelError::InvalidPattern { .. }));
        assert_eq!(store.fields()[0].validation.pattern.as_deref(), Some("^[a-z]+$"));
    }

    #[test]
    fn test_pattern_uses_regexp_syntax() {
        let (mut store, ids) = store_with(&[FieldType::Password]);
        store
            .set_pattern(&ids[0], Some(r"^(?=.*\d).{8,}$".to_string()))
            .unwrap();

        let err = store.set_pattern(&ids[0], Some("(?i)^abc$".to_string())).unwrap_err();
        assert!(matches!(err, ModelError::InvalidPattern { .. }));
        assert_eq!(
            store.fields()[0].validation.pattern.as_deref(),
            Some(r"^(?=.*\d).{8,}$")
        );
    }

    #[test]
    fn test_option_values_must_be_unique_and_non_empty() {
        let (mut store, ids) = store_with(&[FieldType::Select]);
        let before = store.fields()[0].options.clone();

        let dup = vec![FieldOption::new("A", "a"), FieldOption::new("B", "a")];
        assert_eq!(
            store.set_options(&ids[0], dup),
            Err(ModelError::DuplicateOptionValue("a".to_string()))
        );
        let empty = vec![FieldOption::new("A", "a"), FieldOption::new("Blank", "")];
        assert_eq!(
            store.set_options(&ids[0], empty),
            Err(ModelError::EmptyOptionValue { index: 1 })
        );
        assert_eq!(store.fields()[0].options, before);
    }

    #[test]
    fn test_explicit_default_must_pass_own_rule() {
        let (mut store, ids) = store_with(&[FieldType::Select, FieldType::Slider, FieldType::Text]);
        let before = store.model().clone();

        let err = store
            .update_field(&ids[0], |f| f.default_value = Some(DefaultValue::Text("gold".into())))
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidDefault { .. }));
        let err = store
            .update_field(&ids[1], |f| f.default_value = Some(DefaultValue::Number(500.0)))
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidDefault { .. }));
        assert_eq!(store.model(), &before);

        store
            .update_field(&ids[0], |f| f.default_value = Some(DefaultValue::Text("option2".into())))
            .unwrap();
        store
            .update_field(&ids[1], |f| f.default_value = Some(DefaultValue::Number(40.0)))
            .unwrap();
        store
            .update_field(&ids[2], |f| {
                f.validation.required = Some(true);
                f.validation.min_length = Some(3);
                f.default_value = Some(DefaultValue::Text(String::new()));
            })
            .unwrap();
    }

    #[test]
    fn test_type_is_immutable() {
        let (mut store, ids) = store_with(&[FieldType::Text]);
        let err = store
            .update_field(&ids[0], |f| f.field_type = FieldType::Textarea)
            .unwrap_err();
        assert!(matches!(err, ModelError::ImmutableField(_)));
        assert_eq!(store.fields()[0].field_type, FieldType::Text);
    }

    #[test]
    fn test_invalid_date_bound_rejected() {
        let (mut store, ids) = store_with(&[FieldType::Date]);
        let err = store
            .update_field(&ids[0], |f| f.validation.min_date = Some("next tuesday".into()))
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidDate(_)));
        assert_eq!(store.fields()[0].validation.min_date, None);
    }

    #[test]
    fn test_layout_bounds() {
        use crate::model::GridPlacement;
        let (mut store, ids) = store_with(&[FieldType::Text]);
        let bad = GridPlacement { x: 12, y: 0, w: 1, h: 1 };
        assert!(store.update_field(&ids[0], |f| f.layout = Some(bad)).is_err());
        let good = GridPlacement { x: 0, y: 0, w: 12, h: 1 };
        store.update_field(&ids[0], |f| f.layout = Some(good)).unwrap();
    }

    #[test]
    fn test_remove_and_ids_not_reused() {
        let (mut store, ids) = store_with(&[FieldType::Text]);
        store.remove_field(&ids[0]).unwrap();
        let new_id = store.add_field(FieldType::Text).unwrap();
        assert_ne!(new_id, ids[0]);
        assert!(matches!(
            store.remove_field(&ids[0]),
            Err(ModelError::FieldNotFound(_))
        ));
    }

    #[test]
    fn test_move_field() {
        let (mut store, _) = store_with(&[FieldType::Text, FieldType::Checkbox, FieldType::Date]);
        store.move_field(0, 2).unwrap();
        let names: Vec<&str> = store.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["checkbox1", "date1", "text1"]);
        assert!(matches!(
            store.move_field(0, 3),
            Err(ModelError::IndexOutOfBounds { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_duplicate_field() {
        let (mut store, ids) = store_with(&[FieldType::Select]);
        let copy_id = store.duplicate_field(&ids[0]).unwrap();
        assert_eq!(store.fields().len(), 2);
        assert_eq!(store.fields()[1].id, copy_id);
        assert_eq!(store.fields()[1].name, "select1Copy");
        assert_eq!(store.fields()[1].options, store.fields()[0].options);

        store.duplicate_field(&ids[0]).unwrap();
        assert_eq!(store.fields()[1].name, "select1Copy1");
    }

    #[test]
    fn test_replace_is_atomic() {
        let (mut store, _) = store_with(&[FieldType::Text]);
        let before = store.model().clone();

        let mut bad = FormModel::new();
        bad.fields.push(FieldDefinition::new("a", FieldType::Text, "same"));
        bad.fields.push(FieldDefinition::new("b", FieldType::Text, "same"));
        assert!(store.replace(bad).is_err());
        assert_eq!(store.model(), &before);
    }

    #[test]
    fn test_import_round_trip_and_rejection() {
        let (mut store, ids) = store_with(&[FieldType::Text, FieldType::Select, FieldType::Date]);
        store.rename_field(&ids[0], "email").unwrap();
        let json = store.export_json().unwrap();

        let mut other = FormStore::new();
        other.import_json(&json).unwrap();
        assert_eq!(other.model(), store.model());
        assert_eq!(other.metadata(), store.metadata());

        let before = other.model().clone();
        let err = other
            .import_json(r#"{"components":[{"id":"x","type":"text"}]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("Component 0 is missing 'name'"));
        assert_eq!(other.model(), &before);
    }

    proptest! {
        #[test]
        fn prop_names_stay_unique(
            ops in prop::collection::vec((0usize..10, 0usize..8, "[a-c]{1,2}"), 1..40)
        ) {
            let mut store = FormStore::new();
            for (type_index, target, name) in ops {
                if type_index < 5 || store.fields().is_empty() {
                    let ty = FieldType::ALL[type_index % FieldType::ALL.len()];
                    store.add_field(ty).unwrap();
                } else {
                    let id = store.fields()[target % store.fields().len()].id.clone();
                    let before = store.model().clone();
                    if store.rename_field(&id, &name).is_err() {
                        prop_assert_eq!(store.model(), &before);
                    }
                }

                let mut names = HashSet::new();
                for field in store.fields() {
                    prop_assert!(names.insert(field.name.clone()));
                }
            }
        }
    }
}
