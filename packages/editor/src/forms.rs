//! Form definition editing.
//!
//! Field names must stay unique within a form. A rename that collides is
//! rejected and the field keeps its old name; the caller surfaces the
//! message to the user.

use blockpage_document::{
    FieldOption, FieldType, FieldValidation, FormFieldConfig, FormItem, FormSubmission, IdGenerator,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("A field named \"{0}\" already exists")]
    DuplicateFieldName(String),

    #[error("Field id \"{0}\" is used twice")]
    DuplicateFieldId(String),

    #[error("Form not found: {0}")]
    FormNotFound(String),

    #[error("Field not found: {0}")]
    FieldNotFound(String),

    #[error("Field index out of range: {0}")]
    InvalidIndex(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission: Option<FormSubmission>,
}

impl FormPatch {
    pub fn apply_to(&self, form: &mut FormItem) {
        if let Some(name) = &self.name {
            form.name = name.clone();
        }
        if let Some(title) = &self.title {
            form.title = Some(title.clone());
        }
        if let Some(description) = &self.description {
            form.description = Some(description.clone());
        }
        if let Some(submission) = &self.submission {
            form.submission = submission.clone();
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "type")]
    pub kind: Option<FieldType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
}

impl FieldPatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    fn apply_to(&self, field: &mut FormFieldConfig) {
        if let Some(name) = &self.name {
            field.name = name.clone();
        }
        if let Some(kind) = self.kind {
            field.kind = kind;
        }
        if let Some(label) = &self.label {
            field.label = label.clone();
        }
        if let Some(placeholder) = &self.placeholder {
            field.placeholder = placeholder.clone();
        }
        if let Some(required) = self.required {
            field.required = required;
        }
        if let Some(options) = &self.options {
            field.options = options.clone();
        }
        if let Some(validation) = &self.validation {
            field.validation = validation.clone();
        }
        if let Some(width) = self.width {
            field.width = width.clamp(1, 12);
        }
        if let Some(hidden) = self.hidden {
            field.hidden = hidden;
        }
    }
}

/// `<type>`, `<type>_2`, `<type>_3`, ... whichever is free first
fn unique_field_name(form: &FormItem, kind: FieldType) -> String {
    let base = serde_json::to_value(kind)
        .ok()
        .and_then(|value| value.as_str().map(|s| s.replace('-', "_")))
        .unwrap_or_else(|| "field".to_string());

    if !form.has_field_name(&base, None) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", base, n);
        if !form.has_field_name(&candidate, None) {
            return candidate;
        }
        n += 1;
    }
}

/// Create a field with a fresh id and a unique name at `index` (end when `None`)
pub fn add_field(
    form: &mut FormItem,
    kind: FieldType,
    index: Option<usize>,
    ids: &mut IdGenerator,
) -> Result<String, FormError> {
    let index = index.unwrap_or(form.fields.len());
    if index > form.fields.len() {
        return Err(FormError::InvalidIndex(index));
    }

    let field = FormFieldConfig::new(ids.new_id(), unique_field_name(form, kind), kind);
    let id = field.id.clone();
    form.fields.insert(index, field);
    Ok(id)
}

/// Insert an existing field definition (e.g. dropped from another form)
/// under a fresh id, renaming it if its name is taken.
pub fn insert_field(
    form: &mut FormItem,
    mut field: FormFieldConfig,
    index: usize,
    ids: &mut IdGenerator,
) -> Result<String, FormError> {
    if index > form.fields.len() {
        return Err(FormError::InvalidIndex(index));
    }
    field.id = ids.new_id();
    if form.has_field_name(&field.name, None) {
        field.name = unique_field_name(form, field.kind);
    }
    let id = field.id.clone();
    form.fields.insert(index, field);
    Ok(id)
}

pub fn update_field(form: &mut FormItem, field_id: &str, patch: &FieldPatch) -> Result<(), FormError> {
    if let Some(name) = &patch.name {
        if form.has_field_name(name, Some(field_id)) {
            return Err(FormError::DuplicateFieldName(name.clone()));
        }
    }

    let field = form
        .fields
        .iter_mut()
        .find(|f| f.id == field_id)
        .ok_or_else(|| FormError::FieldNotFound(field_id.to_string()))?;
    patch.apply_to(field);
    Ok(())
}

/// Check a whole field list: ids and names must each be unique
pub fn validate_fields(fields: &[FormFieldConfig]) -> Result<(), FormError> {
    let mut ids = HashSet::new();
    let mut names = HashSet::new();
    for field in fields {
        if !ids.insert(field.id.as_str()) {
            return Err(FormError::DuplicateFieldId(field.id.clone()));
        }
        if !names.insert(field.name.as_str()) {
            return Err(FormError::DuplicateFieldName(field.name.clone()));
        }
    }
    Ok(())
}

pub fn remove_field(form: &mut FormItem, field_id: &str) -> Result<FormFieldConfig, FormError> {
    let index = form
        .fields
        .iter()
        .position(|f| f.id == field_id)
        .ok_or_else(|| FormError::FieldNotFound(field_id.to_string()))?;
    Ok(form.fields.remove(index))
}

/// Reorder: `landing` is the post-removal index
pub fn move_field(form: &mut FormItem, from: usize, landing: usize) -> Result<(), FormError> {
    if from >= form.fields.len() {
        return Err(FormError::InvalidIndex(from));
    }
    let field = form.fields.remove(from);
    if landing > form.fields.len() {
        form.fields.insert(from, field);
        return Err(FormError::InvalidIndex(landing));
    }
    form.fields.insert(landing, field);
    Ok(())
}
