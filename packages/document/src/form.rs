//! Form definitions edited alongside the page tree.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    Text,
    TextArea,
    Number,
    Email,
    Phone,
    Password,
    Date,
    TextEditor,
    Select,
    #[serde(rename = "search-select")]
    SearchSelect,
    Checkbox,
    Radio,
    #[serde(rename = "multi-text")]
    MultiText,
    #[serde(rename = "upload-area")]
    UploadArea,
    Component,
}

impl FieldType {
    /// Choice types carry an `options` list
    pub fn has_options(self) -> bool {
        matches!(
            self,
            FieldType::Select | FieldType::SearchSelect | FieldType::Radio | FieldType::Checkbox
        )
    }

    /// Label used when the field is first added
    pub fn default_label(self) -> &'static str {
        match self {
            FieldType::Text => "Text",
            FieldType::TextArea => "Message",
            FieldType::Number => "Number",
            FieldType::Email => "Email",
            FieldType::Phone => "Phone",
            FieldType::Password => "Password",
            FieldType::Date => "Date",
            FieldType::TextEditor => "Content",
            FieldType::Select | FieldType::SearchSelect => "Choose one",
            FieldType::Checkbox => "Options",
            FieldType::Radio => "Choice",
            FieldType::MultiText => "Entries",
            FieldType::UploadArea => "Attachment",
            FieldType::Component => "Custom",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One input definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFieldConfig {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(default)]
    pub validation: FieldValidation,
    /// Grid columns (out of 12) the field spans
    #[serde(default = "default_width")]
    pub width: u8,
    #[serde(default)]
    pub hidden: bool,
}

fn default_width() -> u8 {
    12
}

impl FormFieldConfig {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: FieldType) -> Self {
        let options = if kind.has_options() {
            vec![
                FieldOption {
                    label: "Option 1".to_string(),
                    value: "option-1".to_string(),
                },
                FieldOption {
                    label: "Option 2".to_string(),
                    value: "option-2".to_string(),
                },
            ]
        } else {
            Vec::new()
        };

        Self {
            id: id.into(),
            name: name.into(),
            kind,
            label: kind.default_label().to_string(),
            placeholder: String::new(),
            required: false,
            options,
            validation: FieldValidation::default(),
            width: default_width(),
            hidden: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
    Put,
    Patch,
    Delete,
}

/// What happens after a successful submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum SuccessAction {
    Message(String),
    Redirect(String),
}

impl Default for SuccessAction {
    fn default() -> Self {
        SuccessAction::Message("Thank you! Your submission has been received.".to_string())
    }
}

/// Submission behavior shared by form items and form blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmission {
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub success_action: SuccessAction,
    #[serde(default = "default_error_message")]
    pub error_message: String,
}

fn default_error_message() -> String {
    "Something went wrong. Please try again.".to_string()
}

impl Default for FormSubmission {
    fn default() -> Self {
        Self {
            method: HttpMethod::default(),
            endpoint: String::new(),
            success_action: SuccessAction::default(),
            error_message: default_error_message(),
        }
    }
}

/// A named, standalone form definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormItem {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FormFieldConfig>,
    #[serde(default)]
    pub submission: FormSubmission,
}

impl FormItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            title: None,
            description: None,
            fields: Vec::new(),
            submission: FormSubmission::default(),
        }
    }

    pub fn field(&self, field_id: &str) -> Option<&FormFieldConfig> {
        self.fields.iter().find(|f| f.id == field_id)
    }

    /// True when another field (not `except_id`) already uses `name`
    pub fn has_field_name(&self, name: &str, except_id: Option<&str>) -> bool {
        self.fields
            .iter()
            .any(|f| f.name == name && Some(f.id.as_str()) != except_id)
    }
}
