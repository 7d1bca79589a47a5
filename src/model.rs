use serde::{Deserialize, Serialize};

/// Closed set of field types offered by the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Password,
    Textarea,
    Select,
    Checkbox,
    Radio,
    Switch,
    Slider,
    Date,
    File,
}

impl FieldType {
    pub const ALL: [FieldType; 10] = [
        Self::Text,
        Self::Password,
        Self::Textarea,
        Self::Select,
        Self::Checkbox,
        Self::Radio,
        Self::Switch,
        Self::Slider,
        Self::Date,
        Self::File,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "text" => Some(Self::Text),
            "password" => Some(Self::Password),
            "textarea" => Some(Self::Textarea),
            "select" => Some(Self::Select),
            "checkbox" => Some(Self::Checkbox),
            "radio" => Some(Self::Radio),
            "switch" => Some(Self::Switch),
            "slider" => Some(Self::Slider),
            "date" => Some(Self::Date),
            "file" => Some(Self::File),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Password => "password",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Switch => "switch",
            Self::Slider => "slider",
            Self::Date => "date",
            Self::File => "file",
        }
    }

    /// Label shown in the palette and used for freshly created fields.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Text => "Text Input",
            Self::Password => "Password",
            Self::Textarea => "Textarea",
            Self::Select => "Select",
            Self::Checkbox => "Checkbox",
            Self::Radio => "Radio Group",
            Self::Switch => "Switch",
            Self::Slider => "Slider",
            Self::Date => "Date Picker",
            Self::File => "File Upload",
        }
    }

    /// Values are strings (text inputs and option pickers).
    pub fn is_string_like(self) -> bool {
        matches!(
            self,
            Self::Text | Self::Password | Self::Textarea | Self::Select | Self::Radio
        )
    }

    /// Control and label render as one unit, without a required marker.
    pub fn has_inline_label(self) -> bool {
        matches!(self, Self::Checkbox | Self::Switch | Self::Radio)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

impl FieldOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Explicit default as stored in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_message: Option<String>,
}

impl ValidationRules {
    pub fn is_required(&self) -> bool {
        self.required == Some(true)
    }
}

/// Placement on the 12-column preview grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPlacement {
    /// Column start, 0..=11
    pub x: u8,
    pub y: u32,
    /// Width in columns, 1..=12
    pub w: u8,
    pub h: u32,
}

pub const GRID_COLUMNS: u8 = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DefaultValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,
    #[serde(default)]
    pub validation: ValidationRules,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<GridPlacement>,
}

impl FieldDefinition {
    /// A field with the palette defaults for its type.
    pub fn new(id: impl Into<String>, field_type: FieldType, name: impl Into<String>) -> Self {
        let mut field = Self {
            id: id.into(),
            field_type,
            name: name.into(),
            label: field_type.display_name().to_string(),
            placeholder: None,
            description: None,
            default_value: None,
            options: Vec::new(),
            min: None,
            max: None,
            step: None,
            accept: None,
            max_size: None,
            validation: ValidationRules::default(),
            layout: None,
        };

        match field_type {
            FieldType::Select | FieldType::Radio => {
                field.options = vec![
                    FieldOption::new("Option 1", "option1"),
                    FieldOption::new("Option 2", "option2"),
                ];
            }
            FieldType::Slider => {
                field.min = Some(0.0);
                field.max = Some(100.0);
                field.step = Some(1.0);
            }
            _ => {}
        }

        field
    }

    pub fn is_required(&self) -> bool {
        self.validation.is_required()
    }

    /// Accept filter, or `None` when absent, blank or the `*` wildcard.
    pub fn accept_filter(&self) -> Option<&str> {
        self.accept
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty() && *a != "*")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormLayout {
    #[default]
    SingleColumn,
    TwoColumn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormWidth {
    Sm,
    Md,
    #[default]
    Lg,
    Xl,
    Full,
}

impl FormWidth {
    pub fn class(self) -> &'static str {
        match self {
            Self::Sm => "max-w-sm",
            Self::Md => "max-w-md",
            Self::Lg => "max-w-2xl",
            Self::Xl => "max-w-4xl",
            Self::Full => "w-full",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Spacing {
    Compact,
    #[default]
    Normal,
    Relaxed,
}

impl Spacing {
    pub fn class(self) -> &'static str {
        match self {
            Self::Compact => "space-y-4",
            Self::Normal => "space-y-6",
            Self::Relaxed => "space-y-8",
        }
    }

    pub fn gap_class(self) -> &'static str {
        match self {
            Self::Compact => "gap-4",
            Self::Normal => "gap-6",
            Self::Relaxed => "gap-8",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormSettings {
    pub show_submit_button: bool,
    pub submit_button_text: String,
    pub show_cancel_button: bool,
    pub cancel_button_text: String,
    pub layout: FormLayout,
    pub form_width: FormWidth,
    pub spacing: Spacing,
    pub reset_on_submit: bool,
    pub show_success_message: bool,
    pub success_message: String,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            show_submit_button: true,
            submit_button_text: "Submit".to_string(),
            show_cancel_button: false,
            cancel_button_text: "Cancel".to_string(),
            layout: FormLayout::SingleColumn,
            form_width: FormWidth::Lg,
            spacing: Spacing::Normal,
            reset_on_submit: false,
            show_success_message: true,
            success_message: "Form submitted successfully!".to_string(),
        }
    }
}

impl FormSettings {
    pub fn submit_label(&self) -> &str {
        non_blank(&self.submit_button_text).unwrap_or("Submit")
    }

    pub fn cancel_label(&self) -> &str {
        non_blank(&self.cancel_button_text).unwrap_or("Cancel")
    }

    pub fn success_text(&self) -> &str {
        non_blank(&self.success_message).unwrap_or("Form submitted successfully!")
    }
}

fn non_blank(s: &str) -> Option<&str> {
    if s.trim().is_empty() { None } else { Some(s) }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormModel {
    pub fields: Vec<FieldDefinition>,
    pub settings: FormSettings,
}

impl FormModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_by_id(&self, id: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.id == id)
    }
}
