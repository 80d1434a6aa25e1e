use serde::{Deserialize, Serialize};

/// How a raw cell value is interpreted before display.
///
/// Unknown names in configuration map to [`ValueType::Text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ValueType {
    Number,
    Phone,
    Currency,
    Date,
    LocalTime,
    #[default]
    Text,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Number => "number",
            ValueType::Phone => "phone",
            ValueType::Currency => "currency",
            ValueType::Date => "date",
            ValueType::LocalTime => "local_time",
            ValueType::Text => "text",
        }
    }
}

impl From<String> for ValueType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "number" => ValueType::Number,
            "phone" => ValueType::Phone,
            "currency" => ValueType::Currency,
            "date" => ValueType::Date,
            "local_time" => ValueType::LocalTime,
            _ => ValueType::Text,
        }
    }
}

impl From<ValueType> for String {
    fn from(value: ValueType) -> Self {
        value.as_str().to_string()
    }
}

/// Text-case transform applied to values of [`ValueType::Text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TextFormat {
    TitleCase,
    Uppercase,
    Lowercase,
    Capitalize,
    #[default]
    None,
}

impl TextFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            TextFormat::TitleCase => "title_case",
            TextFormat::Uppercase => "uppercase",
            TextFormat::Lowercase => "lowercase",
            TextFormat::Capitalize => "capitalize",
            TextFormat::None => "none",
        }
    }
}

impl From<String> for TextFormat {
    fn from(value: String) -> Self {
        match value.as_str() {
            "title_case" => TextFormat::TitleCase,
            "uppercase" => TextFormat::Uppercase,
            "lowercase" => TextFormat::Lowercase,
            "capitalize" => TextFormat::Capitalize,
            _ => TextFormat::None,
        }
    }
}

impl From<TextFormat> for String {
    fn from(value: TextFormat) -> Self {
        value.as_str().to_string()
    }
}

fn default_sortable() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub title: String,
    pub data_column: String,
    #[serde(default, rename = "type")]
    pub value_type: ValueType,
    #[serde(default)]
    pub format: TextFormat,
    /// Percentage of the container minimum width.
    pub width: f64,
    #[serde(default)]
    pub prefix_icon: Option<String>,
    #[serde(default)]
    pub suffix_icon: Option<String>,
    #[serde(default)]
    pub copyable: bool,
    #[serde(default = "default_sortable")]
    pub sortable: bool,
    #[serde(default)]
    pub sort_column: Option<String>,
}

impl ColumnDescriptor {
    pub fn new(title: impl Into<String>, data_column: impl Into<String>, width: f64) -> Self {
        Self {
            title: title.into(),
            data_column: data_column.into(),
            value_type: ValueType::default(),
            format: TextFormat::default(),
            width,
            prefix_icon: None,
            suffix_icon: None,
            copyable: false,
            sortable: true,
            sort_column: None,
        }
    }

    /// Field name sent with sort requests for this column.
    pub fn sort_field(&self) -> &str {
        self.sort_column.as_deref().unwrap_or(&self.data_column)
    }
}
