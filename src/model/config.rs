//! Type-specific element configuration payloads

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::formula::{ErrorHandling, FormulaOptions, OutputFormat};

/// Horizontal alignment of a table cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Column-level value format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnFormat {
    #[default]
    Text,
    Number,
    Currency,
    Percentage,
    Date,
    Datetime,
    Uppercase,
    Lowercase,
    Capitalize,
    Custom,
}

/// Length-limiting transform applied after formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTransform {
    /// Cut to `max_length` characters
    Truncate,
    /// Cut to `max_length` characters and append "..."
    Ellipsis,
}

/// Options refining a [`ColumnFormat`]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormatOptions {
    pub decimals: Option<usize>,
    pub thousands_separator: Option<bool>,
    pub currency: Option<String>,
    pub date_format: Option<String>,
    #[serde(alias = "template")]
    pub custom_template: Option<String>,
    pub default_value: Option<String>,
    pub transform: Option<TextTransform>,
    pub max_length: Option<usize>,
}

/// One column of a table element
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableColumn {
    pub header: String,
    /// Dotted path into each row object
    pub property: String,
    pub text_align: TextAlign,
    pub bold: bool,
    pub italic: bool,
    pub format: ColumnFormat,
    pub format_options: FormatOptions,
}

impl TableColumn {
    pub fn new(header: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            property: property.into(),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: ColumnFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_options(mut self, options: FormatOptions) -> Self {
        self.format_options = options;
        self
    }
}

fn default_true() -> bool {
    true
}

/// Configuration of a table element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    /// Data path of the row array, optionally wrapped in `{{ }}`
    #[serde(default)]
    pub data_source: String,
    #[serde(default)]
    pub columns: Vec<TableColumn>,
    #[serde(default = "default_true")]
    pub show_header: bool,
}

/// Configuration of a formula element
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormulaConfig {
    pub code: String,
    pub output_format: OutputFormat,
    pub error_handling: ErrorHandling,
    pub default_value: String,
    /// Execution budget in milliseconds
    pub timeout: Option<u64>,
}

impl FormulaConfig {
    /// Build sandbox options, using `fallback` when no timeout is configured
    pub fn options(&self, fallback: Duration) -> FormulaOptions {
        FormulaOptions {
            output_format: self.output_format,
            error_handling: self.error_handling,
            default_value: self.default_value.clone(),
            timeout: self.timeout.map(Duration::from_millis).unwrap_or(fallback),
        }
    }
}

/// How an image fills its element box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectFit {
    #[default]
    Contain,
    Cover,
    Fill,
    None,
    ScaleDown,
}

/// Configuration of an image element
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageConfig {
    /// URL or data URI
    pub src: Option<String>,
    pub object_fit: ObjectFit,
}
