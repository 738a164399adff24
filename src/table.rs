//! Table elements: rows from a data array, cells through the column formatter

use serde::Serialize;
use serde_json::Value;

use crate::expression::ast::DataPath;
use crate::expression::resolve_expression;
use crate::format::format_column_value;
use crate::model::{TableColumn, TableConfig, TextAlign};

/// One rendered cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedCell {
    pub text: String,
    pub text_align: TextAlign,
    pub bold: bool,
    pub italic: bool,
}

impl ResolvedCell {
    fn new(text: String, column: &TableColumn) -> Self {
        Self {
            text,
            text_align: column.text_align,
            bold: column.bold,
            italic: column.italic,
        }
    }
}

/// A table with every cell formatted
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedTable {
    /// Empty when the header row is hidden
    pub headers: Vec<ResolvedCell>,
    pub rows: Vec<Vec<ResolvedCell>>,
}

/// Strip an optional `{{ }}` wrapper from a data source path
fn source_path(data_source: &str) -> &str {
    let trimmed = data_source.trim();
    trimmed
        .strip_prefix("{{")
        .and_then(|s| s.strip_suffix("}}"))
        .unwrap_or(trimmed)
        .trim()
}

/// Resolve a table against the bound data.
///
/// A data source that is missing or not an array yields no rows. Headers may
/// themselves contain placeholders.
pub fn resolve_table(config: &TableConfig, data: &Value) -> ResolvedTable {
    let headers = if config.show_header {
        config
            .columns
            .iter()
            .map(|column| ResolvedCell::new(resolve_expression(&column.header, data), column))
            .collect()
    } else {
        Vec::new()
    };

    let path = source_path(&config.data_source);
    let rows = match DataPath::parse(path).resolve(data) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|row| resolve_row(&config.columns, row))
            .collect(),
        Some(other) => {
            tracing::debug!(source = path, "table data source is not an array: {other}");
            Vec::new()
        }
        None => {
            tracing::debug!(source = path, "table data source not found");
            Vec::new()
        }
    };

    ResolvedTable { headers, rows }
}

fn resolve_row(columns: &[TableColumn], row: &Value) -> Vec<ResolvedCell> {
    columns
        .iter()
        .map(|column| {
            let value = DataPath::parse(&column.property).resolve(row);
            ResolvedCell::new(format_column_value(value, column), column)
        })
        .collect()
}
