//! Table column formatting

use serde_json::Value;

use crate::model::{ColumnFormat, FormatOptions, TableColumn, TextTransform};

use super::date::{format_date, DATETIME_PATTERN, DATE_PATTERN};
use super::number::{coerce_number, format_grouped, format_percentage, prefixed_amount, Currency};
use super::{capitalize, stringify, truncate};

/// Length used by `transform` when the column sets no `maxLength`
pub const DEFAULT_MAX_LENGTH: usize = 20;

/// Format a table cell value according to its column definition.
///
/// Missing or `null` values render the column's `defaultValue` (or nothing).
/// Values a numeric or date format cannot interpret render the default when
/// one is configured and the plain string otherwise.
pub fn format_column_value(value: Option<&Value>, column: &TableColumn) -> String {
    let options = &column.format_options;
    let value = match value {
        Some(v) if !v.is_null() => v,
        _ => return options.default_value.clone().unwrap_or_default(),
    };

    match format_present(value, column.format, options) {
        Some(text) => apply_transform(text, options),
        None => options
            .default_value
            .clone()
            .unwrap_or_else(|| stringify(value)),
    }
}

fn format_present(value: &Value, format: ColumnFormat, options: &FormatOptions) -> Option<String> {
    let grouping = options.thousands_separator.unwrap_or(true);
    match format {
        ColumnFormat::Text => Some(stringify(value)),
        ColumnFormat::Uppercase => Some(stringify(value).to_uppercase()),
        ColumnFormat::Lowercase => Some(stringify(value).to_lowercase()),
        ColumnFormat::Capitalize => Some(capitalize(&stringify(value))),
        ColumnFormat::Number => {
            let n = coerce_number(value)?;
            Some(format_grouped(n, options.decimals.unwrap_or(2), grouping))
        }
        ColumnFormat::Currency => {
            let n = coerce_number(value)?;
            let decimals = options.decimals.unwrap_or(2);
            let code = options.currency.as_deref().unwrap_or("MXN");
            Some(match Currency::from_code(code) {
                Some(currency) => currency.format(Some(n), decimals, grouping),
                None => {
                    let prefix = format!("{} ", code.trim().to_uppercase());
                    prefixed_amount(&prefix, Some(n), decimals, grouping)
                }
            })
        }
        ColumnFormat::Percentage => {
            let n = coerce_number(value)?;
            Some(format_percentage(Some(n), options.decimals.unwrap_or(0)))
        }
        ColumnFormat::Date => {
            format_date(value, options.date_format.as_deref().unwrap_or(DATE_PATTERN))
        }
        ColumnFormat::Datetime => format_date(
            value,
            options.date_format.as_deref().unwrap_or(DATETIME_PATTERN),
        ),
        ColumnFormat::Custom => {
            let raw = stringify(value);
            Some(match &options.custom_template {
                Some(template) => template
                    .replace("{value}", &raw)
                    .replace("{length}", &raw.chars().count().to_string()),
                None => raw,
            })
        }
    }
}

fn apply_transform(text: String, options: &FormatOptions) -> String {
    let max = options.max_length.unwrap_or(DEFAULT_MAX_LENGTH);
    match options.transform {
        Some(TextTransform::Truncate) => truncate(&text, max, ""),
        Some(TextTransform::Ellipsis) => truncate(&text, max, "..."),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn column(format: ColumnFormat, options: FormatOptions) -> TableColumn {
        TableColumn::new("Col", "value")
            .with_format(format)
            .with_options(options)
    }

    #[test]
    fn test_number_defaults() {
        let col = column(ColumnFormat::Number, FormatOptions::default());
        assert_eq!(format_column_value(Some(&json!(1234.5)), &col), "1,234.50");
    }

    #[test]
    fn test_number_without_grouping() {
        let col = column(
            ColumnFormat::Number,
            FormatOptions {
                decimals: Some(1),
                thousands_separator: Some(false),
                ..FormatOptions::default()
            },
        );
        assert_eq!(format_column_value(Some(&json!("1234.56")), &col), "1234.6");
    }

    #[test]
    fn test_currency_codes() {
        let usd = column(
            ColumnFormat::Currency,
            FormatOptions {
                currency: Some("USD".into()),
                ..FormatOptions::default()
            },
        );
        assert_eq!(format_column_value(Some(&json!(99)), &usd), "$99.00");

        let gbp = column(
            ColumnFormat::Currency,
            FormatOptions {
                currency: Some("gbp".into()),
                ..FormatOptions::default()
            },
        );
        assert_eq!(format_column_value(Some(&json!(1500)), &gbp), "GBP 1,500.00");
    }

    #[test]
    fn test_default_value_for_missing_and_unparseable() {
        let col = column(
            ColumnFormat::Number,
            FormatOptions {
                default_value: Some("-".into()),
                ..FormatOptions::default()
            },
        );
        assert_eq!(format_column_value(None, &col), "-");
        assert_eq!(format_column_value(Some(&json!(null)), &col), "-");
        assert_eq!(format_column_value(Some(&json!("n/a")), &col), "-");
    }

    #[test]
    fn test_unparseable_without_default_keeps_string() {
        let col = column(ColumnFormat::Date, FormatOptions::default());
        assert_eq!(format_column_value(Some(&json!("soon")), &col), "soon");
        assert_eq!(format_column_value(None, &col), "");
    }

    #[test]
    fn test_date_format_option() {
        let col = column(
            ColumnFormat::Date,
            FormatOptions {
                date_format: Some("YYYY/MM/DD".into()),
                ..FormatOptions::default()
            },
        );
        assert_eq!(
            format_column_value(Some(&json!("2024-12-01T08:00:00Z")), &col),
            "2024/12/01"
        );
    }

    #[test]
    fn test_custom_template() {
        let col = column(
            ColumnFormat::Custom,
            FormatOptions {
                custom_template: Some("SKU-{value} ({length})".into()),
                ..FormatOptions::default()
            },
        );
        assert_eq!(format_column_value(Some(&json!("A12")), &col), "SKU-A12 (3)");
    }

    #[test]
    fn test_transforms() {
        let truncate = column(
            ColumnFormat::Uppercase,
            FormatOptions {
                transform: Some(TextTransform::Truncate),
                max_length: Some(4),
                ..FormatOptions::default()
            },
        );
        assert_eq!(format_column_value(Some(&json!("coffee")), &truncate), "COFF");

        let ellipsis = column(
            ColumnFormat::Text,
            FormatOptions {
                transform: Some(TextTransform::Ellipsis),
                max_length: Some(4),
                ..FormatOptions::default()
            },
        );
        assert_eq!(format_column_value(Some(&json!("coffee")), &ellipsis), "coff...");
        assert_eq!(format_column_value(Some(&json!("tea")), &ellipsis), "tea");
    }
}
