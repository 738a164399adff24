//! Formatter catalog
//!
//! Pure value-to-string transforms addressed by short spec strings such as
//! `currency:usd`, `number:2` or `truncate:50`. Formatting never fails: an
//! unknown spec passes the stringified value through and uncoercible values
//! fall back to the family's zero rendering.

pub mod column;
pub mod date;
pub mod number;

pub use column::format_column_value;
pub use number::Currency;

use serde_json::Value;

use self::date::{format_date, DATETIME_PATTERN, DATE_PATTERN};
use self::number::{coerce_number, format_compact, format_grouped, format_percentage};

/// A parsed formatter spec
#[derive(Debug, Clone, PartialEq)]
pub enum FormatterSpec {
    Uppercase,
    Lowercase,
    Capitalize,
    /// Fixed decimals when given, compact grouping otherwise
    Number(Option<usize>),
    Currency(Currency),
    Percentage(usize),
    Date(String),
    DateTime(String),
    Truncate(usize),
    /// Anything outside the catalog
    Unknown,
}

impl FormatterSpec {
    /// Parse a `name[:param]` spec. The name is case-insensitive and the
    /// parameter is kept as written.
    pub fn parse(spec: &str) -> Self {
        let (name, param) = match spec.trim().split_once(':') {
            Some((name, param)) => (name.trim(), Some(param.trim())),
            None => (spec.trim(), None),
        };
        let name = name.to_lowercase();
        let param = param.filter(|p| !p.is_empty());
        let decimals = |p: &str| p.parse::<usize>().ok().map(|d| d.min(number::MAX_DECIMALS));

        match (name.as_str(), param) {
            ("uppercase", _) => FormatterSpec::Uppercase,
            ("lowercase", _) => FormatterSpec::Lowercase,
            ("capitalize", _) => FormatterSpec::Capitalize,
            ("number", None) => FormatterSpec::Number(None),
            ("number", Some(p)) => decimals(p)
                .map(|d| FormatterSpec::Number(Some(d)))
                .unwrap_or(FormatterSpec::Unknown),
            ("currency", None) => FormatterSpec::Currency(Currency::Mxn),
            ("currency", Some(code)) => Currency::from_code(code)
                .map(FormatterSpec::Currency)
                .unwrap_or(FormatterSpec::Unknown),
            ("percentage", None) => FormatterSpec::Percentage(0),
            ("percentage", Some(p)) => decimals(p)
                .map(FormatterSpec::Percentage)
                .unwrap_or(FormatterSpec::Unknown),
            ("date", p) => FormatterSpec::Date(p.unwrap_or(DATE_PATTERN).to_string()),
            ("datetime", p) => FormatterSpec::DateTime(p.unwrap_or(DATETIME_PATTERN).to_string()),
            ("truncate", Some(p)) => p
                .parse::<usize>()
                .map(FormatterSpec::Truncate)
                .unwrap_or(FormatterSpec::Unknown),
            _ => FormatterSpec::Unknown,
        }
    }

    /// Apply this formatter to a raw value
    pub fn apply(&self, value: &Value) -> String {
        match self {
            FormatterSpec::Uppercase => stringify(value).to_uppercase(),
            FormatterSpec::Lowercase => stringify(value).to_lowercase(),
            FormatterSpec::Capitalize => capitalize(&stringify(value)),
            FormatterSpec::Number(decimals) => {
                let n = coerce_number(value);
                match decimals {
                    Some(d) => format_grouped(n.unwrap_or(0.0), *d, true),
                    None => n.map(format_compact).unwrap_or_else(|| "0".to_string()),
                }
            }
            FormatterSpec::Currency(currency) => currency.format(coerce_number(value), 2, true),
            FormatterSpec::Percentage(decimals) => {
                format_percentage(coerce_number(value), *decimals)
            }
            FormatterSpec::Date(pattern) | FormatterSpec::DateTime(pattern) => {
                format_date(value, pattern).unwrap_or_default()
            }
            FormatterSpec::Truncate(max) => truncate(&stringify(value), *max, "..."),
            FormatterSpec::Unknown => stringify(value),
        }
    }
}

/// Format `value` with a formatter spec string
pub fn format_value(value: &Value, spec: &str) -> String {
    let parsed = FormatterSpec::parse(spec);
    if parsed == FormatterSpec::Unknown {
        tracing::debug!(spec, "unknown formatter, passing value through");
    }
    parsed.apply(value)
}

/// Display string of a JSON value; `null` renders empty
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n
            .as_f64()
            .map(number::js_number_string)
            .unwrap_or_else(|| n.to_string()),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Upper-case the first character, lower-case the rest
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => String::new(),
    }
}

/// Keep the first `max` characters, appending `suffix` when anything was cut
pub fn truncate(s: &str, max: usize, suffix: &str) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(max).collect();
    cut.push_str(suffix);
    cut
}
