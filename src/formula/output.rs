//! Rendering a script result as element text

use crate::format::number::js_number_string;

use super::options::{ErrorHandling, FormulaError, FormulaOptions, OutputFormat};

/// A script result, detached from the runtime that produced it
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// Arrays and objects, as they serialize through `JSON.stringify`
    Structured(serde_json::Value),
}

impl ScriptValue {
    fn is_nullish(&self) -> bool {
        matches!(self, ScriptValue::Undefined | ScriptValue::Null)
    }

    /// String conversion the way JavaScript's `String(x)` reads for scalars
    fn to_text(&self) -> String {
        match self {
            ScriptValue::Undefined => "undefined".to_string(),
            ScriptValue::Null => "null".to_string(),
            ScriptValue::Bool(b) => b.to_string(),
            ScriptValue::Number(n) => js_number_string(*n),
            ScriptValue::String(s) => s.clone(),
            ScriptValue::Structured(v) => v.to_string(),
        }
    }

    fn to_json(&self) -> String {
        match self {
            ScriptValue::Undefined => String::new(),
            ScriptValue::Null => "null".to_string(),
            ScriptValue::Bool(b) => b.to_string(),
            // JSON.stringify writes non-finite numbers as null
            ScriptValue::Number(n) if !n.is_finite() => "null".to_string(),
            ScriptValue::Number(n) => js_number_string(*n),
            ScriptValue::String(s) => serde_json::Value::String(s.clone()).to_string(),
            ScriptValue::Structured(v) => v.to_string(),
        }
    }
}

fn or_fallback(default_value: &str, fallback: &str) -> String {
    if default_value.is_empty() {
        fallback.to_string()
    } else {
        default_value.to_string()
    }
}

/// Coerce a successful result according to the output format
pub fn coerce(value: &ScriptValue, options: &FormulaOptions) -> String {
    let default_value = &options.default_value;
    match options.output_format {
        OutputFormat::Number => match value {
            ScriptValue::Number(n) => js_number_string(*n),
            _ => or_fallback(default_value, "0"),
        },
        OutputFormat::Boolean => match value {
            ScriptValue::Bool(b) => b.to_string(),
            _ => or_fallback(default_value, "false"),
        },
        OutputFormat::Json => match value {
            ScriptValue::Undefined => default_value.clone(),
            other => other.to_json(),
        },
        OutputFormat::Text => {
            if value.is_nullish() {
                default_value.clone()
            } else {
                value.to_text()
            }
        }
    }
}

/// Map an evaluation outcome to the text shown in the element
pub fn render(outcome: Result<ScriptValue, FormulaError>, options: &FormulaOptions) -> String {
    match outcome {
        Ok(value) => coerce(&value, options),
        Err(err) => {
            tracing::warn!("formula failed: {err}");
            match options.error_handling {
                ErrorHandling::ShowError => format!("Error: {err}"),
                ErrorHandling::HideError => String::new(),
                ErrorHandling::ShowDefault => options.default_value.clone(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn opts(format: OutputFormat) -> FormulaOptions {
        FormulaOptions::default().with_output(format)
    }

    #[test]
    fn test_number_output() {
        let o = opts(OutputFormat::Number);
        assert_eq!(coerce(&ScriptValue::Number(10.0), &o), "10");
        assert_eq!(coerce(&ScriptValue::Number(2.5), &o), "2.5");
        assert_eq!(coerce(&ScriptValue::String("x".into()), &o), "0");
        assert_eq!(
            coerce(&ScriptValue::Null, &o.clone().with_default("-")),
            "-"
        );
    }

    #[test]
    fn test_boolean_output() {
        let o = opts(OutputFormat::Boolean);
        assert_eq!(coerce(&ScriptValue::Bool(true), &o), "true");
        assert_eq!(coerce(&ScriptValue::Number(1.0), &o), "false");
    }

    #[test]
    fn test_json_output() {
        let o = opts(OutputFormat::Json);
        let value = ScriptValue::Structured(json!({"a": [1, 2]}));
        assert_eq!(coerce(&value, &o), r#"{"a":[1,2]}"#);
        assert_eq!(coerce(&ScriptValue::String("hi".into()), &o), "\"hi\"");
        assert_eq!(coerce(&ScriptValue::Undefined, &o), "");
    }

    #[test]
    fn test_text_output() {
        let o = opts(OutputFormat::Text).with_default("n/a");
        assert_eq!(coerce(&ScriptValue::Undefined, &o), "n/a");
        assert_eq!(coerce(&ScriptValue::Null, &o), "n/a");
        assert_eq!(coerce(&ScriptValue::Number(f64::NAN), &o), "NaN");
        assert_eq!(coerce(&ScriptValue::Bool(false), &o), "false");
    }

    #[test]
    fn test_error_handling() {
        let err = || Err(FormulaError::Script("boom".into()));
        let base = FormulaOptions::default().with_default("N/A");

        assert_eq!(render(err(), &base), "Error: boom");
        assert_eq!(
            render(err(), &base.clone().with_error_handling(ErrorHandling::HideError)),
            ""
        );
        assert_eq!(
            render(err(), &base.with_error_handling(ErrorHandling::ShowDefault)),
            "N/A"
        );
    }
}
