//! Sandboxed JavaScript formulas
//!
//! A formula is the body of a function with the bound data available as
//! `data`:
//!
//! ```text
//! return data.venta.total * 1.16
//! ```
//!
//! The result is rendered as `text`, `number`, `boolean` or `json`. Failures
//! and timeouts never propagate; they render per [`ErrorHandling`].

mod options;
mod output;
mod sandbox;

pub use options::{ErrorHandling, FormulaError, FormulaOptions, OutputFormat, DEFAULT_TIMEOUT};
pub use output::{coerce, render, ScriptValue};
pub use sandbox::{FormulaJob, FormulaSandbox, SandboxLimits};

/// Evaluate one formula with default sandbox limits
pub fn evaluate_formula(code: &str, data: &serde_json::Value, options: &FormulaOptions) -> String {
    FormulaSandbox::default().evaluate(code, data, options)
}
