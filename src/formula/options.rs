//! Per-evaluation options and the sandbox error type

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default execution budget for a formula
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// How the script result is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Number,
    Boolean,
    Json,
}

/// What a failing or timed-out formula renders as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorHandling {
    /// `"Error: <message>"`
    #[default]
    ShowError,
    /// Empty string
    HideError,
    /// The configured default value
    ShowDefault,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormulaOptions {
    pub output_format: OutputFormat,
    pub error_handling: ErrorHandling,
    pub default_value: String,
    pub timeout: Duration,
}

impl Default for FormulaOptions {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::default(),
            error_handling: ErrorHandling::default(),
            default_value: String::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl FormulaOptions {
    pub fn with_output(mut self, output_format: OutputFormat) -> Self {
        self.output_format = output_format;
        self
    }

    pub fn with_error_handling(mut self, error_handling: ErrorHandling) -> Self {
        self.error_handling = error_handling;
        self
    }

    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = default_value.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Why a formula produced no value
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// The script threw, or the engine rejected it
    #[error("{0}")]
    Script(String),

    #[error("Formula timed out after {ms} ms")]
    Timeout { ms: u128 },

    /// The worker thread died without reporting
    #[error("formula worker terminated unexpectedly")]
    WorkerLost,

    /// The runtime could not be created
    #[error("could not start formula runtime: {0}")]
    Setup(String),
}

impl FormulaError {
    pub fn timeout(budget: Duration) -> Self {
        Self::Timeout {
            ms: budget.as_millis(),
        }
    }
}
