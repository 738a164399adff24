//! Engine configuration
//!
//! Loaded from TOML. Every key is optional; missing sections fall back to the
//! embedded defaults below.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::formula::{FormulaSandbox, SandboxLimits};

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Default configuration document
pub const DEFAULT_CONFIG: &str = r#"
[formula]
# Budget for formulas that do not set their own timeout
timeout_ms = 1000
# Per-runtime heap limit in bytes
memory_limit = 33554432
# Per-runtime stack limit in bytes
max_stack_size = 524288

[layout]
# Fail binding on layout errors instead of keeping authored positions
strict = false
"#;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FormulaSettings {
    pub timeout_ms: u64,
    pub memory_limit: usize,
    pub max_stack_size: usize,
}

impl Default for FormulaSettings {
    fn default() -> Self {
        let limits = SandboxLimits::default();
        Self {
            timeout_ms: 1000,
            memory_limit: limits.memory_limit,
            max_stack_size: limits.max_stack_size,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub strict: bool,
}

/// Configuration for a binding pass
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub formula: FormulaSettings,
    pub layout: LayoutSettings,
}

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// The embedded default configuration
    pub fn builtin() -> Self {
        Self::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.formula.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_memory_limit(mut self, bytes: usize) -> Self {
        self.formula.memory_limit = bytes;
        self
    }

    pub fn with_strict_layout(mut self, strict: bool) -> Self {
        self.layout.strict = strict;
        self
    }

    /// Budget for formulas without their own timeout
    pub fn formula_timeout(&self) -> Duration {
        Duration::from_millis(self.formula.timeout_ms)
    }

    /// A sandbox using the configured limits
    pub fn sandbox(&self) -> FormulaSandbox {
        FormulaSandbox::new(SandboxLimits {
            memory_limit: self.formula.memory_limit,
            max_stack_size: self.formula.max_stack_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_matches_default() {
        assert_eq!(EngineConfig::builtin(), EngineConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config = EngineConfig::from_str("[layout]\nstrict = true\n").unwrap();
        assert!(config.layout.strict);
        assert_eq!(config.formula_timeout(), Duration::from_millis(1000));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[formula]\ntimeout_ms = 250\nmemory_limit = 1048576").unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.formula_timeout(), Duration::from_millis(250));
        assert_eq!(config.sandbox().limits().memory_limit, 1_048_576);
    }

    #[test]
    fn test_parse_error() {
        let err = EngineConfig::from_str("[formula]\ntimeout_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_builders() {
        let config = EngineConfig::default()
            .with_timeout(Duration::from_millis(50))
            .with_memory_limit(4096)
            .with_strict_layout(true);
        assert_eq!(config.formula.timeout_ms, 50);
        assert_eq!(config.formula.memory_limit, 4096);
        assert!(config.layout.strict);
    }
}
