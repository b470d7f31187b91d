//! Config loading, validation, and utility operations.

use super::model::BridgeConfig;
use super::types::DANGEROUS_TOOLS;
use crate::error::{CoworkError, Result};
use std::path::Path;
use std::time::Duration;

impl BridgeConfig {
    /// Load config from a YAML file.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    /// Returns `Err` if the file exists but cannot be read, parsed or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            CoworkError::ConfigError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content).map(Some)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: BridgeConfig = serde_yaml::from_str(yaml)
            .map_err(|e| CoworkError::ConfigError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            CoworkError::ConfigError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values.
    ///
    /// Validation rules:
    /// - `program` must split into at least one word
    /// - `timeout_seconds` must be positive
    /// - `allowed_tools` and `restricted_tools` must be non-empty, without blank names
    /// - `default_bias` must lie in `[0, 1]`
    pub fn validate(&self) -> Result<()> {
        self.command_prefix()?;

        if self.timeout_seconds == 0 {
            return Err(CoworkError::ConfigError(
                "timeout_seconds must be greater than 0".to_string(),
            ));
        }

        for (field, tools) in [
            ("allowed_tools", &self.allowed_tools),
            ("restricted_tools", &self.restricted_tools),
        ] {
            if tools.is_empty() {
                return Err(CoworkError::ConfigError(format!(
                    "{} must list at least one tool",
                    field
                )));
            }
            if tools.iter().any(|t| t.trim().is_empty()) {
                return Err(CoworkError::ConfigError(format!(
                    "{} entries must be non-empty",
                    field
                )));
            }
        }

        if let Some(tool) = self
            .restricted_tools
            .iter()
            .find(|t| DANGEROUS_TOOLS.contains(&t.trim()))
        {
            return Err(CoworkError::ConfigError(format!(
                "restricted_tools must not include '{}'\n\
                 Fix: restricted calls are read-only; remove {} from restricted_tools.",
                tool,
                DANGEROUS_TOOLS.join(", ")
            )));
        }

        if !(0.0..=1.0).contains(&self.default_bias) {
            return Err(CoworkError::ConfigError(format!(
                "default_bias must be between 0 and 1 (found {})",
                self.default_bias
            )));
        }

        Ok(())
    }

    /// The agent program and any leading arguments, split with shell-words rules.
    pub fn command_prefix(&self) -> Result<Vec<String>> {
        let words = shell_words::split(&self.program).map_err(|e| {
            CoworkError::ConfigError(format!(
                "failed to parse program '{}': {}\n\
                 Fix: check for unmatched quotes or invalid escape sequences.",
                self.program, e
            ))
        })?;

        if words.is_empty() {
            return Err(CoworkError::ConfigError(
                "program must not be empty".to_string(),
            ));
        }

        Ok(words)
    }

    /// Configured timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
