//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    ///
    /// Project and region are deliberately not checked here: a bad value
    /// there is a model client initialization failure, handled at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be > 0".into(),
            ));
        }
        if self.server.max_upload_mb == 0 {
            return Err(ConfigError::ValidationError(
                "server.max_upload_mb must be > 0".into(),
            ));
        }
        if self.vertex.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "vertex.model must not be empty".into(),
            ));
        }
        if self.vertex.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "vertex.timeout_secs must be > 0".into(),
            ));
        }
        if let Some(temperature) = self.vertex.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::ValidationError(
                    "vertex.temperature must be between 0.0 and 2.0".into(),
                ));
            }
        }
        if self.vertex.max_output_tokens == Some(0) {
            return Err(ConfigError::ValidationError(
                "vertex.max_output_tokens must be > 0".into(),
            ));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::ValidationError(format!(
                "logging.format must be \"pretty\" or \"json\", got \"{}\"",
                self.logging.format
            )));
        }
        Ok(())
    }
}
