//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.prompt.template.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "prompt.template must not be empty".into(),
            ));
        }
        if self.prompt.max_output_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "prompt.max_output_tokens must be > 0".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.prompt.temperature) {
            return Err(ConfigError::ValidationError(
                "prompt.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.request_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.request_timeout_ms must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_template() {
        let mut config = Config::default();
        config.prompt.template = "   \n".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("prompt.template"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.request_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("request_timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_zero_file_size() {
        let mut config = Config::default();
        config.limits.max_file_size_mb = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_file_size_mb"));
    }

    #[test]
    fn test_validate_rejects_invalid_temperature() {
        let mut config = Config::default();
        config.prompt.temperature = 2.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("temperature"));

        config.prompt.temperature = -0.1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }
}
