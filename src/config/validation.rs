//! Configuration validation.

use crate::config::{Config, ConfigError};
use std::collections::HashSet;

/// Rejects a fallback provider that is the same as the default. The
/// failover path would retry the provider that just failed.
fn validate_fallback_distinct(config: &Config) -> Result<(), ConfigError> {
    if let Some(fallback) = &config.ai.fallback_provider {
        if fallback == &config.ai.default_provider {
            return Err(ConfigError::ValidationError(format!(
                "fallback_provider '{fallback}' is the same as default_provider"
            )));
        }
    }
    Ok(())
}

/// A fallback model without a fallback provider would never be used.
fn validate_fallback_model_has_provider(config: &Config) -> Result<(), ConfigError> {
    if config.ai.fallback_model.is_some() && config.ai.fallback_provider.is_none() {
        return Err(ConfigError::ValidationError(
            "fallback_model is set but fallback_provider is not".to_string(),
        ));
    }
    Ok(())
}

/// Validates a complete configuration before it is used or saved.
#[derive(Debug)]
pub struct ConfigValidator {
    valid_log_levels: HashSet<String>,
    valid_providers: HashSet<String>,
    interdependent_validations: Vec<fn(&Config) -> Result<(), ConfigError>>,
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator {
    pub fn new() -> Self {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"]
            .into_iter()
            .map(str::to_string)
            .collect();

        let valid_providers = ["openai", "gemini"]
            .into_iter()
            .map(str::to_string)
            .collect();

        let interdependent_validations: Vec<fn(&Config) -> Result<(), ConfigError>> = vec![
            validate_fallback_distinct,
            validate_fallback_model_has_provider,
        ];

        Self {
            valid_log_levels,
            valid_providers,
            interdependent_validations,
        }
    }

    pub fn validate(&self, config: &Config) -> Result<(), ConfigError> {
        self.validate_general(&config.general)?;
        self.validate_ai(&config.ai)?;
        self.validate_generation(&config.generation)?;
        self.validate_analysis(&config.analysis)?;

        for validation in &self.interdependent_validations {
            validation(config)?;
        }

        Ok(())
    }

    fn validate_general(&self, general: &crate::config::GeneralConfig) -> Result<(), ConfigError> {
        if general.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "output_dir cannot be empty".to_string(),
            ));
        }
        self.validate_allowed_value(&general.log_level, &self.valid_log_levels, "log_level")
    }

    fn validate_ai(&self, ai: &crate::config::AiConfig) -> Result<(), ConfigError> {
        self.validate_allowed_value(&ai.default_provider, &self.valid_providers, "default_provider")?;
        self.validate_non_empty(&ai.default_model, "default_model")?;

        if let Some(fallback) = &ai.fallback_provider {
            self.validate_allowed_value(fallback, &self.valid_providers, "fallback_provider")?;
        }

        self.validate_range(ai.request_timeout_seconds, 1, 600, "request_timeout_seconds")?;
        self.validate_range(ai.max_retries, 0, 10, "max_retries")?;
        self.validate_range(ai.temperature, 0.0, 2.0, "temperature")?;
        self.validate_range(ai.max_tokens, 1, 128_000, "max_tokens")?;

        Ok(())
    }

    fn validate_generation(
        &self,
        generation: &crate::config::GenerationSettings,
    ) -> Result<(), ConfigError> {
        if generation.min_requirement_length == 0 {
            return Err(ConfigError::ValidationError(
                "min_requirement_length must be greater than 0".to_string(),
            ));
        }
        if generation.max_requirement_length <= generation.min_requirement_length {
            return Err(ConfigError::ValidationError(format!(
                "max_requirement_length ({}) must exceed min_requirement_length ({})",
                generation.max_requirement_length, generation.min_requirement_length
            )));
        }
        self.validate_range(
            generation.max_requirement_length,
            2,
            100_000,
            "max_requirement_length",
        )
    }

    fn validate_analysis(
        &self,
        analysis: &crate::config::AnalysisSettings,
    ) -> Result<(), ConfigError> {
        self.validate_range(analysis.long_function_lines, 10, 1000, "long_function_lines")?;
        self.validate_range(analysis.readiness_threshold, 0.0, 100.0, "readiness_threshold")
    }

    fn validate_range<T>(&self, value: T, min: T, max: T, field_name: &str) -> Result<(), ConfigError>
    where
        T: std::cmp::PartialOrd + std::fmt::Display,
    {
        if value < min || value > max {
            return Err(ConfigError::ValidationError(format!(
                "{field_name}={value} must be between {min} and {max}"
            )));
        }
        Ok(())
    }

    fn validate_non_empty(&self, value: &str, field_name: &str) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{field_name} cannot be empty"
            )));
        }
        Ok(())
    }

    fn validate_allowed_value(
        &self,
        value: &str,
        allowed: &HashSet<String>,
        field_name: &str,
    ) -> Result<(), ConfigError> {
        if !allowed.contains(value) {
            let mut options: Vec<&str> = allowed.iter().map(String::as_str).collect();
            options.sort_unstable();
            return Err(ConfigError::ValidationError(format!(
                "invalid {field_name} '{value}'. Valid options are: {options:?}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> ConfigValidator {
        ConfigValidator::new()
    }

    #[test]
    fn default_configuration_passes() {
        assert!(validator().validate(&Config::default()).is_ok());
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let mut config = Config::default();
        config.ai.default_provider = "bedrock".to_string();
        let err = validator().validate(&config).unwrap_err();
        assert!(err.to_string().contains("default_provider"));
    }

    #[test]
    fn fallback_equal_to_default_is_rejected() {
        let mut config = Config::default();
        config.ai.fallback_provider = Some("openai".to_string());
        let err = validator().validate(&config).unwrap_err();
        assert!(err.to_string().contains("same as default_provider"));
    }

    #[test]
    fn fallback_model_without_provider_is_rejected() {
        let mut config = Config::default();
        config.ai.fallback_provider = None;
        assert!(validator().validate(&config).is_err());

        config.ai.fallback_model = None;
        assert!(validator().validate(&config).is_ok());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut config = Config::default();
        config.ai.temperature = 3.5;
        assert!(validator().validate(&config).is_err());

        let mut config = Config::default();
        config.ai.request_timeout_seconds = 0;
        assert!(validator().validate(&config).is_err());

        let mut config = Config::default();
        config.analysis.readiness_threshold = 120.0;
        assert!(validator().validate(&config).is_err());
    }

    #[test]
    fn inverted_requirement_bounds_are_rejected() {
        let mut config = Config::default();
        config.generation.min_requirement_length = 500;
        config.generation.max_requirement_length = 100;
        let err = validator().validate(&config).unwrap_err();
        assert!(err.to_string().contains("must exceed"));
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let mut config = Config::default();
        config.general.log_level = "verbose".to_string();
        assert!(validator().validate(&config).is_err());
    }
}
