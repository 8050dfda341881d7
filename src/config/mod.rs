//! Configuration for the assistant.
//!
//! Settings live in a TOML file (by default under the platform config
//! directory) and split into sections: general behavior, AI provider
//! access, requirement validation bounds, and analysis thresholds. API
//! keys are resolved from the environment first so they never have to be
//! written to disk.

pub mod loader;
pub mod validation;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub ai: AiConfig,
    pub generation: GenerationSettings,
    pub analysis: AnalysisSettings,
}

/// General application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Where generated projects and assessments are written.
    pub output_dir: PathBuf,
    pub log_level: String,
    /// Persist artifacts automatically after each pipeline run.
    pub auto_save: bool,
}

/// AI provider access and request shaping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub default_provider: String,
    pub default_model: String,
    pub fallback_provider: Option<String>,
    pub fallback_model: Option<String>,
    pub request_timeout_seconds: u64,
    pub max_retries: usize,
    pub temperature: f64,
    pub max_tokens: u32,
    pub openai: ProviderSettings,
    pub gemini: ProviderSettings,
}

/// Per-provider credentials and endpoint override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

/// Bounds applied to requirements before any model call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub min_requirement_length: usize,
    pub max_requirement_length: usize,
}

/// Static analysis tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Functions longer than this many lines are flagged.
    pub long_function_lines: usize,
    /// Overall score at or above this counts as deployment ready.
    pub readiness_threshold: f64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./devforge_output"),
            log_level: "info".to_string(),
            auto_save: true,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            default_provider: "openai".to_string(),
            default_model: "gpt-4o-mini".to_string(),
            fallback_provider: Some("gemini".to_string()),
            fallback_model: Some("gemini-2.0-flash".to_string()),
            request_timeout_seconds: 60,
            max_retries: 2,
            temperature: 0.7,
            max_tokens: 4000,
            openai: ProviderSettings::default(),
            gemini: ProviderSettings::default(),
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            min_requirement_length: 10,
            max_requirement_length: 1000,
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            long_function_lines: 20,
            readiness_threshold: 70.0,
        }
    }
}

/// Environment variable if set and non-empty, else the file value.
fn env_or(var: &str, file_value: Option<&str>) -> Option<String> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => file_value
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string),
    }
}

impl AiConfig {
    pub fn openai_api_key(&self) -> Option<String> {
        env_or("OPENAI_API_KEY", self.openai.api_key.as_deref())
    }

    pub fn gemini_api_key(&self) -> Option<String> {
        env_or("GEMINI_API_KEY", self.gemini.api_key.as_deref())
    }

    pub fn openai_base_url(&self) -> Option<String> {
        env_or("OPENAI_BASE_URL", self.openai.base_url.as_deref())
    }

    pub fn gemini_base_url(&self) -> Option<String> {
        env_or("GEMINI_BASE_URL", self.gemini.base_url.as_deref())
    }
}

/// Errors that can occur during configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("validation failed: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    SerializationError(#[from] toml::ser::Error),

    #[error("deserialization error: {0}")]
    DeserializationError(#[from] toml::de::Error),
}

/// Path used when no `--config` flag is given.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("devforge")
        .join("config.toml")
}

/// Owns the loaded configuration and the path it came from.
#[derive(Debug)]
pub struct ConfigManager {
    config: Config,
    config_path: PathBuf,
    loader: loader::ConfigLoader,
    validator: validation::ConfigValidator,
}

impl ConfigManager {
    /// Load from `config_path`, or from the default location when `None`.
    ///
    /// A missing file at the default location means defaults; a missing
    /// file at an explicitly requested path is an error.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let explicit = config_path.is_some();
        let config_path = config_path.unwrap_or_else(default_config_path);

        let loader = loader::ConfigLoader::new();
        let validator = validation::ConfigValidator::new();

        let config = if config_path.exists() {
            let config = loader.load_from_file(&config_path)?;
            validator.validate(&config)?;
            config
        } else if explicit {
            return Err(ConfigError::FileNotFound(config_path));
        } else {
            Config::default()
        };

        Ok(Self {
            config,
            config_path,
            loader,
            validator,
        })
    }

    /// Reload from disk, keeping the current settings if the file is gone.
    pub fn load(&mut self) -> Result<(), ConfigError> {
        if self.config_path.exists() {
            let config = self.loader.load_from_file(&self.config_path)?;
            self.validator.validate(&config)?;
            self.config = config;
        }
        Ok(())
    }

    /// Write the current configuration, creating parent directories.
    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.loader.save_to_file(&self.config, &self.config_path)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Apply a mutation, rejecting it if the result no longer validates.
    pub fn update<F>(&mut self, updater: F) -> Result<(), ConfigError>
    where
        F: FnOnce(&mut Config),
    {
        let mut candidate = self.config.clone();
        updater(&mut candidate);
        self.validator.validate(&candidate)?;
        self.config = candidate;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(validation::ConfigValidator::new().validate(&config).is_ok());
        assert_eq!(config.ai.default_provider, "openai");
        assert_eq!(config.generation.min_requirement_length, 10);
        assert_eq!(config.analysis.readiness_threshold, 70.0);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [ai]
            default_model = "gpt-4.1"

            [analysis]
            readiness_threshold = 85.0
            "#,
        )
        .unwrap();

        assert_eq!(parsed.ai.default_model, "gpt-4.1");
        assert_eq!(parsed.ai.default_provider, "openai");
        assert_eq!(parsed.analysis.readiness_threshold, 85.0);
        assert_eq!(parsed.general.log_level, "info");
    }

    #[test]
    fn env_or_falls_back_to_the_file_value() {
        // deliberately unset variable
        let resolved = env_or("DEVFORGE_TEST_UNSET_VARIABLE", Some("from-file"));
        assert_eq!(resolved.as_deref(), Some("from-file"));

        let empty = env_or("DEVFORGE_TEST_UNSET_VARIABLE", Some("   "));
        assert_eq!(empty, None);

        let nothing = env_or("DEVFORGE_TEST_UNSET_VARIABLE", None);
        assert_eq!(nothing, None);
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let result = ConfigManager::new(Some(PathBuf::from("/nonexistent/devforge.toml")));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn save_and_reload_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        std::fs::write(
            &path,
            "[general]\nlog_level = \"debug\"\n\n[ai]\nmax_retries = 5\n",
        )
        .unwrap();

        let mut manager = ConfigManager::new(Some(path.clone())).unwrap();
        assert_eq!(manager.config().general.log_level, "debug");
        assert_eq!(manager.config().ai.max_retries, 5);

        manager
            .update(|config| config.analysis.long_function_lines = 80)
            .unwrap();
        manager.save().unwrap();

        let reloaded = ConfigManager::new(Some(path)).unwrap();
        assert_eq!(reloaded.config().analysis.long_function_lines, 80);
        assert_eq!(reloaded.config().general.log_level, "debug");
    }

    #[test]
    fn update_rejects_invalid_mutations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        let mut manager = ConfigManager::new(Some(path)).unwrap();
        let result = manager.update(|config| {
            config.ai.default_provider = "carrier-pigeon".to_string();
        });

        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
        // the bad mutation was not kept
        assert_eq!(manager.config().ai.default_provider, "openai");
    }
}
