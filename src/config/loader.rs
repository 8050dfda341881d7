//! Configuration loading and saving.

use crate::config::{Config, ConfigError};
use std::path::Path;

/// Reads and writes the TOML configuration file.
#[derive(Debug, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn new() -> Self {
        Self
    }

    pub fn load_from_file(&self, path: &Path) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, config: &Config, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(config)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_toml_is_a_deserialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[ai\ndefault_model = ").unwrap();

        let result = ConfigLoader::new().load_from_file(&path);
        assert!(matches!(result, Err(ConfigError::DeserializationError(_))));
    }

    #[test]
    fn saved_file_parses_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let loader = ConfigLoader::new();

        let mut config = Config::default();
        config.ai.default_model = "gpt-4.1".to_string();
        loader.save_to_file(&config, &path).unwrap();

        let loaded = loader.load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
