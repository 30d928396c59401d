//! Configuration file loading and serialization.

use crate::error::ConfigError;
use crate::types::PlacerConfig;
use crate::validate::validate_config;
use std::path::Path;

/// Conventional file name of the placer configuration.
pub const CONFIG_FILE_NAME: &str = "sdplace.toml";

/// Loads and validates a placer configuration file.
///
/// If `path` is a directory, `<path>/sdplace.toml` is read.
pub fn load_config(path: &Path) -> Result<PlacerConfig, ConfigError> {
    let config_path = if path.is_dir() {
        path.join(CONFIG_FILE_NAME)
    } else {
        path.to_path_buf()
    };
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a placer configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<PlacerConfig, ConfigError> {
    let config: PlacerConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

impl PlacerConfig {
    /// Serializes the configuration as TOML, e.g. to write out the defaults.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }
}
