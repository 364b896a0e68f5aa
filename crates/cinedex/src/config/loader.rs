use std::fs;
use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;

/// Loads and validates configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    load_config_from_str(&content)
}

/// Parses and validates configuration from a TOML string.
pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks value-level constraints the TOML schema cannot express.
/// Filesystem existence is checked by the caller before the run starts.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.library.path.as_os_str().is_empty() {
        return Err(ConfigError::Validation {
            message: "library.path must not be empty".to_string(),
        });
    }

    if config.driver.chrome_version.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "driver.chrome_version must not be empty".to_string(),
        });
    }

    if config.translate.endpoint.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "translate.endpoint must not be empty".to_string(),
        });
    }

    if config.translate.target_lang.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "translate.target_lang must not be empty".to_string(),
        });
    }

    Ok(())
}
