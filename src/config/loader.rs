//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::properties::{Properties, PropertyError};
use crate::config::schema::FrameworkConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Parse error: {0}")]
    Property(#[from] PropertyError),
    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a `.properties` or TOML file.
pub fn load_config(path: &Path) -> Result<FrameworkConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let is_properties = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("properties"));

    let config = if is_properties {
        parse_properties(&content)?
    } else {
        parse_toml(&content)?
    };

    validate_config(&config).map_err(ConfigError::Validation)?;
    tracing::debug!(path = %path.display(), "Configuration file loaded");
    Ok(config)
}

pub fn parse_toml(content: &str) -> Result<FrameworkConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

pub fn parse_properties(content: &str) -> Result<FrameworkConfig, ConfigError> {
    Ok(Properties::parse(content).to_config()?)
}
