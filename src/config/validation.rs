//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the scan namespace and context path shapes
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FrameworkConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::FrameworkConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check every field, collecting all problems.
pub fn validate_config(config: &FrameworkConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.scan_package.trim().is_empty() {
        errors.push(ValidationError::new("scan_package", "must not be empty"));
    } else if config
        .scan_package
        .split('.')
        .any(|segment| segment.is_empty() || segment.chars().any(char::is_whitespace))
    {
        errors.push(ValidationError::new(
            "scan_package",
            format!("`{}` is not a dot-separated namespace", config.scan_package),
        ));
    }

    let context = &config.context_path;
    if !context.is_empty() && (!context.starts_with('/') || context.ends_with('/')) {
        errors.push(ValidationError::new(
            "context_path",
            format!("`{}` must be empty or start with `/` and not end with `/`", context),
        ));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("`{}` is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::new("limits.max_body_bytes", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("`{}` is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
