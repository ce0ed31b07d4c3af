//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and header names before anything binds
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;

use crate::config::schema::ServiceConfig;

/// One semantic problem in a configuration document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (field, address) in [
        ("listener.bind_address", &config.listener.bind_address),
        ("authz.bind_address", &config.authz.bind_address),
    ] {
        if address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::new(
                field,
                format!("invalid socket address '{address}'"),
            ));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "invalid socket address '{}'",
                config.observability.metrics_address
            ),
        ));
    }

    if HeaderName::try_from(config.authz.routing_header.as_str()).is_err() {
        errors.push(ValidationError::new(
            "authz.routing_header",
            "must be a valid header name",
        ));
    }

    if config.selector.public_url.trim().is_empty() {
        errors.push(ValidationError::new("selector.public_url", "must not be empty"));
    }

    if config.credentials.cookie_name.trim().is_empty() {
        errors.push(ValidationError::new(
            "credentials.cookie_name",
            "must not be empty",
        ));
    }

    if HeaderName::try_from(config.credentials.header_name.as_str()).is_err() {
        errors.push(ValidationError::new(
            "credentials.header_name",
            "must be a valid header name",
        ));
    }

    if !matches!(config.observability.log_format.as_str(), "text" | "json") {
        errors.push(ValidationError::new(
            "observability.log_format",
            "must be \"text\" or \"json\"",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ServiceConfig {
        let mut config = ServiceConfig::default();
        config.selector.public_url = "http://localhost:3000".into();
        config
    }

    #[test]
    fn test_defaults_with_public_url_are_valid() {
        assert_eq!(validate_config(&valid()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = valid();
        config.listener.bind_address = "nope".into();
        config.authz.routing_header = "bad header".into();
        config.credentials.cookie_name = String::new();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "authz.routing_header",
                "credentials.cookie_name"
            ]
        );
    }

    #[test]
    fn test_metrics_address_ignored_when_disabled() {
        let mut config = valid();
        config.observability.metrics_enabled = false;
        config.observability.metrics_address = "garbage".into();
        assert!(validate_config(&config).is_ok());
    }
}
