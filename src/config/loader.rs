//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
///
/// Shared by the service settings and the namespace document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML settings file without validating it.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
}

/// Build the effective settings: file (or defaults), then environment,
/// then derived defaults, then validation.
pub fn load_service_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    apply_overrides(&mut config, |key| std::env::var(key).ok());
    resolve_defaults(&mut config);

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply environment overrides. `lookup` is `std::env::var` outside tests.
///
/// - `PORT`: selector listener port
/// - `AUTHZ_PORT`: check listener port
/// - `URLS_SELF_PUBLIC`: public selector URL
/// - `NAMESPACES_CONFIG`: namespace document path
/// - `ADMIN_API_KEY`: admin bearer token
pub fn apply_overrides<F>(config: &mut ServiceConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(port) = var("PORT") {
        config.listener.bind_address = with_port(&config.listener.bind_address, &port);
    }
    if let Some(port) = var("AUTHZ_PORT") {
        config.authz.bind_address = with_port(&config.authz.bind_address, &port);
    }
    if let Some(url) = var("URLS_SELF_PUBLIC") {
        config.selector.public_url = url;
    }
    if let Some(path) = var("NAMESPACES_CONFIG") {
        config.namespaces.path = path;
    }
    if let Some(key) = var("ADMIN_API_KEY") {
        config.admin.api_key = Some(key);
    }
}

/// Fill settings whose default depends on other settings.
pub fn resolve_defaults(config: &mut ServiceConfig) {
    if config.selector.public_url.trim().is_empty() {
        let port = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(_, port)| port)
            .unwrap_or("3000");
        config.selector.public_url = format!("http://localhost:{port}");
    }
}

fn with_port(address: &str, port: &str) -> String {
    let host = address
        .rsplit_once(':')
        .map(|(host, _)| host)
        .unwrap_or("0.0.0.0");
    format!("{host}:{}", port.trim())
}
