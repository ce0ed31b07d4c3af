//! Configuration schema definitions.
//!
//! This module defines the complete settings structure for the service.
//! All types derive Serde traits for deserialization from TOML files, and
//! every section has defaults so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::namespaces::credentials::{DEFAULT_COOKIE_NAME, DEFAULT_HEADER_NAME};

/// Root configuration for the authorization service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Selector UI / control listener.
    pub listener: ListenerConfig,

    /// ext_authz check listener.
    pub authz: AuthzConfig,

    /// Public selector page settings.
    pub selector: SelectorConfig,

    /// Cookie issued after a namespace is selected.
    pub cookie: CookieConfig,

    /// Where the namespace identifier is read from.
    pub credentials: CredentialsConfig,

    /// Namespace document source.
    pub namespaces: NamespacesConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub admin: AdminConfig,
}

/// Listener for the selector UI, health checks and admin endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Listener and response shaping for ext_authz checks.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthzConfig {
    /// Bind address (e.g., "0.0.0.0:3001").
    pub bind_address: String,

    /// Header carrying the routing target on allowed requests.
    pub routing_header: String,

    /// Prefix the proxy prepends to checked paths; stripped before deciding.
    pub path_prefix: String,
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3001".to_string(),
            routing_header: "x-backend".to_string(),
            path_prefix: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Public URL of the selector page. Empty means `http://localhost:<port>`.
    pub public_url: String,

    /// Where to send the browser after selection when no `redirect_to` is given.
    pub default_redirect: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            public_url: String::new(),
            default_redirect: "http://namespaces.int.kube/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CookieConfig {
    /// Cookie domain. Empty omits the attribute.
    pub domain: String,

    /// Cookie lifetime in seconds.
    pub ttl_secs: u64,

    pub secure: bool,

    pub http_only: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            domain: "int.kube".to_string(),
            ttl_secs: 24 * 60 * 60,
            secure: false,
            http_only: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub cookie_name: String,
    pub header_name: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            header_name: DEFAULT_HEADER_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NamespacesConfig {
    /// Path of the namespace document (YAML, or TOML by extension).
    pub path: String,

    /// Reload automatically when the document changes on disk.
    pub watch: bool,
}

impl Default for NamespacesConfig {
    fn default() -> Self {
        Self {
            path: "/app/config/config.yaml".to_string(),
            watch: false,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,

    /// "text" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AdminConfig {
    /// Bearer token required by `/admin/*`. `None` leaves them open.
    pub api_key: Option<String>,
}
