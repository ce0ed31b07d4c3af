//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! service settings (TOML, optional)
//!     → loader.rs (parse, env overrides, derived defaults)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable, shared via Arc)
//!
//! namespace document (see crate::namespaces):
//!     admin reload / SIGHUP / watcher.rs (opt-in)
//!     → NamespaceStore::reload
//!     → atomic swap of Arc<NamespaceConfig>
//! ```
//!
//! # Design Decisions
//! - Service settings are fixed for the process lifetime; only the
//!   namespace mapping hot-reloads
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_service_config, ConfigError};
pub use schema::{
    AdminConfig, AuthzConfig, CookieConfig, CredentialsConfig, ListenerConfig, NamespacesConfig,
    ObservabilityConfig, SelectorConfig, ServiceConfig, TimeoutConfig,
};
