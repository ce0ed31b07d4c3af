//! External-authorization router for Envoy-style data planes.
//!
//! Decides per request whether to allow it (tagged with a routing target),
//! send a browser to the namespace selector, or deny it.

pub mod admin;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod namespaces;
pub mod observability;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use namespaces::{DecisionEngine, NamespaceStore, Outcome, RequestDescriptor};
