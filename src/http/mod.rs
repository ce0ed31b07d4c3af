//! HTTP transport subsystem.
//!
//! # Data Flow
//! ```text
//! proxy check request (check listener)
//!     → check.rs (headers → RequestDescriptor)
//!     → DecisionEngine::decide
//!     → check.rs (Outcome → status + headers)
//!
//! browser / API client (selector listener)
//!     → selector.rs (page, namespace list, selection + cookie)
//!     → health, admin
//! ```

pub mod check;
pub mod request;
pub mod selector;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer, ServerError};
