//! Namespace resolution subsystem.
//!
//! # Data Flow
//! ```text
//! namespace document (YAML/TOML)
//!     → loader.rs (read & deserialize)
//!     → document.rs (semantic checks, immutable NamespaceConfig)
//!     → store.rs (atomic swap of Arc<NamespaceConfig>)
//!
//! Per check:
//!     RequestDescriptor
//!     → credentials.rs (cookie, then header)
//!     → decision.rs (one snapshot read, exactly one Outcome)
//! ```
//!
//! # Design Decisions
//! - Snapshots are never mutated; reload builds a new one and swaps it in
//! - A failed reload keeps the last-good snapshot serving decisions
//! - Nothing here depends on a transport; adapters live under `http`

pub mod credentials;
pub mod decision;
pub mod document;
pub mod loader;
pub mod store;

pub use credentials::{CredentialExtractor, Headers};
pub use decision::{DecisionEngine, Outcome, RequestDescriptor, SelectionError};
pub use document::{DocumentFormat, NamespaceConfig, NamespaceEntry};
pub use loader::load_namespaces;
pub use store::{Installed, NamespaceStore};
