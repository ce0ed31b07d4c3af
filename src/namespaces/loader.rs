//! Namespace document loading from disk.

use std::fs;
use std::path::Path;

use crate::config::loader::ConfigError;
use crate::namespaces::document::{DocumentFormat, NamespaceConfig};

/// Read, parse and validate the namespace document at `path`.
///
/// Nothing is installed here; callers decide what to do with the result.
pub fn load_namespaces(path: &Path) -> Result<NamespaceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    NamespaceConfig::parse(&content, DocumentFormat::from_path(path))
}
