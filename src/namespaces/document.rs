//! Namespace document schema.
//!
//! A document maps namespace identifiers to routing targets:
//! ```yaml
//! namespaces:
//!   red:
//!     target: svc-a
//!   blue:
//!     target: svc-b
//!     description: Blue tenant
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::loader::ConfigError;
use crate::config::validation::ValidationError;

/// One configured tenant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NamespaceEntry {
    /// Opaque routing token handed to the proxy on allow.
    pub target: String,

    /// Human-readable label shown by the selector UI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NamespaceEntry {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The label to present for this entry, falling back to its identifier.
    pub fn description_or<'a>(&'a self, id: &'a str) -> &'a str {
        match self.description.as_deref() {
            Some(desc) if !desc.trim().is_empty() => desc,
            _ => id,
        }
    }
}

/// Supported on-disk encodings of the namespace document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Toml,
}

impl DocumentFormat {
    /// `.toml` files are read as TOML; everything else as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => DocumentFormat::Toml,
            _ => DocumentFormat::Yaml,
        }
    }
}

/// An immutable snapshot of the identifier → entry mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NamespaceConfig {
    pub namespaces: HashMap<String, NamespaceEntry>,
}

impl NamespaceConfig {
    /// Parse and validate a document.
    pub fn parse(content: &str, format: DocumentFormat) -> Result<Self, ConfigError> {
        let config: NamespaceConfig = if content.trim().is_empty() {
            NamespaceConfig::default()
        } else {
            match format {
                DocumentFormat::Yaml => serde_yaml::from_str(content)
                    .map_err(|e| ConfigError::Parse(e.to_string()))?,
                DocumentFormat::Toml => {
                    toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?
                }
            }
        };

        config.validate().map_err(ConfigError::Validation)?;
        Ok(config)
    }

    /// Semantic checks serde cannot express. Reports every violation.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut ids: Vec<&String> = self.namespaces.keys().collect();
        ids.sort();

        let mut errors = Vec::new();
        for id in ids {
            if id.trim().is_empty() {
                errors.push(ValidationError::new(
                    "namespaces",
                    "namespace identifier must not be empty",
                ));
            }
            if self.namespaces[id].target.trim().is_empty() {
                errors.push(ValidationError::new(
                    format!("namespaces.{id}.target"),
                    "target must not be empty",
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Look up an identifier. The empty identifier never matches.
    pub fn get(&self, id: &str) -> Option<&NamespaceEntry> {
        if id.is_empty() {
            return None;
        }
        self.namespaces.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// Identifier → presentation label, ordered by identifier.
    pub fn descriptions(&self) -> BTreeMap<String, String> {
        self.namespaces
            .iter()
            .map(|(id, entry)| (id.clone(), entry.description_or(id).to_string()))
            .collect()
    }
}

impl<K: Into<String>> FromIterator<(K, NamespaceEntry)> for NamespaceConfig {
    fn from_iter<I: IntoIterator<Item = (K, NamespaceEntry)>>(iter: I) -> Self {
        Self {
            namespaces: iter.into_iter().map(|(id, e)| (id.into(), e)).collect(),
        }
    }
}
