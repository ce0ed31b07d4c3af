//! Authorization decision engine.
//!
//! # Responsibilities
//! - Resolve the request's namespace against the current snapshot
//! - Produce exactly one `Outcome` per request
//! - Validate selector submissions
//!
//! # Design Decisions
//! - Stateless per call; the snapshot is read once per decision
//! - Path and method never influence the result, only `accept` does
//! - Unknown or missing namespaces are outcomes, not errors

use std::collections::BTreeMap;
use std::sync::Arc;

use url::form_urlencoded;

use crate::namespaces::credentials::{CredentialExtractor, Headers};
use crate::namespaces::store::NamespaceStore;

/// Normalized view of the request being authorized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub method: String,
    pub scheme: String,
    pub host: String,
    /// Path including any query string, as the proxy saw it.
    pub path: String,
    pub headers: Headers,
}

impl RequestDescriptor {
    pub fn new(
        method: impl Into<String>,
        scheme: impl Into<String>,
        host: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            scheme: scheme.into(),
            host: host.into(),
            path: path.into(),
            headers: Headers::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Whether the caller negotiates HTML, i.e. is a browser navigation.
    pub fn prefers_html(&self) -> bool {
        self.headers
            .get("accept")
            .is_some_and(|accept| accept.contains("text/html"))
    }

    /// Absolute URL of the original request.
    pub fn original_url(&self) -> String {
        format!("{}://{}{}", self.scheme, self.host, self.path)
    }
}

/// The engine's decision for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Forward the request, tagged with the namespace's routing target.
    Allow { target: String },
    /// Send a browser to the namespace chooser.
    RedirectToSelector { location: String },
    /// The namespace is not configured.
    DenyForbidden { message: String },
    /// No namespace was supplied by a non-browser client.
    DenyUnauthorized { message: String },
}

impl Outcome {
    /// Stable label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Allow { .. } => "allow",
            Outcome::RedirectToSelector { .. } => "redirect",
            Outcome::DenyForbidden { .. } => "forbidden",
            Outcome::DenyUnauthorized { .. } => "unauthorized",
        }
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, Outcome::Allow { .. })
    }
}

/// Rejection of a namespace submitted through the selector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("namespace value is required")]
    Empty,
    #[error("unknown namespace: {0}")]
    Unknown(String),
}

/// Combines credential extraction with a snapshot lookup.
#[derive(Debug)]
pub struct DecisionEngine {
    store: Arc<NamespaceStore>,
    extractor: CredentialExtractor,
    selector_url: String,
}

impl DecisionEngine {
    /// `selector_url` is the public URL of the namespace chooser page.
    pub fn new(
        store: Arc<NamespaceStore>,
        extractor: CredentialExtractor,
        selector_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            extractor,
            selector_url: selector_url.into(),
        }
    }

    pub fn store(&self) -> &Arc<NamespaceStore> {
        &self.store
    }

    pub fn extractor(&self) -> &CredentialExtractor {
        &self.extractor
    }

    pub fn decide(&self, request: &RequestDescriptor) -> Outcome {
        // An empty identifier can never be configured, so it counts as missing.
        let identifier = self
            .extractor
            .extract(&request.headers)
            .filter(|id| !id.is_empty());

        let Some(identifier) = identifier else {
            return self.missing_credential(request);
        };

        let snapshot = self.store.current();
        match snapshot.get(identifier) {
            Some(entry) => Outcome::Allow {
                target: entry.target.clone(),
            },
            None => Outcome::DenyForbidden {
                message: format!("unauthorized namespace ID: {identifier}"),
            },
        }
    }

    fn missing_credential(&self, request: &RequestDescriptor) -> Outcome {
        if request.prefers_html() {
            Outcome::RedirectToSelector {
                location: self.selector_location(&request.original_url()),
            }
        } else {
            Outcome::DenyUnauthorized {
                message: format!(
                    "Missing namespace identifier. Provide namespace via '{}' header or '{}' cookie.",
                    self.extractor.header_name(),
                    self.extractor.cookie_name(),
                ),
            }
        }
    }

    /// Selector URL carrying `redirect_to` as an encoded query value.
    pub fn selector_location(&self, redirect_to: &str) -> String {
        let encoded: String = form_urlencoded::byte_serialize(redirect_to.as_bytes()).collect();
        let separator = if self.selector_url.contains('?') { '&' } else { '?' };
        format!("{}{}redirect_to={}", self.selector_url, separator, encoded)
    }

    /// Check that a submitted namespace exists in the current snapshot.
    pub fn select(&self, candidate: &str) -> Result<(), SelectionError> {
        if candidate.is_empty() {
            return Err(SelectionError::Empty);
        }
        if self.store.current().contains(candidate) {
            Ok(())
        } else {
            Err(SelectionError::Unknown(candidate.to_string()))
        }
    }

    /// Identifier → description for presentation.
    pub fn list_namespaces(&self) -> BTreeMap<String, String> {
        self.store.list_namespaces()
    }
}
