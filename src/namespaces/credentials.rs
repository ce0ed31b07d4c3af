//! Namespace credential extraction.
//!
//! # Precedence
//! 1. `namespace` cookie, first occurrence scanning left to right
//! 2. `x-namespace` header
//!
//! Header names are compared case-insensitively; the cookie name is not.

use std::collections::BTreeMap;

/// Default cookie carrying the namespace identifier.
pub const DEFAULT_COOKIE_NAME: &str = "namespace";
/// Default header carrying the namespace identifier.
pub const DEFAULT_HEADER_NAME: &str = "x-namespace";

/// Transport-neutral header map with case-insensitive names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value`, replacing any previous value.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.0
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Add a value, folding repeated headers into one line.
    /// Cookie lines are joined with `"; "`, everything else with `", "`.
    pub fn append(&mut self, name: impl AsRef<str>, value: &str) {
        let name = name.as_ref().to_ascii_lowercase();
        let separator = if name == "cookie" { "; " } else { ", " };
        self.0
            .entry(name)
            .and_modify(|existing| {
                existing.push_str(separator);
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// Derives the namespace identifier from a request's headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialExtractor {
    cookie_name: String,
    header_name: String,
}

impl CredentialExtractor {
    pub fn new(cookie_name: impl Into<String>, header_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            header_name: header_name.into().to_ascii_lowercase(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    /// Returns the identifier, or `None` when neither channel carries one.
    ///
    /// An empty value is still returned as present.
    pub fn extract<'h>(&self, headers: &'h Headers) -> Option<&'h str> {
        self.from_cookie(headers)
            .or_else(|| headers.get(&self.header_name))
    }

    fn from_cookie<'h>(&self, headers: &'h Headers) -> Option<&'h str> {
        headers
            .get("cookie")?
            .split(';')
            .map(str::trim)
            .find_map(|pair| pair.strip_prefix(self.cookie_name.as_str())?.strip_prefix('='))
    }
}

impl Default for CredentialExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_COOKIE_NAME, DEFAULT_HEADER_NAME)
    }
}
