//! Hot-swappable holder of the current namespace snapshot.
//!
//! Readers take a wait-free `Arc` clone of the installed snapshot and keep
//! using it for the rest of their decision; installs replace the pointer and
//! never touch a snapshot a reader may hold.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;

use crate::config::loader::ConfigError;
use crate::namespaces::document::NamespaceConfig;
use crate::namespaces::loader::load_namespaces;
use crate::observability::metrics;

/// Result of a successful install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Installed {
    /// Install counter, starting at 1 for the first install.
    pub generation: u64,
    /// Number of namespaces in the installed snapshot.
    pub namespaces: usize,
}

/// Owns the current snapshot and the document it is reloaded from.
#[derive(Debug)]
pub struct NamespaceStore {
    source: PathBuf,
    current: ArcSwap<NamespaceConfig>,
    install_lock: Mutex<()>,
    generation: AtomicU64,
}

impl NamespaceStore {
    /// Create a store serving `initial` without touching `source`.
    /// `initial` is not counted as an install.
    pub fn new(source: impl Into<PathBuf>, initial: NamespaceConfig) -> Self {
        Self {
            source: source.into(),
            current: ArcSwap::from_pointee(initial),
            install_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Boot-time constructor: load `source`, or start empty if that fails.
    pub fn open(source: impl Into<PathBuf>) -> Self {
        let store = Self::new(source, NamespaceConfig::default());
        tracing::info!(path = ?store.source, "Namespace configuration file");
        if let Err(e) = store.reload() {
            tracing::error!(
                path = ?store.source,
                error = %e,
                "Failed to load namespace configuration, starting with an empty mapping"
            );
        }
        store
    }

    /// Path of the document `reload` reads.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The installed snapshot. Never blocks on a concurrent install.
    pub fn current(&self) -> Arc<NamespaceConfig> {
        self.current.load_full()
    }

    /// Number of installs so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Atomically replace the current snapshot.
    pub fn install(&self, config: NamespaceConfig) -> Installed {
        let namespaces = config.len();
        let _guard = self
            .install_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        self.current.store(Arc::new(config));
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        metrics::set_namespace_count(namespaces);
        tracing::info!(generation, namespaces, "Namespace configuration installed");

        Installed {
            generation,
            namespaces,
        }
    }

    /// Re-read the source document and install it on success.
    ///
    /// On failure the previous snapshot stays current.
    pub fn reload(&self) -> Result<Installed, ConfigError> {
        match load_namespaces(&self.source) {
            Ok(config) => {
                metrics::record_reload(true);
                Ok(self.install(config))
            }
            Err(e) => {
                metrics::record_reload(false);
                tracing::warn!(
                    path = ?self.source,
                    error = %e,
                    "Namespace reload failed, keeping current configuration"
                );
                Err(e)
            }
        }
    }

    /// Identifier → description for the selector UI.
    pub fn list_namespaces(&self) -> BTreeMap<String, String> {
        self.current().descriptions()
    }
}
