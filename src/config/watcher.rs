//! Namespace document watcher for hot reload.
//!
//! Opt-in (`namespaces.watch`). The parent directory is watched rather than
//! the file so that atomic replacements (rename over, ConfigMap symlink
//! flips) keep triggering reloads.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::namespaces::NamespaceStore;

/// Symlink Kubernetes flips when a mounted ConfigMap changes.
const CONFIGMAP_DATA_LINK: &str = "..data";

/// Reloads a `NamespaceStore` whenever its source changes on disk.
pub struct NamespaceWatcher {
    store: Arc<NamespaceStore>,
}

impl NamespaceWatcher {
    pub fn new(store: Arc<NamespaceStore>) -> Self {
        Self { store }
    }

    /// Start watching in a background thread.
    ///
    /// The returned watcher must be kept alive for events to keep flowing.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let store = self.store.clone();
        let watched = watch_root(store.source()).to_path_buf();
        let source = store.source().to_path_buf();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if (event.kind.is_modify() || event.kind.is_create())
                        && touches_source(&event.paths, &source)
                    {
                        tracing::info!("Namespace file change detected, reloading...");
                        // Failures are logged by the store; last-good stays current.
                        let _ = store.reload();
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&watched, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?watched, "Namespace watcher started");
        Ok(watcher)
    }
}

fn watch_root(source: &Path) -> &Path {
    match source.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Whether any event path is the document itself or the ConfigMap data link
/// it resolves through.
fn touches_source(paths: &[PathBuf], source: &Path) -> bool {
    let Some(name) = source.file_name() else {
        return true;
    };
    paths.iter().any(|path| {
        path.file_name()
            .is_some_and(|changed| changed == name || changed == CONFIGMAP_DATA_LINK)
    })
}
