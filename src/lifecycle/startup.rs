//! Startup orchestration.
//!
//! # Order
//! 1. Metrics exporter (if enabled)
//! 2. Namespace store (empty on load failure, never fatal)
//! 3. Reload triggers: SIGHUP, optional file watcher
//! 4. Listeners, last, so traffic only arrives once everything is ready

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::watcher::NamespaceWatcher;
use crate::config::ServiceConfig;
use crate::http::{HttpServer, ServerError};
use crate::lifecycle::{signals, Shutdown};
use crate::namespaces::NamespaceStore;
use crate::observability::metrics;

/// Run the service until a shutdown signal arrives.
pub async fn run(config: ServiceConfig) -> Result<(), ServerError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    if config.admin.api_key.is_none() {
        tracing::warn!("No admin.api_key configured, /admin endpoints are unauthenticated");
    }

    let store = Arc::new(NamespaceStore::open(&config.namespaces.path));

    let shutdown = Shutdown::new();
    signals::spawn_reload_on_hangup(store.clone(), &shutdown);

    // Dropping the watcher stops it, so it lives until run returns.
    let _watcher = if config.namespaces.watch {
        match NamespaceWatcher::new(store.clone()).run() {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                tracing::error!(error = %e, "Failed to start namespace watcher, continuing without it");
                None
            }
        }
    } else {
        None
    };

    let http_listener = bind(&config.listener.bind_address).await?;
    let authz_listener = bind(&config.authz.bind_address).await?;

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        trigger.trigger();
    });

    HttpServer::new(config, store)
        .run(http_listener, authz_listener, shutdown)
        .await
}

async fn bind(address: &str) -> Result<TcpListener, ServerError> {
    TcpListener::bind(address)
        .await
        .map_err(|source| ServerError::Bind {
            address: address.to_string(),
            source,
        })
}
