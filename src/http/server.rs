//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the selector router (UI, namespace API, health, admin)
//! - Build the ext_authz check router
//! - Wire up middleware (tracing, timeouts, request ID)
//! - Serve both listeners until shutdown

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::admin::setup_admin_router;
use crate::config::ServiceConfig;
use crate::health;
use crate::http::check::{self, challenge, DEFAULT_CHALLENGE};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::selector;
use crate::lifecycle::Shutdown;
use crate::namespaces::{CredentialExtractor, DecisionEngine, NamespaceStore};

/// Error type for server operations.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DecisionEngine>,
    pub config: Arc<ServiceConfig>,
    pub routing_header: HeaderName,
    pub challenge: HeaderValue,
}

impl AppState {
    pub fn new(config: ServiceConfig, store: Arc<NamespaceStore>) -> Self {
        let extractor = CredentialExtractor::new(
            &config.credentials.cookie_name,
            &config.credentials.header_name,
        );

        let routing_header = HeaderName::try_from(config.authz.routing_header.as_str())
            .unwrap_or_else(|_| {
                tracing::warn!(
                    header = %config.authz.routing_header,
                    "Invalid routing header, using x-backend"
                );
                HeaderName::from_static("x-backend")
            });
        let challenge = HeaderValue::from_str(&challenge(&extractor))
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CHALLENGE));

        let engine = Arc::new(DecisionEngine::new(
            store,
            extractor,
            config.selector.public_url.clone(),
        ));

        Self {
            engine,
            config: Arc::new(config),
            routing_header,
            challenge,
        }
    }

    pub fn store(&self) -> &Arc<NamespaceStore> {
        self.engine.store()
    }
}

/// Serves the selector API and the ext_authz check endpoint.
pub struct HttpServer {
    selector: Router,
    check: Router,
    state: AppState,
}

impl HttpServer {
    pub fn new(config: ServiceConfig, store: Arc<NamespaceStore>) -> Self {
        let timeout = Duration::from_secs(config.timeouts.request_secs);
        let state = AppState::new(config, store);

        let selector = Self::with_layers(
            selector::routes()
                .merge(health::routes())
                .merge(setup_admin_router(state.clone()))
                .with_state(state.clone()),
            timeout,
        );
        let check = Self::with_layers(check::routes(state.clone()), timeout);

        Self {
            selector,
            check,
            state,
        }
    }

    #[allow(deprecated)]
    fn with_layers(router: Router, timeout: Duration) -> Router {
        router
            .layer(TimeoutLayer::new(timeout))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// Router for the selector listener.
    pub fn selector_router(&self) -> Router {
        self.selector.clone()
    }

    /// Router for the check listener.
    pub fn check_router(&self) -> Router {
        self.check.clone()
    }

    /// Serve both listeners until `shutdown` fires, then drain.
    pub async fn run(
        self,
        http_listener: TcpListener,
        authz_listener: TcpListener,
        shutdown: Shutdown,
    ) -> Result<(), ServerError> {
        tracing::info!(
            address = %http_listener.local_addr()?,
            public_url = %self.state.config.selector.public_url,
            "Selector server starting"
        );
        tracing::info!(
            address = %authz_listener.local_addr()?,
            "ext_authz check server starting"
        );

        let selector = axum::serve(http_listener, self.selector)
            .with_graceful_shutdown(shutdown.notified())
            .into_future();
        let check = axum::serve(authz_listener, self.check)
            .with_graceful_shutdown(shutdown.notified())
            .into_future();

        tokio::try_join!(selector, check)?;

        tracing::info!("HTTP servers stopped");
        Ok(())
    }
}
