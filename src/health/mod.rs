//! Health check endpoints.
//!
//! # Routes
//! - `/ready`, `/readyz`: ready to serve requests
//! - `/health`, `/healthz`: live, but may not be ready
//! - `/startupz`: startup probe
//!
//! # Design Decisions
//! - An empty namespace mapping is still healthy; it only denies requests
//! - Probes never touch the namespace store

use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "UP".to_string(),
    })
}

pub fn routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/ready", get(health))
        .route("/readyz", get(health))
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/startupz", get(health))
}
