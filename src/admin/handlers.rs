use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::http::server::AppState;
use crate::namespaces::NamespaceConfig;

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    pub generation: u64,
    pub namespaces: usize,
    pub source: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReloadResult {
    pub status: String,
    pub generation: u64,
    pub namespaces: usize,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let store = state.store();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        generation: store.generation(),
        namespaces: store.current().len(),
        source: store.source().display().to_string(),
    })
}

/// Reload the namespace document. The read happens off the async workers.
pub async fn post_reload(State(state): State<AppState>) -> Response {
    let store = state.store().clone();
    match tokio::task::spawn_blocking(move || store.reload()).await {
        Ok(Ok(installed)) => Json(ReloadResult {
            status: "reloaded".to_string(),
            generation: installed.generation,
            namespaces: installed.namespaces,
        })
        .into_response(),
        Ok(Err(e)) => reload_failed(e.to_string()),
        Err(e) => {
            tracing::error!(error = %e, "Reload task failed");
            reload_failed("reload task failed".to_string())
        }
    }
}

fn reload_failed(error: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": error })),
    )
        .into_response()
}

/// Full mapping including targets, for operators.
pub async fn get_namespaces(State(state): State<AppState>) -> Json<NamespaceConfig> {
    Json(state.store().current().as_ref().clone())
}
