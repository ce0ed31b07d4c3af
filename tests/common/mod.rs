//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::io::Write;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use ext_authz_router::config::ServiceConfig;
use ext_authz_router::http::HttpServer;
use ext_authz_router::lifecycle::Shutdown;
use ext_authz_router::namespaces::NamespaceStore;
use reqwest::redirect::Policy;
use tempfile::NamedTempFile;

pub const NAMESPACES_YAML: &str = r#"
namespaces:
  red:
    target: red-backend
  blue:
    target: blue-backend
    description: Blue tenant
"#;

/// Write a namespace document to a temp file with a `.yaml` extension.
pub fn namespace_file(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Overwrite a namespace document in place.
pub fn rewrite(path: &Path, content: &str) {
    std::fs::write(path, content).unwrap();
}

/// A running service bound to fixed loopback ports.
pub struct TestService {
    pub selector: SocketAddr,
    pub authz: SocketAddr,
    pub store: Arc<NamespaceStore>,
    pub shutdown: Shutdown,
}

impl TestService {
    pub fn selector_url(&self, path: &str) -> String {
        format!("http://{}{}", self.selector, path)
    }

    pub fn authz_url(&self, path: &str) -> String {
        format!("http://{}{}", self.authz, path)
    }
}

impl Drop for TestService {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the service with `namespaces` loaded from disk.
pub async fn start_service(
    selector_port: u16,
    authz_port: u16,
    namespaces: &Path,
    admin_key: Option<&str>,
) -> TestService {
    let selector: SocketAddr = format!("127.0.0.1:{selector_port}").parse().unwrap();
    let authz: SocketAddr = format!("127.0.0.1:{authz_port}").parse().unwrap();

    let mut config = ServiceConfig::default();
    config.listener.bind_address = selector.to_string();
    config.authz.bind_address = authz.to_string();
    config.selector.public_url = "http://namespaces.int.kube".to_string();
    config.namespaces.path = namespaces.display().to_string();
    config.observability.metrics_enabled = false;
    config.admin.api_key = admin_key.map(str::to_string);

    let store = Arc::new(NamespaceStore::open(namespaces));
    let shutdown = Shutdown::new();

    let http_listener = tokio::net::TcpListener::bind(selector).await.unwrap();
    let authz_listener = tokio::net::TcpListener::bind(authz).await.unwrap();
    let server = HttpServer::new(config, store.clone());
    let server_shutdown = shutdown.clone();

    tokio::spawn(async move {
        let _ = server
            .run(http_listener, authz_listener, server_shutdown)
            .await;
    });

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(100)).await;

    TestService {
        selector,
        authz,
        store,
        shutdown,
    }
}

/// Client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(Policy::none())
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}
