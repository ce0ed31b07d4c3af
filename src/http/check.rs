//! ext_authz check adapter.
//!
//! Speaks Envoy's HTTP authorization-service protocol: the proxy replays the
//! original request's method, path and headers against this listener and
//! acts on the status code and headers of the reply.
//!
//! # Proxy setup
//! The ext_authz filter must forward `cookie`, `accept`, `x-namespace`,
//! `x-forwarded-proto` and `user-agent`, and allow the routing header
//! (`x-backend` by default) through to the upstream request.
//!
//! # Outcome mapping
//! ```text
//! Allow              → 200 + <routing header>: <target>
//! RedirectToSelector → 302 + location
//! DenyUnauthorized   → 401 + www-authenticate challenge, message body
//! DenyForbidden      → 403, message body
//! ```

use std::time::Instant;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};

use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::namespaces::{CredentialExtractor, Outcome, RequestDescriptor};
use crate::observability::metrics;

/// Challenge sent with 401 responses for the default credential names.
pub const DEFAULT_CHALLENGE: &str = r#"Custom realm="namespace-required", error="missing_namespace", error_description="Provide namespace via x-namespace header or namespace cookie""#;

/// `www-authenticate` value naming the configured credential channels.
pub fn challenge(extractor: &CredentialExtractor) -> String {
    format!(
        r#"Custom realm="namespace-required", error="missing_namespace", error_description="Provide namespace via {} header or {} cookie""#,
        extractor.header_name(),
        extractor.cookie_name()
    )
}

/// Every path and method on the check listener is a check.
pub fn routes(state: AppState) -> Router {
    Router::new().fallback(check_handler).with_state(state)
}

async fn check_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let start = Instant::now();
    let descriptor = describe_request(&method, &uri, &headers, &state.config.authz.path_prefix);

    let outcome = state.engine.decide(&descriptor);
    metrics::record_decision(outcome.label(), start);

    tracing::info!(
        request_id = %request_id(&headers),
        method = %descriptor.method,
        url = %descriptor.original_url(),
        user_agent = descriptor.headers.get("user-agent").unwrap_or("-"),
        outcome = outcome.label(),
        latency_us = start.elapsed().as_micros() as u64,
        "ext_authz check"
    );

    outcome_response(outcome, &state.routing_header, &state.challenge)
}

/// Translate the proxy's check request into the engine's input.
pub fn describe_request(
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    path_prefix: &str,
) -> RequestDescriptor {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| uri.scheme_str().unwrap_or("http"));

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| uri.authority().map(|a| a.to_string()))
        .unwrap_or_default();

    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

    let mut descriptor = RequestDescriptor::new(
        method.as_str(),
        scheme,
        host,
        strip_path_prefix(path_and_query, path_prefix),
    );
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            descriptor.headers.append(name.as_str(), value);
        }
    }
    descriptor
}

fn strip_path_prefix(path: &str, prefix: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return path.to_string();
    }
    match path.strip_prefix(prefix) {
        Some("") => "/".to_string(),
        Some(rest) if rest.starts_with('/') => rest.to_string(),
        Some(rest) if rest.starts_with('?') => format!("/{rest}"),
        _ => path.to_string(),
    }
}

/// Render an outcome as the check reply the proxy understands.
pub fn outcome_response(
    outcome: Outcome,
    routing_header: &HeaderName,
    challenge: &HeaderValue,
) -> Response {
    match outcome {
        Outcome::Allow { target } => match HeaderValue::from_str(&target) {
            Ok(value) => (StatusCode::OK, [(routing_header.clone(), value)]).into_response(),
            Err(_) => {
                tracing::error!(routing_target = %target, "Routing target is not a valid header value");
                (StatusCode::INTERNAL_SERVER_ERROR, "invalid routing target").into_response()
            }
        },
        Outcome::RedirectToSelector { location } => match HeaderValue::from_str(&location) {
            Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
            Err(_) => {
                tracing::error!(location = %location, "Selector location is not a valid header value");
                (StatusCode::INTERNAL_SERVER_ERROR, "invalid selector location").into_response()
            }
        },
        Outcome::DenyUnauthorized { message } => (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, challenge.clone())],
            message,
        )
            .into_response(),
        Outcome::DenyForbidden { message } => (StatusCode::FORBIDDEN, message).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_request() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("app.int.kube"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        headers.append(header::COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::COOKIE, HeaderValue::from_static("namespace=red"));

        let uri: Uri = "/items?page=2".parse().unwrap();
        let descriptor = describe_request(&Method::POST, &uri, &headers, "");

        assert_eq!(descriptor.method, "POST");
        assert_eq!(descriptor.original_url(), "https://app.int.kube/items?page=2");
        assert_eq!(descriptor.headers.get("cookie"), Some("a=1; namespace=red"));
    }

    #[test]
    fn test_scheme_defaults_to_http() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("h"));
        let uri: Uri = "/p".parse().unwrap();
        let descriptor = describe_request(&Method::GET, &uri, &headers, "");
        assert_eq!(descriptor.original_url(), "http://h/p");
    }

    #[test]
    fn test_host_falls_back_to_authority() {
        let uri: Uri = "https://fallback.example/x".parse().unwrap();
        let descriptor = describe_request(&Method::GET, &uri, &HeaderMap::new(), "");
        assert_eq!(descriptor.original_url(), "https://fallback.example/x");
    }

    #[test]
    fn test_strip_path_prefix() {
        assert_eq!(strip_path_prefix("/authz/items", "/authz"), "/items");
        assert_eq!(strip_path_prefix("/authz", "/authz/"), "/");
        assert_eq!(strip_path_prefix("/authz?x=1", "/authz"), "/?x=1");
        assert_eq!(strip_path_prefix("/authzed", "/authz"), "/authzed");
        assert_eq!(strip_path_prefix("/items", ""), "/items");
    }

    #[test]
    fn test_outcome_response_statuses() {
        let routing = HeaderName::from_static("x-backend");
        let challenge = HeaderValue::from_static(DEFAULT_CHALLENGE);

        let allow = outcome_response(Outcome::Allow { target: "svc-a".into() }, &routing, &challenge);
        assert_eq!(allow.status(), StatusCode::OK);
        assert_eq!(allow.headers()["x-backend"], "svc-a");

        let redirect = outcome_response(
            Outcome::RedirectToSelector { location: "http://s/?redirect_to=x".into() },
            &routing,
            &challenge,
        );
        assert_eq!(redirect.status(), StatusCode::FOUND);
        assert_eq!(redirect.headers()[header::LOCATION], "http://s/?redirect_to=x");

        let unauthorized = outcome_response(
            Outcome::DenyUnauthorized { message: "missing".into() },
            &routing,
            &challenge,
        );
        assert_eq!(unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unauthorized.headers()[header::WWW_AUTHENTICATE], DEFAULT_CHALLENGE);

        let forbidden = outcome_response(
            Outcome::DenyForbidden { message: "nope".into() },
            &routing,
            &challenge,
        );
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
        assert!(forbidden.headers().get("x-backend").is_none());
    }

    #[test]
    fn test_invalid_target_is_server_error() {
        let response = outcome_response(
            Outcome::Allow { target: "bad\nvalue".into() },
            &HeaderName::from_static("x-backend"),
            &HeaderValue::from_static(DEFAULT_CHALLENGE),
        );
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_default_challenge_matches_default_names() {
        assert_eq!(challenge(&CredentialExtractor::default()), DEFAULT_CHALLENGE);
    }

    #[tokio::test]
    async fn test_router_answers_any_method_and_path() {
        use std::sync::Arc;

        use axum::body::Body;
        use axum::http::Request;
        use tower::ServiceExt;

        use crate::config::ServiceConfig;
        use crate::namespaces::{NamespaceConfig, NamespaceEntry, NamespaceStore};

        let mapping: NamespaceConfig = [("red", NamespaceEntry::new("red-svc"))].into_iter().collect();
        let store = Arc::new(NamespaceStore::new("unused.yaml", mapping));
        let app = routes(AppState::new(ServiceConfig::default(), store));

        let request = Request::builder()
            .method(Method::DELETE)
            .uri("/deeply/nested/path?q=1")
            .header("x-namespace", "red")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-backend"], "red-svc");

        let request = Request::builder()
            .uri("/")
            .header("x-namespace", "blue")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
