//! Namespace selector endpoints.
//!
//! # Routes
//! - `GET /`: chooser page
//! - `GET /namespaces`: identifier → description
//! - `POST /namespace`: validate a choice, set the cookie, redirect
//! - `GET /openapi.json`: API description
//!
//! # Design Decisions
//! - The engine only validates existence; the cookie is issued here
//! - JSON and form submissions are both accepted

use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::config::CookieConfig;
use crate::http::server::AppState;

const INDEX_HTML: &str = include_str!("assets/index.html");

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamespaceList {
    pub namespaces: BTreeMap<String, NamespaceAttributes>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamespaceAttributes {
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitParams {
    pub redirect_to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitBody {
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/namespaces", get(list_namespaces))
        .route("/namespace", post(submit_namespace))
        .route("/openapi.json", get(openapi))
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn list_namespaces(State(state): State<AppState>) -> Json<NamespaceList> {
    let namespaces = state
        .engine
        .list_namespaces()
        .into_iter()
        .map(|(id, description)| (id, NamespaceAttributes { description }))
        .collect();
    Json(NamespaceList { namespaces })
}

async fn submit_namespace(
    State(state): State<AppState>,
    Query(params): Query<SubmitParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let namespace = match submitted_value(&headers, &body) {
        Ok(value) => value,
        Err(message) => return bad_request(message),
    };

    if let Err(e) = state.engine.select(&namespace) {
        tracing::info!(namespace = %namespace, error = %e, "Rejected namespace selection");
        return bad_request(e.to_string());
    }

    let location = params
        .redirect_to
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| state.config.selector.default_redirect.clone());
    let cookie = session_cookie(
        state.engine.extractor().cookie_name(),
        &namespace,
        &state.config.cookie,
        Utc::now(),
    );

    let (Ok(location), Ok(cookie)) = (
        HeaderValue::from_str(&location),
        HeaderValue::from_str(&cookie),
    ) else {
        return bad_request("redirect target or namespace is not header-safe".to_string());
    };

    tracing::info!(namespace = %namespace, "Namespace selected");
    (
        StatusCode::FOUND,
        [(header::LOCATION, location), (header::SET_COOKIE, cookie)],
    )
        .into_response()
}

/// Pull `value` out of a JSON or form-encoded body.
fn submitted_value(headers: &HeaderMap, body: &[u8]) -> Result<String, String> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("application/json") {
        serde_json::from_slice::<SubmitBody>(body)
            .map(|b| b.value)
            .map_err(|e| format!("invalid JSON body: {e}"))
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        Ok(form_urlencoded::parse(body)
            .find(|(key, _)| key == "value")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default())
    } else {
        Err(format!("unsupported content type '{content_type}'"))
    }
}

fn bad_request(error: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorBody { error })).into_response()
}

/// `Set-Cookie` value persisting the chosen namespace.
pub fn session_cookie(name: &str, value: &str, config: &CookieConfig, now: DateTime<Utc>) -> String {
    let ttl = chrono::Duration::seconds(config.ttl_secs.min(i32::MAX as u64) as i64);
    let expires = (now + ttl).format("%a, %d %b %Y %H:%M:%S GMT");

    let mut cookie = format!("{name}={value}; Path=/");
    if !config.domain.is_empty() {
        cookie.push_str(&format!("; Domain={}", config.domain));
    }
    cookie.push_str(&format!("; Expires={expires}"));
    if config.http_only {
        cookie.push_str("; HttpOnly");
    }
    if config.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

async fn openapi() -> Json<serde_json::Value> {
    Json(openapi_document())
}

fn openapi_document() -> serde_json::Value {
    serde_json::json!({
        "openapi": "3.0.3",
        "info": {
            "title": "ext-authz-router selector API",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "paths": {
            "/": {
                "get": {
                    "summary": "Namespace selection UI",
                    "responses": {
                        "200": { "description": "Selector page", "content": { "text/html": {} } }
                    }
                }
            },
            "/namespaces": {
                "get": {
                    "summary": "List available namespaces",
                    "responses": {
                        "200": {
                            "description": "Configured namespaces",
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/NamespaceList" } } }
                        }
                    }
                }
            },
            "/namespace": {
                "post": {
                    "summary": "Select a namespace and set the namespace cookie",
                    "parameters": [{
                        "name": "redirect_to",
                        "in": "query",
                        "required": false,
                        "schema": { "type": "string" }
                    }],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": { "schema": { "$ref": "#/components/schemas/Submission" } },
                            "application/x-www-form-urlencoded": { "schema": { "$ref": "#/components/schemas/Submission" } }
                        }
                    },
                    "responses": {
                        "302": {
                            "description": "Namespace accepted",
                            "headers": {
                                "Location": { "schema": { "type": "string" } },
                                "Set-Cookie": { "schema": { "type": "string" } }
                            }
                        },
                        "400": {
                            "description": "Missing or unknown namespace",
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Error" } } }
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "NamespaceList": {
                    "type": "object",
                    "required": ["namespaces"],
                    "properties": {
                        "namespaces": {
                            "type": "object",
                            "additionalProperties": {
                                "type": "object",
                                "properties": { "description": { "type": "string" } }
                            }
                        }
                    }
                },
                "Submission": {
                    "type": "object",
                    "required": ["value"],
                    "properties": { "value": { "type": "string" } }
                },
                "Error": {
                    "type": "object",
                    "properties": { "error": { "type": "string" } }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn form_headers(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    #[test]
    fn test_session_cookie() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let cookie = session_cookie("namespace", "red", &CookieConfig::default(), now);
        assert_eq!(
            cookie,
            "namespace=red; Path=/; Domain=int.kube; Expires=Wed, 03 Jan 2024 03:04:05 GMT; HttpOnly"
        );
    }

    #[test]
    fn test_session_cookie_without_domain() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let config = CookieConfig {
            domain: String::new(),
            ttl_secs: 60,
            secure: true,
            http_only: false,
        };
        assert_eq!(
            session_cookie("ns", "blue", &config, now),
            "ns=blue; Path=/; Expires=Tue, 02 Jan 2024 03:05:05 GMT; Secure"
        );
    }

    #[test]
    fn test_submitted_value_json() {
        let headers = form_headers("application/json; charset=utf-8");
        assert_eq!(
            submitted_value(&headers, br#"{"value":"red"}"#),
            Ok("red".to_string())
        );
        assert!(submitted_value(&headers, b"{").is_err());
    }

    #[test]
    fn test_submitted_value_form() {
        let headers = form_headers("application/x-www-form-urlencoded");
        assert_eq!(
            submitted_value(&headers, b"other=1&value=cool-otter"),
            Ok("cool-otter".to_string())
        );
        assert_eq!(submitted_value(&headers, b"other=1"), Ok(String::new()));
    }

    #[test]
    fn test_submitted_value_unsupported() {
        assert!(submitted_value(&form_headers("text/plain"), b"red").is_err());
        assert!(submitted_value(&HeaderMap::new(), b"red").is_err());
    }

    #[test]
    fn test_openapi_lists_paths() {
        let doc = openapi_document();
        for path in ["/", "/namespaces", "/namespace"] {
            assert!(doc["paths"].get(path).is_some(), "missing {path}");
        }
    }
}
