//! Selector listener: namespace list, selection, health.

use reqwest::header::{LOCATION, SET_COOKIE};
use reqwest::StatusCode;
use serde_json::Value;

mod common;

#[tokio::test]
async fn test_list_namespaces_hides_targets() {
    let file = common::namespace_file(common::NAMESPACES_YAML);
    let service = common::start_service(18201, 18202, file.path(), None).await;
    let client = common::client();

    let res = client
        .get(service.selector_url("/namespaces"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["namespaces"]["red"]["description"], "red");
    assert_eq!(body["namespaces"]["blue"]["description"], "Blue tenant");
    assert!(!body.to_string().contains("blue-backend"));
}

#[tokio::test]
async fn test_json_selection_sets_cookie_and_redirects() {
    let file = common::namespace_file(common::NAMESPACES_YAML);
    let service = common::start_service(18211, 18212, file.path(), None).await;
    let client = common::client();

    let res = client
        .post(service.selector_url("/namespace?redirect_to=https%3A%2F%2Fapp.int.kube%2Fhome"))
        .json(&serde_json::json!({ "value": "blue" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()[LOCATION], "https://app.int.kube/home");

    let cookie = res.headers()[SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("namespace=blue; Path=/; Domain=int.kube; Expires="));
    assert!(cookie.ends_with("GMT; HttpOnly"));
}

#[tokio::test]
async fn test_form_selection_uses_default_redirect() {
    let file = common::namespace_file(common::NAMESPACES_YAML);
    let service = common::start_service(18221, 18222, file.path(), None).await;
    let client = common::client();

    let res = client
        .post(service.selector_url("/namespace"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("value=red")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()[LOCATION], "http://namespaces.int.kube/");
    assert!(res.headers()[SET_COOKIE]
        .to_str()
        .unwrap()
        .starts_with("namespace=red;"));
}

#[tokio::test]
async fn test_unknown_selection_is_rejected() {
    let file = common::namespace_file(common::NAMESPACES_YAML);
    let service = common::start_service(18231, 18232, file.path(), None).await;
    let client = common::client();

    let res = client
        .post(service.selector_url("/namespace"))
        .json(&serde_json::json!({ "value": "purple" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(res.headers().get(SET_COOKIE).is_none());
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("purple"));

    let res = client
        .post(service.selector_url("/namespace"))
        .json(&serde_json::json!({ "value": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_and_ui_endpoints() {
    let file = common::namespace_file(common::NAMESPACES_YAML);
    let service = common::start_service(18241, 18242, file.path(), None).await;
    let client = common::client();

    for path in ["/ready", "/readyz", "/health", "/healthz", "/startupz"] {
        let res = client.get(service.selector_url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{path}");
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["status"], "UP");
    }

    let res = client.get(service.selector_url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("<html"));

    let res = client
        .get(service.selector_url("/openapi.json"))
        .send()
        .await
        .unwrap();
    let doc: Value = res.json().await.unwrap();
    assert!(doc["paths"]["/namespaces"].is_object());
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let file = common::namespace_file(common::NAMESPACES_YAML);
    let service = common::start_service(18251, 18252, file.path(), None).await;
    let client = common::client();

    let res = client
        .get(service.selector_url("/healthz"))
        .header("x-request-id", "abc-123")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "abc-123");

    let res = client.get(service.authz_url("/")).send().await.unwrap();
    assert!(res.headers().get("x-request-id").is_some());
}
