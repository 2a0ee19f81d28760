//! Relay handler tests against a mock upstream.

use std::time::Duration;

use relay_server::relay::{HttpMethod, RelayBody, RelayError, RelayRequest, Relayer, ResponseBody};
use serde_json::{json, Value};

mod common;

use common::{closed_addr, start_fixed_upstream, start_upstream, MockResponse};

fn relayer(services: &[(&str, String)]) -> Relayer {
    common::relayer_for(&common::config_with(services))
}

#[tokio::test]
async fn test_json_response_is_parsed() {
    let upstream =
        start_fixed_upstream(MockResponse::json(200, r#"{"url": "/get", "ok": true}"#)).await;
    let relayer = relayer(&[("httpbin", upstream.base_url())]);

    let response = relayer
        .relay(RelayRequest::get("httpbin", "/get"))
        .await
        .unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(response.url, format!("{}/get", upstream.base_url()));
    assert_eq!(response.body.json(), Some(&json!({"url": "/get", "ok": true})));
    assert_eq!(response.body.text(), None);
    assert_eq!(response.headers["content-type"], "application/json");
    assert!(response.elapsed_ms >= 0.0);

    let seen = upstream.last_request();
    assert_eq!(seen.method, "GET");
    assert_eq!(seen.target, "/get");
}

#[tokio::test]
async fn test_non_json_response_falls_back_to_text() {
    let upstream = start_fixed_upstream(MockResponse::text(200, "<html>hi</html>")).await;
    let relayer = relayer(&[("site", upstream.base_url())]);

    let response = relayer.relay(RelayRequest::get("site", "/")).await.unwrap();

    assert_eq!(response.body, ResponseBody::Text("<html>hi</html>".to_string()));
    let doc = serde_json::to_value(&response).unwrap();
    assert!(doc["body"].is_null());
    assert_eq!(doc["text"], "<html>hi</html>");
}

#[tokio::test]
async fn test_query_and_headers_are_forwarded() {
    let upstream = start_fixed_upstream(MockResponse::json(200, "{}")).await;
    let relayer = relayer(&[("search", upstream.base_url())]);

    let request = RelayRequest::get("search", "/find")
        .with_query("q", "rust")
        .with_query("page", "2")
        .with_header("X-Trace", "abc123");
    let response = relayer.relay(request).await.unwrap();

    let seen = upstream.last_request();
    assert_eq!(seen.target, "/find?page=2&q=rust");
    assert_eq!(seen.header("x-trace"), Some("abc123"));
    assert!(response.url.ends_with("/find?page=2&q=rust"));
}

#[tokio::test]
async fn test_json_body_is_encoded() {
    let upstream = start_fixed_upstream(MockResponse::json(201, r#"{"id": 1}"#)).await;
    let relayer = relayer(&[("api", upstream.base_url())]);

    let request = RelayRequest::get("api", "/items")
        .with_method(HttpMethod::Post)
        .with_body(RelayBody::Json(json!({"name": "widget", "qty": 3})));
    let response = relayer.relay(request).await.unwrap();
    assert_eq!(response.status_code, 201);

    let seen = upstream.last_request();
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.header("content-type"), Some("application/json"));
    let sent: Value = serde_json::from_slice(&seen.body).unwrap();
    assert_eq!(sent, json!({"name": "widget", "qty": 3}));
}

#[tokio::test]
async fn test_raw_body_is_sent_verbatim() {
    let upstream = start_fixed_upstream(MockResponse::text(200, "stored")).await;
    let relayer = relayer(&[("api", upstream.base_url())]);

    let request = RelayRequest::get("api", "/blob")
        .with_method(HttpMethod::Put)
        .with_header("Content-Type", "text/csv")
        .with_body(RelayBody::Raw("a,b\n1,2".to_string()));
    relayer.relay(request).await.unwrap();

    let seen = upstream.last_request();
    assert_eq!(seen.method, "PUT");
    assert_eq!(seen.body, b"a,b\n1,2");
    assert_eq!(seen.header("content-type"), Some("text/csv"));
}

#[tokio::test]
async fn test_unknown_service_makes_no_call() {
    let upstream = start_fixed_upstream(MockResponse::json(200, "{}")).await;
    let relayer = relayer(&[("known", upstream.base_url())]);

    let err = relayer
        .relay(RelayRequest::get("unknown", "/"))
        .await
        .unwrap_err();

    assert!(matches!(err, RelayError::UnknownService(_)));
    assert_eq!(err.status_code().as_u16(), 404);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(upstream.hits(), 0);
}

#[tokio::test]
async fn test_timeout_maps_to_gateway_timeout() {
    let upstream = start_fixed_upstream(
        MockResponse::json(200, "{}").delayed(Duration::from_secs(3)),
    )
    .await;
    let relayer = relayer(&[("slow", upstream.base_url())]);

    let request = RelayRequest::get("slow", "/wait").with_timeout(0.2).unwrap();
    let err = relayer.relay(request).await.unwrap_err();

    assert!(matches!(err, RelayError::Timeout(_)), "got {:?}", err);
    assert_eq!(err.status_code().as_u16(), 504);
    assert!(!err.to_string().is_empty());

    // Registry is unaffected by the failure.
    assert_eq!(relayer.registry().lookup("slow"), Ok(upstream.base_url().as_str()));
}

#[tokio::test]
async fn test_connection_refused_maps_to_bad_gateway() {
    let addr = closed_addr().await;
    let relayer = relayer(&[("down", format!("http://{}", addr))]);

    let err = relayer
        .relay(RelayRequest::get("down", "/"))
        .await
        .unwrap_err();

    assert!(matches!(err, RelayError::Upstream(_)), "got {:?}", err);
    assert_eq!(err.status_code().as_u16(), 502);
}

#[tokio::test]
async fn test_invalid_header_maps_to_bad_gateway() {
    let upstream = start_fixed_upstream(MockResponse::json(200, "{}")).await;
    let relayer = relayer(&[("api", upstream.base_url())]);

    let request = RelayRequest::get("api", "/").with_header("bad header", "x");
    let err = relayer.relay(request).await.unwrap_err();
    assert!(matches!(err, RelayError::Upstream(_)));
}

#[tokio::test]
async fn test_base_url_path_is_kept() {
    let upstream = start_fixed_upstream(MockResponse::json(200, "[]")).await;
    let relayer = relayer(&[("v2", format!("{}/api/v2/", upstream.base_url()))]);

    relayer
        .relay(RelayRequest::get("v2", "/users/42"))
        .await
        .unwrap();

    assert_eq!(upstream.last_request().target, "/api/v2/users/42");
}

#[tokio::test]
async fn test_upstream_error_status_is_relayed() {
    let upstream =
        start_fixed_upstream(MockResponse::json(500, r#"{"error": "boom"}"#)).await;
    let relayer = relayer(&[("api", upstream.base_url())]);

    let response = relayer.relay(RelayRequest::get("api", "/")).await.unwrap();
    assert_eq!(response.status_code, 500);
    assert_eq!(response.body.json(), Some(&json!({"error": "boom"})));
}

#[tokio::test]
async fn test_redirects_are_not_followed() {
    let upstream = start_upstream(|request| {
        if request.target == "/old" {
            MockResponse::text(302, "").header("Location", "/new")
        } else {
            MockResponse::json(200, r#"{"moved": true}"#)
        }
    })
    .await;
    let relayer = relayer(&[("api", upstream.base_url())]);

    let response = relayer.relay(RelayRequest::get("api", "/old")).await.unwrap();

    assert_eq!(response.status_code, 302);
    assert_eq!(response.headers["location"], "/new");
    assert_eq!(upstream.requests().len(), 1);
}

#[tokio::test]
async fn test_repeated_headers_are_joined() {
    let upstream = start_fixed_upstream(
        MockResponse::text(200, "ok")
            .header("Set-Cookie", "a=1")
            .header("Set-Cookie", "b=2"),
    )
    .await;
    let relayer = relayer(&[("api", upstream.base_url())]);

    let response = relayer.relay(RelayRequest::get("api", "/")).await.unwrap();
    assert_eq!(response.headers["set-cookie"], "a=1, b=2");
}

#[tokio::test]
async fn test_json_null_body() {
    let upstream = start_fixed_upstream(MockResponse::json(200, "null")).await;
    let relayer = relayer(&[("api", upstream.base_url())]);

    let response = relayer.relay(RelayRequest::get("api", "/")).await.unwrap();
    assert_eq!(response.body, ResponseBody::Json(Value::Null));

    let doc = serde_json::to_value(&response).unwrap();
    assert!(doc["body"].is_null());
    assert!(doc["text"].is_null());
}

#[tokio::test]
async fn test_concurrent_relays_are_independent() {
    let upstream = start_upstream(|request| {
        MockResponse::json(200, &format!(r#"{{"path": "{}"}}"#, request.target))
    })
    .await;
    let relayer = relayer(&[("echo", upstream.base_url())]);

    let mut tasks = Vec::new();
    for i in 0..10 {
        let relayer = relayer.clone();
        tasks.push(tokio::spawn(async move {
            relayer
                .relay(RelayRequest::get("echo", format!("/item/{}", i)))
                .await
        }));
    }

    for (i, task) in tasks.into_iter().enumerate() {
        let response = task.await.unwrap().unwrap();
        assert_eq!(response.body.json(), Some(&json!({"path": format!("/item/{}", i)})));
    }
}

#[tokio::test]
async fn test_path_cannot_change_upstream_host() {
    let upstream = start_fixed_upstream(MockResponse::json(200, "{}")).await;
    let relayer = relayer(&[("api", upstream.base_url())]);

    for path in ["@evil.example/x", ".evil.example/x"] {
        let mut request = RelayRequest::get("api", "/");
        request.path = path.to_string();
        let err = relayer.relay(request).await.unwrap_err();
        assert!(matches!(err, RelayError::Upstream(_)), "got {:?}", err);
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(upstream.hits(), 0);
}

#[tokio::test]
async fn test_text_uses_declared_charset() {
    let upstream = start_fixed_upstream(MockResponse::bytes(
        200,
        "text/plain; charset=iso-8859-1",
        b"caf\xE9",
    ))
    .await;
    let relayer = relayer(&[("legacy", upstream.base_url())]);

    let response = relayer.relay(RelayRequest::get("legacy", "/")).await.unwrap();
    assert_eq!(response.body.text(), Some("café"));
}

#[tokio::test]
async fn test_text_without_charset_is_utf8() {
    let upstream =
        start_fixed_upstream(MockResponse::bytes(200, "text/plain", "naïve".as_bytes())).await;
    let relayer = relayer(&[("api", upstream.base_url())]);

    let response = relayer.relay(RelayRequest::get("api", "/")).await.unwrap();
    assert_eq!(response.body.text(), Some("naïve"));
}

#[tokio::test]
async fn test_values_are_sent_untrimmed() {
    let upstream = start_fixed_upstream(MockResponse::json(200, "{}")).await;
    let relayer = relayer(&[("api", upstream.base_url())]);

    let request: RelayRequest = serde_json::from_value(json!({
        "service": " api ",
        "path": " /echo ",
        "method": "POST",
        "query_params": {"q": " padded "},
        "headers": {"x-note": "tail  "},
        "raw_body": "  body  "
    }))
    .unwrap();
    relayer.relay(request).await.unwrap();

    let seen = upstream.last_request();
    assert_eq!(seen.target, "/echo?q=+padded+");
    assert_eq!(seen.body, b"  body  ");
}
