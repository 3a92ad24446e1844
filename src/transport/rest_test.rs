use super::*;

#[test]
fn join_url_adds_single_slash() {
    assert_eq!(join_url("https://api.example.test", "openai"), "https://api.example.test/openai");
    assert_eq!(join_url("https://api.example.test/", "/health"), "https://api.example.test/health");
    assert_eq!(join_url("https://api.example.test//", "health"), "https://api.example.test/health");
}

#[test]
fn client_strips_trailing_slashes_from_base() {
    let client = RestClient::new("http://localhost:8787///").unwrap();
    assert_eq!(client.url(HEALTH_PATH), "http://localhost:8787/health");
    assert_eq!(client.url(GENERATE_PATH), "http://localhost:8787/openai");
}

#[test]
fn generate_request_body_shape() {
    let body = serde_json::to_value(GenerateRequest { message: "hello" }).unwrap();
    assert_eq!(body, serde_json::json!({ "message": "hello" }));
}

#[test]
fn parse_generate_success() {
    let json = serde_json::json!({ "content": "hi", "model": "m1", "finishReason": "stop" }).to_string();
    let msg = parse_generate_response(200, &json).unwrap();
    assert_eq!(
        msg,
        AIMessage { content: "hi".into(), model: "m1".into(), finish_reason: Some("stop".into()) }
    );
}

#[test]
fn parse_generate_without_finish_reason() {
    let json = serde_json::json!({ "content": "hi", "model": "m1" }).to_string();
    let msg = parse_generate_response(200, &json).unwrap();
    assert_eq!(msg.finish_reason, None);
}

#[test]
fn parse_generate_server_error_carries_status_and_body() {
    let err = parse_generate_response(500, "boom").unwrap_err();
    match err {
        TransportError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body.as_deref(), Some("boom"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn parse_generate_error_with_empty_body() {
    let err = parse_generate_response(404, "").unwrap_err();
    assert!(matches!(err, TransportError::Status { status: 404, body: None }));
}

#[test]
fn parse_no_content_is_empty_success() {
    let msg = parse_generate_response(204, "").unwrap();
    assert_eq!(msg, AIMessage::default());
}

#[test]
fn parse_invalid_json_is_parse_error() {
    let err = parse_generate_response(200, "<html>").unwrap_err();
    assert!(matches!(err, TransportError::Parse(_)));
}

#[test]
fn parse_health_maps_message_and_model() {
    let json = serde_json::json!({ "message": "Worker online", "model": "gpt-4o-mini" }).to_string();
    let status = parse_health_response(200, &json).unwrap();
    assert_eq!(status.message, "Worker online");
    assert_eq!(status.model.as_deref(), Some("gpt-4o-mini"));
}

#[test]
fn parse_health_null_model() {
    let json = serde_json::json!({ "message": "Worker online", "model": null }).to_string();
    let status = parse_health_response(200, &json).unwrap();
    assert_eq!(status.model, None);
}

#[test]
fn parse_health_failure_status() {
    let err = parse_health_response(503, "down").unwrap_err();
    assert_eq!(err.to_string(), "request failed with status 503: down");
}

// Over the wire, against a one-shot local stub.

use crate::transport::test_helpers::{direct_client, serve_once};

#[tokio::test]
async fn generate_posts_message_json_to_openai() {
    let (base, server) = serve_once(200, r#"{"content":"hi there","model":"m1","finishReason":"stop"}"#).await;
    let client = RestClient::with_client(direct_client(), &base);

    let reply = client.generate("hello").await.unwrap();
    let request = server.await.unwrap();

    assert_eq!(request.request_line, "POST /openai HTTP/1.1");
    assert!(request.header("content-type").unwrap().starts_with("application/json"));
    assert_eq!(request.json(), serde_json::json!({ "message": "hello" }));
    assert_eq!(reply.content, "hi there");
    assert_eq!(reply.model, "m1");
    assert_eq!(reply.finish_reason.as_deref(), Some("stop"));
}

#[tokio::test]
async fn fetch_status_gets_health_path() {
    let (base, server) = serve_once(200, r#"{"message":"Worker online","model":"m1"}"#).await;
    let client = RestClient::with_client(direct_client(), &base);

    let snapshot = client.fetch_status().await.unwrap();
    let request = server.await.unwrap();

    assert_eq!(request.request_line, "GET /health HTTP/1.1");
    assert!(request.body.is_empty());
    assert_eq!(snapshot.status.message, "Worker online");
    assert_eq!(snapshot.health.status, "Worker online");
}

#[tokio::test]
async fn server_error_over_http_keeps_status_and_body() {
    let (base, server) = serve_once(500, "boom").await;
    let client = RestClient::with_client(direct_client(), &base);

    let err = client.generate("hello").await.unwrap_err();
    server.await.unwrap();

    match err {
        TransportError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body.as_deref(), Some("boom"));
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn no_content_over_http_is_empty_reply() {
    let (base, server) = serve_once(204, "").await;
    let client = RestClient::with_client(direct_client(), &base);

    let reply = client.generate("hello").await.unwrap();
    let request = server.await.unwrap();

    assert_eq!(request.request_line, "POST /openai HTTP/1.1");
    assert_eq!(reply, AIMessage::default());
}
