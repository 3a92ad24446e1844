use super::*;

#[test]
fn ai_message_reads_camel_case_finish_reason() {
    let msg: AIMessage =
        serde_json::from_str(r#"{"content":"hi","model":"m1","finishReason":"stop"}"#).unwrap();
    assert_eq!(msg.content, "hi");
    assert_eq!(msg.model, "m1");
    assert_eq!(msg.finish_reason.as_deref(), Some("stop"));
}

#[test]
fn ai_message_null_finish_reason_is_none() {
    let msg: AIMessage = serde_json::from_str(r#"{"content":"hi","model":"m1","finishReason":null}"#).unwrap();
    assert_eq!(msg.finish_reason, None);
}

#[test]
fn service_status_model_is_optional() {
    let status: ServiceStatus = serde_json::from_str(r#"{"message":"ok"}"#).unwrap();
    assert_eq!(status.model, None);
}

#[test]
fn stamped_now_mirrors_message_into_health() {
    let snapshot = StatusSnapshot::stamped_now(ServiceStatus { message: "Worker online".into(), model: None });
    assert_eq!(snapshot.health.status, "Worker online");
    assert!(chrono::DateTime::parse_from_rfc3339(&snapshot.health.timestamp).is_ok());
}

#[test]
fn status_error_includes_body_when_present() {
    let err = TransportError::status(500, "boom".into());
    assert_eq!(err.to_string(), "request failed with status 500: boom");
}

#[test]
fn status_error_drops_blank_body() {
    let err = TransportError::status(502, "  ".into());
    assert!(matches!(err, TransportError::Status { status: 502, body: None }));
    assert_eq!(err.to_string(), "request failed with status 502");
}

#[test]
fn graphql_error_joins_all_messages() {
    let err = TransportError::GraphQL { messages: vec!["bad input".into(), "try again".into()] };
    assert_eq!(err.to_string(), "graphql error: bad input; try again");
    assert_eq!(err.code(), "E_GRAPHQL");
}
