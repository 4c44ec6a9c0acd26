// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

//! Integration tests for the Anthropic backend and the analysis pipeline.
//!
//! Uses `wiremock` to mock HTTP endpoints so no real API is needed.

mod helpers;

use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dangle::config::{Backend, Config};
use dangle::domain::{AiAnalysisContext, DeletionAnalysisRequest, ReferenceType, Severity};
use dangle::error::Error;
use dangle::services::deleted::extract_deleted_content;
use dangle::services::deletion::DeletionAnalyzer;
use dangle::services::diff_parser::DiffParser;
use dangle::services::llm::{LlmClient, anthropic::AnthropicClient, create_client};
use helpers::{CALCULATE_SUM_DIFF, MAIN_GO, make_codebase, make_file};

// ─── Test helpers ────────────────────────────────────────────────────────────

fn anthropic_config(server_url: &str) -> Config {
    Config {
        backend: Backend::Anthropic,
        model: "claude-sonnet-4-20250514".into(),
        anthropic_base_url: Some(format!("{server_url}/v1")),
        api_key: Some("test-key".into()),
        timeout_secs: 5,
        max_retries: 0,
        ..Config::default()
    }
}

/// Anthropic SSE body streaming `chunks` as text deltas, then stopping.
fn sse_body(chunks: &[&str]) -> String {
    let mut lines = vec![
        "event: message_start".to_string(),
        r#"data: {"type":"message_start","message":{"id":"msg_1"}}"#.to_string(),
        String::new(),
    ];
    for chunk in chunks {
        let data = serde_json::json!({
            "type": "content_block_delta",
            "index": 0,
            "delta": {"type": "text_delta", "text": chunk}
        });
        lines.push("event: content_block_delta".into());
        lines.push(format!("data: {data}"));
        lines.push(String::new());
    }
    lines.push("event: message_stop".into());
    lines.push(r#"data: {"type":"message_stop"}"#.into());
    lines.push(String::new());
    lines.join("\n")
}

fn context() -> AiAnalysisContext {
    AiAnalysisContext {
        system_prompt: "system".into(),
        user_prompt: "analyze".into(),
        ..AiAnalysisContext::default()
    }
}

const RESULT_JSON: &str = r#"{"orphaned_references":[{"deleted_entity":"CalculateSum","referencing_file":"main.go","referencing_lines":[6],"reference_type":"function_call","context":"result := CalculateSum(1, 2)","severity":"error","suggestion":"Restore it"}],"safe_deletions":[],"warnings":[],"summary":"Still called.","confidence":0.92}"#;

// ─── Streaming ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn streamed_json_is_assembled_and_parsed() {
    let server = MockServer::start().await;
    let (head, tail) = RESULT_JSON.split_at(60);

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(serde_json::json!({
            "model": "claude-sonnet-4-20250514",
            "system": "system",
            "stream": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_body(&[head, tail])))
        .expect(1)
        .mount(&server)
        .await;

    let client = AnthropicClient::new(&anthropic_config(&server.uri())).unwrap();
    let result = client
        .analyze_deletions(&context(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.orphaned_references.len(), 1);
    let reference = &result.orphaned_references[0];
    assert_eq!(reference.reference_type, ReferenceType::FunctionCall);
    assert_eq!(reference.severity, Severity::Error);
    assert!((result.confidence - 0.92).abs() < f64::EPSILON);
    assert!(result.has_errors());
}

#[tokio::test]
async fn fenced_reply_is_accepted() {
    let server = MockServer::start().await;
    let reply = format!("Here you go:\n```json\n{RESULT_JSON}\n```");

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_body(&[&reply])))
        .mount(&server)
        .await;

    let client = AnthropicClient::new(&anthropic_config(&server.uri())).unwrap();
    let result = client
        .analyze_deletions(&context(), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(result.summary, "Still called.");
}

#[tokio::test]
async fn prose_reply_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(sse_body(&["I cannot tell from this."])),
        )
        .mount(&server)
        .await;

    let client = AnthropicClient::new(&anthropic_config(&server.uri())).unwrap();
    let err = client
        .analyze_deletions(&context(), CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidResponse(_)));
}

#[tokio::test]
async fn empty_stream_is_a_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_body(&[])))
        .mount(&server)
        .await;

    let client = AnthropicClient::new(&anthropic_config(&server.uri())).unwrap();
    let err = client
        .analyze_deletions(&context(), CancellationToken::new())
        .await
        .unwrap_err();
    match err {
        Error::Provider { provider, message } => {
            assert_eq!(provider, "anthropic");
            assert!(message.contains("empty response"));
        }
        other => panic!("expected Provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn stream_error_event_is_a_provider_error() {
    let server = MockServer::start().await;
    let body = [
        "event: error",
        r#"data: {"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#,
        "",
    ]
    .join("\n");

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let client = AnthropicClient::new(&anthropic_config(&server.uri())).unwrap();
    let err = client
        .analyze_deletions(&context(), CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Provider { ref message, .. } if message == "Overloaded"));
}

// ─── HTTP failures and retry ─────────────────────────────────────────────────

#[tokio::test]
async fn server_error_without_retries_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let client = AnthropicClient::new(&anthropic_config(&server.uri())).unwrap();
    let err = client
        .analyze_deletions(&context(), CancellationToken::new())
        .await
        .unwrap_err();
    match err {
        Error::Provider { message, .. } => {
            assert!(message.contains("HTTP 500"), "unexpected message: {message}");
            assert!(message.contains("boom"));
        }
        other => panic!("expected Provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn transient_failure_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_body(&[RESULT_JSON])))
        .with_priority(2)
        .mount(&server)
        .await;

    let config = Config {
        max_retries: 1,
        ..anthropic_config(&server.uri())
    };
    let client = AnthropicClient::new(&config).unwrap();
    let result = client
        .analyze_deletions(&context(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.orphaned_references.len(), 1);
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid x-api-key"))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config {
        max_retries: 3,
        ..anthropic_config(&server.uri())
    };
    let client = AnthropicClient::new(&config).unwrap();
    let err = client
        .analyze_deletions(&context(), CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("HTTP 401"));
}

// ─── Construction and cancellation ───────────────────────────────────────────

#[test]
fn missing_api_key_is_rejected() {
    let config = Config {
        backend: Backend::Anthropic,
        api_key: None,
        ..Config::default()
    };

    match AnthropicClient::new(&config) {
        Err(Error::Provider { provider, message }) => {
            assert_eq!(provider, "anthropic");
            assert!(message.contains("API key not configured"));
        }
        Err(other) => panic!("expected Provider error, got {other:?}"),
        Ok(_) => panic!("expected an error for a missing API key"),
    }
}

#[test]
fn heuristic_backend_has_no_llm_client() {
    assert!(matches!(
        create_client(&Config::default()),
        Err(Error::Config(_))
    ));
}

#[tokio::test]
async fn cancelled_before_request() {
    let server = MockServer::start().await;
    let client = AnthropicClient::new(&anthropic_config(&server.uri())).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = client.analyze_deletions(&context(), cancel).await.unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

// ─── Full pipeline ───────────────────────────────────────────────────────────

#[tokio::test]
async fn analyzer_sends_codebase_and_deleted_code() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sse_body(&[RESULT_JSON])))
        .expect(1)
        .mount(&server)
        .await;

    let diff = DiffParser::parse(CALCULATE_SUM_DIFF).unwrap();
    let request = DeletionAnalysisRequest {
        codebase: make_codebase(vec![make_file("main.go", MAIN_GO)], None),
        deleted_content: extract_deleted_content(&diff),
        context: "Drop unused math helpers".into(),
    };

    let analyzer = DeletionAnalyzer::from_config(&anthropic_config(&server.uri())).unwrap();
    assert_eq!(analyzer.backend_name(), "anthropic");
    let result = analyzer
        .analyze_deletions(&request, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(result.orphaned_references[0].referencing_file, "main.go");

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let user = body["messages"][0]["content"].as_str().unwrap();
    assert!(user.contains("### File: main.go"));
    assert!(user.contains("### Deleted from math.go (lines 3-6, go, deletion)"));
    assert!(user.contains("Drop unused math helpers"));
    assert_eq!(body["messages"][0]["role"], "user");
}

#[tokio::test]
async fn analyzer_wraps_provider_failures() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let analyzer = DeletionAnalyzer::from_config(&anthropic_config(&server.uri())).unwrap();
    let err = analyzer
        .analyze_deletions(&DeletionAnalysisRequest::default(), CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Backend { ref backend, .. } if backend == "anthropic"));
    assert!(matches!(err.root(), Error::Provider { .. }));
}
