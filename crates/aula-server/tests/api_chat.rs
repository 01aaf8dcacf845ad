mod common;

use aula_server::api::ChatResponse;
use aula_server::app;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use common::{events, model_reply, EventLog, Harness, HarnessOptions};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

fn setup_app(options: HarnessOptions) -> (Router, TempDir, EventLog) {
    let (state, dir, log) = Harness::new(options).into_state();
    (app(state), dir, log)
}

fn post_chat(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn root_reports_liveness() {
    let (app, _dir, _log) = setup_app(HarnessOptions::default());

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(!body.is_empty());
}

#[tokio::test]
async fn health_check_returns_ok() {
    let (app, _dir, _log) = setup_app(HarnessOptions::default());

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn chat_returns_assembled_messages() {
    let (app, _dir, log) = setup_app(HarnessOptions {
        reply: model_reply(&["Hola, soy tu asistente.", "¿En qué te ayudo?"]),
        ..HarnessOptions::default()
    });

    let response = app
        .oneshot(post_chat(r#"{"message": "Hola"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    let messages = json["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["text"], "Hola, soy tu asistente.");
    assert_eq!(messages[0]["facialExpression"], "smile");
    assert_eq!(messages[0]["animation"], "Talking_0");
    assert!(!messages[0]["audio"].as_str().unwrap().is_empty());
    assert!(messages[0]["lipsync"]["mouthCues"].is_array());

    let parsed: ChatResponse = serde_json::from_value(json).unwrap();
    assert_eq!(parsed.messages[1].text, "¿En qué te ayudo?");
    assert_eq!(events(&log).len(), 1 + 2 * 3);
}

#[tokio::test]
async fn chat_without_message_returns_intro() {
    let (app, _dir, log) = setup_app(HarnessOptions::default());

    let response = app.oneshot(post_chat("{}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed: ChatResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(parsed.messages.len(), 2);
    assert_eq!(parsed.messages[0].text, "Hey dear... How was your day?");
    assert!(events(&log).is_empty());
}

#[tokio::test]
async fn bodyless_chat_returns_intro() {
    let (app, _dir, log) = setup_app(HarnessOptions::default());

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/chat")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed: ChatResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(parsed.messages.len(), 2);
    assert_eq!(parsed.messages[0].text, "Hey dear... How was your day?");
    assert!(events(&log).is_empty());
}

#[tokio::test]
async fn malformed_chat_body_is_a_typed_bad_request() {
    let (app, _dir, log) = setup_app(HarnessOptions::default());

    for body in [r#"{"message": 5}"#, "{\"message\": \"Hola\""] {
        let response = app.clone().oneshot(post_chat(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(json["kind"], "invalid_request");
        assert!(json["error"].as_str().unwrap().starts_with("invalid input"));
    }
    assert!(events(&log).is_empty());
}

#[tokio::test]
async fn invalid_model_reply_is_bad_gateway() {
    let (app, _dir, log) = setup_app(HarnessOptions {
        reply: r#"{"answer": "hola"}"#.to_string(),
        ..HarnessOptions::default()
    });

    let response = app
        .oneshot(post_chat(r#"{"message": "Hola"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["kind"], "model_response_invalid");
    assert!(json["error"].as_str().unwrap().contains("unexpected shape"));
    assert_eq!(events(&log), ["model"]);
}

#[tokio::test]
async fn synthesis_failure_is_reported_without_partial_messages() {
    let (app, _dir, _log) = setup_app(HarnessOptions {
        reply: model_reply(&["Uno", "Dos"]),
        fail_synthesis_on: Some(0),
        ..HarnessOptions::default()
    });

    let response = app
        .oneshot(post_chat(r#"{"message": "Hola"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["kind"], "synthesis");
    assert!(json.get("messages").is_none());
}

#[tokio::test]
async fn voices_proxies_provider_listing() {
    let (app, _dir, log) = setup_app(HarnessOptions::default());

    let response = app.oneshot(get("/voices")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["voices"][0]["voice_id"], "86V9x9hrQds83qf7zaGn");
    assert_eq!(events(&log), ["list_voices"]);
}

#[tokio::test]
async fn voices_without_speech_key_is_unavailable() {
    let (app, _dir, _log) = setup_app(HarnessOptions {
        with_speech: false,
        ..HarnessOptions::default()
    });

    let response = app.oneshot(get("/voices")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["kind"], "not_configured");
}

#[tokio::test]
async fn formats_are_served_statically() {
    let (app, _dir, _log) = setup_app(HarnessOptions::default());

    let response = app
        .clone()
        .oneshot(get("/formats/constancia.pdf"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"%PDF-1.4");

    let missing = app.oneshot(get("/formats/missing.pdf")).await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let (app, _dir, _log) = setup_app(HarnessOptions::default());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}
