//! End-to-end tests for the chatbridge pipeline.
//!
//! These wire a config file through the real inference chain (pointed at
//! local stand-in model servers), the resolver, the history store, and the
//! HTTP router.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::{Json, Router, routing::post};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use chatbridge_agent::ResponseResolver;
use chatbridge_config::AppConfig;
use chatbridge_core::exchange::Exchange;
use chatbridge_core::history::HistoryBackend;
use chatbridge_gateway::{GatewayState, build_router};
use chatbridge_memory::InMemoryHistory;

// ── Stand-in model servers ───────────────────────────────────────────────

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/")
}

/// A model that is still loading.
async fn unavailable_model() -> String {
    serve(Router::new().route(
        "/",
        post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "model is loading") }),
    ))
    .await
}

/// A model that echoes the prompt followed by `continuation`.
async fn echo_model(continuation: &'static str) -> String {
    serve(Router::new().route(
        "/",
        post(move |Json(body): Json<Value>| async move {
            let prompt = body["inputs"].as_str().unwrap_or_default().to_string();
            Json(json!([{ "generated_text": format!("{prompt}{continuation}") }]))
        }),
    ))
    .await
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn load_config(dir: &tempfile::TempDir, toml: &str) -> AppConfig {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, toml).unwrap();
    AppConfig::load_from(&path).unwrap()
}

fn config_with_models(primary: &str, secondary: &str, extra: &str) -> String {
    format!(
        r#"
[history]
max_exchanges = 3

[inference]
primary_url = "{primary}"
secondary_url = "{secondary}"
timeout_secs = 2

{extra}
"#
    )
}

fn app_for(config: &AppConfig) -> (Router, Arc<dyn HistoryBackend>) {
    let provider = Arc::new(chatbridge_providers::build_from_config(config).unwrap());
    let resolver = Arc::new(ResponseResolver::from_config(config, provider));
    let history: Arc<dyn HistoryBackend> =
        Arc::new(InMemoryHistory::with_capacity(config.history.max_exchanges));
    let router = build_router(Arc::new(GatewayState::new(resolver, history.clone())));
    (router, history)
}

async fn chat(router: &Router, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/chat")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn keyword_reply_skips_the_models() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(
        &dir,
        &config_with_models("http://127.0.0.1:9/", "http://127.0.0.1:9/", ""),
    );
    let (router, history) = app_for(&config);

    let (status, body) = chat(&router, json!({ "message": "こんにちは", "user": "alice" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "こんにちは！素敵な日ですね。");
    assert_eq!(
        history.get("alice").await.unwrap(),
        vec![Exchange::new("こんにちは", "こんにちは！素敵な日ですね。")]
    );
}

#[tokio::test]
async fn primary_model_reply_is_returned_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let primary = echo_model("映画はいいですね。").await;
    let secondary = unavailable_model().await;
    let config = load_config(&dir, &config_with_models(&primary, &secondary, ""));
    let (router, _) = app_for(&config);

    let (status, body) = chat(&router, json!({ "message": "映画" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "映画はいいですね。");
    assert_eq!(body["user"], "anonymous");
}

#[tokio::test]
async fn secondary_model_output_goes_through_the_lexicon() {
    let dir = tempfile::tempdir().unwrap();
    let primary = unavailable_model().await;
    let secondary = echo_model("yes, thank you").await;
    let config = load_config(&dir, &config_with_models(&primary, &secondary, ""));
    let (router, _) = app_for(&config);

    let (status, body) = chat(&router, json!({ "message": "映画" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "はい, ありがとう");
}

#[tokio::test]
async fn both_models_down_uses_configured_canned_reply() {
    let dir = tempfile::tempdir().unwrap();
    let primary = unavailable_model().await;
    let secondary = unavailable_model().await;
    let config = load_config(
        &dir,
        &config_with_models(
            &primary,
            &secondary,
            "[responder]\ncanned = [\"少々お待ちください。\"]",
        ),
    );
    let (router, _) = app_for(&config);

    let (status, body) = chat(&router, json!({ "message": "映画", "user": "bob" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "少々お待ちください。");
}

#[tokio::test]
async fn configured_capacity_bounds_history() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(
        &dir,
        &config_with_models("http://127.0.0.1:9/", "http://127.0.0.1:9/", ""),
    );
    let (router, history) = app_for(&config);

    for greeting in ["hello 1", "hello 2", "hello 3", "hello 4"] {
        let (status, _) = chat(&router, json!({ "message": greeting, "user": "carol" })).await;
        assert_eq!(status, StatusCode::OK);
    }

    let stored = history.get("carol").await.unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(stored[0].user_message, "hello 2");

    let req = Request::builder()
        .method("POST")
        .uri("/clear_history/carol")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(history.get("carol").await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_requests_do_not_reach_history() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(&dir, "");
    let (router, history) = app_for(&config);

    let (status, body) = chat(&router, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["response"], "データが空です");

    let (status, body) = chat(&router, json!({ "message": " ", "user": "dave" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["response"], "メッセージが空です");

    assert_eq!(history.user_count().await.unwrap(), 0);
}

#[test]
fn onboard_output_loads_back_as_defaults() {
    let rendered = AppConfig::default_toml();
    let parsed: AppConfig = toml::from_str(&rendered).unwrap();

    assert_eq!(parsed.gateway.port, 5000);
    assert_eq!(parsed.history.max_exchanges, 10);
    assert_eq!(parsed.inference.prompt_template, "ユーザー: {message}\nAI: ");
    assert!(parsed.responder.keywords.is_none());
}
