//! GeminiProvider against a local stand-in for the Generative Language API.

use askdocs::config::LlmConfig;
use askdocs::llm::{CompletionProvider, GeminiProvider};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct Recorded {
    keys: Arc<Mutex<Vec<String>>>,
    bodies: Arc<Mutex<Vec<Value>>>,
    actions: Arc<Mutex<Vec<String>>>,
}

async fn generate(
    State(rec): State<Recorded>,
    Path(action): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    rec.keys.lock().unwrap().push(key.clone());
    rec.bodies.lock().unwrap().push(body);
    rec.actions.lock().unwrap().push(action);

    if key != "test-key" {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": { "message": "bad key" } })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": "The cat sat " }, { "text": "on the mat. [pets.txt]" }]
                }
            }]
        })),
    )
}

async fn models(headers: HeaderMap) -> StatusCode {
    match headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) {
        Some("test-key") => StatusCode::OK,
        _ => StatusCode::FORBIDDEN,
    }
}

async fn start_mock() -> (String, Recorded) {
    let rec = Recorded::default();
    let app = Router::new()
        .route("/v1beta/models", get(models))
        .route("/v1beta/models/{action}", post(generate))
        .with_state(rec.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    (format!("http://{}/", addr), rec)
}

fn llm_config(base_url: &str) -> LlmConfig {
    LlmConfig {
        provider: "gemini".to_string(),
        model: "gemini-test".to_string(),
        base_url: base_url.to_string(),
        ..LlmConfig::default()
    }
}

#[tokio::test]
async fn test_complete_sends_prompt_and_joins_parts() {
    let (base, rec) = start_mock().await;
    let provider = GeminiProvider::with_api_key(&llm_config(&base), "test-key").unwrap();

    let answer = provider.complete("Question: where is the cat?").await.unwrap();
    assert_eq!(answer, "The cat sat on the mat. [pets.txt]");
    assert_eq!(provider.model_name(), "gemini-test");

    assert_eq!(rec.actions.lock().unwrap()[0], "gemini-test:generateContent");
    assert_eq!(rec.keys.lock().unwrap()[0], "test-key");
    let body = rec.bodies.lock().unwrap()[0].clone();
    assert_eq!(
        body["contents"][0]["parts"][0]["text"],
        "Question: where is the cat?"
    );
}

#[tokio::test]
async fn test_complete_surfaces_http_errors() {
    let (base, _rec) = start_mock().await;
    let provider = GeminiProvider::with_api_key(&llm_config(&base), "wrong").unwrap();

    let err = provider.complete("hello").await.unwrap_err();
    assert!(err.to_string().contains("403"), "got: {}", err);
}

#[tokio::test]
async fn test_ping() {
    let (base, _rec) = start_mock().await;

    let good = GeminiProvider::with_api_key(&llm_config(&base), "test-key").unwrap();
    assert!(good.ping().await.is_ok());

    let bad = GeminiProvider::with_api_key(&llm_config(&base), "wrong").unwrap();
    assert!(bad.ping().await.is_err());
}

#[tokio::test]
async fn test_unreachable_host_is_an_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let base = format!("http://127.0.0.1:{}", port);
    let provider = GeminiProvider::with_api_key(&llm_config(&base), "test-key").unwrap();

    assert!(provider.complete("hello").await.is_err());
    assert!(provider.ping().await.is_err());
}

#[test]
fn test_missing_key_env_is_an_error() {
    let config = LlmConfig {
        api_key_env: "ASKDOCS_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
        ..LlmConfig::default()
    };
    let err = GeminiProvider::new(&config).err().unwrap();
    assert_eq!(
        err.to_string(),
        "ASKDOCS_TEST_KEY_THAT_IS_NEVER_SET environment variable not set"
    );
}
