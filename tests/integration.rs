use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use blame_charles::models::Config;
use blame_charles::server::{build_router, AppState, BLAME_PATH, IMAGE_PATH};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEXT_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";
const PREDICT_PATH: &str = "/v1beta/models/imagen-3.0-generate-002:predict";

fn test_config(server: &MockServer, key: Option<&str>) -> Config {
    Config {
        gemini_api_key: key.map(str::to_string),
        imagen_api_key: key.map(str::to_string),
        text_model: "gemini-2.0-flash".to_string(),
        image_model: "imagen-3.0-generate-002".to_string(),
        api_base_url: server.uri(),
        upstream_timeout: Duration::from_millis(300),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
    }
}

fn app(server: &MockServer, key: Option<&str>) -> Router {
    build_router(AppState::from_config(&test_config(server, key)))
}

async fn post(app: Router, uri: &str, body: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(
            Request::post(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn as_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn test_blame_round_trip_through_gemini() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .and(query_param("key", "test-key"))
        .and(body_string_contains("\"role\":\"user\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "X" }] },
                "finishReason": "STOP"
            }],
            "modelVersion": "gemini-2.0-flash"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = post(app(&server, Some("test-key")), BLAME_PATH, "").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        as_json(&body),
        json!({ "candidates": [{ "content": { "parts": [{ "text": "X" }] } }] })
    );
}

#[tokio::test]
async fn test_image_round_trip_through_imagen() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(PREDICT_PATH))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({ "parameters": { "sampleCount": 1 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "predictions": [{ "bytesBase64Encoded": "YWJj", "mimeType": "image/png" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = post(
        app(&server, Some("test-key")),
        IMAGE_PATH,
        r#"{"prompt":"Charles triggered the Tunguska event."}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        as_json(&body),
        json!({ "predictions": [{ "bytesBase64Encoded": "YWJj" }] })
    );
}

#[tokio::test]
async fn test_missing_key_never_calls_upstream() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (status, body) = post(app(&server, None), BLAME_PATH, "").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(as_json(&body)["error"].is_string());

    let (status, body) = post(app(&server, None), IMAGE_PATH, "{bad").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(as_json(&body)["error"].is_string());
}

#[tokio::test]
async fn test_image_bad_body_is_client_error() {
    let server = MockServer::start().await;

    let (status, body) = post(app(&server, Some("k")), IMAGE_PATH, "{bad").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, b"Invalid JSON body");

    let (status, body) = post(app(&server, Some("k")), IMAGE_PATH, r#"{"prompt":""}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, b"Missing prompt in request body.");
}

#[tokio::test]
async fn test_upstream_error_status_passes_through() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        })))
        .mount(&server)
        .await;

    let (status, body) = post(app(&server, Some("bad-key")), BLAME_PATH, "").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        as_json(&body),
        json!({ "error": "API key not valid. Please pass a valid API key." })
    );
}

#[tokio::test]
async fn test_unexpected_shape_is_contract_violation() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(PREDICT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "predictions": [] })))
        .mount(&server)
        .await;

    let (status, body) = post(app(&server, Some("k")), IMAGE_PATH, r#"{"prompt":"p"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        as_json(&body),
        json!({ "error": "Failed to generate image: Unexpected API response format." })
    );
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "candidates": [{ "content": { "parts": [{ "text": "late" }] } }]
                }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let (status, body) = post(app(&server, Some("k")), BLAME_PATH, "").await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(
        as_json(&body),
        json!({ "error": "Gemini API request timed out. Please try again." })
    );
}

#[tokio::test]
async fn test_non_json_success_is_internal_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let (status, body) = post(app(&server, Some("k")), BLAME_PATH, "").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        as_json(&body),
        json!({ "error": "Internal server error during AI generation." })
    );
}
