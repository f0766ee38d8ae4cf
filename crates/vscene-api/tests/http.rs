//! HTTP surface integration tests.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vscene_analyzer::{Analyzer, AnalyzerConfig};
use vscene_api::{create_router, ApiConfig, AppState};
use vscene_pipeline::{Pipeline, PipelineConfig};

fn test_router(temp_root: &TempDir) -> Router {
    let pipeline_config = PipelineConfig {
        temp_root: temp_root.path().to_path_buf(),
        download_timeout: Duration::from_secs(5),
        ..PipelineConfig::default()
    };
    let http = reqwest::Client::new();
    let analyzer = Analyzer::new(AnalyzerConfig::default(), http.clone());
    let pipeline = Pipeline::new(pipeline_config, analyzer, http.clone());
    let state = AppState::new(ApiConfig::default(), pipeline, http);
    create_router(state, None)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_status_and_version() {
    let root = TempDir::new().unwrap();
    let app = test_router(&root);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn status_reports_configured_limits() {
    let root = TempDir::new().unwrap();
    let app = test_router(&root);

    let response = app
        .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["workers"], 4);
    assert_eq!(body["max_frames"], 200);
    assert_eq!(body["max_video_duration_seconds"], 300.0);
    assert_eq!(body["default_frame_interval_seconds"], 2.0);
}

#[tokio::test]
async fn analyze_rejects_unsupported_scheme() {
    let root = TempDir::new().unwrap();
    let app = test_router(&root);

    let response = app
        .oneshot(json_request(
            "/analyze",
            json!({"video_url": "ftp://example.com/clip.mp4"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("scheme"));
}

#[tokio::test]
async fn analyze_rejects_out_of_range_interval() {
    let root = TempDir::new().unwrap();
    let app = test_router(&root);

    let response = app
        .oneshot(json_request(
            "/analyze",
            json!({
                "video_url": "https://example.com/clip.mp4",
                "frame_interval_seconds": 0.0
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn analyze_maps_download_failure_with_stage() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/clip.mp4"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let app = test_router(&root);

    let response = app
        .oneshot(json_request(
            "/analyze",
            json!({"video_url": format!("{}/clip.mp4", server.uri())}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "download_failure");
    assert_eq!(body["stage"], "downloading");
}

#[tokio::test]
async fn submit_rejects_invalid_request_synchronously() {
    let root = TempDir::new().unwrap();
    let app = test_router(&root);

    let response = app
        .oneshot(json_request(
            "/analyze/submit",
            json!({"video_url": "", "callbacks": []}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn submit_acknowledges_and_delivers_terminal_callback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/clip.mp4"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let root = TempDir::new().unwrap();
    let app = test_router(&root);

    let response = app
        .oneshot(json_request(
            "/analyze/submit",
            json!({
                "video_url": format!("{}/clip.mp4", server.uri()),
                "callbacks": [{"url": format!("{}/hook", server.uri()), "method": "POST"}]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "accepted");
    assert!(body["job_id"].is_string());

    // The run happens in a detached task; wait for the callback to land.
    let mut delivered = false;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let received = server.received_requests().await.unwrap();
        if let Some(hook) = received.iter().find(|r| r.url.path() == "/hook") {
            let payload: Value = serde_json::from_slice(&hook.body).unwrap();
            assert_eq!(payload["status"], "failed");
            assert_eq!(payload["error"]["kind"], "download_failure");
            assert_eq!(payload["job_id"], body["job_id"]);
            delivered = true;
            break;
        }
    }
    assert!(delivered, "callback was never delivered");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let root = TempDir::new().unwrap();
    let app = test_router(&root);

    let response = app
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
