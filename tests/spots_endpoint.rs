//! Integration tests for `POST /api/get-tourist-spots`

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use tripnavi::config::Config;
use tripnavi::error::{ENTER_LOCATION_MESSAGE, SPOTS_FAILED_MESSAGE};
use tripnavi::handlers::{self, AppState};
use tripnavi::llm::{ChatGateway, GatewayError};
use tripnavi::metrics::{Endpoint, Outcome};
use tripnavi::request_log::NoopLogSink;

/// Gateway returning scripted results in order and recording prompts
struct ScriptedGateway {
    script: Mutex<Vec<Result<String, GatewayError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    fn new(mut script: Vec<Result<String, GatewayError>>) -> Arc<Self> {
        script.reverse();
        Arc::new(Self {
            script: Mutex::new(script),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatGateway for ScriptedGateway {
    async fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.script
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Ok(String::new()))
    }

    fn has_credential(&self) -> bool {
        true
    }
}

fn create_test_app(gateway: Arc<ScriptedGateway>, max_attempts: u32) -> (Router, AppState) {
    let config: Config = format!(
        r#"
[server]
host = "127.0.0.1"
port = 3000

[llm]
max_attempts = {}
retry_backoff_ms = 1
"#,
        max_attempts
    )
    .parse()
    .expect("should parse test config");

    let state = AppState::from_parts(Arc::new(config), gateway, Arc::new(NoopLogSink))
        .expect("should create AppState");
    (handlers::router(state.clone()), state)
}

fn spots_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/get-tourist-spots")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).expect("response body should be JSON")
}

#[tokio::test]
async fn test_location_lookup_returns_raw_text() {
    let gateway = ScriptedGateway::new(vec![Ok("1. 清水寺\n2. 金閣寺".to_string())]);
    let (app, state) = create_test_app(gateway.clone(), 2);

    let response = app
        .oneshot(spots_request(r#"{"location": "京都"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], "1. 清水寺\n2. 金閣寺");
    assert_eq!(
        gateway.prompts(),
        vec!["Give me the top tourist attractions in 京都.".to_string()]
    );
    assert_eq!(
        state
            .metrics()
            .requests_count(Endpoint::TouristSpots, Outcome::Success),
        1
    );
}

#[tokio::test]
async fn test_coordinate_lookup_uses_coordinate_prompt() {
    let gateway = ScriptedGateway::new(vec![Ok("皇居".to_string())]);
    let (app, _) = create_test_app(gateway.clone(), 2);

    let response = app
        .oneshot(spots_request(r#"{"lat": 35.6812, "lon": 139.7671}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        gateway.prompts()[0],
        "Give me the top tourist attractions near latitude 35.6812, longitude 139.7671."
    );
}

#[tokio::test]
async fn test_missing_input_is_client_error() {
    for body in ["{}", r#"{"location": "  "}"#, r#"{"lat": 35.0}"#, r#"{"lat": 95.0, "lon": 0.0}"#] {
        let gateway = ScriptedGateway::new(vec![]);
        let (app, _) = create_test_app(gateway.clone(), 2);

        let response = app.oneshot(spots_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(body_json(response).await["message"], ENTER_LOCATION_MESSAGE);
        assert!(gateway.prompts().is_empty());
    }
}

#[tokio::test]
async fn test_transport_failure_is_retried_once() {
    let gateway = ScriptedGateway::new(vec![
        Err(GatewayError::Network {
            reason: "connection reset".to_string(),
        }),
        Ok("東京タワー".to_string()),
    ]);
    let (app, _) = create_test_app(gateway.clone(), 2);

    let response = app
        .oneshot(spots_request(r#"{"location": "東京"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"], "東京タワー");
    assert_eq!(gateway.prompts().len(), 2);
}

#[tokio::test]
async fn test_upstream_status_is_not_retried() {
    let gateway = ScriptedGateway::new(vec![
        Err(GatewayError::UpstreamStatus {
            status: 503,
            body_preview: "overloaded".to_string(),
        }),
        Ok("never reached".to_string()),
    ]);
    let (app, state) = create_test_app(gateway.clone(), 2);

    let response = app
        .oneshot(spots_request(r#"{"location": "東京"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], SPOTS_FAILED_MESSAGE);
    assert_eq!(gateway.prompts().len(), 1);
    assert_eq!(state.metrics().gateway_failures_count("upstream_status"), 1);
}

#[tokio::test]
async fn test_wrongly_typed_body_gets_failure_envelope() {
    for body in [r#"{"lat": "north", "lon": 139.7}"#, r#"{"location": 42}"#] {
        let gateway = ScriptedGateway::new(vec![]);
        let (app, state) = create_test_app(gateway.clone(), 2);

        let response = app.oneshot(spots_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], ENTER_LOCATION_MESSAGE);
        assert!(gateway.prompts().is_empty());
        assert_eq!(
            state
                .metrics()
                .requests_count(Endpoint::TouristSpots, Outcome::ClientError),
            1
        );
    }
}
