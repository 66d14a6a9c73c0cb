//! Integration tests for the HTTP dialogue service

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // for oneshot
use uuid::Uuid;
use voyage_dialogue::DialogueOrchestrator;
use voyage_domain::TransportKind;
use voyage_extractor::{EntityExtractor, ExtractionClient, ExtractorConfig, FallbackExtractor};
use voyage_llm::{MockProvider, RateLimiter};
use voyage_routes::{MockRouteService, MultiLegComposer, RoutesConfig};
use voyage_server::handlers::{create_router, AppState, HealthCheckResponse};
use voyage_server::service::DialogueService;

/// Helper to create a router over mock extraction and transit services
fn create_test_app() -> Router {
    let config = ExtractorConfig {
        max_rps: 1000.0,
        throttle_secs: 0.0,
        request_timeout_secs: 1,
        max_retry_after_secs: 1.0,
    };
    let limiter = Arc::new(RateLimiter::new(config.max_rps).unwrap());
    let client = ExtractionClient::new(Arc::new(MockProvider::unconfigured()), limiter, config);
    let extractor = EntityExtractor::new(client, FallbackExtractor::new());

    let routes = Arc::new(
        MockRouteService::new()
            .with_city("Moscow", "c213")
            .with_city("Saint Petersburg", "c2")
            .with_route(
                "c213",
                "c2",
                vec![
                    MockRouteService::segment(
                        TransportKind::Train,
                        "Moscow",
                        "Saint Petersburg",
                        1746048900,
                        14400.0,
                    ),
                    MockRouteService::segment(
                        TransportKind::Plane,
                        "Moscow",
                        "Saint Petersburg",
                        1746060000,
                        5400.0,
                    ),
                ],
            ),
    );
    let config = RoutesConfig::default();
    let composer = MultiLegComposer::from_services(Arc::clone(&routes), routes, &config);
    let service = DialogueService::new(DialogueOrchestrator::new(extractor, composer));

    create_router(AppState {
        conversation: Arc::new(service),
    })
}

async fn post(app: &Router, body: Value) -> (StatusCode, Option<Value>) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/request")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).ok())
}

async fn health(app: &Router) -> HealthCheckResponse {
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_check_endpoint() {
    let app = create_test_app();
    let health = health(&app).await;
    assert_eq!(health.status, "healthy");
    assert_eq!(health.sessions, 0);
}

#[tokio::test]
async fn test_dialogue_over_http() {
    let app = create_test_app();
    let id = Uuid::new_v4().to_string();

    let (status, reply) = post(&app, json!({"id": id, "text": "from Moscow"})).await;
    assert_eq!(status, StatusCode::OK);
    let reply = reply.unwrap();
    assert_eq!(reply["type"], "message");
    assert!(reply["text"].as_str().unwrap().contains("from: Moscow"));
    assert_eq!(health(&app).await.sessions, 1);

    let (_, reply) = post(&app, json!({"session_id": id, "text": "to Saint Petersburg"})).await;
    assert_eq!(reply.unwrap()["type"], "message");

    let (status, reply) = post(&app, json!({"sessionId": id, "text": "May 1 2025"})).await;
    assert_eq!(status, StatusCode::OK);
    let reply = reply.unwrap();
    assert_eq!(reply["type"], "schedule");

    let objects = reply["objects"].as_array().unwrap();
    assert_eq!(objects.len(), 2);
    assert_eq!(objects[0]["type"], "plane");
    assert_eq!(objects[0]["place_start"], "Moscow");
    assert_eq!(objects[1]["time_start_utc"], 1746048900);

    // The finished request no longer counts as open
    assert_eq!(health(&app).await.sessions, 0);
}

#[tokio::test]
async fn test_empty_text_is_bad_request() {
    let app = create_test_app();
    let (status, body) = post(&app, json!({"id": Uuid::new_v4().to_string(), "text": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.unwrap()["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn test_malformed_session_id_is_rejected() {
    let app = create_test_app();
    let (status, _) = post(&app, json!({"id": "not-a-uuid", "text": "from Moscow"})).await;
    assert!(status.is_client_error());

    let (status, _) = post(&app, json!({"text": "from Moscow"})).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = create_test_app();
    let request = Request::builder()
        .uri("/api/unknown")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
