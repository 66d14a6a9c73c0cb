//! HTTP request handlers for the dialogue service.
//!
//! Implements the request and health check endpoints using axum.

use crate::service::Conversation;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;
use voyage_dialogue::texts::APOLOGY_MESSAGE;
use voyage_dialogue::Reply;
use voyage_domain::SessionId;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Conversation backend
    pub conversation: Arc<dyn Conversation>,
}

/// User message request
#[derive(Debug, Deserialize)]
pub struct UserRequest {
    /// Session identifier
    #[serde(alias = "session_id", alias = "sessionId")]
    pub id: Uuid,

    /// Message text
    pub text: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Sessions with an open request
    pub sessions: usize,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Request was well-formed JSON but unusable
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

/// POST /api/request - Handle one user message
///
/// The dialogue runs on the blocking pool; a panicked turn yields the
/// apology reply.
async fn process_request(
    State(state): State<AppState>,
    Json(request): Json<UserRequest>,
) -> Result<Json<Reply>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::BadRequest("text must not be empty".to_string()));
    }

    let session = SessionId::from_uuid(request.id);
    info!(%session, "Request received");

    let conversation = Arc::clone(&state.conversation);
    let text = request.text;
    let turn = tokio::task::spawn_blocking(move || conversation.handle_message(session, &text));
    let reply = match turn.await {
        Ok(reply) => reply,
        Err(e) => {
            error!(%session, error = %e, "Dialogue task failed");
            Reply::message(APOLOGY_MESSAGE)
        }
    };

    Ok(Json(reply))
}

/// GET /health - Liveness and open session count
async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        sessions: state.conversation.session_count(),
    })
}

/// Create the axum router with all routes
///
/// Requests from any origin are accepted and every request is traced.
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/api/request", post(process_request))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt; // for oneshot

    struct PanickingConversation;

    impl Conversation for PanickingConversation {
        fn handle_message(&self, _session: SessionId, _text: &str) -> Reply {
            panic!("orchestrator bug");
        }

        fn session_count(&self) -> usize {
            0
        }
    }

    fn request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/request")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_panicked_turn_yields_apology() {
        let app = create_router(AppState {
            conversation: Arc::new(PanickingConversation),
        });

        let body = format!(r#"{{"id": "{}", "text": "hello"}}"#, Uuid::new_v4());
        let response = app.oneshot(request(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let reply: Reply = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(reply, Reply::message(APOLOGY_MESSAGE));
    }

    #[tokio::test]
    async fn test_cross_origin_requests_are_allowed() {
        let app = create_router(AppState {
            conversation: Arc::new(PanickingConversation),
        });

        let request = Request::builder()
            .uri("/health")
            .header("origin", "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );

        let preflight = Request::builder()
            .method("OPTIONS")
            .uri("/api/request")
            .header("origin", "http://localhost:3000")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(preflight).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("access-control-allow-methods"));
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected() {
        let app = create_router(AppState {
            conversation: Arc::new(PanickingConversation),
        });

        let body = format!(r#"{{"id": "{}", "text": "   "}}"#, Uuid::new_v4());
        let response = app.oneshot(request(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
