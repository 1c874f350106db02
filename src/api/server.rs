//! Axum HTTP server for the chat endpoint.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::history::ConversationLog;
use crate::resolver::AnswerResolver;

/// Request bodies above this size are rejected before parsing.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<AnswerResolver>,
    /// Recent inputs, for `GET /api/history`.
    pub history: Arc<ConversationLog>,
}

impl AppState {
    pub fn new(resolver: Arc<AnswerResolver>, history: Arc<ConversationLog>) -> Self {
        Self { resolver, history }
    }
}

/// Build the router. `static_dir`, when set, serves the front end for
/// every path that is not an API route.
pub fn build_router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let shared_state = Arc::new(state);

    let api = Router::new()
        .route("/api/chat", post(super::routes::chat::chat))
        .route("/api/health", get(super::routes::health::get_health))
        .route("/api/history", get(super::routes::history::get_history))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state);

    if let Some(dir) = static_dir {
        api.fallback_service(tower_http::services::ServeDir::new(dir))
    } else {
        api
    }
}

/// Bind `config.bind:config.port` and serve until the process exits.
pub async fn start_server(
    config: &ServerConfig,
    state: AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = build_router(state, config.static_dir.clone());
    let addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server is running on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::ResolverConfig;
    use crate::providers::MockAnswerGenerator;
    use crate::store::QaStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tempfile::TempDir;
    use tower::util::ServiceExt;

    /// State backed by a temp store and a mock that answers `answer`.
    pub(crate) fn test_state(answer: &'static str) -> (TempDir, AppState) {
        let tmp = TempDir::new().unwrap();
        let store = QaStore::new(tmp.path().join("database.json"));
        let mut mock = MockAnswerGenerator::new();
        mock.expect_name().return_const("mock");
        mock.expect_generate()
            .returning(move |_| Ok(answer.to_string()));
        let resolver = AnswerResolver::new(store, Arc::new(mock), &ResolverConfig::default());
        let state = AppState::new(Arc::new(resolver), Arc::new(ConversationLog::new(10)));
        (tmp, state)
    }

    #[tokio::test]
    async fn test_health_route() {
        let (_tmp, state) = test_state("x");
        let app = build_router(state, None);
        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_chat_route_round_trip() {
        let (_tmp, state) = test_state("Paris");
        let app = build_router(state, None);
        let req = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"input": "Capital of France"}"#))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["response"], "Paris");
        assert_eq!(body["savedToDb"], true);
    }

    #[tokio::test]
    async fn test_cors_preflight_allowed() {
        let (_tmp, state) = test_state("x");
        let app = build_router(state, None);
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/api/chat")
            .header("origin", "http://example.com")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert!(resp
            .headers()
            .contains_key("access-control-allow-origin"));
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let (_tmp, state) = test_state("x");
        let app = build_router(state, None);
        let big = format!(r#"{{"input": "{}"}}"#, "a".repeat(MAX_BODY_BYTES + 1));
        let req = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(big))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_static_dir_fallback() {
        let (_tmp, state) = test_state("x");
        let site = TempDir::new().unwrap();
        std::fs::write(site.path().join("index.html"), "<h1>DevBot</h1>").unwrap();
        let app = build_router(state, Some(site.path().to_path_buf()));
        let req = Request::builder()
            .uri("/index.html")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
