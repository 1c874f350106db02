//! `POST /api/chat`: answer one question.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::api::server::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub input: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub saved_to_db: bool,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return error_response(rejection.status(), &rejection.body_text()),
    };

    let input = match request.input.as_deref().map(str::trim) {
        Some(input) if !input.is_empty() => input,
        _ => return error_response(StatusCode::BAD_REQUEST, "Input is required."),
    };

    state.history.record(input);

    match state.resolver.resolve(input).await {
        Ok(resolution) => {
            let body = ChatResponse {
                saved_to_db: resolution.saved_to_db(),
                response: resolution.answer,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) if e.is_client_error() => error_response(StatusCode::BAD_REQUEST, &e.to_string()),
        Err(e) => {
            error!("Chat request failed: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to resolve question.",
            )
        }
    }
}
