//! Health endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::api::server::AppState;

/// GET /api/health — version, store size and cache policy.
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let resolver = &state.resolver;
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "entries": resolver.store().load().len(),
        "persistNewAnswers": resolver.persist_new_answers(),
    }))
}
