//! Recent-input route.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::server::AppState;

const DEFAULT_LIMIT: usize = 20;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// GET /api/history?limit=N — most recent inputs, oldest first.
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Json<Value> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let entries = state.history.recent(limit);
    Json(json!({
        "capacity": state.history.capacity(),
        "entries": entries,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::server::tests::test_state;

    #[tokio::test]
    async fn test_history_empty() {
        let (_tmp, state) = test_state("x");
        let Json(body) = get_history(State(Arc::new(state)), Query(HistoryQuery::default())).await;
        assert_eq!(body["entries"].as_array().unwrap().len(), 0);
        assert_eq!(body["capacity"], 10);
    }

    #[tokio::test]
    async fn test_history_respects_limit() {
        let (_tmp, state) = test_state("x");
        for q in ["one", "two", "three"] {
            state.history.record(q);
        }
        let Json(body) = get_history(
            State(Arc::new(state)),
            Query(HistoryQuery { limit: Some(2) }),
        )
        .await;
        let entries = body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["input"], "two");
        assert_eq!(entries[1]["input"], "three");
    }
}
