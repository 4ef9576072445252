use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

/// `GET /metadata/leader`.
pub async fn leader(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let leader = state.current_leader().await?;
    Ok(Json(json!({ "leader": leader })))
}

/// `GET /metadata/topics`.
pub async fn topics(State(state): State<Arc<AppState>>) -> Json<Value> {
    let topics: Vec<_> = state.log_store.list_topics().into_iter().map(|t| t.as_str().to_string()).collect();
    Json(json!({ "count": topics.len(), "topics": topics }))
}
