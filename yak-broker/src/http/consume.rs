use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use yak_core::{Offset, TopicName};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConsumeQuery {
    topic: String,
    #[serde(default)]
    offset: u64,
}

/// `GET /consume?topic=T&offset=O` — served by any broker. Returns messages
/// with `offset ≤ m.offset ≤ hwm`, read-committed.
pub async fn consume(State(state): State<Arc<AppState>>, Query(q): Query<ConsumeQuery>) -> Result<Json<Value>, AppError> {
    let topic = TopicName::parse(q.topic.clone()).map_err(|_| AppError::UnknownTopicForConsume(q.topic.clone()))?;
    if !state.log_store.has_topic(&topic) {
        return Err(AppError::UnknownTopicForConsume(q.topic));
    }

    let hwm = state.hwm.hwm(&topic).await?;
    let from = Offset(q.offset.max(1));
    let messages: Vec<_> = state
        .log_store
        .read_all(&topic)?
        .into_iter()
        .filter(|m| m.offset >= from && m.offset <= hwm)
        .collect();

    Ok(Json(json!({
        "messages": messages,
        "hwm": hwm.get(),
        "total_available": hwm.get(),
    })))
}
