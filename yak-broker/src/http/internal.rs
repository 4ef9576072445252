use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use yak_core::{Message, Offset, TopicName};
use yak_coordinator::Coordinator;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReplicateRequest {
    topic: String,
    message: Message,
}

/// `POST /internal/replicate` — idempotent by offset. Unknown topics are
/// rejected: followers never auto-create.
pub async fn replicate(State(state): State<Arc<AppState>>, Json(req): Json<ReplicateRequest>) -> Result<Json<Value>, AppError> {
    let topic = TopicName::parse(req.topic).map_err(|e| AppError::MalformedRequest(e.to_string()))?;
    if !state.log_store.has_topic(&topic) {
        return Err(AppError::UnknownTopic(topic.as_str().to_string()));
    }

    let already_present = state.log_store.read_all(&topic)?.iter().any(|m| m.offset == req.message.offset);
    if !already_present {
        state.log_store.append(&topic, &req.message)?;
        let key = yak_core::keys::follower_hwm(state.me.broker_id, &topic);
        state.coordinator.set(&key, &req.message.offset.get().to_string()).await?;
    }

    Ok(Json(json!({
        "status": "replicated",
        "topic": topic.as_str(),
        "offset": req.message.offset.get(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct CatchupRequest {
    topic: String,
    from_offset: u64,
}

/// `POST /internal/catchup` — returns every local message past `from_offset`,
/// in offset order.
pub async fn catchup(State(state): State<Arc<AppState>>, Json(req): Json<CatchupRequest>) -> Result<Json<Value>, AppError> {
    let topic = TopicName::parse(req.topic).map_err(|e| AppError::MalformedRequest(e.to_string()))?;
    if !state.log_store.has_topic(&topic) {
        return Err(AppError::UnknownTopic(topic.as_str().to_string()));
    }

    let from_offset = Offset(req.from_offset);
    let messages: Vec<_> = state
        .log_store
        .read_all(&topic)?
        .into_iter()
        .filter(|m| m.offset > from_offset)
        .collect();

    Ok(Json(json!({
        "status": "ok",
        "topic": topic.as_str(),
        "messages": messages,
    })))
}
