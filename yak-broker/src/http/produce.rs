use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use yak_core::{TopicName, MAX_MESSAGE_BYTES};
use yak_runtime::Role;

use crate::error::AppError;
use crate::state::AppState;

/// Reads `topic` without consuming it — the produce path keeps it in the
/// payload so the stored record and every read response carry it (spec.md §8
/// scenario 1's literal `{"offset":1,"topic":"t","msg":"hello"}`).
fn extract_topic(body: &serde_json::Map<String, Value>) -> Result<TopicName, AppError> {
    let raw = body
        .get("topic")
        .ok_or_else(|| AppError::MalformedRequest("missing field 'topic'".into()))?;
    let name = raw
        .as_str()
        .ok_or_else(|| AppError::MalformedRequest("'topic' must be a string".into()))?;
    TopicName::parse(name).map_err(|e| AppError::MalformedRequest(e.to_string()))
}

/// `POST /register_topic` — leader-only.
pub async fn register_topic(State(state): State<Arc<AppState>>, Json(body): Json<serde_json::Map<String, Value>>) -> Result<Json<Value>, AppError> {
    if state.role() != Role::Leader {
        return Err(AppError::NotLeader {
            leader: state.current_leader().await?,
        });
    }
    let topic = extract_topic(&body)?;
    let created = state.log_store.ensure_topic(&topic)?;
    if created {
        state.hwm.init_topic(&topic).await?;
        Ok(Json(json!({"status": "ok", "topic": topic.as_str()})))
    } else {
        Ok(Json(json!({"status": "exists", "topic": topic.as_str()})))
    }
}

/// `POST /produce` — leader-only.
///
/// Assigns the offset, appends locally, fans out to live peers, then
/// advances the high-water mark — in that order.
pub async fn produce(State(state): State<Arc<AppState>>, Json(body): Json<serde_json::Map<String, Value>>) -> Result<Json<Value>, AppError> {
    if state.role() != Role::Leader {
        return Err(AppError::NotLeader {
            leader: state.current_leader().await?,
        });
    }
    let topic = extract_topic(&body)?;
    if !state.log_store.has_topic(&topic) {
        return Err(AppError::UnknownTopic(topic.as_str().to_string()));
    }
    let payload_len = serde_json::to_vec(&body).map(|bytes| bytes.len()).unwrap_or(0);
    if payload_len > MAX_MESSAGE_BYTES {
        return Err(AppError::MalformedRequest("message exceeds the maximum size".into()));
    }

    let lock = state.produce_lock(&topic);
    let _serialize_produce_path = lock.lock().await;

    let offset = state.hwm.next_offset(&topic).await?;
    let message = yak_core::Message { offset, payload: body };
    state.log_store.append(&topic, &message)?;

    let peers = state.registry.live_peers().await?;
    state.replication.fanout(&topic, &message, &peers).await;

    state.hwm.advance_hwm(&topic, offset).await?;

    Ok(Json(json!({
        "status": "ok",
        "topic": topic.as_str(),
        "offset": offset.get(),
        "hwm": offset.get(),
    })))
}
