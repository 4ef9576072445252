use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use yak_core::LeaseRecord;

/// Error kinds an HTTP handler can fail with.
///
/// `UnknownTopic`, `NotLeader`, and `MalformedRequest` all return HTTP 200
/// with a `status:"error"`/`status:"redirect"` body — preserving wire
/// compatibility with the pre-existing producer/consumer clients, which
/// branch on the body rather than the status code. Only failures the broker
/// itself considers exceptional get a non-2xx status.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("topic {0:?} not registered")]
    UnknownTopic(String),

    #[error("topic {0:?} does not exist")]
    UnknownTopicForConsume(String),

    #[error("not currently the leader")]
    NotLeader { leader: Option<LeaseRecord> },

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("coordinator unavailable: {0}")]
    Coordinator(#[from] yak_runtime::Error),

    #[error(transparent)]
    Log(#[from] yak_core::LogError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::UnknownTopic(topic) => ok_error(format!("Topic '{topic}' not registered")),
            AppError::UnknownTopicForConsume(topic) => ok_error(format!("Topic '{topic}' does not exist")),
            AppError::MalformedRequest(message) => ok_error(message),
            AppError::NotLeader { leader } => (
                StatusCode::OK,
                Json(json!({
                    "status": "redirect",
                    "message": "not currently the leader",
                    "leader": leader,
                })),
            )
                .into_response(),
            AppError::Coordinator(err) => {
                tracing::error!(error = %err, "coordinator unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({"status": "error", "message": "coordinator unavailable"})),
                )
                    .into_response()
            }
            AppError::Log(err) => {
                tracing::error!(error = %err, "log I/O failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"status": "error", "message": "log I/O failure"})),
                )
                    .into_response()
            }
        }
    }
}

fn ok_error(message: String) -> Response {
    (StatusCode::OK, Json(json!({"status": "error", "message": message}))).into_response()
}
