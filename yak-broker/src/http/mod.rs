mod consume;
mod internal;
mod metadata;
mod produce;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::Level;

use crate::state::AppState;

/// Build the full HTTP surface.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/register_topic", post(produce::register_topic))
        .route("/produce", post(produce::produce))
        .route("/consume", get(consume::consume))
        .route("/internal/replicate", post(internal::replicate))
        .route("/internal/catchup", post(internal::catchup))
        .route("/metadata/leader", get(metadata::leader))
        .route("/metadata/topics", get(metadata::topics))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::new().level(Level::INFO)))
        .with_state(state)
}
