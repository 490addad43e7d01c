use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::services::AssistantService;

pub fn assistant_routes(service: Arc<AssistantService>) -> Router {
    Router::new()
        .route("/chat", post(handlers::chat))
        .route("/sessions/{session_id}", get(handlers::get_transcript))
        .with_state(service)
}
