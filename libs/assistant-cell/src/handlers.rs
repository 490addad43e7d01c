use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{ChatRequest, ChatResponse, TranscriptResponse};
use crate::services::AssistantService;

#[axum::debug_handler]
pub async fn chat(
    State(service): State<Arc<AssistantService>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::ValidationError("message is required".to_string()));
    }

    let response = service.chat(request.session_id, &request.message).await?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn get_transcript(
    State(service): State<Arc<AssistantService>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<TranscriptResponse>, AppError> {
    let messages = service
        .transcript(session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("No conversation with id {}", session_id)))?;

    Ok(Json(TranscriptResponse { session_id, messages }))
}
