use crate::database::{MessageRecord, Repository, SessionSummary};
use crate::services::ChatService;
use crate::utils::error::ApiError;
use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    // Optional so an absent field reaches the handler as a 400, not a
    // framework-level rejection.
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

pub async fn chat_handler(
    Extension(chat_service): Extension<Arc<ChatService>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let session_id = request.session_id.unwrap_or_default();
    let message = request.message.unwrap_or_default();

    info!(
        "Chat request: session={}, message_len={}",
        session_id,
        message.len()
    );

    let reply = chat_service.handle_turn(&session_id, &message).await?;

    Ok(Json(ChatResponse { reply }))
}

pub async fn conversation_handler(
    Extension(repository): Extension<Arc<Repository>>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<MessageRecord>>, ApiError> {
    // Any string is a valid session id; an unseen one yields an empty history.
    let messages = repository
        .all_messages(&session_id)
        .await
        .map_err(|e| ApiError::StorageUnavailable(e.to_string()))?;

    Ok(Json(messages))
}

pub async fn sessions_handler(
    Extension(repository): Extension<Arc<Repository>>,
) -> Result<Json<Vec<SessionSummary>>, ApiError> {
    let sessions = repository
        .list_sessions()
        .await
        .map_err(|e| ApiError::StorageUnavailable(e.to_string()))?;

    Ok(Json(sessions))
}
