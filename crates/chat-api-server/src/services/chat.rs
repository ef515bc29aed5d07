use crate::config::ChatConfig;
use crate::database::Repository;
use crate::document::DocumentStore;
use crate::services::resolver;
use crate::utils::error::ApiError;
use std::sync::Arc;
use tracing::info;

/// Orchestrates one chat turn: session bookkeeping, reply selection, and
/// persistence of the user/assistant message pair.
pub struct ChatService {
    repository: Arc<Repository>,
    documents: Arc<DocumentStore>,
    config: ChatConfig,
}

impl ChatService {
    pub fn new(
        repository: Arc<Repository>,
        documents: Arc<DocumentStore>,
        config: ChatConfig,
    ) -> Self {
        Self {
            repository,
            documents,
            config,
        }
    }

    /// Handle one turn for the given session and return the reply.
    ///
    /// Both inputs must be non-empty; nothing is persisted otherwise.
    /// Concurrent turns on the same session are not ordered relative to each
    /// other, only each turn's own message pair is.
    pub async fn handle_turn(&self, session_id: &str, user_message: &str) -> Result<String, ApiError> {
        if session_id.is_empty() || user_message.is_empty() {
            return Err(ApiError::InvalidInput(
                "sessionId and message required".to_string(),
            ));
        }

        self.repository
            .ensure_session(session_id)
            .await
            .map_err(|e| ApiError::StorageUnavailable(e.to_string()))?;

        // TODO: feed the history window into the resolver once context-aware
        // matching lands; today it is loaded but not consumed.
        let _history = self
            .repository
            .recent_messages(session_id, self.config.history_limit)
            .await
            .map_err(|e| ApiError::StorageUnavailable(e.to_string()))?;

        let reply = resolver::resolve(user_message, self.documents.documents()).to_string();

        self.repository
            .record_turn(session_id, user_message, &reply)
            .await
            .map_err(|e| ApiError::StorageUnavailable(e.to_string()))?;

        info!(
            "Turn completed: session={}, message_len={}, reply_len={}",
            session_id,
            user_message.len(),
            reply.len()
        );

        Ok(reply)
    }
}
