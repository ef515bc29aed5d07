use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Message author. Stored as plain text in the messages table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape for the session listing endpoint.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SessionSummary {
    pub id: String,
    pub updated_at: DateTime<Utc>,
}

/// Row shape for conversation display and the per-turn history window.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MessageRecord {
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
