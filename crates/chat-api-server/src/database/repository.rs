use super::models::{MessageRecord, MessageRole, Session, SessionSummary};
use super::DbPool;
use anyhow::Result;
use chrono::Utc;
use tracing::debug;

pub struct Repository {
    pub pool: DbPool,
}

impl Repository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Ensure the conversation tables exist.
    pub async fn migrate(&self) -> Result<()> {
        let pool = self.pool.get_pool();

        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )"#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL REFERENCES sessions(id),
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            )"#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_messages_session ON messages(session_id, created_at)",
        )
        .execute(pool)
        .await?;

        debug!("Conversation tables ensured");
        Ok(())
    }

    /// Insert the session row if absent. Idempotent; an existing id is a no-op.
    pub async fn ensure_session(&self, session_id: &str) -> Result<()> {
        let now = Utc::now();
        sqlx::query("INSERT OR IGNORE INTO sessions (id, created_at, updated_at) VALUES (?, ?, ?)")
            .bind(session_id)
            .bind(now)
            .bind(now)
            .execute(self.pool.get_pool())
            .await?;

        Ok(())
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT id, created_at, updated_at FROM sessions WHERE id = ?",
        )
        .bind(session_id)
        .fetch_optional(self.pool.get_pool())
        .await?;

        Ok(session)
    }

    /// Append a single message with a server-assigned timestamp.
    pub async fn append_message(
        &self,
        session_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO messages (session_id, role, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(session_id)
        .bind(role.as_str())
        .bind(content)
        .bind(Utc::now())
        .execute(self.pool.get_pool())
        .await?;

        Ok(())
    }

    /// Up to `limit` most recent messages, returned in chronological order.
    /// Fetched newest-first, then reversed. The autoincrement id breaks
    /// exact-timestamp ties so a turn's user message sorts before its reply.
    pub async fn recent_messages(
        &self,
        session_id: &str,
        limit: u32,
    ) -> Result<Vec<MessageRecord>> {
        let mut messages = sqlx::query_as::<_, MessageRecord>(
            r#"SELECT role, content, created_at
               FROM messages
               WHERE session_id = ?
               ORDER BY created_at DESC, id DESC
               LIMIT ?"#,
        )
        .bind(session_id)
        .bind(limit as i64)
        .fetch_all(self.pool.get_pool())
        .await?;

        messages.reverse();

        debug!(
            "Loaded {} history messages for session {}",
            messages.len(),
            session_id
        );

        Ok(messages)
    }

    /// Full message history in chronological order, for conversation display.
    pub async fn all_messages(&self, session_id: &str) -> Result<Vec<MessageRecord>> {
        let messages = sqlx::query_as::<_, MessageRecord>(
            r#"SELECT role, content, created_at
               FROM messages
               WHERE session_id = ?
               ORDER BY created_at ASC, id ASC"#,
        )
        .bind(session_id)
        .fetch_all(self.pool.get_pool())
        .await?;

        Ok(messages)
    }

    /// All sessions, most recently active first.
    pub async fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        let sessions = sqlx::query_as::<_, SessionSummary>(
            "SELECT id, updated_at FROM sessions ORDER BY updated_at DESC",
        )
        .fetch_all(self.pool.get_pool())
        .await?;

        Ok(sessions)
    }

    pub async fn touch_session(&self, session_id: &str) -> Result<()> {
        sqlx::query("UPDATE sessions SET updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(session_id)
            .execute(self.pool.get_pool())
            .await?;

        Ok(())
    }

    /// Record one completed chat turn: the user message, the assistant reply,
    /// and the session activity bump, committed as a single transaction so a
    /// mid-turn failure leaves no orphaned user message behind.
    pub async fn record_turn(
        &self,
        session_id: &str,
        user_content: &str,
        reply: &str,
    ) -> Result<()> {
        let mut transaction = self.pool.get_pool().begin().await?;
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO messages (session_id, role, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(session_id)
        .bind(MessageRole::User.as_str())
        .bind(user_content)
        .bind(now)
        .execute(&mut *transaction)
        .await?;

        sqlx::query(
            "INSERT INTO messages (session_id, role, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(session_id)
        .bind(MessageRole::Assistant.as_str())
        .bind(reply)
        .bind(now)
        .execute(&mut *transaction)
        .await?;

        sqlx::query("UPDATE sessions SET updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(session_id)
            .execute(&mut *transaction)
            .await?;

        transaction.commit().await?;
        debug!("Recorded turn for session {}", session_id);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;

    async fn test_repository() -> Repository {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            // A second connection would open a separate in-memory database.
            pool_max_size: 1,
            pool_timeout_seconds: 5,
        };
        let pool = DbPool::new(&config).await.unwrap();
        let repository = Repository::new(pool);
        repository.migrate().await.unwrap();
        repository
    }

    #[tokio::test]
    async fn ensure_session_is_idempotent() {
        let repo = test_repository().await;

        repo.ensure_session("s-1").await.unwrap();
        let first = repo.get_session("s-1").await.unwrap().unwrap();

        repo.ensure_session("s-1").await.unwrap();
        let second = repo.get_session("s-1").await.unwrap().unwrap();

        assert_eq!(first.created_at, second.created_at);
        assert_eq!(repo.list_sessions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn all_messages_returns_chronological_order() {
        let repo = test_repository().await;
        repo.ensure_session("s-1").await.unwrap();

        repo.append_message("s-1", MessageRole::User, "first")
            .await
            .unwrap();
        repo.append_message("s-1", MessageRole::Assistant, "second")
            .await
            .unwrap();
        repo.append_message("s-1", MessageRole::User, "third")
            .await
            .unwrap();

        let messages = repo.all_messages("s-1").await.unwrap();
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn recent_messages_windows_newest_then_reverses() {
        let repo = test_repository().await;
        repo.ensure_session("s-1").await.unwrap();

        for i in 0..12 {
            repo.append_message("s-1", MessageRole::User, &format!("m{}", i))
                .await
                .unwrap();
        }

        let recent = repo.recent_messages("s-1", 10).await.unwrap();
        assert_eq!(recent.len(), 10);
        assert_eq!(recent.first().unwrap().content, "m2");
        assert_eq!(recent.last().unwrap().content, "m11");
    }

    #[tokio::test]
    async fn recent_messages_for_unknown_session_is_empty() {
        let repo = test_repository().await;
        let recent = repo.recent_messages("nope", 10).await.unwrap();
        assert!(recent.is_empty());
    }

    #[tokio::test]
    async fn list_sessions_orders_by_recent_activity() {
        let repo = test_repository().await;

        repo.ensure_session("a").await.unwrap();
        repo.ensure_session("b").await.unwrap();
        repo.touch_session("b").await.unwrap();
        // Touch "a" last so it becomes the most recently active.
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        repo.touch_session("a").await.unwrap();

        let sessions = repo.list_sessions().await.unwrap();
        let ids: Vec<&str> = sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn record_turn_appends_pair_and_touches_session() {
        let repo = test_repository().await;
        repo.ensure_session("s-1").await.unwrap();
        let before = repo.get_session("s-1").await.unwrap().unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        repo.record_turn("s-1", "hi there", "hello").await.unwrap();

        let messages = repo.all_messages("s-1").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[0].content, "hi there");
        assert_eq!(messages[1].role, "assistant");
        assert_eq!(messages[1].content, "hello");

        let after = repo.get_session("s-1").await.unwrap().unwrap();
        assert!(after.updated_at > before.updated_at);
    }
}
