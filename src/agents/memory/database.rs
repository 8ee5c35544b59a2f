//! SQLite-backed durable session store

use async_trait::async_trait;
use sqlx::Row;

use super::SessionStore;
use crate::agents::domain::{ConversationSession, Message, Role};
use crate::agents::error::{AgentError, AgentResult};
use crate::persistence::{ConnectionPool, MigrationRunner};

/// Durable session store backed by SQLite. Survives process restart;
/// sessions are single-writer so writes only need per-session ordering.
pub struct SqliteSessionStore {
    pool: ConnectionPool,
}

impl SqliteSessionStore {
    /// Create a store over an existing pool. Assumes migrations have run.
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Connect to a database URL and run migrations
    pub async fn connect(
        url: &str,
        max_connections: u32,
        connect_timeout_secs: u64,
    ) -> AgentResult<Self> {
        let pool = ConnectionPool::new(url, max_connections, connect_timeout_secs).await?;
        MigrationRunner::new(pool.clone()).migrate_up().await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn save(&self, session: &ConversationSession) -> AgentResult<()> {
        let metadata = serde_json::to_string(&session.metadata)?;
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO sessions (session_id, metadata, created_at, updated_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(session_id) DO UPDATE SET metadata = excluded.metadata, updated_at = excluded.updated_at",
        )
        .bind(&session.session_id)
        .bind(&metadata)
        .bind(&now)
        .bind(&now)
        .execute(self.pool.pool())
        .await
        .map_err(|e| AgentError::Memory(format!("Failed to save session: {}", e)))?;

        Ok(())
    }

    async fn load(&self, session_id: &str) -> AgentResult<Option<ConversationSession>> {
        let row = sqlx::query("SELECT metadata, created_at, updated_at FROM sessions WHERE session_id = ?")
            .bind(session_id)
            .fetch_optional(self.pool.pool())
            .await
            .map_err(|e| AgentError::Memory(format!("Failed to load session: {}", e)))?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let metadata_str: String = row
            .try_get("metadata")
            .map_err(|e| AgentError::Memory(e.to_string()))?;
        let created_at: String = row
            .try_get("created_at")
            .map_err(|e| AgentError::Memory(e.to_string()))?;
        let updated_at: String = row
            .try_get("updated_at")
            .map_err(|e| AgentError::Memory(e.to_string()))?;

        let mut session = ConversationSession::new(session_id.to_string());
        session.metadata = serde_json::from_str(&metadata_str)?;
        session.created_at = parse_millis(&created_at);
        session.updated_at = parse_millis(&updated_at);

        let message_rows =
            sqlx::query("SELECT role, content FROM messages WHERE session_id = ? ORDER BY id ASC")
                .bind(session_id)
                .fetch_all(self.pool.pool())
                .await
                .map_err(|e| AgentError::Memory(format!("Failed to load messages: {}", e)))?;

        for row in message_rows {
            let role_str: String = row
                .try_get("role")
                .map_err(|e| AgentError::Memory(e.to_string()))?;
            let content: String = row
                .try_get("content")
                .map_err(|e| AgentError::Memory(e.to_string()))?;
            let role: Role = role_str
                .parse()
                .map_err(|e: String| AgentError::Memory(e))?;
            session.messages.push(Message { role, content });
        }

        Ok(Some(session))
    }

    async fn append(&self, session_id: &str, message: Message) -> AgentResult<()> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query("UPDATE sessions SET updated_at = ? WHERE session_id = ?")
            .bind(&now)
            .bind(session_id)
            .execute(self.pool.pool())
            .await
            .map_err(|e| AgentError::Memory(format!("Failed to touch session: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AgentError::SessionNotFound(session_id.to_string()));
        }

        sqlx::query("INSERT INTO messages (session_id, role, content, created_at) VALUES (?, ?, ?, ?)")
            .bind(session_id)
            .bind(message.role.to_string())
            .bind(&message.content)
            .bind(&now)
            .execute(self.pool.pool())
            .await
            .map_err(|e| AgentError::Memory(format!("Failed to append message: {}", e)))?;

        Ok(())
    }
}

fn parse_millis(rfc3339: &str) -> u64 {
    chrono::DateTime::parse_from_rfc3339(rfc3339)
        .map(|dt| dt.timestamp_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteSessionStore {
        SqliteSessionStore::connect("sqlite::memory:", 1, 5)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn append_then_reload_returns_turns_verbatim_in_order() {
        let store = store().await;
        store.get_or_create("s1").await.unwrap();

        store
            .append("s1", Message::user("I want to go to Paris"))
            .await
            .unwrap();
        store
            .append("s1", Message::assistant("Where are you departing from?"))
            .await
            .unwrap();
        store
            .append("s1", Message::user("From Rome, June 10-17, budget 1500 EUR"))
            .await
            .unwrap();

        let loaded = store.load("s1").await.unwrap().unwrap();
        assert_eq!(loaded.message_count(), 3);
        assert_eq!(loaded.messages[0].role, Role::User);
        assert_eq!(loaded.messages[0].content, "I want to go to Paris");
        assert_eq!(loaded.messages[1].role, Role::Assistant);
        assert_eq!(loaded.messages[1].content, "Where are you departing from?");
        assert_eq!(
            loaded.messages[2].content,
            "From Rome, June 10-17, budget 1500 EUR"
        );
    }

    #[tokio::test]
    async fn metadata_round_trips_through_save() {
        let store = store().await;
        let mut session = store.get_or_create("s2").await.unwrap();

        let trip = crate::agents::domain::TripRequest {
            origin: Some("Rome".to_string()),
            destinations: vec!["Paris".to_string()],
            ..Default::default()
        };
        session.set_trip_request(&trip);
        store.save(&session).await.unwrap();

        let loaded = store.load("s2").await.unwrap().unwrap();
        let trip = loaded.trip_request().unwrap();
        assert_eq!(trip.origin.as_deref(), Some("Rome"));
        assert_eq!(trip.destinations, vec!["Paris".to_string()]);
    }

    #[tokio::test]
    async fn missing_session_loads_as_none() {
        let store = store().await;
        assert!(store.load("missing").await.unwrap().is_none());
    }
}
