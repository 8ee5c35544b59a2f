//! Session persistence and memory recall
//!
//! Two services back the router: a durable key-value session store
//! (SQLite in production, in-memory for tests) and a memory service whose
//! read path recalls known user preferences. Memory ingestion is an
//! external concern; only `recall` is exercised by the router.

mod database;
mod in_memory;

pub use database::SqliteSessionStore;
pub use in_memory::{InMemoryMemoryService, InMemorySessionStore};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::agents::domain::{ConversationSession, Message, TripField};
use crate::agents::error::AgentResult;

/// Trait for durable session storage, keyed by session identifier
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Save a session (metadata and derived state)
    async fn save(&self, session: &ConversationSession) -> AgentResult<()>;

    /// Load a session by ID
    async fn load(&self, session_id: &str) -> AgentResult<Option<ConversationSession>>;

    /// Append a message to an existing session
    async fn append(&self, session_id: &str, message: Message) -> AgentResult<()>;

    /// Get or create a session
    async fn get_or_create(&self, session_id: &str) -> AgentResult<ConversationSession> {
        if let Some(session) = self.load(session_id).await? {
            Ok(session)
        } else {
            let session = ConversationSession::new(session_id.to_string());
            self.save(&session).await?;
            Ok(session)
        }
    }
}

/// A recalled fact about a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// Trip field this entry can pre-fill, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<TripField>,
    /// Free-form preference label (e.g. "preferred_airline")
    pub key: String,
    /// Recalled value
    pub value: String,
}

impl MemoryEntry {
    /// A preference that pre-fills a trip field when it is missing
    pub fn for_field(field: TripField, value: impl Into<String>) -> Self {
        Self {
            field: Some(field),
            key: field.key().to_string(),
            value: value.into(),
        }
    }

    /// A free-form preference passed to prompts but not tied to a field
    pub fn preference(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: None,
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Trait for the memory recall service (read path only)
#[async_trait]
pub trait MemoryService: Send + Sync {
    /// Recall known entries for a user identity. May be eventually
    /// consistent; no freshness guarantee is assumed.
    async fn recall(&self, user_id: &str) -> AgentResult<Vec<MemoryEntry>>;
}
