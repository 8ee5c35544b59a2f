//! In-memory session store and memory service

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{MemoryEntry, MemoryService, SessionStore};
use crate::agents::domain::{ConversationSession, Message};
use crate::agents::error::{AgentError, AgentResult};

/// In-memory session store (lost on restart); used by tests and as a
/// fallback when no database is configured
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, ConversationSession>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save(&self, session: &ConversationSession) -> AgentResult<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.session_id.clone(), session.clone());
        Ok(())
    }

    async fn load(&self, session_id: &str) -> AgentResult<Option<ConversationSession>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned())
    }

    async fn append(&self, session_id: &str, message: Message) -> AgentResult<()> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session_id) {
            Some(session) => {
                session.add_message(message);
                Ok(())
            }
            None => Err(AgentError::SessionNotFound(session_id.to_string())),
        }
    }
}

/// In-memory memory service. The router only reads from it; `remember`
/// stands in for the external ingestion policy.
#[derive(Default)]
pub struct InMemoryMemoryService {
    entries: Arc<RwLock<HashMap<String, Vec<MemoryEntry>>>>,
}

impl InMemoryMemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest an entry for a user (external write path)
    pub async fn remember(&self, user_id: &str, entry: MemoryEntry) {
        let mut entries = self.entries.write().await;
        entries.entry(user_id.to_string()).or_default().push(entry);
    }
}

#[async_trait]
impl MemoryService for InMemoryMemoryService {
    async fn recall(&self, user_id: &str) -> AgentResult<Vec<MemoryEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.get(user_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::domain::TripField;

    #[tokio::test]
    async fn append_then_load_returns_messages_in_order() {
        let store = InMemorySessionStore::new();
        let session = store.get_or_create("s1").await.unwrap();
        assert_eq!(session.message_count(), 0);

        store.append("s1", Message::user("hello")).await.unwrap();
        store.append("s1", Message::assistant("hi")).await.unwrap();

        let loaded = store.load("s1").await.unwrap().unwrap();
        assert_eq!(loaded.message_count(), 2);
        assert_eq!(loaded.messages[0].content, "hello");
        assert_eq!(loaded.messages[1].content, "hi");
    }

    #[tokio::test]
    async fn append_to_unknown_session_fails() {
        let store = InMemorySessionStore::new();
        let err = store.append("nope", Message::user("x")).await.unwrap_err();
        assert!(matches!(err, AgentError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn recall_returns_ingested_entries() {
        let memory = InMemoryMemoryService::new();
        memory
            .remember("u1", MemoryEntry::for_field(TripField::Budget, "1500 EUR"))
            .await;
        memory
            .remember("u1", MemoryEntry::preference("preferred_airline", "ITA Airways"))
            .await;

        let recalled = memory.recall("u1").await.unwrap();
        assert_eq!(recalled.len(), 2);
        assert_eq!(recalled[0].field, Some(TripField::Budget));
        assert!(memory.recall("u2").await.unwrap().is_empty());
    }
}
