//! Message and conversation session types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::{PlanningPhase, TripRequest};

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System message (instructions to the LLM)
    System,
    /// User message
    User,
    /// Assistant message
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// A message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: Role,
    /// Message content (text)
    pub content: String,
}

impl Message {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A durable conversation session: message history plus derived planning state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSession {
    /// Unique session identifier
    pub session_id: String,
    /// Message history, in arrival order
    pub messages: Vec<Message>,
    /// Derived state attached to the session (trip request, planning phase)
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    /// Session creation timestamp (Unix epoch milliseconds)
    pub created_at: u64,
    /// Last update timestamp (Unix epoch milliseconds)
    pub updated_at: u64,
}

const TRIP_KEY: &str = "trip_request";
const PHASE_KEY: &str = "phase";

impl ConversationSession {
    /// Create a new conversation session
    pub fn new(session_id: String) -> Self {
        let now = now_millis();
        Self {
            session_id,
            messages: Vec::new(),
            metadata: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Add a message to the session
    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = now_millis();
    }

    /// Get the number of messages
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// The trip request accumulated so far, if any turn stored one
    pub fn trip_request(&self) -> Option<TripRequest> {
        self.metadata
            .get(TRIP_KEY)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Store the accumulated trip request
    pub fn set_trip_request(&mut self, trip: &TripRequest) {
        if let Ok(value) = serde_json::to_value(trip) {
            self.metadata.insert(TRIP_KEY.to_string(), value);
            self.updated_at = now_millis();
        }
    }

    /// The planning phase recorded on the last turn
    pub fn phase(&self) -> PlanningPhase {
        self.metadata
            .get(PHASE_KEY)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or(PlanningPhase::CollectingParameters)
    }

    /// Record the planning phase
    pub fn set_phase(&mut self, phase: PlanningPhase) {
        if let Ok(value) = serde_json::to_value(phase) {
            self.metadata.insert(PHASE_KEY.to_string(), value);
            self.updated_at = now_millis();
        }
    }
}

fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
