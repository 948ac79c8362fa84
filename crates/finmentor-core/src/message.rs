//! Conversation Messages
//!
//! Chat transcript entries and the turns sent to the remote model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of prior transcript entries sent along with a new query
pub const CONTEXT_TURNS: usize = 5;

/// Author of a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The investor typing into the chat
    User,
    /// The remote model
    Model,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Model => write!(f, "model"),
        }
    }
}

/// A single entry of the chat transcript
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role
    pub role: Role,

    /// Text content (markdown for model replies)
    pub text: String,

    /// Optional generated image as a data URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Timestamp
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a new message
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            image: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Create a model message
    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, text)
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// One entry of the context sent to the remote model
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

impl From<&ChatMessage> for Turn {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role,
            text: msg.text.clone(),
        }
    }
}

/// Append-only, ordered chat transcript
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transcript seeded with a single model greeting
    pub fn with_greeting(text: impl Into<String>) -> Self {
        let mut transcript = Self::new();
        transcript.push(ChatMessage::model(text));
        transcript
    }

    /// Rebuild a transcript from turns received over the wire
    pub fn from_turns(turns: impl IntoIterator<Item = Turn>) -> Self {
        Self {
            messages: turns
                .into_iter()
                .map(|t| ChatMessage::new(t.role, t.text))
                .collect(),
        }
    }

    /// Append a message
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// All messages, oldest first
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The last `n` messages as turns, in original order
    pub fn recent(&self, n: usize) -> Vec<Turn> {
        let start = self.messages.len().saturating_sub(n);
        self.messages[start..].iter().map(Turn::from).collect()
    }

    /// Context for a new query: the last [`CONTEXT_TURNS`] prior messages
    /// followed by the query itself.
    ///
    /// Only the remote call is windowed; the transcript keeps everything.
    pub fn context_window(&self, query: &str) -> Vec<Turn> {
        let mut turns = self.recent(CONTEXT_TURNS);
        turns.push(Turn::user(query));
        turns
    }
}
