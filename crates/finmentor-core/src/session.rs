//! Chat Session
//!
//! Owns the transcript for one chat view and guards it against replies that
//! arrive after the user has started over.

use serde::{Deserialize, Serialize};

use crate::assistant::{MARKET_UPDATE_REQUEST, WELCOME_MESSAGE};
use crate::message::{CONTEXT_TURNS, ChatMessage, Transcript, Turn};
use crate::mode::AnalysisMode;

/// What a pending remote call needs, captured when the call is issued
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestKind {
    /// Free-form question with recent history
    Query {
        message: String,
        history: Vec<Turn>,
    },
    /// Canned market summary
    MarketUpdate,
}

/// Ticket for an in-flight call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingRequest {
    /// Session generation the request belongs to
    pub generation: u64,
    pub mode: AnalysisMode,
    pub kind: RequestKind,
}

/// A chat view's state
#[derive(Clone, Debug)]
pub struct ChatSession {
    transcript: Transcript,
    mode: AnalysisMode,
    generation: u64,
    pending: bool,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    /// New session with the welcome message
    pub fn new() -> Self {
        Self {
            transcript: Transcript::with_greeting(WELCOME_MESSAGE),
            mode: AnalysisMode::default(),
            generation: 0,
            pending: false,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub const fn mode(&self) -> AnalysisMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: AnalysisMode) {
        self.mode = mode;
    }

    /// Whether a call is in flight; controls are disabled meanwhile
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    /// Record a user query and hand back the request to send.
    ///
    /// History is snapshotted before the query is appended, so the context
    /// is the last prior turns plus the query.
    pub fn begin_send(&mut self, input: &str) -> Option<PendingRequest> {
        let query = input.trim();
        if query.is_empty() || self.pending {
            return None;
        }

        let history = self.transcript.recent(CONTEXT_TURNS);
        self.transcript.push(ChatMessage::user(query));
        self.pending = true;

        Some(PendingRequest {
            generation: self.generation,
            mode: self.mode,
            kind: RequestKind::Query {
                message: query.to_owned(),
                history,
            },
        })
    }

    /// Record a market update request
    pub fn begin_market_update(&mut self) -> Option<PendingRequest> {
        if self.pending {
            return None;
        }

        self.transcript.push(ChatMessage::user(MARKET_UPDATE_REQUEST));
        self.pending = true;

        Some(PendingRequest {
            generation: self.generation,
            mode: AnalysisMode::Standard,
            kind: RequestKind::MarketUpdate,
        })
    }

    /// Apply a reply. Returns `false` when the reply is stale and was dropped.
    pub fn complete(&mut self, request: &PendingRequest, reply: impl Into<String>) -> bool {
        if request.generation != self.generation {
            tracing::debug!(
                request = request.generation,
                current = self.generation,
                "Discarding stale reply"
            );
            return false;
        }

        self.transcript.push(ChatMessage::model(reply));
        self.pending = false;
        true
    }

    /// Start over: welcome message only, outstanding replies become stale
    pub fn reset(&mut self) {
        self.transcript = Transcript::with_greeting(WELCOME_MESSAGE);
        self.generation += 1;
        self.pending = false;
    }
}
