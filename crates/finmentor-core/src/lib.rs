//! # finmentor-core
//!
//! Provider-agnostic chat core for the FinMentor assistant.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Assistant                            │
//! │  ┌─────────────┐  ┌──────────────┐  ┌─────────────────────┐  │
//! │  │ ChatSession │  │ RequestMode  │  │   LlmProvider       │  │
//! │  │ Transcript  │──│ → Options    │──│   (Strategy)        │  │
//! │  └─────────────┘  └──────────────┘  └─────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//!                 raw text ──► markdown::render ──► Block nodes
//! ```
//!
//! The `LlmProvider` trait keeps the hosted model swappable; everything that
//! reaches the UI goes through the fallback rules in [`assistant`].

pub mod assistant;
pub mod error;
pub mod markdown;
pub mod message;
pub mod mode;
pub mod provider;
pub mod session;

pub use assistant::{Assistant, AssistantConfig, FALLBACK_REPLY};
pub use error::{AssistantError, Result};
pub use markdown::{Block, Inline};
pub use message::{ChatMessage, Role, Transcript, Turn};
pub use mode::{AnalysisMode, ModelSet, RequestMode};
pub use provider::LlmProvider;
pub use session::{ChatSession, PendingRequest, RequestKind};
