//! # finmentor-runtime
//!
//! Hosted model providers for FinMentor.
//!
//! ## Providers
//!
//! - **Gemini** (default): Google Generative Language API
//!
//! ## Usage
//!
//! ```rust,ignore
//! use finmentor_runtime::GeminiProvider;
//!
//! let provider = GeminiProvider::from_env()?;
//! let assistant = Assistant::with_defaults(Arc::new(provider));
//! ```

#[cfg(feature = "gemini")]
pub mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::{GeminiConfig, GeminiProvider};

// Re-export core types for convenience
pub use finmentor_core::{Assistant, AssistantError, LlmProvider, ModelSet, Result, Turn};
