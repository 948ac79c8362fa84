//! LLM Provider Strategy Pattern
//!
//! Defines the interface to the hosted text-generation service. The rest of
//! the system treats the provider as an opaque function from turns to text.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use finmentor_core::provider::{LlmProvider, GenerationOptions};
//!
//! let provider = GeminiProvider::from_env()?;
//! let completion = provider.complete(&turns, &options).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Turn;

/// Output modality requested from the model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modality {
    Text,
    Image,
}

/// Configuration for a single generation call
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier (e.g., "gemini-2.5-flash")
    pub model: String,

    /// System instruction sent alongside the turns
    #[serde(default)]
    pub system_instruction: Option<String>,

    /// Attach the provider's web-search capability
    #[serde(default)]
    pub web_search: bool,

    /// Internal reasoning budget in tokens
    #[serde(default)]
    pub thinking_budget: Option<u32>,

    /// Requested output modalities (empty = provider default)
    #[serde(default)]
    pub response_modalities: Vec<Modality>,

    #[serde(default)]
    pub temperature: Option<f32>,

    #[serde(default)]
    pub top_p: Option<f32>,

    #[serde(default)]
    pub max_output_tokens: Option<u32>,
}

impl GenerationOptions {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }
}

/// Inline binary payload returned by the model
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineImage {
    pub mime_type: String,

    /// Base64-encoded bytes, as delivered by the API
    pub data: String,
}

impl InlineImage {
    /// Render as a `data:` URL suitable for an `<img src>`
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Response from an LLM completion
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Completion {
    /// The generated text (all text parts concatenated)
    pub text: String,

    /// Generated images, in response order
    #[serde(default)]
    pub images: Vec<InlineImage>,

    /// Model that generated this response
    pub model: String,

    /// Token usage statistics (if available)
    pub usage: Option<TokenUsage>,

    /// Finish reason
    pub finish_reason: Option<FinishReason>,
}

/// Token usage statistics
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Reason for completion finishing
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    Safety,
    Other,
}

/// Provider metadata
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "Gemini")
    pub name: String,

    /// Available models
    pub models: Vec<ModelInfo>,

    /// Whether web-search grounding is supported
    pub supports_search: bool,
}

/// Information about a model
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub context_length: Option<u32>,
}

/// Strategy trait for LLM providers
///
/// Implement this trait to add support for new hosted backends.
/// The assistant works exclusively through this interface.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get provider information and capabilities
    async fn info(&self) -> Result<ProviderInfo>;

    /// Check if the provider is reachable and the credential accepted
    async fn health_check(&self) -> Result<bool>;

    /// Generate a completion from the given context
    async fn complete(&self, turns: &[Turn], options: &GenerationOptions) -> Result<Completion>;

    /// List available models
    async fn list_models(&self) -> Result<Vec<ModelInfo>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_options_defaults() {
        let opts = GenerationOptions::new("gemini-2.5-flash");
        assert_eq!(opts.model, "gemini-2.5-flash");
        assert!(!opts.web_search);
        assert!(opts.thinking_budget.is_none());
        assert!(opts.response_modalities.is_empty());
    }

    #[test]
    fn test_data_url() {
        let image = InlineImage {
            mime_type: "image/png".into(),
            data: "iVBORw0".into(),
        };
        assert_eq!(image.data_url(), "data:image/png;base64,iVBORw0");
    }
}
