//! Remote Call Orchestration
//!
//! Builds the context for each feature, picks the mode configuration and
//! invokes the provider. Chat callers never see an error: every failure is
//! replaced by [`FALLBACK_REPLY`].

use std::sync::Arc;

use crate::error::{AssistantError, Result};
use crate::message::{Transcript, Turn};
use crate::mode::{AnalysisMode, ModelSet, RequestMode};
use crate::provider::LlmProvider;

/// Persona and scope given to every chat call
pub const SYSTEM_INSTRUCTION: &str = r"You are FinMentor AI, an expert Indian financial research chatbot. Your goal is to provide **brief, direct, and data-driven answers**. Use **bullet points** or short sentences. **Avoid long paragraphs**.
- Your expertise is strictly the **Indian market (NSE/BSE)**.
- For complex queries, you perform deep analysis.
- For general queries, you use search to get real-time data.
- If a query is not about finance or the Indian market, politely state your purpose.";

/// First transcript entry of every chat
pub const WELCOME_MESSAGE: &str = "Welcome to **FinMentor AI**.\n\nI'm an AI financial analyst for the **Indian market (NSE/BSE)**. Use the \"Analysis Mode\" selector below to switch between standard search-powered responses or deep analysis for complex questions.";

/// User-visible text recorded when a market update is requested
pub const MARKET_UPDATE_REQUEST: &str = "Give me the latest market update.";

const MARKET_UPDATE_PROMPT: &str = r#"Act as FinMentor AI. Use your search tool to find the top 3-5 Indian financial market news stories from today. Summarize them concisely for a retail investor. For each story, provide: a **Headline**, a **Brief Summary**, and **"Why it matters"**. Format as plain text with markdown. Start with: "**Here is your Indian Market Update for today:**""#;

/// Reply shown for any remote failure
pub const FALLBACK_REPLY: &str = "There was an error connecting to the financial data services. Please check your connection or API key and try again.";

/// Assistant configuration
#[derive(Clone, Debug)]
pub struct AssistantConfig {
    /// System instruction for chat modes
    pub system_instruction: String,

    /// Models per mode
    pub models: ModelSet,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            system_instruction: SYSTEM_INSTRUCTION.into(),
            models: ModelSet::default(),
        }
    }
}

/// Front door to the remote model
pub struct Assistant {
    provider: Arc<dyn LlmProvider>,
    config: AssistantConfig,
}

impl Assistant {
    pub fn new(provider: Arc<dyn LlmProvider>, config: AssistantConfig) -> Self {
        Self { provider, config }
    }

    /// Create with default configuration
    pub fn with_defaults(provider: Arc<dyn LlmProvider>) -> Self {
        Self::new(provider, AssistantConfig::default())
    }

    /// Raw call: returns the model's text or the provider error
    pub async fn try_generate(&self, mode: RequestMode, turns: &[Turn]) -> Result<String> {
        let options = mode.options(&self.config.models, &self.config.system_instruction);
        tracing::debug!(?mode, model = %options.model, turns = turns.len(), "Dispatching remote call");

        let completion = self.provider.complete(turns, &options).await?;
        if completion.text.trim().is_empty() {
            return Err(AssistantError::EmptyResponse(options.model));
        }
        Ok(completion.text)
    }

    /// Call that never fails: errors become [`FALLBACK_REPLY`]
    pub async fn generate(&self, mode: RequestMode, turns: &[Turn]) -> String {
        match self.try_generate(mode, turns).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(?mode, code = e.code(), "Remote call failed: {}", e);
                FALLBACK_REPLY.into()
            }
        }
    }

    /// Answer a chat query using the recent transcript as context
    pub async fn reply(&self, mode: AnalysisMode, transcript: &Transcript, query: &str) -> String {
        let context = transcript.context_window(query);
        self.generate(mode.into(), &context).await
    }

    /// Today's market summary, as a single synthesized turn
    pub async fn market_update(&self) -> String {
        self.generate(RequestMode::Standard, &[Turn::user(MARKET_UPDATE_PROMPT)])
            .await
    }

    /// Ask the image model for a pie chart of `description`; returns a data URL
    pub async fn visualize(&self, description: &str) -> Option<String> {
        let options = RequestMode::Visualization
            .options(&self.config.models, &self.config.system_instruction);
        let prompt = format!(
            "Generate a modern, clean, and professional 2D financial pie chart based on the following data for an Indian investor's portfolio: {description}. The chart should be visually appealing, using a balanced color palette appropriate for a financial document. Include clear labels for each segment and a legend."
        );

        match self.provider.complete(&[Turn::user(prompt)], &options).await {
            Ok(completion) => completion.images.first().map(|img| img.data_url()),
            Err(e) => {
                tracing::warn!(code = e.code(), "Image generation failed: {}", e);
                None
            }
        }
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{ChatMessage, Role};
    use crate::provider::{
        Completion, GenerationOptions, InlineImage, ModelInfo, ProviderInfo,
    };
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    /// Records every call and answers with a canned result
    struct ScriptedProvider {
        reply: std::result::Result<Completion, String>,
        calls: Mutex<Vec<(Vec<Turn>, GenerationOptions)>>,
    }

    impl ScriptedProvider {
        fn text(text: &str) -> Self {
            Self {
                reply: Ok(Completion {
                    text: text.into(),
                    model: "test".into(),
                    ..Default::default()
                }),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err("quota exceeded".into()),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn info(&self) -> Result<ProviderInfo> {
            Ok(ProviderInfo {
                name: "scripted".into(),
                models: Vec::new(),
                supports_search: true,
            })
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        async fn complete(&self, turns: &[Turn], options: &GenerationOptions) -> Result<Completion> {
            self.calls.lock().await.push((turns.to_vec(), options.clone()));
            self.reply
                .clone()
                .map_err(AssistantError::RateLimited)
        }

        async fn list_models(&self) -> Result<Vec<ModelInfo>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_reply_windows_context() {
        let provider = Arc::new(ScriptedProvider::text("Nifty closed higher."));
        let assistant = Assistant::with_defaults(provider.clone());

        let mut transcript = Transcript::with_greeting(WELCOME_MESSAGE);
        for i in 0..6 {
            transcript.push(ChatMessage::user(format!("q{i}")));
        }

        let reply = assistant
            .reply(AnalysisMode::Standard, &transcript, "How is the market?")
            .await;
        assert_eq!(reply, "Nifty closed higher.");

        let calls = provider.calls.lock().await;
        let (turns, options) = &calls[0];
        assert_eq!(turns.len(), 6);
        assert_eq!(turns[0].text, "q1");
        assert_eq!(turns[5], Turn::user("How is the market?"));
        assert!(options.web_search);
        assert_eq!(options.system_instruction.as_deref(), Some(SYSTEM_INSTRUCTION));
    }

    #[tokio::test]
    async fn test_failure_becomes_fallback() {
        let assistant = Assistant::with_defaults(Arc::new(ScriptedProvider::failing()));
        let reply = assistant
            .reply(AnalysisMode::Deep, &Transcript::new(), "Explain P/E")
            .await;
        assert_eq!(reply, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_empty_text_is_an_error() {
        let assistant = Assistant::with_defaults(Arc::new(ScriptedProvider::text("  ")));
        let err = assistant
            .try_generate(RequestMode::Portfolio, &[Turn::user("x")])
            .await
            .unwrap_err();
        assert!(matches!(err, AssistantError::EmptyResponse(_)));
        assert_eq!(assistant.market_update().await, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_market_update_is_single_turn() {
        let provider = Arc::new(ScriptedProvider::text("**Here is your Indian Market Update for today:**"));
        let assistant = Assistant::with_defaults(provider.clone());

        assistant.market_update().await;

        let calls = provider.calls.lock().await;
        let (turns, options) = &calls[0];
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, Role::User);
        assert!(turns[0].text.contains("top 3-5 Indian financial market news"));
        assert_eq!(options.model, "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn test_visualize_returns_data_url() {
        let provider = Arc::new(ScriptedProvider {
            reply: Ok(Completion {
                images: vec![InlineImage {
                    mime_type: "image/png".into(),
                    data: "AAAA".into(),
                }],
                ..Default::default()
            }),
            calls: Mutex::new(Vec::new()),
        });
        let assistant = Assistant::with_defaults(provider.clone());

        assert_eq!(
            assistant.visualize("60% Fund A").await.as_deref(),
            Some("data:image/png;base64,AAAA")
        );
        let calls = provider.calls.lock().await;
        assert!(calls[0].0[0].text.contains("Indian investor's portfolio: 60% Fund A."));
        assert_eq!(calls[0].1.model, "gemini-2.5-flash-image");
        drop(calls);

        let failing = Assistant::with_defaults(Arc::new(ScriptedProvider::failing()));
        assert!(failing.visualize("60% Fund A").await.is_none());
    }
}
