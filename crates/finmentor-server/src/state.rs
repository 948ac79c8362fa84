//! Application State

use std::sync::Arc;

use finmentor_core::{Assistant, AssistantConfig, LlmProvider, ModelSet};
use portfolio_advisor::PortfolioAdvisor;

/// Shared application state. Holds no per-user data.
#[derive(Clone)]
pub struct AppState {
    /// Chat and market-update orchestration
    pub assistant: Arc<Assistant>,

    /// Portfolio generation on the same assistant
    pub advisor: PortfolioAdvisor,
}

impl AppState {
    pub fn new(provider: Arc<dyn LlmProvider>, models: ModelSet) -> Self {
        let config = AssistantConfig {
            models,
            ..AssistantConfig::default()
        };
        let assistant = Arc::new(Assistant::new(provider, config));
        Self {
            advisor: PortfolioAdvisor::new(assistant.clone()),
            assistant,
        }
    }
}
