//! Portfolio Advisor Service
//!
//! Runs one portfolio analysis: validate the profile, ask the reasoning model
//! with search enabled, then parse and price the answer locally.

use std::sync::Arc;

use finmentor_core::mode::RequestMode;
use finmentor_core::{Assistant, Turn};

use crate::error::Result;
use crate::model::{ANALYSIS_ERROR_MESSAGE, PortfolioAnalysis, PortfolioInput};
use crate::parser::analysis_from_raw;
use crate::prompt::portfolio_prompt;

/// Portfolio generation on top of a shared [`Assistant`]
#[derive(Clone)]
pub struct PortfolioAdvisor {
    assistant: Arc<Assistant>,
}

impl PortfolioAdvisor {
    pub const fn new(assistant: Arc<Assistant>) -> Self {
        Self { assistant }
    }

    /// Analyze an investor profile.
    ///
    /// Only an invalid profile is an error. A failed remote call or an
    /// unusable answer yields [`PortfolioAnalysis::failed`].
    pub async fn analyze(&self, input: &PortfolioInput) -> Result<PortfolioAnalysis> {
        input.validate()?;

        tracing::info!(
            risk = %input.risk_appetite,
            tools = input.preferred_tools.len(),
            "Generating portfolio"
        );

        let prompt = portfolio_prompt(input);
        match self
            .assistant
            .try_generate(RequestMode::Portfolio, &[Turn::user(prompt)])
            .await
        {
            Ok(raw) => Ok(analysis_from_raw(&raw, input)),
            Err(e) => {
                tracing::warn!(code = e.code(), "Portfolio call failed: {}", e);
                Ok(PortfolioAnalysis::failed(ANALYSIS_ERROR_MESSAGE))
            }
        }
    }

    /// Image-model illustration of the allocation, as a data URL
    pub async fn chart_image(&self, analysis: &PortfolioAnalysis) -> Option<String> {
        if analysis.is_failed() {
            return None;
        }
        self.assistant.visualize(&chart_description(analysis)).await
    }

    pub fn assistant(&self) -> &Arc<Assistant> {
        &self.assistant
    }
}

fn chart_description(analysis: &PortfolioAnalysis) -> String {
    analysis
        .allocations
        .iter()
        .map(|a| format!("{}: {}%", a.name, a.percentage.normalize()))
        .collect::<Vec<_>>()
        .join(", ")
}
