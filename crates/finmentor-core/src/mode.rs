//! Request Modes
//!
//! Every remote call is made in one of a closed set of modes, each mapped to
//! a fixed generation configuration.

use serde::{Deserialize, Serialize};

use crate::provider::{GenerationOptions, Modality};

/// Reasoning budget granted to deep analysis calls
pub const DEEP_THINKING_BUDGET: u32 = 32_768;

/// Analysis mode selectable in the chat UI
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Search-grounded quick answers
    #[default]
    Standard,
    /// Extended reasoning for complex questions
    Deep,
}

impl AnalysisMode {
    pub const ALL: [Self; 2] = [Self::Standard, Self::Deep];

    /// Label shown on the mode selector
    pub const fn label(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Deep => "Deep Analysis",
        }
    }
}

/// Remote call configuration selector
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestMode {
    Standard,
    Deep,
    Portfolio,
    Visualization,
}

impl From<AnalysisMode> for RequestMode {
    fn from(mode: AnalysisMode) -> Self {
        match mode {
            AnalysisMode::Standard => Self::Standard,
            AnalysisMode::Deep => Self::Deep,
        }
    }
}

/// Model identifiers used by each mode
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSet {
    /// Fast model for search-grounded chat
    pub flash: String,
    /// Reasoning model for deep analysis and portfolios
    pub pro: String,
    /// Image generation model
    pub image: String,
}

impl Default for ModelSet {
    fn default() -> Self {
        Self {
            flash: "gemini-2.5-flash".into(),
            pro: "gemini-2.5-pro".into(),
            image: "gemini-2.5-flash-image".into(),
        }
    }
}

impl RequestMode {
    /// Generation configuration for this mode
    pub fn options(self, models: &ModelSet, system_instruction: &str) -> GenerationOptions {
        match self {
            Self::Standard => GenerationOptions {
                system_instruction: Some(system_instruction.to_owned()),
                web_search: true,
                ..GenerationOptions::new(&models.flash)
            },
            Self::Deep => GenerationOptions {
                system_instruction: Some(system_instruction.to_owned()),
                thinking_budget: Some(DEEP_THINKING_BUDGET),
                ..GenerationOptions::new(&models.pro)
            },
            // The prompt carries its own instructions and output contract
            Self::Portfolio => GenerationOptions {
                web_search: true,
                ..GenerationOptions::new(&models.pro)
            },
            Self::Visualization => GenerationOptions {
                response_modalities: vec![Modality::Image],
                ..GenerationOptions::new(&models.image)
            },
        }
    }
}
