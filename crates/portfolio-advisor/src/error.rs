//! Error Types for Portfolio Advisor

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Response is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("Invalid allocation: {0}")]
    InvalidAllocation(String),

    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Remote call failed: {0}")]
    Remote(#[from] finmentor_core::AssistantError),
}

impl AdvisorError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::MissingField(_) => "MISSING_FIELD",
            Self::InvalidAllocation(_) => "INVALID_ALLOCATION",
            Self::Malformed(_) => "MALFORMED_RESPONSE",
            Self::Remote(_) => "REMOTE_ERROR",
        }
    }
}
