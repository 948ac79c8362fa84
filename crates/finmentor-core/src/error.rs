//! Error Types

use thiserror::Error;

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, AssistantError>;

/// Errors raised while talking to the remote model
#[derive(Error, Debug)]
pub enum AssistantError {
    /// Remote model returned an error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Remote model unreachable or overloaded
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Quota exhausted
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Credential rejected
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Remote model answered with no usable content
    #[error("Empty response from model {0}")]
    EmptyResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl AssistantError {
    /// Short machine-readable code, used in logs and API payloads
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Provider(_) => "PROVIDER_ERROR",
            Self::ProviderUnavailable(_) => "PROVIDER_UNAVAILABLE",
            Self::RateLimited(_) => "RATE_LIMITED",
            Self::Auth(_) => "AUTH_FAILED",
            Self::EmptyResponse(_) => "EMPTY_RESPONSE",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Other(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<anyhow::Error> for AssistantError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
