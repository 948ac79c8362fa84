//! Gemini LLM Provider
//!
//! Implementation of `LlmProvider` for the Google Generative Language REST API.

use std::time::Duration;

use async_trait::async_trait;
use finmentor_core::{
    error::{AssistantError, Result},
    message::{Role, Turn},
    mode::ModelSet,
    provider::{
        Completion, FinishReason, GenerationOptions, InlineImage, LlmProvider, Modality,
        ModelInfo, ProviderInfo, TokenUsage,
    },
};
use serde::{Deserialize, Serialize};

/// Environment variable holding the API credential
pub const API_KEY_VAR: &str = "API_KEY";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini provider configuration
#[derive(Clone)]
pub struct GeminiConfig {
    /// API credential
    pub api_key: String,

    /// API root, without trailing slash
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Model identifiers per mode
    pub models: ModelSet,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("models", &self.models)
            .finish()
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: 120,
            models: ModelSet::default(),
        }
    }

    /// Read configuration from the process environment.
    ///
    /// `API_KEY` is required; everything else has a default.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(API_KEY_VAR)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AssistantError::Config(format!("{API_KEY_VAR} environment variable is not set"))
            })?;

        let mut config = Self::new(api_key);

        if let Some(url) = lookup("GEMINI_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_owned();
        }
        // Zero or unparsable keeps the default
        if let Some(secs) = lookup("GEMINI_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
        {
            config.timeout_secs = secs;
        }
        if let Some(model) = lookup("GEMINI_FLASH_MODEL") {
            config.models.flash = model;
        }
        if let Some(model) = lookup("GEMINI_PRO_MODEL") {
            config.models.pro = model;
        }
        if let Some(model) = lookup("GEMINI_IMAGE_MODEL") {
            config.models.image = model;
        }

        Ok(config)
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolDeclaration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolDeclaration {
    google_search: serde_json::Value,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    response_modalities: Vec<Modality>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelList {
    #[serde(default)]
    models: Vec<RemoteModel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteModel {
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    input_token_limit: Option<u32>,
}

// ============================================================================
// Provider
// ============================================================================

/// Gemini LLM provider
pub struct GeminiProvider {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create from configuration
    pub fn from_config(config: GeminiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AssistantError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(GeminiConfig::from_env()?)
    }

    pub const fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path)
    }

    /// Convert turns and options to the request body
    fn build_request(turns: &[Turn], options: &GenerationOptions) -> GenerateRequest {
        let contents = turns
            .iter()
            .map(|t| Content {
                role: Some(
                    match t.role {
                        Role::User => "user",
                        Role::Model => "model",
                    }
                    .into(),
                ),
                parts: vec![Part {
                    text: Some(t.text.clone()),
                    ..Default::default()
                }],
            })
            .collect();

        let system_instruction = options.system_instruction.as_ref().map(|s| Content {
            role: None,
            parts: vec![Part {
                text: Some(s.clone()),
                ..Default::default()
            }],
        });

        let tools = if options.web_search {
            vec![ToolDeclaration {
                google_search: serde_json::json!({}),
            }]
        } else {
            Vec::new()
        };

        let config = GenerationConfig {
            temperature: options.temperature,
            top_p: options.top_p,
            max_output_tokens: options.max_output_tokens,
            thinking_config: options
                .thinking_budget
                .map(|thinking_budget| ThinkingConfig { thinking_budget }),
            response_modalities: options.response_modalities.clone(),
        };
        let has_config = config.temperature.is_some()
            || config.top_p.is_some()
            || config.max_output_tokens.is_some()
            || config.thinking_config.is_some()
            || !config.response_modalities.is_empty();

        GenerateRequest {
            contents,
            system_instruction,
            tools,
            generation_config: has_config.then_some(config),
        }
    }

    /// Convert the API response to a completion
    fn convert_response(response: GenerateResponse, model: &str) -> Completion {
        let mut text = String::new();
        let mut images = Vec::new();
        let mut finish_reason = None;

        if let Some(candidate) = response.candidates.into_iter().next() {
            finish_reason = candidate.finish_reason.as_deref().map(convert_finish_reason);
            let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
            for part in parts {
                if part.thought == Some(true) {
                    continue;
                }
                if let Some(t) = part.text {
                    text.push_str(&t);
                }
                if let Some(data) = part.inline_data {
                    images.push(InlineImage {
                        mime_type: data.mime_type,
                        data: data.data,
                    });
                }
            }
        }

        Completion {
            text,
            images,
            model: model.to_owned(),
            usage: response.usage_metadata.map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            }),
            finish_reason,
        }
    }

    /// Map a non-success HTTP status to an error
    fn status_error(status: reqwest::StatusCode, body: &str) -> AssistantError {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| format!("HTTP {status}"));

        match status.as_u16() {
            401 | 403 => AssistantError::Auth(message),
            429 => AssistantError::RateLimited(message),
            500..=599 => AssistantError::ProviderUnavailable(message),
            _ => AssistantError::Provider(message),
        }
    }

    async fn read_body(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AssistantError::ProviderUnavailable(e.to_string()))?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(Self::status_error(status, &body))
        }
    }
}

fn convert_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "STOP" => FinishReason::Stop,
        "MAX_TOKENS" => FinishReason::Length,
        "SAFETY" | "BLOCKLIST" | "PROHIBITED_CONTENT" => FinishReason::Safety,
        _ => FinishReason::Other,
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn info(&self) -> Result<ProviderInfo> {
        let models = self.list_models().await.unwrap_or_default();

        Ok(ProviderInfo {
            name: "Gemini".into(),
            models,
            supports_search: true,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        match self.list_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Gemini health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(&self, turns: &[Turn], options: &GenerationOptions) -> Result<Completion> {
        let request = Self::build_request(turns, options);
        let url = self.endpoint(&format!("models/{}:generateContent", options.model));

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AssistantError::ProviderUnavailable(e.to_string()))?;

        let body = Self::read_body(response).await?;
        let parsed: GenerateResponse = serde_json::from_str(&body)?;

        Ok(Self::convert_response(parsed, &options.model))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let response = self
            .client
            .get(self.endpoint("models"))
            .header("x-goog-api-key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| AssistantError::ProviderUnavailable(e.to_string()))?;

        let body = Self::read_body(response).await?;
        let list: ModelList = serde_json::from_str(&body)?;

        Ok(list
            .models
            .into_iter()
            .map(|m| {
                let id = m
                    .name
                    .strip_prefix("models/")
                    .unwrap_or(&m.name)
                    .to_owned();
                ModelInfo {
                    name: m.display_name.unwrap_or_else(|| id.clone()),
                    id,
                    context_length: m.input_token_limit,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finmentor_core::mode::RequestMode;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_requires_api_key() {
        let err = GeminiConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, AssistantError::Config(_)));

        let err = GeminiConfig::from_lookup(lookup(&[("API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, AssistantError::Config(_)));
    }

    #[test]
    fn test_config_defaults_and_overrides() {
        let config = GeminiConfig::from_lookup(lookup(&[("API_KEY", "secret")])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 120);
        assert_eq!(config.models, ModelSet::default());
        assert!(!format!("{config:?}").contains("secret"));

        let config = GeminiConfig::from_lookup(lookup(&[
            ("API_KEY", "secret"),
            ("GEMINI_BASE_URL", "http://localhost:8080/v1beta/"),
            ("GEMINI_TIMEOUT_SECS", "30"),
            ("GEMINI_PRO_MODEL", "gemini-exp"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:8080/v1beta");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.models.pro, "gemini-exp");
    }

    #[test]
    fn test_config_ignores_unusable_timeout() {
        for raw in ["0", "soon", "-5", ""] {
            let config = GeminiConfig::from_lookup(lookup(&[
                ("API_KEY", "secret"),
                ("GEMINI_TIMEOUT_SECS", raw),
            ]))
            .unwrap();
            assert_eq!(config.timeout_secs, 120, "timeout {raw:?}");
        }
    }

    #[test]
    fn test_standard_request_body() {
        let options = RequestMode::Standard.options(&ModelSet::default(), "Be brief.");
        let request = GeminiProvider::build_request(
            &[Turn::model("Welcome"), Turn::user("Nifty today?")],
            &options,
        );
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["contents"][0]["role"], "model");
        assert_eq!(body["contents"][1]["parts"][0]["text"], "Nifty today?");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Be brief.");
        assert_eq!(body["tools"][0]["googleSearch"], serde_json::json!({}));
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_deep_and_image_request_config() {
        let models = ModelSet::default();
        let deep = GeminiProvider::build_request(
            &[Turn::user("q")],
            &RequestMode::Deep.options(&models, "sys"),
        );
        let body = serde_json::to_value(&deep).unwrap();
        assert_eq!(body["generationConfig"]["thinkingConfig"]["thinkingBudget"], 32_768);
        assert!(body.get("tools").is_none());

        let image = GeminiProvider::build_request(
            &[Turn::user("chart")],
            &RequestMode::Visualization.options(&models, "sys"),
        );
        let body = serde_json::to_value(&image).unwrap();
        assert_eq!(body["generationConfig"]["responseModalities"][0], "IMAGE");
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_convert_response() {
        let raw = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "internal notes", "thought": true},
                    {"text": "Sensex "},
                    {"text": "rallied."},
                    {"inlineData": {"mimeType": "image/png", "data": "AAAA"}}
                ]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5, "totalTokenCount": 15}
        }"#;
        let response: GenerateResponse = serde_json::from_str(raw).unwrap();
        let completion = GeminiProvider::convert_response(response, "gemini-2.5-flash");

        assert_eq!(completion.text, "Sensex rallied.");
        assert_eq!(completion.images.len(), 1);
        assert_eq!(completion.finish_reason, Some(FinishReason::Stop));
        assert_eq!(completion.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn test_convert_empty_response() {
        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        let completion = GeminiProvider::convert_response(response, "m");
        assert!(completion.text.is_empty());
        assert!(completion.finish_reason.is_none());
    }

    #[test]
    fn test_status_mapping() {
        let body = r#"{"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        let err = GeminiProvider::status_error(reqwest::StatusCode::TOO_MANY_REQUESTS, body);
        assert!(matches!(err, AssistantError::RateLimited(ref m) if m == "Quota exceeded"));

        let err = GeminiProvider::status_error(reqwest::StatusCode::FORBIDDEN, "");
        assert!(matches!(err, AssistantError::Auth(_)));

        let err = GeminiProvider::status_error(reqwest::StatusCode::BAD_GATEWAY, "<html>");
        assert!(matches!(err, AssistantError::ProviderUnavailable(_)));

        let err = GeminiProvider::status_error(reqwest::StatusCode::BAD_REQUEST, "");
        assert!(matches!(err, AssistantError::Provider(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_unavailable() {
        let mut config = GeminiConfig::new("key");
        config.base_url = "http://127.0.0.1:9".into();
        config.timeout_secs = 2;
        let provider = GeminiProvider::from_config(config).unwrap();

        let err = provider
            .complete(&[Turn::user("hi")], &GenerationOptions::new("m"))
            .await
            .unwrap_err();
        assert!(matches!(err, AssistantError::ProviderUnavailable(_)));
        assert!(!provider.health_check().await.unwrap());
    }
}
