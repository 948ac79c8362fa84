//! HTTP Handlers

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use finmentor_core::{AnalysisMode, AssistantError, Transcript, Turn, provider::ModelInfo};
use portfolio_advisor::{AdvisorError, PortfolioAnalysis, PortfolioInput};

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model_connected: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub mode: AnalysisMode,
    pub message: String,

    /// Prior turns, oldest first; only the most recent ones are forwarded
    #[serde(default)]
    pub history: Vec<Turn>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReplyResponse {
    pub reply: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChartResponse {
    pub image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest { message: String, code: &'static str },

    #[error(transparent)]
    Upstream(#[from] AssistantError),

    #[error(transparent)]
    Advisor(#[from] AdvisorError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } | Self::Advisor(AdvisorError::InvalidInput(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Upstream(AssistantError::RateLimited(_)) => StatusCode::TOO_MANY_REQUESTS,
            Self::Upstream(_) | Self::Advisor(_) => StatusCode::BAD_GATEWAY,
        }
    }

    const fn code(&self) -> &'static str {
        match self {
            Self::BadRequest { code, .. } => *code,
            Self::Upstream(e) => e.code(),
            Self::Advisor(e) => e.code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), "Request failed: {}", self);
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code().into(),
        };
        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_connected = state
        .assistant
        .provider()
        .health_check()
        .await
        .unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model_connected,
    })
}

/// Models available to the configured key
pub async fn list_models(State(state): State<AppState>) -> Result<Json<Vec<ModelInfo>>, ApiError> {
    let models = state.assistant.provider().list_models().await?;
    Ok(Json(models))
}

/// Chat turn: answers with the model reply or the fallback text
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ReplyResponse>, ApiError> {
    let message = payload.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest {
            message: "Message cannot be empty".into(),
            code: "EMPTY_MESSAGE",
        });
    }

    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, mode = ?payload.mode, history = payload.history.len(), "Chat request");

    let transcript = Transcript::from_turns(payload.history);
    let reply = state
        .assistant
        .reply(payload.mode, &transcript, message)
        .await;

    tracing::debug!(%request_id, chars = reply.len(), "Chat reply ready");
    Ok(Json(ReplyResponse { reply }))
}

/// One-shot market summary
pub async fn market_update_handler(State(state): State<AppState>) -> Json<ReplyResponse> {
    Json(ReplyResponse {
        reply: state.assistant.market_update().await,
    })
}

/// Portfolio generation; only an invalid profile is an error
pub async fn portfolio_handler(
    State(state): State<AppState>,
    Json(input): Json<PortfolioInput>,
) -> Result<Json<PortfolioAnalysis>, ApiError> {
    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, risk = %input.risk_appetite, "Portfolio request");

    let analysis = state.advisor.analyze(&input).await?;
    if analysis.is_failed() {
        tracing::warn!(%request_id, "Portfolio analysis unavailable");
    }
    Ok(Json(analysis))
}

/// Image-model pie chart for an analysis
pub async fn portfolio_chart_handler(
    State(state): State<AppState>,
    Json(analysis): Json<PortfolioAnalysis>,
) -> Json<ChartResponse> {
    Json(ChartResponse {
        image: state.advisor.chart_image(&analysis).await,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use finmentor_core::provider::{Completion, GenerationOptions, ProviderInfo};
    use finmentor_core::{FALLBACK_REPLY, LlmProvider};
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    struct MockProvider {
        reply: std::result::Result<String, String>,
        calls: Mutex<Vec<(Vec<Turn>, GenerationOptions)>>,
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        async fn info(&self) -> finmentor_core::Result<ProviderInfo> {
            Ok(ProviderInfo {
                name: "mock".into(),
                models: Vec::new(),
                supports_search: false,
            })
        }

        async fn health_check(&self) -> finmentor_core::Result<bool> {
            Ok(self.reply.is_ok())
        }

        async fn complete(
            &self,
            turns: &[Turn],
            options: &GenerationOptions,
        ) -> finmentor_core::Result<Completion> {
            self.calls.lock().await.push((turns.to_vec(), options.clone()));
            match &self.reply {
                Ok(text) => Ok(Completion {
                    text: text.clone(),
                    ..Default::default()
                }),
                Err(e) => Err(AssistantError::RateLimited(e.clone())),
            }
        }

        async fn list_models(&self) -> finmentor_core::Result<Vec<ModelInfo>> {
            match &self.reply {
                Ok(_) => Ok(vec![ModelInfo {
                    id: "gemini-2.5-flash".into(),
                    name: "Gemini 2.5 Flash".into(),
                    context_length: Some(1_048_576),
                }]),
                Err(e) => Err(AssistantError::RateLimited(e.clone())),
            }
        }
    }

    fn setup(reply: std::result::Result<&str, &str>) -> (axum::Router, Arc<MockProvider>) {
        let provider = Arc::new(MockProvider {
            reply: reply.map(str::to_owned).map_err(str::to_owned),
            calls: Mutex::new(Vec::new()),
        });
        (
            crate::app(AppState::new(provider.clone(), finmentor_core::ModelSet::default())),
            provider,
        )
    }

    fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = setup(Ok("ok"));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["model_connected"], true);
    }

    #[tokio::test]
    async fn test_chat_forwards_recent_history() {
        let (app, provider) = setup(Ok("**Nifty 50** closed higher."));
        let history: Vec<_> = (0..7)
            .map(|i| {
                let role = if i % 2 == 0 { "user" } else { "model" };
                serde_json::json!({"role": role, "text": format!("turn {i}")})
            })
            .collect();

        let response = app
            .oneshot(post_json(
                "/api/chat",
                &serde_json::json!({"mode": "deep", "message": "  How did Nifty do?  ", "history": history}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["reply"], "**Nifty 50** closed higher.");

        let calls = provider.calls.lock().await;
        let (turns, options) = &calls[0];
        assert_eq!(turns.len(), 6);
        assert_eq!(turns[0].text, "turn 2");
        assert_eq!(turns[5], Turn::user("How did Nifty do?"));
        assert_eq!(options.model, "gemini-2.5-pro");
    }

    #[tokio::test]
    async fn test_chat_rejects_empty_message() {
        let (app, provider) = setup(Ok("unused"));
        let response = app
            .oneshot(post_json("/api/chat", &serde_json::json!({"message": "   "})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["code"], "EMPTY_MESSAGE");
        assert!(provider.calls.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_chat_failure_returns_fallback() {
        let (app, _) = setup(Err("quota"));
        let response = app
            .oneshot(post_json("/api/chat", &serde_json::json!({"message": "hi"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["reply"], FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_market_update() {
        let (app, provider) = setup(Ok("**Here is your Indian Market Update for today:**"));
        let response = app
            .oneshot(Request::post("/api/market-update").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            read_json(response).await["reply"]
                .as_str()
                .unwrap()
                .starts_with("**Here is your")
        );
        assert_eq!(provider.calls.lock().await[0].0.len(), 1);
    }

    #[tokio::test]
    async fn test_portfolio_success() {
        let (app, _) = setup(Ok(
            "```json\n{\"rationale\":\"x\",\"projectedReturn\":\"10-12%\",\"allocations\":[{\"name\":\"Fund A\",\"percentage\":60,\"metrics\":\"m\"},{\"name\":\"Fund B\",\"percentage\":40,\"metrics\":\"m2\"}]}\n```",
        ));
        let response = app
            .oneshot(post_json(
                "/api/portfolio",
                &serde_json::json!({"initialCapital": 50000, "monthlyInvestment": 10000, "riskAppetite": "Medium"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["projectedReturn"], "10-12%");
        assert_eq!(body["allocations"][0]["lumpSum"], "30000");
        assert_eq!(body["allocations"][1]["sip"], "4000");
    }

    #[tokio::test]
    async fn test_portfolio_invalid_input() {
        let (app, provider) = setup(Ok("unused"));
        let response = app
            .oneshot(post_json(
                "/api/portfolio",
                &serde_json::json!({"initialCapital": 0, "monthlyInvestment": 0, "riskAppetite": "Low"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["code"], "INVALID_INPUT");
        assert!(provider.calls.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_portfolio_malformed_answer_is_sentinel() {
        let (app, _) = setup(Ok("Sorry, I can't do that."));
        let response = app
            .oneshot(post_json(
                "/api/portfolio",
                &serde_json::json!({"initialCapital": 1000, "monthlyInvestment": 0, "riskAppetite": "High"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["projectedReturn"], "N/A");
        assert_eq!(body["allocations"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_models_upstream_error() {
        let (app, _) = setup(Err("quota"));
        let response = app
            .oneshot(Request::get("/api/models").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(read_json(response).await["code"], "RATE_LIMITED");
    }
}
