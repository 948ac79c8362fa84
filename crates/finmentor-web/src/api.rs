//! API Client
//!
//! Thin wrappers over the server routes. Failures are folded into the same
//! fallbacks the server uses, so pages only ever render a value.

use serde::{Deserialize, Serialize};

use finmentor_core::{AnalysisMode, FALLBACK_REPLY, Turn};
use portfolio_advisor::{ANALYSIS_ERROR_MESSAGE, PortfolioAnalysis, PortfolioInput};

#[derive(Serialize)]
struct ChatRequest<'a> {
    mode: AnalysisMode,
    message: &'a str,
    history: &'a [Turn],
}

#[derive(Deserialize)]
struct ReplyResponse {
    reply: String,
}

#[derive(Deserialize)]
struct ChartResponse {
    image: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Absolute URL for a server path; the WASM client cannot resolve relative ones
fn endpoint(path: &str) -> String {
    let origin = web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_else(|| "http://localhost:3000".into());
    format!("{origin}{path}")
}

async fn post<B: Serialize + ?Sized>(path: &str, body: &B) -> Result<reqwest::Response, String> {
    reqwest::Client::new()
        .post(endpoint(path))
        .json(body)
        .send()
        .await
        .map_err(|e| e.to_string())
}

async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    response
        .json::<ErrorResponse>()
        .await
        .map_or_else(|_| format!("Request failed ({status})"), |e| e.error)
}

async fn fetch_reply(path: &str, response: Result<reqwest::Response, String>) -> String {
    let result = match response {
        Ok(r) if r.status().is_success() => r
            .json::<ReplyResponse>()
            .await
            .map(|data| data.reply)
            .map_err(|e| e.to_string()),
        Ok(r) => Err(error_message(r).await),
        Err(e) => Err(e),
    };

    result.unwrap_or_else(|e| {
        web_sys::console::warn_1(&format!("{path}: {e}").into());
        FALLBACK_REPLY.into()
    })
}

/// Send a chat query; `history` is the window captured when it was issued
pub async fn send_chat(mode: AnalysisMode, message: &str, history: &[Turn]) -> String {
    let body = ChatRequest {
        mode,
        message,
        history,
    };
    fetch_reply("/api/chat", post("/api/chat", &body).await).await
}

/// Today's market summary
pub async fn market_update() -> String {
    let response = reqwest::Client::new()
        .post(endpoint("/api/market-update"))
        .send()
        .await
        .map_err(|e| e.to_string());
    fetch_reply("/api/market-update", response).await
}

/// Generate a portfolio.
///
/// `Err` carries a validation message for the form; every other failure
/// yields the analysis-failed sentinel.
pub async fn generate_portfolio(input: &PortfolioInput) -> Result<PortfolioAnalysis, String> {
    let response = match post("/api/portfolio", input).await {
        Ok(r) => r,
        Err(_) => return Ok(PortfolioAnalysis::failed(ANALYSIS_ERROR_MESSAGE)),
    };

    if response.status() == reqwest::StatusCode::BAD_REQUEST {
        return Err(error_message(response).await);
    }
    if !response.status().is_success() {
        return Ok(PortfolioAnalysis::failed(ANALYSIS_ERROR_MESSAGE));
    }

    Ok(response
        .json::<PortfolioAnalysis>()
        .await
        .unwrap_or_else(|_| PortfolioAnalysis::failed(ANALYSIS_ERROR_MESSAGE)))
}

/// Image-model rendering of the allocation, if the model produced one
pub async fn portfolio_chart(analysis: &PortfolioAnalysis) -> Option<String> {
    let response = post("/api/portfolio/chart", analysis).await.ok()?;
    if !response.status().is_success() {
        return None;
    }
    response.json::<ChartResponse>().await.ok()?.image
}
