//! Response Parser
//!
//! The model is asked for a single fenced JSON block, but nothing enforces
//! it. This module is the boundary where malformed output is turned into a
//! typed error instead of reaching the UI.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::calculator::build_analysis;
use crate::error::{AdvisorError, Result};
use crate::model::{
    ANALYSIS_ERROR_MESSAGE, AiAllocation, AiPortfolioResponse, PortfolioAnalysis, PortfolioInput,
};

const FENCE: &str = "```";
const JSON_FENCE: &str = "```json";

/// Response as sent, every field optional until validated
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResponse {
    #[serde(default)]
    rationale: Option<String>,
    #[serde(default)]
    projected_return: Option<String>,
    #[serde(default)]
    allocations: Option<Vec<AiAllocation>>,
}

/// Strip the markdown fence around the JSON payload.
///
/// Prefers a ```` ```json ```` block anywhere in the text, then a bare
/// fence anywhere, and otherwise returns the trimmed text unchanged.
pub fn extract_json_block(raw: &str) -> &str {
    let text = raw.trim();

    let body = if let Some(start) = text.find(JSON_FENCE) {
        &text[start + JSON_FENCE.len()..]
    } else if let Some(start) = text.find(FENCE) {
        &text[start + FENCE.len()..]
    } else {
        return text;
    };

    let body = body.find(FENCE).map_or(body, |end| &body[..end]);
    body.trim()
}

/// Parse and validate the model's portfolio answer
pub fn parse_response(raw: &str) -> Result<AiPortfolioResponse> {
    let parsed: RawResponse = serde_json::from_str(extract_json_block(raw))?;

    let rationale = non_empty(parsed.rationale).ok_or(AdvisorError::MissingField("rationale"))?;
    let projected_return =
        non_empty(parsed.projected_return).ok_or(AdvisorError::MissingField("projectedReturn"))?;
    let allocations = parsed
        .allocations
        .ok_or(AdvisorError::MissingField("allocations"))?;

    for allocation in &allocations {
        if allocation.percentage.is_sign_negative() && !allocation.percentage.is_zero() {
            return Err(AdvisorError::InvalidAllocation(format!(
                "{} at {}%",
                allocation.name, allocation.percentage
            )));
        }
        if allocation.percentage > Decimal::ONE_HUNDRED {
            tracing::warn!(
                name = %allocation.name,
                percentage = %allocation.percentage,
                "Allocation above 100%, using it as given"
            );
        }
    }

    Ok(AiPortfolioResponse {
        rationale,
        projected_return,
        allocations,
    })
}

/// Parse the raw answer into the final analysis, or the failure sentinel
pub fn analysis_from_raw(raw: &str, input: &PortfolioInput) -> PortfolioAnalysis {
    match parse_response(raw) {
        Ok(response) => build_analysis(response, input),
        Err(e) => {
            tracing::warn!(code = e.code(), "Discarding portfolio response: {}", e);
            PortfolioAnalysis::failed(ANALYSIS_ERROR_MESSAGE)
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
