//! # portfolio-advisor
//!
//! AI-generated investment portfolios for Indian investors, priced locally.
//!
//! ## Flow
//!
//! ```text
//! PortfolioInput ──validate──► portfolio_prompt ──► reasoning model (+ search)
//!                                                          │
//!                                                 fenced JSON (untrusted)
//!                                                          │
//!                      extract_json_block ──► parse_response ──► allocate
//!                                                          │
//!                                               PortfolioAnalysis
//! ```
//!
//! ## Example: ₹50,000 lump sum + ₹10,000 SIP, Medium risk
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │  Fund A  ████████████  60%  ₹30,000  ₹6,000/mo │
//! │  Fund B  ████████      40%  ₹20,000  ₹4,000/mo │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! The model only chooses names and percentages. Rupee amounts are always
//! computed here with `rust_decimal`, and any answer that does not fit the
//! expected shape becomes [`PortfolioAnalysis::failed`].

pub mod advisor;
pub mod calculator;
pub mod chart;
pub mod error;
pub mod model;
pub mod parser;
pub mod prompt;

pub use advisor::PortfolioAdvisor;
pub use calculator::{allocate, build_analysis, share_of, totals};
pub use chart::{ChartSlice, PiePath, chart_slices, pie_paths};
pub use error::{AdvisorError, Result};
pub use model::{
    ANALYSIS_ERROR_MESSAGE, AiAllocation, AiPortfolioResponse, Allocation, INVESTMENT_TOOLS,
    MAX_AMOUNT, NOT_AVAILABLE, PortfolioAnalysis, PortfolioInput, RiskAppetite, parse_amount,
};
pub use parser::{analysis_from_raw, extract_json_block, parse_response};
pub use prompt::{format_inr, portfolio_prompt};
