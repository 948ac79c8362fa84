//! Domain Models
//!
//! Investor profile, the untrusted allocation set returned by the model and
//! the analysis shown to the user. Uses `rust_decimal` for all monetary
//! values - never use f64 for money!

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{AdvisorError, Result};

/// Instruments the investor can express a preference for
pub const INVESTMENT_TOOLS: [&str; 4] = ["Mutual Funds", "Stocks", "Bonds", "Debt Funds"];

/// Largest accepted capital or SIP amount
pub const MAX_AMOUNT: Decimal = dec!(1000000000000000);

/// Projected return reported when no usable analysis exists
pub const NOT_AVAILABLE: &str = "N/A";

/// Rationale reported when the model output cannot be used
pub const ANALYSIS_ERROR_MESSAGE: &str = "There was an error generating the portfolio analysis. The AI model's response was not in the expected format. Please try adjusting your inputs or try again later.";

/// Investor risk appetite
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskAppetite {
    Low,
    #[default]
    Medium,
    High,
}

impl RiskAppetite {
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl std::fmt::Display for RiskAppetite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Investor profile submitted from the portfolio form
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioInput {
    /// One-time lump sum (₹)
    pub initial_capital: Decimal,

    /// Monthly SIP contribution (₹)
    pub monthly_investment: Decimal,

    pub risk_appetite: RiskAppetite,

    /// Subset of [`INVESTMENT_TOOLS`]; empty means no preference
    #[serde(default)]
    pub preferred_tools: BTreeSet<String>,
}

impl PortfolioInput {
    pub fn new(initial_capital: Decimal, monthly_investment: Decimal, risk_appetite: RiskAppetite) -> Self {
        Self {
            initial_capital,
            monthly_investment,
            risk_appetite,
            preferred_tools: BTreeSet::new(),
        }
    }

    /// Add the tool if absent, remove it otherwise
    pub fn toggle_tool(&mut self, tool: &str) {
        if !self.preferred_tools.remove(tool) {
            self.preferred_tools.insert(tool.to_owned());
        }
    }

    /// Check amounts before any remote call is made
    pub fn validate(&self) -> Result<()> {
        for (label, amount) in [
            ("Initial capital", self.initial_capital),
            ("Monthly SIP", self.monthly_investment),
        ] {
            if amount.is_sign_negative() && !amount.is_zero() {
                return Err(AdvisorError::InvalidInput(format!("{label} cannot be negative")));
            }
            if amount > MAX_AMOUNT {
                return Err(AdvisorError::InvalidInput(format!("{label} is too large")));
            }
        }

        if self.initial_capital.is_zero() && self.monthly_investment.is_zero() {
            return Err(AdvisorError::InvalidInput(
                "Please enter either Initial Capital or Monthly SIP.".into(),
            ));
        }

        Ok(())
    }
}

/// Parse a form field: every non-digit is ignored, empty means zero
pub fn parse_amount(raw: &str) -> Decimal {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Decimal::ZERO;
    }
    digits.parse::<u64>().map_or(Decimal::MAX, Decimal::from)
}

/// One allocation as returned by the remote model
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiAllocation {
    pub name: String,

    /// Share of the portfolio, 0-100
    pub percentage: Decimal,

    /// Free-form key metrics (e.g., "1Y Return: 15.2%, Expense Ratio: 0.5%")
    #[serde(default)]
    pub metrics: String,
}

/// Validated remote response, before local amounts are attached
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiPortfolioResponse {
    pub rationale: String,
    pub projected_return: String,
    pub allocations: Vec<AiAllocation>,
}

/// An allocation with locally computed amounts
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub name: String,
    pub percentage: Decimal,
    pub metrics: String,

    /// Share of the initial capital
    pub lump_sum: Decimal,

    /// Share of the monthly SIP
    pub sip: Decimal,
}

/// Analysis shown to the user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioAnalysis {
    /// Markdown rationale, or the error message for a failed analysis
    pub rationale: String,
    pub projected_return: String,
    pub allocations: Vec<Allocation>,
}

impl PortfolioAnalysis {
    /// The "analysis failed" sentinel
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            rationale: message.into(),
            projected_return: NOT_AVAILABLE.into(),
            allocations: Vec::new(),
        }
    }

    /// Empty allocations mean the error panel is shown
    pub fn is_failed(&self) -> bool {
        self.allocations.is_empty()
    }
}
