//! Prompt Construction
//!
//! Turns an investor profile into the single instruction turn sent to the
//! model, and formats rupee amounts the way Indian readers expect.

use rust_decimal::Decimal;

use crate::model::PortfolioInput;

const NO_TOOL_PREFERENCE: &str = "All standard tools";

const JSON_STRUCTURE: &str = r#"{
  "rationale": "string",
  "projectedReturn": "string",
  "allocations": [
    {
      "name": "string",
      "percentage": number,
      "metrics": "string"
    }
  ]
}"#;

/// Build the portfolio generation prompt
pub fn portfolio_prompt(input: &PortfolioInput) -> String {
    let tools = if input.preferred_tools.is_empty() {
        NO_TOOL_PREFERENCE.to_owned()
    } else {
        input
            .preferred_tools
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "Analyze the following Indian investor profile and generate a diversified investment portfolio.

**Investor Profile:**
- **Risk Profile:** {risk}
- **Initial Lump Sum:** ₹{capital}
- **Monthly SIP:** ₹{sip}
- **Preferred Tools:** {tools}

**Your Task:**
1.  Use your search tool to find 3-5 top-performing, relevant investment assets (Mutual Funds, Stocks from NSE/BSE, etc.) suitable for this profile.
2.  Determine an appropriate percentage allocation for each asset. The total percentage must equal 100.
3.  Provide a brief rationale for your strategy and a projected annual return range (e.g., \"10-14%\").
4.  For each recommended asset, provide a concise string of key metrics (e.g., \"1Y Return: 15.2%, Expense Ratio: 0.5%\").
5.  Return the entire response as a single JSON object inside a ```json markdown block. Do NOT include any text outside of the JSON block.

**JSON Structure:**
{JSON_STRUCTURE}",
        risk = input.risk_appetite,
        capital = format_inr(input.initial_capital),
        sip = format_inr(input.monthly_investment),
    )
}

/// Format an amount with Indian digit grouping (12,34,567.5).
///
/// At most two fraction digits are kept; trailing zeros are dropped.
pub fn format_inr(amount: Decimal) -> String {
    let rounded = amount.round_dp(2).normalize();
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = rounded.abs().to_string();

    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut out = String::with_capacity(text.len() + text.len() / 2 + 1);
    if negative {
        out.push('-');
    }
    out.push_str(&group_indian(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Last three digits form one group, every two digits before that another
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_owned();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}
