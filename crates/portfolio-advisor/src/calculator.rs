//! Monetary Calculator
//!
//! Amounts are always derived locally from the percentages and what the user
//! typed; figures the model may have put in its text are never used.

use rust_decimal::Decimal;

use crate::model::{
    AiAllocation, AiPortfolioResponse, Allocation, NOT_AVAILABLE, PortfolioAnalysis, PortfolioInput,
};

/// `percentage / 100 × amount`, saturating instead of overflowing
pub fn share_of(percentage: Decimal, amount: Decimal) -> Decimal {
    let fraction = percentage / Decimal::ONE_HUNDRED;
    fraction
        .checked_mul(amount)
        .map_or_else(
            || {
                if fraction.is_sign_negative() == amount.is_sign_negative() {
                    Decimal::MAX
                } else {
                    Decimal::MIN
                }
            },
            |share| share.normalize(),
        )
}

/// Attach lump-sum and SIP amounts to each allocation
pub fn allocate(allocations: &[AiAllocation], capital: Decimal, monthly: Decimal) -> Vec<Allocation> {
    allocations
        .iter()
        .map(|a| Allocation {
            name: a.name.clone(),
            percentage: a.percentage,
            metrics: a.metrics.clone(),
            lump_sum: share_of(a.percentage, capital),
            sip: share_of(a.percentage, monthly),
        })
        .collect()
}

/// Final analysis for a validated response
pub fn build_analysis(response: AiPortfolioResponse, input: &PortfolioInput) -> PortfolioAnalysis {
    let allocations = allocate(
        &response.allocations,
        input.initial_capital,
        input.monthly_investment,
    );

    // An empty set is shown as the error panel, so no return figure either
    let projected_return = if allocations.is_empty() {
        NOT_AVAILABLE.to_owned()
    } else {
        response.projected_return
    };

    PortfolioAnalysis {
        rationale: response.rationale,
        projected_return,
        allocations,
    }
}

/// Sum of lump-sum and SIP amounts
pub fn totals(allocations: &[Allocation]) -> (Decimal, Decimal) {
    allocations.iter().fold((Decimal::ZERO, Decimal::ZERO), |(lump, sip), a| {
        (
            lump.saturating_add(a.lump_sum),
            sip.saturating_add(a.sip),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RiskAppetite;
    use rust_decimal_macros::dec;

    fn ai(name: &str, percentage: Decimal) -> AiAllocation {
        AiAllocation {
            name: name.into(),
            percentage,
            metrics: String::new(),
        }
    }

    #[test]
    fn test_share_of_bounds() {
        assert_eq!(share_of(dec!(0), dec!(50000)), Decimal::ZERO);
        assert_eq!(share_of(dec!(100), dec!(50000)), dec!(50000));
        assert_eq!(share_of(dec!(60), dec!(0)), Decimal::ZERO);
        assert_eq!(share_of(dec!(12.5), dec!(8000)), dec!(1000));
        assert_eq!(share_of(dec!(33.3), dec!(100000)), dec!(33300));
    }

    #[test]
    fn test_share_of_is_deterministic() {
        let a = share_of(dec!(17.35), dec!(123456));
        let b = share_of(dec!(17.35), dec!(123456));
        assert_eq!(a, b);
        assert_eq!(a, dec!(21419.616));
    }

    #[test]
    fn test_share_of_drops_trailing_zeros() {
        assert_eq!(share_of(dec!(60), dec!(50000)).to_string(), "30000");
        assert_eq!(share_of(dec!(40), dec!(10000)).to_string(), "4000");
        assert_eq!(share_of(dec!(12.5), dec!(1000)).to_string(), "125");
    }

    #[test]
    fn test_share_of_saturates() {
        assert_eq!(share_of(dec!(1000), Decimal::MAX), Decimal::MAX);
    }

    #[test]
    fn test_allocate_end_to_end_figures() {
        let allocations = allocate(
            &[ai("Fund A", dec!(60)), ai("Fund B", dec!(40))],
            dec!(50000),
            dec!(10000),
        );

        assert_eq!(allocations[0].lump_sum, dec!(30000));
        assert_eq!(allocations[0].sip, dec!(6000));
        assert_eq!(allocations[1].lump_sum, dec!(20000));
        assert_eq!(allocations[1].sip, dec!(4000));
        assert_eq!(totals(&allocations), (dec!(50000), dec!(10000)));
    }

    #[test]
    fn test_empty_allocations_report_na() {
        let input = PortfolioInput::new(dec!(1000), dec!(0), RiskAppetite::Low);
        let analysis = build_analysis(
            AiPortfolioResponse {
                rationale: "Markets are closed.".into(),
                projected_return: "8%".into(),
                allocations: Vec::new(),
            },
            &input,
        );

        assert!(analysis.is_failed());
        assert_eq!(analysis.rationale, "Markets are closed.");
        assert_eq!(analysis.projected_return, "N/A");
    }
}
