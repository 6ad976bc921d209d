use rust_decimal::Decimal;

use crate::decimal::Money;
use crate::interest::{installment_per_unit, monthly_rate};

use super::PaymentSummary;

/// unrounded EMI and total payable, or `None` for degenerate input
///
/// Degenerate means non-positive principal, negative rate, zero tenure, or
/// figures too large for a `Decimal`. A zero rate is not degenerate: it
/// amortizes straight-line.
fn exact_totals(principal: Decimal, annual_rate_percent: Decimal, tenure_months: u32) -> Option<(Decimal, Decimal)> {
    if principal <= Decimal::ZERO || annual_rate_percent < Decimal::ZERO || tenure_months == 0 {
        return None;
    }

    // EMI = P * r * (1 + r)^n / ((1 + r)^n - 1)
    let rate = monthly_rate(annual_rate_percent);
    let emi = principal.checked_mul(installment_per_unit(rate, tenure_months))?;
    let total_payable = emi.checked_mul(Decimal::from(tenure_months))?;
    Some((emi, total_payable))
}

/// unrounded EMI, or `None` for degenerate input
pub(crate) fn exact_emi(principal: Decimal, annual_rate_percent: Decimal, tenure_months: u32) -> Option<Decimal> {
    exact_totals(principal, annual_rate_percent, tenure_months).map(|(emi, _)| emi)
}

/// calculate EMI, total interest and total payable
///
/// Never fails. Degenerate input yields [`PaymentSummary::ZERO`]. Figures are
/// rounded to whole units only at the end; intermediates keep full precision.
pub fn compute_emi(principal: Money, annual_rate_percent: Decimal, tenure_months: u32) -> PaymentSummary {
    let Some((emi, total_payable)) = exact_totals(principal.as_decimal(), annual_rate_percent, tenure_months) else {
        log::debug!(
            "degenerate emi input: principal {}, rate {}%, tenure {}",
            principal,
            annual_rate_percent,
            tenure_months
        );
        return PaymentSummary::ZERO;
    };

    let total_interest = total_payable - principal.as_decimal();

    let summary = PaymentSummary {
        emi: Money::from_decimal(emi).round_to_unit(),
        total_interest: Money::from_decimal(total_interest).round_to_unit(),
        total_payable: Money::from_decimal(total_payable).round_to_unit(),
    };

    log::debug!(
        "emi for {} at {}% over {} months: {}",
        principal,
        annual_rate_percent,
        tenure_months,
        summary.emi
    );

    summary
}
