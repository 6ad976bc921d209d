use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::PolicyConfig;
use crate::customer::CustomerProfile;
use crate::decimal::Money;
use crate::interest::{monthly_rate, principal_per_unit_installment};
use crate::loan::Loan;

/// rate and tenure after credit-score pricing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustedTerms {
    pub tier: String,
    pub rate_spread: Decimal,
    pub annual_rate_percent: Decimal,
    pub tenure_months: u32,
}

/// price a request by credit score
///
/// Adds the tier spread to the requested rate (two decimals, never below zero)
/// and caps the tenure at the tier maximum. `None` when no tier covers the score.
pub fn risk_adjusted_terms(
    credit_score: u32,
    annual_rate_percent: Decimal,
    tenure_months: u32,
    policy: &PolicyConfig,
) -> Option<AdjustedTerms> {
    let tier = policy.risk_tier(credit_score)?;

    Some(AdjustedTerms {
        tier: tier.label.clone(),
        rate_spread: tier.rate_spread,
        annual_rate_percent: (annual_rate_percent + tier.rate_spread)
            .round_dp(2)
            .max(Decimal::ZERO),
        tenure_months: tenure_months.min(tier.max_tenure_months),
    })
}

/// largest amount the customer can be approved for on a verified salary
///
/// The smaller of the hard cap on the pre-approved limit and the principal
/// whose EMI, at the risk-adjusted rate and tenure, stays within the allowed
/// share of salary. Rounded down to whole units.
pub fn eligible_amount(
    profile: &CustomerProfile,
    monthly_salary: Money,
    annual_rate_percent: Decimal,
    tenure_months: u32,
    policy: &PolicyConfig,
) -> Money {
    if !monthly_salary.is_positive() || tenure_months == 0 {
        return Money::ZERO;
    }

    let (rate, tenure) = match risk_adjusted_terms(profile.credit_score, annual_rate_percent, tenure_months, policy) {
        Some(terms) => (terms.annual_rate_percent, terms.tenure_months),
        None => (annual_rate_percent, tenure_months),
    };

    let cap = policy.hard_cap(profile.pre_approved_limit);
    let affordable = monthly_salary
        .as_decimal()
        .checked_mul(policy.max_emi_to_income)
        .and_then(|max_emi| max_emi.checked_mul(principal_per_unit_installment(monthly_rate(rate), tenure)))
        .map(|amount| Money::from_decimal(amount.floor()));

    log::debug!(
        "eligibility for {}: affordable {:?} at {}% over {} months, cap {}",
        profile.cust_id,
        affordable,
        rate,
        tenure,
        cap
    );

    // beyond the decimal range only the cap binds
    affordable.map_or(cap, |amount| amount.min(cap))
}

/// outcome of supplementary verification for a loan under review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    /// the document service confirmed the submitted evidence
    pub passed: bool,
    pub eligible_amount: Money,
}

impl Verification {
    pub fn new(passed: bool, eligible_amount: Money) -> Self {
        Self {
            passed,
            eligible_amount,
        }
    }

    /// verification from a salary figure the document service extracted
    ///
    /// Uses the loan's own rate and tenure; without them nothing is eligible.
    pub fn from_salary(
        profile: &CustomerProfile,
        loan: &Loan,
        verified_salary: Option<Money>,
        policy: &PolicyConfig,
    ) -> Self {
        let terms = loan.interest_rate.zip(loan.tenure_months);

        match (verified_salary, terms) {
            (Some(salary), Some((rate, tenure))) => Self {
                passed: true,
                eligible_amount: eligible_amount(profile, salary, rate.as_percentage(), tenure, policy),
            },
            (Some(_), None) => Self::new(true, Money::ZERO),
            (None, _) => Self::new(false, Money::ZERO),
        }
    }

    pub fn covers(&self, amount: Money) -> bool {
        self.passed && self.eligible_amount >= amount
    }
}
