pub mod amortization;
pub mod emi;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LendingError, Result};
use crate::interest;

pub use amortization::{generate_schedule, AmortizationSchedule, ScheduleIter, ScheduleRow};
pub use emi::compute_emi;

/// principal, rate and tenure for one calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub principal: Money,
    pub annual_rate_percent: Decimal,
    pub tenure_months: u32,
}

impl LoanRequest {
    /// validated request: principal > 0, 0 < rate <= 100, tenure > 0
    pub fn new(principal: Money, annual_rate_percent: Decimal, tenure_months: u32) -> Result<Self> {
        if !principal.is_positive() {
            return Err(LendingError::InvalidLoanRequest {
                message: format!("principal must be positive, got {}", principal),
            });
        }
        if annual_rate_percent <= Decimal::ZERO || annual_rate_percent > Decimal::ONE_HUNDRED {
            return Err(LendingError::InvalidLoanRequest {
                message: format!("annual rate must be in (0, 100], got {}", annual_rate_percent),
            });
        }
        if tenure_months == 0 {
            return Err(LendingError::InvalidLoanRequest {
                message: "tenure must be at least one month".to_string(),
            });
        }

        Ok(Self {
            principal,
            annual_rate_percent,
            tenure_months,
        })
    }

    pub fn monthly_rate(&self) -> Decimal {
        interest::monthly_rate(self.annual_rate_percent)
    }

    /// EMI, total interest and total payable for this request
    pub fn summary(&self) -> PaymentSummary {
        compute_emi(self.principal, self.annual_rate_percent, self.tenure_months)
    }

    /// lazily generated schedule; bound it with `take` for a preview window
    pub fn schedule(&self) -> ScheduleIter {
        ScheduleIter::new(self.principal, self.annual_rate_percent, self.tenure_months)
    }
}

/// derived repayment figures, rounded to whole currency units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub emi: Money,
    pub total_interest: Money,
    pub total_payable: Money,
}

impl PaymentSummary {
    pub const ZERO: PaymentSummary = PaymentSummary {
        emi: Money::ZERO,
        total_interest: Money::ZERO,
        total_payable: Money::ZERO,
    };

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// share of the total payable that is interest, in percent
    pub fn interest_share(&self) -> Decimal {
        if self.total_payable.is_zero() {
            return Decimal::ZERO;
        }
        (self.total_interest.as_decimal() / self.total_payable.as_decimal() * Decimal::ONE_HUNDRED)
            .round_dp(2)
    }
}
