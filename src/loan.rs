use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::payments::{AmortizationSchedule, LoanRequest, PaymentSummary, ScheduleIter};
use crate::types::{Documents, LoanId, LoanStatus};

/// loan application record
///
/// `status`, `approved_amount` and `reason` are only changed by the lifecycle
/// state machine, which hands back a new value rather than editing this one.
/// Schedules and summaries are never stored here; they are derived on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: LoanId,
    pub cust_id: String,
    pub requested_amount: Money,
    pub(crate) approved_amount: Option<Money>,
    pub(crate) status: LoanStatus,
    /// requested rate until approval, risk-adjusted afterwards
    pub interest_rate: Option<Rate>,
    pub tenure_months: Option<u32>,
    pub(crate) reason: Option<String>,
    #[serde(default)]
    pub documents: Documents,
    pub applied_at: DateTime<Utc>,
}

impl Loan {
    /// create a pending application from the requested terms
    pub fn submit(
        cust_id: &str,
        request: &LoanRequest,
        documents: Documents,
        time_provider: &SafeTimeProvider,
    ) -> Self {
        Self {
            loan_id: Uuid::new_v4(),
            cust_id: cust_id.to_string(),
            requested_amount: request.principal,
            approved_amount: None,
            status: LoanStatus::Pending,
            interest_rate: Some(Rate::from_percentage(request.annual_rate_percent)),
            tenure_months: Some(request.tenure_months),
            reason: None,
            documents,
            applied_at: time_provider.now(),
        }
    }

    pub fn status(&self) -> LoanStatus {
        self.status
    }

    pub fn approved_amount(&self) -> Option<Money> {
        self.approved_amount
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// approved terms when there are any, the requested ones otherwise
    pub fn terms(&self) -> Option<LoanRequest> {
        let principal = match self.approved_amount {
            Some(amount) if amount.is_positive() => amount,
            _ => self.requested_amount,
        };

        Some(LoanRequest {
            principal,
            annual_rate_percent: self.interest_rate?.as_percentage(),
            tenure_months: self.tenure_months?,
        })
    }

    /// EMI figures for the current terms, if rate and tenure are known
    pub fn payment_summary(&self) -> Option<PaymentSummary> {
        self.terms().map(|terms| terms.summary())
    }

    /// repayment schedule for the current terms, if rate and tenure are known
    pub fn schedule(&self) -> Option<ScheduleIter> {
        self.terms().map(|terms| terms.schedule())
    }

    /// balance left after `periods_paid` installments
    pub fn outstanding_after(&self, periods_paid: u32) -> Option<Money> {
        let terms = self.terms()?;
        Some(AmortizationSchedule::generate(&terms).balance_after(periods_paid))
    }

    /// share of the tenure already repaid, in percent
    pub fn repayment_progress(&self, periods_paid: u32) -> Option<Decimal> {
        let tenure = self.tenure_months.filter(|months| *months > 0)?;
        let paid = periods_paid.min(tenure);
        Some((Decimal::from(paid) / Decimal::from(tenure) * Decimal::ONE_HUNDRED).round_dp(2))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// parse a record from the loan store
    ///
    /// A status outside the lifecycle is refused with
    /// [`LendingError::UnknownLoanStatus`](crate::errors::LendingError::UnknownLoanStatus)
    /// before the rest of the record is read.
    pub fn from_json(json: &str) -> Result<Self> {
        let record: serde_json::Value = serde_json::from_str(json)?;
        if let Some(status) = record.get("status").and_then(serde_json::Value::as_str) {
            status.parse::<LoanStatus>()?;
        }
        Ok(serde_json::from_value(record)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LendingError;
    use chrono::TimeZone;
    use hourglass_rs::TimeSource;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn pending_loan() -> Loan {
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap(),
        ));
        let request = LoanRequest::new(Money::from_major(500_000), dec!(10.5), 36).unwrap();
        Loan::submit("201059870", &request, Documents::default(), &time)
    }

    #[test]
    fn test_submit_starts_pending() {
        let loan = pending_loan();

        assert_eq!(loan.status(), LoanStatus::Pending);
        assert_eq!(loan.approved_amount(), None);
        assert_eq!(loan.reason(), None);
        assert_eq!(loan.interest_rate, Some(Rate::from_percentage(dec!(10.5))));
        assert_eq!(loan.tenure_months, Some(36));
        assert_eq!(loan.applied_at, Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap());
    }

    #[test]
    fn test_derived_views_use_requested_terms() {
        let loan = pending_loan();

        let summary = loan.payment_summary().unwrap();
        assert_eq!(summary.emi, Money::from_major(16_251));

        let rows: Vec<_> = loan.schedule().unwrap().collect();
        assert_eq!(rows.len(), 36);
        assert_eq!(rows[35].remaining_balance, Money::ZERO);
    }

    #[test]
    fn test_derived_views_prefer_approved_amount() {
        let mut loan = pending_loan();
        loan.approved_amount = Some(Money::from_major(100_000));
        loan.interest_rate = Some(Rate::from_percentage(dec!(12)));
        loan.tenure_months = Some(12);

        assert_eq!(loan.payment_summary().unwrap().emi, Money::from_major(8_885));

        // rejected loans carry a zero approval and fall back to the request
        loan.approved_amount = Some(Money::ZERO);
        assert_eq!(loan.terms().unwrap().principal, Money::from_major(500_000));
    }

    #[test]
    fn test_views_need_rate_and_tenure() {
        let mut loan = pending_loan();
        loan.interest_rate = None;
        assert!(loan.payment_summary().is_none());
        assert!(loan.schedule().is_none());
        assert!(loan.outstanding_after(3).is_none());
    }

    #[test]
    fn test_outstanding_and_progress() {
        let loan = pending_loan();

        assert_eq!(loan.outstanding_after(0), Some(Money::from_major(500_000)));
        assert_eq!(loan.outstanding_after(1), Some(Money::from_major(488_124)));
        assert_eq!(loan.outstanding_after(36), Some(Money::ZERO));

        assert_eq!(loan.repayment_progress(0), Some(Decimal::ZERO));
        assert_eq!(loan.repayment_progress(9), Some(dec!(25)));
        assert_eq!(loan.repayment_progress(50), Some(dec!(100)));
    }

    #[test]
    fn test_json_round_trip_and_integrity() {
        let loan = pending_loan();
        let json = loan.to_json().unwrap();
        assert!(json.contains("\"status\":\"Pending\""));
        assert_eq!(Loan::from_json(&json).unwrap(), loan);

        let tampered = json.replace("\"Pending\"", "\"Disbursed\"");
        assert_eq!(
            Loan::from_json(&tampered).unwrap_err(),
            LendingError::UnknownLoanStatus {
                value: "Disbursed".to_string()
            }
        );

        // malformed records are still plain serialization failures
        let truncated = &json[..json.len() - 1];
        assert!(matches!(Loan::from_json(truncated), Err(LendingError::Serialization { .. })));
        let no_status = json.replace("\"status\":\"Pending\",", "");
        assert!(matches!(Loan::from_json(&no_status), Err(LendingError::Serialization { .. })));
    }
}
