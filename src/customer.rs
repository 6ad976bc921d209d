use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LendingError, Result};
use crate::events::{Event, EventStore};
use crate::loan::Loan;
use crate::payments::LoanRequest;
use crate::types::{CustomerCategory, Documents, LoanId, LoanStatus};

/// the part of a customer record the lifecycle guards read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub cust_id: String,
    pub credit_score: u32,
    pub pre_approved_limit: Money,
    pub category: Option<CustomerCategory>,
}

/// customer record with the loans it owns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub cust_id: String,
    pub name: String,
    pub credit_score: u32,
    pub pre_approved_limit: Money,
    pub category: Option<CustomerCategory>,
    #[serde(default)]
    pub loans: Vec<Loan>,
}

impl Customer {
    pub fn new(cust_id: &str, name: &str, credit_score: u32, pre_approved_limit: Money) -> Self {
        Self {
            cust_id: cust_id.to_string(),
            name: name.to_string(),
            credit_score,
            pre_approved_limit,
            category: None,
            loans: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: CustomerCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn profile(&self) -> CustomerProfile {
        CustomerProfile {
            cust_id: self.cust_id.clone(),
            credit_score: self.credit_score,
            pre_approved_limit: self.pre_approved_limit,
            category: self.category,
        }
    }

    /// submit a new application; the loan starts out pending
    pub fn apply(
        &mut self,
        request: &LoanRequest,
        documents: Documents,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> &Loan {
        let loan = Loan::submit(&self.cust_id, request, documents, time_provider);

        events.emit(Event::LoanSubmitted {
            loan_id: loan.loan_id,
            cust_id: self.cust_id.clone(),
            requested_amount: loan.requested_amount,
            timestamp: loan.applied_at,
        });
        log::info!(
            "customer {} applied for {} over {} months",
            self.cust_id,
            loan.requested_amount,
            request.tenure_months
        );

        let index = self.loans.len();
        self.loans.push(loan);
        &self.loans[index]
    }

    pub fn loan(&self, loan_id: LoanId) -> Option<&Loan> {
        self.loans.iter().find(|loan| loan.loan_id == loan_id)
    }

    /// replace a loan with its transitioned copy
    ///
    /// Only copies that move the stored loan along the lifecycle are accepted.
    /// A decided loan can be stored again unchanged but never replaced.
    pub fn store(&mut self, loan: Loan) -> Result<()> {
        if loan.cust_id != self.cust_id {
            return Err(LendingError::LoanNotFound { id: loan.loan_id });
        }
        let slot = self
            .loans
            .iter_mut()
            .find(|existing| existing.loan_id == loan.loan_id)
            .ok_or(LendingError::LoanNotFound { id: loan.loan_id })?;

        if *slot != loan && !slot.status().can_become(loan.status()) {
            log::warn!(
                "refusing {} copy of loan {} over stored {} record",
                loan.status(),
                loan.loan_id,
                slot.status()
            );
            return Err(LendingError::StaleLoan {
                id: loan.loan_id,
                stored: slot.status(),
                incoming: loan.status(),
            });
        }

        *slot = loan;
        Ok(())
    }

    pub fn loans_with_status(&self, status: LoanStatus) -> impl Iterator<Item = &Loan> {
        self.loans.iter().filter(move |loan| loan.status() == status)
    }
}
