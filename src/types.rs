use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::LendingError;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// loan status
///
/// Only these four values exist. Parsing anything else is a data-integrity
/// failure and surfaces as [`LendingError::UnknownLoanStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LoanStatus {
    /// application submitted, no decision yet
    Pending,
    /// manual underwriting or supplementary verification in progress
    UnderReview,
    /// terminal
    Approved,
    /// terminal
    Rejected,
}

impl LoanStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanStatus::Approved | LoanStatus::Rejected)
    }

    /// whether a loan in this status may next be recorded as `next`
    ///
    /// True for the same open status and for the lifecycle edges.
    pub fn can_become(&self, next: LoanStatus) -> bool {
        matches!(
            (self, next),
            (LoanStatus::Pending, _)
                | (LoanStatus::UnderReview, LoanStatus::UnderReview)
                | (LoanStatus::UnderReview, LoanStatus::Approved)
                | (LoanStatus::UnderReview, LoanStatus::Rejected)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Pending => "Pending",
            LoanStatus::UnderReview => "Under Review",
            LoanStatus::Approved => "Approved",
            LoanStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanStatus {
    type Err = LendingError;

    /// accepts `Under Review`, `under_review`, `UnderReview` and friends, case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();

        match key.as_str() {
            "pending" => Ok(LoanStatus::Pending),
            "underreview" => Ok(LoanStatus::UnderReview),
            "approved" => Ok(LoanStatus::Approved),
            "rejected" => Ok(LoanStatus::Rejected),
            _ => {
                log::warn!("refusing unknown loan status {:?}", s);
                Err(LendingError::UnknownLoanStatus {
                    value: s.to_string(),
                })
            }
        }
    }
}

impl TryFrom<String> for LoanStatus {
    type Error = LendingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LoanStatus> for String {
    fn from(status: LoanStatus) -> Self {
        status.as_str().to_string()
    }
}

/// kind of lifecycle event, used to identify the attempted move in errors and audit records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanEventKind {
    /// send a pending application to manual review
    Escalate,
    Approve,
    Reject,
}

impl fmt::Display for LoanEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoanEventKind::Escalate => "escalate",
            LoanEventKind::Approve => "approve",
            LoanEventKind::Reject => "reject",
        };
        f.write_str(name)
    }
}

/// supporting documents attached to an application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    SalarySlip,
    BankStatement,
    SanctionLetter,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentKind::SalarySlip => "salary slip",
            DocumentKind::BankStatement => "bank statement",
            DocumentKind::SanctionLetter => "sanction letter",
        };
        f.write_str(name)
    }
}

/// references to uploaded documents, stored by the external document service
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Documents {
    pub salary_slip: Option<String>,
    pub bank_statement: Option<String>,
    pub sanction_letter: Option<String>,
}

impl Documents {
    pub fn get(&self, kind: DocumentKind) -> Option<&str> {
        match kind {
            DocumentKind::SalarySlip => self.salary_slip.as_deref(),
            DocumentKind::BankStatement => self.bank_statement.as_deref(),
            DocumentKind::SanctionLetter => self.sanction_letter.as_deref(),
        }
    }

    pub fn has(&self, kind: DocumentKind) -> bool {
        self.get(kind).map_or(false, |reference| !reference.trim().is_empty())
    }

    /// required documents that are absent, in the order given
    pub fn missing(&self, required: &[DocumentKind]) -> Vec<DocumentKind> {
        required.iter().copied().filter(|kind| !self.has(*kind)).collect()
    }
}

/// static customer classification assigned by the bank, not derived here
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomerCategory {
    #[serde(rename = "Good Customer")]
    GoodCustomer,
    Bargainer,
    Risk,
    #[serde(rename = "Self Employed")]
    SelfEmployed,
    #[serde(rename = "New Customer")]
    NewCustomer,
}

impl fmt::Display for CustomerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CustomerCategory::GoodCustomer => "Good Customer",
            CustomerCategory::Bargainer => "Bargainer",
            CustomerCategory::Risk => "Risk",
            CustomerCategory::SelfEmployed => "Self Employed",
            CustomerCategory::NewCustomer => "New Customer",
        };
        f.write_str(name)
    }
}
