use thiserror::Error;

use crate::types::{LoanEventKind, LoanId, LoanStatus};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LendingError {
    #[error("invalid transition: {event} not allowed from {from} ({reason})")]
    InvalidTransition {
        from: LoanStatus,
        event: LoanEventKind,
        reason: String,
    },

    #[error("unknown loan status: {value:?}")]
    UnknownLoanStatus {
        value: String,
    },

    #[error("invalid loan request: {message}")]
    InvalidLoanRequest {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("serialization error: {message}")]
    Serialization {
        message: String,
    },

    #[error("loan {id} is {stored}; refusing to overwrite it with a {incoming} copy")]
    StaleLoan {
        id: LoanId,
        stored: LoanStatus,
        incoming: LoanStatus,
    },

    #[error("loan not found: {id}")]
    LoanNotFound {
        id: LoanId,
    },
}

impl From<serde_json::Error> for LendingError {
    fn from(err: serde_json::Error) -> Self {
        LendingError::Serialization {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LendingError>;
