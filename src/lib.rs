pub mod config;
pub mod customer;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod interest;
pub mod lifecycle;
pub mod loan;
pub mod payments;
pub mod types;

// re-export key types
pub use config::{PolicyConfig, RiskTier};
pub use customer::{Customer, CustomerProfile};
pub use decimal::{Money, Rate};
pub use errors::{LendingError, Result};
pub use events::{Event, EventStore};
pub use interest::monthly_rate;
pub use lifecycle::{
    eligible_amount, risk_adjusted_terms, transition, AdjustedTerms, Assessment, LoanEvent,
    LoanStateMachine, Verification,
};
pub use loan::Loan;
pub use payments::{
    compute_emi, generate_schedule, AmortizationSchedule, LoanRequest, PaymentSummary,
    ScheduleIter, ScheduleRow,
};
pub use types::{
    CustomerCategory, DocumentKind, Documents, LoanEventKind, LoanId, LoanStatus,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
