pub mod eligibility;
pub mod guards;

use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};

use crate::config::PolicyConfig;
use crate::customer::CustomerProfile;
use crate::decimal::{Money, Rate};
use crate::errors::{LendingError, Result};
use crate::events::{Event, EventStore};
use crate::loan::Loan;
use crate::types::{LoanEventKind, LoanStatus};

pub use eligibility::{eligible_amount, risk_adjusted_terms, AdjustedTerms, Verification};

/// guard inputs gathered by the caller for one decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub profile: CustomerProfile,
    /// supplementary verification result, required to settle a loan under review
    pub verification: Option<Verification>,
}

impl Assessment {
    pub fn new(profile: CustomerProfile) -> Self {
        Self {
            profile,
            verification: None,
        }
    }

    pub fn with_verification(mut self, verification: Verification) -> Self {
        self.verification = Some(verification);
        self
    }
}

/// a requested lifecycle move together with the facts its guard is checked against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanEvent {
    /// Pending -> UnderReview
    Escalate(Assessment),
    /// Pending or UnderReview -> Approved
    Approve(Assessment),
    /// Pending or UnderReview -> Rejected
    Reject(Assessment),
}

impl LoanEvent {
    pub fn kind(&self) -> LoanEventKind {
        match self {
            LoanEvent::Escalate(_) => LoanEventKind::Escalate,
            LoanEvent::Approve(_) => LoanEventKind::Approve,
            LoanEvent::Reject(_) => LoanEventKind::Reject,
        }
    }

    pub fn assessment(&self) -> &Assessment {
        match self {
            LoanEvent::Escalate(assessment)
            | LoanEvent::Approve(assessment)
            | LoanEvent::Reject(assessment) => assessment,
        }
    }
}

/// loan lifecycle state machine
///
/// ```text
/// Pending ──escalate──> UnderReview
///    │                     │
///    ├──approve──> Approved <──approve──┤
///    └──reject───> Rejected <──reject───┘
/// ```
///
/// Transitions are pure: the input loan is never touched and the caller is
/// responsible for persisting the returned copy.
#[derive(Debug, Clone, Default)]
pub struct LoanStateMachine {
    policy: PolicyConfig,
}

impl LoanStateMachine {
    pub fn new(policy: PolicyConfig) -> Result<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// apply `event` to `loan`, returning the loan in its new state
    pub fn transition(&self, loan: &Loan, event: &LoanEvent) -> Result<Loan> {
        let kind = event.kind();
        let assessment = event.assessment();

        let refuse = |reason: String| {
            log::warn!(
                "refused {} for loan {} in {}: {}",
                kind,
                loan.loan_id,
                loan.status(),
                reason
            );
            LendingError::InvalidTransition {
                from: loan.status(),
                event: kind,
                reason,
            }
        };

        if loan.is_terminal() {
            return Err(refuse(format!("{} is a terminal state", loan.status())));
        }
        if assessment.profile.cust_id != loan.cust_id {
            return Err(refuse(format!(
                "assessment is for customer {}, loan belongs to {}",
                assessment.profile.cust_id, loan.cust_id
            )));
        }

        let next = match (loan.status(), kind) {
            (LoanStatus::Pending, LoanEventKind::Escalate) => {
                let reason = guards::escalation_reason(loan, assessment, &self.policy)
                    .ok_or_else(|| refuse("nothing requires manual review".to_string()))?;
                escalate(loan, reason)
            }
            (_, LoanEventKind::Escalate) => {
                return Err(refuse("loan is already under review".to_string()));
            }
            (_, LoanEventKind::Approve) => {
                if let Some(blocker) = guards::approval_blocker(loan, assessment, &self.policy) {
                    return Err(refuse(blocker));
                }
                self.approve(loan, assessment)
            }
            (_, LoanEventKind::Reject) => {
                let reason = guards::rejection_reason(loan, assessment, &self.policy)
                    .ok_or_else(|| refuse("no rejection condition holds".to_string()))?;
                reject(loan, reason)
            }
        };

        log::info!(
            "loan {} moved {} -> {} on {}",
            loan.loan_id,
            loan.status(),
            next.status(),
            kind
        );

        Ok(next)
    }

    /// the event whose guard currently holds, checked reject, approve, escalate
    ///
    /// `None` when the loan is terminal or is waiting on verification.
    pub fn next_event(&self, loan: &Loan, assessment: &Assessment) -> Option<LoanEvent> {
        if loan.is_terminal() || assessment.profile.cust_id != loan.cust_id {
            return None;
        }

        if guards::rejection_reason(loan, assessment, &self.policy).is_some() {
            return Some(LoanEvent::Reject(assessment.clone()));
        }
        if guards::approval_blocker(loan, assessment, &self.policy).is_none() {
            return Some(LoanEvent::Approve(assessment.clone()));
        }
        if loan.status() == LoanStatus::Pending
            && guards::escalation_reason(loan, assessment, &self.policy).is_some()
        {
            return Some(LoanEvent::Escalate(assessment.clone()));
        }

        None
    }

    /// decide automatically; `Ok(None)` when no move is possible yet
    pub fn advance(&self, loan: &Loan, assessment: &Assessment) -> Result<Option<Loan>> {
        self.next_event(loan, assessment)
            .map(|event| self.transition(loan, &event))
            .transpose()
    }

    /// [`transition`](Self::transition) plus an audit record of the outcome
    pub fn transition_recorded(
        &self,
        loan: &Loan,
        event: &LoanEvent,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<Loan> {
        let result = self.transition(loan, event);

        match &result {
            Ok(next) => events.emit(Event::StatusChanged {
                loan_id: loan.loan_id,
                old_status: loan.status(),
                new_status: next.status(),
                event: event.kind(),
                reason: next.reason.clone(),
                timestamp: time_provider.now(),
            }),
            Err(LendingError::InvalidTransition { reason, .. }) => events.emit(Event::TransitionRefused {
                loan_id: loan.loan_id,
                status: loan.status(),
                event: event.kind(),
                reason: reason.clone(),
                timestamp: time_provider.now(),
            }),
            Err(_) => {}
        }

        result
    }

    fn approve(&self, loan: &Loan, assessment: &Assessment) -> Loan {
        let score = assessment.profile.credit_score;
        let mut next = loan.clone();
        next.status = LoanStatus::Approved;
        next.approved_amount = Some(loan.requested_amount);

        let adjusted = loan
            .interest_rate
            .zip(loan.tenure_months)
            .and_then(|(rate, tenure)| risk_adjusted_terms(score, rate.as_percentage(), tenure, &self.policy));
        if let Some(terms) = adjusted {
            next.interest_rate = Some(Rate::from_percentage(terms.annual_rate_percent));
            next.tenure_months = Some(terms.tenure_months);
        }

        next.reason = Some(match self.policy.risk_tier(score) {
            Some(tier) => format!("Approved. Rated {}.", tier.label),
            None => "Approved.".to_string(),
        });
        next
    }
}

fn escalate(loan: &Loan, reason: String) -> Loan {
    let mut next = loan.clone();
    next.status = LoanStatus::UnderReview;
    next.reason = Some(reason);
    next
}

fn reject(loan: &Loan, reason: String) -> Loan {
    let mut next = loan.clone();
    next.status = LoanStatus::Rejected;
    next.approved_amount = Some(Money::ZERO);
    next.reason = Some(reason);
    next
}

/// apply `event` under the standard policy
pub fn transition(loan: &Loan, event: &LoanEvent) -> Result<Loan> {
    LoanStateMachine::default().transition(loan, event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::LoanRequest;
    use crate::types::{CustomerCategory, Documents};
    use chrono::{TimeZone, Utc};
    use hourglass_rs::TimeSource;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    const CUST: &str = "201059871";

    fn time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2025, 2, 3, 11, 0, 0).unwrap()))
    }

    fn all_documents() -> Documents {
        Documents {
            salary_slip: Some("salary_slip_201059871.pdf".to_string()),
            bank_statement: Some("bank_statement_201059871.pdf".to_string()),
            sanction_letter: None,
        }
    }

    fn loan(amount: i64, documents: Documents) -> Loan {
        let request = LoanRequest::new(Money::from_major(amount), dec!(11), 36).unwrap();
        Loan::submit(CUST, &request, documents, &time())
    }

    fn assessment(score: u32, limit: i64) -> Assessment {
        Assessment::new(CustomerProfile {
            cust_id: CUST.to_string(),
            credit_score: score,
            pre_approved_limit: Money::from_major(limit),
            category: None,
        })
    }

    fn expect_refused(result: Result<Loan>, from: LoanStatus, event: LoanEventKind) -> String {
        match result {
            Err(LendingError::InvalidTransition { from: f, event: e, reason }) => {
                assert_eq!((f, e), (from, event));
                reason
            }
            other => panic!("expected invalid transition, got {:?}", other),
        }
    }

    #[test]
    fn test_low_score_is_rejected_and_stays_rejected() {
        let pending = loan(250_000, all_documents());
        let facts = assessment(550, 300_000);

        let rejected = transition(&pending, &LoanEvent::Reject(facts.clone())).unwrap();
        assert_eq!(rejected.status(), LoanStatus::Rejected);
        assert_eq!(rejected.approved_amount(), Some(Money::ZERO));
        assert!(rejected.reason().unwrap().contains("550"));

        let again = transition(&rejected, &LoanEvent::Approve(assessment(800, 1_000_000)));
        let reason = expect_refused(again, LoanStatus::Rejected, LoanEventKind::Approve);
        assert!(reason.contains("terminal"));

        // approving the pending loan directly fails on the score as well
        let direct = transition(&pending, &LoanEvent::Approve(facts));
        expect_refused(direct, LoanStatus::Pending, LoanEventKind::Approve);
    }

    #[test]
    fn test_terminal_states_refuse_every_event() {
        let facts = assessment(760, 300_000);
        let approved = transition(&loan(250_000, all_documents()), &LoanEvent::Approve(facts.clone())).unwrap();
        let rejected = transition(&loan(250_000, all_documents()), &LoanEvent::Reject(assessment(600, 300_000))).unwrap();

        for terminal in [&approved, &rejected] {
            for event in [
                LoanEvent::Escalate(facts.clone()),
                LoanEvent::Approve(facts.clone()),
                LoanEvent::Reject(assessment(500, 300_000)),
            ] {
                let kind = event.kind();
                expect_refused(transition(terminal, &event), terminal.status(), kind);
            }
        }
    }

    #[test]
    fn test_pending_approval_when_guards_hold() {
        let pending = loan(250_000, all_documents());
        let before = pending.clone();

        let approved = transition(&pending, &LoanEvent::Approve(assessment(760, 300_000))).unwrap();

        assert_eq!(pending, before);
        assert_eq!(approved.status(), LoanStatus::Approved);
        assert_eq!(approved.approved_amount(), Some(Money::from_major(250_000)));
        assert_eq!(approved.interest_rate, Some(Rate::from_percentage(dec!(11))));
        assert_eq!(approved.tenure_months, Some(36));
        assert_eq!(approved.reason(), Some("Approved. Rated Low Risk."));
        assert_eq!(approved.loan_id, pending.loan_id);
    }

    #[test]
    fn test_pending_approval_guards() {
        let facts = assessment(760, 300_000);

        let over_limit = transition(&loan(350_000, all_documents()), &LoanEvent::Approve(facts.clone()));
        let reason = expect_refused(over_limit, LoanStatus::Pending, LoanEventKind::Approve);
        assert!(reason.contains("pre-approved limit"));

        let no_docs = Documents {
            salary_slip: Some("salary_slip_201059871.pdf".to_string()),
            ..Documents::default()
        };
        let missing = transition(&loan(250_000, no_docs), &LoanEvent::Approve(facts.clone()));
        let reason = expect_refused(missing, LoanStatus::Pending, LoanEventKind::Approve);
        assert_eq!(reason, "Missing required documents: bank statement.");

        let mut risky = facts.clone();
        risky.profile.category = Some(CustomerCategory::Risk);
        let category = transition(&loan(250_000, all_documents()), &LoanEvent::Approve(risky));
        let reason = expect_refused(category, LoanStatus::Pending, LoanEventKind::Approve);
        assert!(reason.contains("Risk"));
    }

    #[test]
    fn test_escalation() {
        let over_limit = loan(450_000, all_documents());
        let review = transition(&over_limit, &LoanEvent::Escalate(assessment(760, 300_000))).unwrap();
        assert_eq!(review.status(), LoanStatus::UnderReview);
        assert_eq!(
            review.reason(),
            Some("Requested amount ₹4,50,000 exceeds the pre-approved limit of ₹3,00,000.")
        );
        assert_eq!(review.approved_amount(), None);

        let incomplete = transition(&loan(100_000, Documents::default()), &LoanEvent::Escalate(assessment(760, 300_000))).unwrap();
        assert_eq!(incomplete.status(), LoanStatus::UnderReview);

        let clean = transition(&loan(100_000, all_documents()), &LoanEvent::Escalate(assessment(760, 300_000)));
        expect_refused(clean, LoanStatus::Pending, LoanEventKind::Escalate);

        let twice = transition(&review, &LoanEvent::Escalate(assessment(760, 300_000)));
        expect_refused(twice, LoanStatus::UnderReview, LoanEventKind::Escalate);
    }

    #[test]
    fn test_pending_rejection_guards() {
        let good = transition(&loan(250_000, all_documents()), &LoanEvent::Reject(assessment(760, 300_000)));
        expect_refused(good, LoanStatus::Pending, LoanEventKind::Reject);

        let beyond_cap = transition(&loan(700_000, all_documents()), &LoanEvent::Reject(assessment(760, 300_000))).unwrap();
        assert_eq!(beyond_cap.status(), LoanStatus::Rejected);
        assert_eq!(
            beyond_cap.reason(),
            Some("Requested amount ₹7,00,000 exceeds the maximum eligibility limit of ₹6,00,000 (2x pre-approved).")
        );
    }

    #[test]
    fn test_under_review_needs_verification() {
        let review = transition(&loan(450_000, all_documents()), &LoanEvent::Escalate(assessment(760, 300_000))).unwrap();

        let unverified = transition(&review, &LoanEvent::Approve(assessment(760, 300_000)));
        let reason = expect_refused(unverified, LoanStatus::UnderReview, LoanEventKind::Approve);
        assert!(reason.contains("verification"));

        let unverified = transition(&review, &LoanEvent::Reject(assessment(760, 300_000)));
        expect_refused(unverified, LoanStatus::UnderReview, LoanEventKind::Reject);
    }

    #[test]
    fn test_under_review_approval_applies_risk_pricing() {
        let review = transition(&loan(450_000, all_documents()), &LoanEvent::Escalate(assessment(680, 300_000))).unwrap();
        let facts = assessment(680, 300_000).with_verification(Verification::new(true, Money::from_major(500_000)));

        let approved = transition(&review, &LoanEvent::Approve(facts.clone())).unwrap();
        assert_eq!(approved.status(), LoanStatus::Approved);
        assert_eq!(approved.approved_amount(), Some(Money::from_major(450_000)));
        assert_eq!(approved.interest_rate, Some(Rate::from_percentage(dec!(14.5))));
        assert_eq!(approved.tenure_months, Some(24));
        assert_eq!(approved.reason(), Some("Approved. Rated High Risk."));

        // not rejectable while verification covers the request
        let reject = transition(&review, &LoanEvent::Reject(facts));
        expect_refused(reject, LoanStatus::UnderReview, LoanEventKind::Reject);
    }

    #[test]
    fn test_under_review_rejection() {
        let review = transition(&loan(450_000, all_documents()), &LoanEvent::Escalate(assessment(760, 300_000))).unwrap();

        let short = assessment(760, 300_000).with_verification(Verification::new(true, Money::from_major(400_000)));
        let approve = transition(&review, &LoanEvent::Approve(short.clone()));
        expect_refused(approve, LoanStatus::UnderReview, LoanEventKind::Approve);

        let rejected = transition(&review, &LoanEvent::Reject(short)).unwrap();
        assert_eq!(rejected.status(), LoanStatus::Rejected);
        assert_eq!(
            rejected.reason(),
            Some("Eligible amount ₹4,00,000 is below the requested ₹4,50,000.")
        );

        let failed = assessment(760, 300_000).with_verification(Verification::new(false, Money::from_major(900_000)));
        let rejected = transition(&review, &LoanEvent::Reject(failed)).unwrap();
        assert_eq!(rejected.reason(), Some("Supplementary verification failed."));
    }

    #[test]
    fn test_assessment_must_match_customer() {
        let mut facts = assessment(760, 300_000);
        facts.profile.cust_id = "201059870".to_string();

        let result = transition(&loan(250_000, all_documents()), &LoanEvent::Approve(facts));
        let reason = expect_refused(result, LoanStatus::Pending, LoanEventKind::Approve);
        assert!(reason.contains("201059870"));
    }

    #[test]
    fn test_next_event_and_advance() {
        let machine = LoanStateMachine::default();

        let low = assessment(600, 300_000);
        let pending = loan(250_000, all_documents());
        assert_eq!(machine.next_event(&pending, &low).map(|e| e.kind()), Some(LoanEventKind::Reject));

        let good = assessment(790, 300_000);
        assert_eq!(machine.next_event(&pending, &good).map(|e| e.kind()), Some(LoanEventKind::Approve));

        let over = loan(450_000, all_documents());
        let review = machine.advance(&over, &good).unwrap().unwrap();
        assert_eq!(review.status(), LoanStatus::UnderReview);

        // waiting on verification
        assert!(machine.next_event(&review, &good).is_none());
        assert_eq!(machine.advance(&review, &good).unwrap(), None);

        let verified = good.clone().with_verification(Verification::new(true, Money::from_major(600_000)));
        let approved = machine.advance(&review, &verified).unwrap().unwrap();
        assert_eq!(approved.status(), LoanStatus::Approved);
        assert!(machine.next_event(&approved, &verified).is_none());
    }

    #[test]
    fn test_custom_policy() {
        let policy = PolicyConfig {
            min_credit_score: 700,
            required_documents: Vec::new(),
            ..PolicyConfig::standard()
        };
        let machine = LoanStateMachine::new(policy).unwrap();

        let rejected = machine
            .transition(&loan(100_000, Documents::default()), &LoanEvent::Reject(assessment(680, 300_000)))
            .unwrap();
        assert!(rejected.reason().unwrap().contains("700"));

        let approved = machine
            .transition(&loan(100_000, Documents::default()), &LoanEvent::Approve(assessment(720, 300_000)))
            .unwrap();
        assert_eq!(approved.status(), LoanStatus::Approved);

        let invalid = PolicyConfig {
            max_emi_to_income: dec!(0),
            ..PolicyConfig::standard()
        };
        assert!(LoanStateMachine::new(invalid).is_err());
    }

    #[test]
    fn test_transition_recorded() {
        let machine = LoanStateMachine::default();
        let mut events = EventStore::new();
        let pending = loan(250_000, all_documents());

        let approved = machine
            .transition_recorded(&pending, &LoanEvent::Approve(assessment(760, 300_000)), &time(), &mut events)
            .unwrap();
        let refused = machine.transition_recorded(
            &approved,
            &LoanEvent::Reject(assessment(500, 300_000)),
            &time(),
            &mut events,
        );
        assert!(refused.is_err());

        let recorded: Vec<_> = events.for_loan(pending.loan_id).cloned().collect();
        assert_eq!(
            recorded,
            vec![
                Event::StatusChanged {
                    loan_id: pending.loan_id,
                    old_status: LoanStatus::Pending,
                    new_status: LoanStatus::Approved,
                    event: LoanEventKind::Approve,
                    reason: Some("Approved. Rated Low Risk.".to_string()),
                    timestamp: time().now(),
                },
                Event::TransitionRefused {
                    loan_id: pending.loan_id,
                    status: LoanStatus::Approved,
                    event: LoanEventKind::Reject,
                    reason: "Approved is a terminal state".to_string(),
                    timestamp: time().now(),
                },
            ]
        );
    }

    #[test]
    fn test_core_types_are_thread_safe() {
        fn is_normal<T: Sized + Send + Sync + Unpin>() {}
        is_normal::<Loan>();
        is_normal::<LoanEvent>();
        is_normal::<LoanStateMachine>();
        is_normal::<crate::payments::ScheduleIter>();
    }
}
