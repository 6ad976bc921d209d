use crate::config::PolicyConfig;
use crate::loan::Loan;
use crate::types::LoanStatus;

use super::Assessment;

/// why a pending loan has to go to manual review, if it has to
pub fn escalation_reason(loan: &Loan, assessment: &Assessment, policy: &PolicyConfig) -> Option<String> {
    let profile = &assessment.profile;

    if loan.requested_amount > profile.pre_approved_limit {
        return Some(format!(
            "Requested amount {} exceeds the pre-approved limit of {}.",
            loan.requested_amount.format_inr(),
            profile.pre_approved_limit.format_inr()
        ));
    }

    let missing = loan.documents.missing(&policy.required_documents);
    if !missing.is_empty() {
        let names: Vec<String> = missing.iter().map(|kind| kind.to_string()).collect();
        return Some(format!("Missing required documents: {}.", names.join(", ")));
    }

    if let Some(category) = profile
        .category
        .filter(|category| policy.review_categories.contains(category))
    {
        return Some(format!("Customer category {} requires manual review.", category));
    }

    None
}

/// why the loan has to be rejected, if it has to
///
/// Credit score and the hard cap apply in any open state. Verification
/// results only count once the loan is under review.
pub fn rejection_reason(loan: &Loan, assessment: &Assessment, policy: &PolicyConfig) -> Option<String> {
    let profile = &assessment.profile;

    if profile.credit_score < policy.min_credit_score {
        return Some(format!(
            "Credit score {} is below the policy minimum of {}.",
            profile.credit_score, policy.min_credit_score
        ));
    }

    let cap = policy.hard_cap(profile.pre_approved_limit);
    if loan.requested_amount > cap {
        return Some(format!(
            "Requested amount {} exceeds the maximum eligibility limit of {} ({}x pre-approved).",
            loan.requested_amount.format_inr(),
            cap.format_inr(),
            policy.max_limit_multiple.normalize()
        ));
    }

    if loan.status() != LoanStatus::UnderReview {
        return None;
    }

    match &assessment.verification {
        Some(verification) if !verification.passed => {
            Some("Supplementary verification failed.".to_string())
        }
        Some(verification) if verification.eligible_amount < loan.requested_amount => Some(format!(
            "Eligible amount {} is below the requested {}.",
            verification.eligible_amount.format_inr(),
            loan.requested_amount.format_inr()
        )),
        _ => None,
    }
}

/// what stands in the way of approval; `None` when every approval guard holds
pub fn approval_blocker(loan: &Loan, assessment: &Assessment, policy: &PolicyConfig) -> Option<String> {
    if let Some(reason) = rejection_reason(loan, assessment, policy) {
        return Some(reason);
    }

    match loan.status() {
        LoanStatus::Pending => escalation_reason(loan, assessment, policy),
        LoanStatus::UnderReview => match &assessment.verification {
            None => Some("Supplementary verification has not completed.".to_string()),
            Some(_) => None,
        },
        status => Some(format!("{} is a terminal state.", status)),
    }
}
