/// lifecycle - pending applications through review to a decision
use lending_engine_rs::{
    Assessment, Customer, CustomerCategory, Documents, EventStore, LoanRequest, LoanStateMachine,
    LoanStatus, Money, PolicyConfig, Verification,
};
use lending_engine_rs::{SafeTimeProvider, TimeSource};
use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== loan lifecycle ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
    ));
    let mut events = EventStore::new();
    let machine = LoanStateMachine::new(PolicyConfig::standard())?;

    let mut customer = Customer::new("201059872", "Neha Kapoor", 720, Money::from_major(300_000))
        .with_category(CustomerCategory::GoodCustomer);
    let documents = Documents {
        salary_slip: Some("salary_slip_201059872.pdf".to_string()),
        bank_statement: Some("bank_statement_201059872.pdf".to_string()),
        sanction_letter: None,
    };

    // above the pre-approved limit, so it goes to review first
    let request = LoanRequest::new(Money::from_major(450_000), dec!(11), 60)?;
    let loan = customer.apply(&request, documents, &time, &mut events).clone();
    println!("submitted {} for {}", loan.loan_id, loan.requested_amount.format_inr());

    let assessment = Assessment::new(customer.profile());
    if let Some(review) = machine.advance(&loan, &assessment)? {
        println!("{}: {}", review.status(), review.reason().unwrap_or_default());
        customer.store(review)?;
    }

    // salary verification comes back from the document service
    let loan = customer.loan(loan.loan_id).cloned().ok_or("loan missing")?;
    let verification = Verification::from_salary(
        &assessment.profile,
        &loan,
        Some(Money::from_major(65_000)),
        machine.policy(),
    );
    println!("verified eligibility: {}", verification.eligible_amount.format_inr());

    let assessment = assessment.with_verification(verification);
    match machine.next_event(&loan, &assessment) {
        Some(event) => {
            let decided = machine.transition_recorded(&loan, &event, &time, &mut events)?;
            println!("{}: {}", decided.status(), decided.reason().unwrap_or_default());
            if let Some(summary) = decided.payment_summary() {
                println!("emi {} over {:?} months", summary.emi.format_inr(), decided.tenure_months);
            }
            customer.store(decided)?;
        }
        None => println!("still waiting on a decision"),
    }

    println!("\napproved loans: {}", customer.loans_with_status(LoanStatus::Approved).count());

    println!("\naudit trail:");
    for event in events.events() {
        println!("  {:?}", event);
    }

    Ok(())
}
