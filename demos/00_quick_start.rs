/// quick start - minimal example to get started
use lending_engine_rs::{compute_emi, transition, Assessment, CustomerProfile, Documents, Loan, LoanEvent, LoanRequest, Money};
use lending_engine_rs::{SafeTimeProvider, TimeSource};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // what does ₹5,00,000 at 10.5% over three years cost
    let summary = compute_emi(Money::from_major(500_000), dec!(10.5), 36);
    println!("emi {} / interest {} / payable {}",
        summary.emi.format_inr(),
        summary.total_interest.format_inr(),
        summary.total_payable.format_inr());

    // apply and get a decision
    let time = SafeTimeProvider::new(TimeSource::System);
    let request = LoanRequest::new(Money::from_major(250_000), dec!(11), 36)?;
    let documents = Documents {
        salary_slip: Some("salary_slip.pdf".to_string()),
        bank_statement: Some("bank_statement.pdf".to_string()),
        sanction_letter: None,
    };
    let loan = Loan::submit("201059871", &request, documents, &time);

    let profile = CustomerProfile {
        cust_id: "201059871".to_string(),
        credit_score: 760,
        pre_approved_limit: Money::from_major(300_000),
        category: None,
    };
    let approved = transition(&loan, &LoanEvent::Approve(Assessment::new(profile)))?;

    // print current state
    println!("{}", approved.to_json()?);

    Ok(())
}
