/// json state - loans as they are kept in the loan store
use lending_engine_rs::{transition, Assessment, CustomerProfile, Documents, Loan, LoanEvent, LoanRequest, Money};
use lending_engine_rs::{SafeTimeProvider, TimeSource};
use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== json state serialization ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    ));

    let request = LoanRequest::new(Money::from_major(150_000), dec!(12.5), 24)?;
    let loan = Loan::submit("201059874", &request, Documents::default(), &time);

    // stage 1: pending
    println!("stage 1: pending");
    println!("----------------");
    println!("{}\n", loan.to_json()?);

    // stage 2: rejected on credit score
    let profile = CustomerProfile {
        cust_id: "201059874".to_string(),
        credit_score: 610,
        pre_approved_limit: Money::from_major(200_000),
        category: None,
    };
    let rejected = transition(&loan, &LoanEvent::Reject(Assessment::new(profile)))?;
    println!("stage 2: rejected");
    println!("-----------------");
    let json = rejected.to_json()?;
    println!("{}\n", json);

    // stage 3: read back
    let restored = Loan::from_json(&json)?;
    println!("stage 3: restored as {} with reason {:?}\n", restored.status(), restored.reason());

    // records with a status outside the lifecycle are refused
    let tampered = json.replace("\"Rejected\"", "\"Disbursed\"");
    match Loan::from_json(&tampered) {
        Ok(_) => println!("tampered record accepted"),
        Err(e) => println!("tampered record refused: {}", e),
    }

    Ok(())
}
