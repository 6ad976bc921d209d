/// schedule - month by month breakdown of a loan
use lending_engine_rs::{generate_schedule, AmortizationSchedule, LoanRequest, Money};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== amortization schedule ===\n");

    let request = LoanRequest::new(Money::from_major(100_000), dec!(12), 12)?;
    let schedule = AmortizationSchedule::generate(&request);

    println!("principal: {}", request.principal.format_inr());
    println!("rate:      {}% a year", request.annual_rate_percent);
    println!("emi:       {}", schedule.summary.emi.format_inr());
    println!("interest:  {} ({}% of payable)\n",
        schedule.summary.total_interest.format_inr(),
        schedule.summary.interest_share());

    println!("{:>5} {:>12} {:>12} {:>14}", "month", "principal", "interest", "balance");
    println!("{}", "-".repeat(46));
    for row in &schedule.rows {
        println!("{:>5} {:>12} {:>12} {:>14}",
            row.period_index,
            row.principal_component.format_inr(),
            row.interest_component.format_inr(),
            row.remaining_balance.format_inr());
    }

    println!("\nbalance after 6 months: {}", schedule.balance_after(6).format_inr());
    println!("interest through 6 months: {}", schedule.interest_through(6).format_inr());

    // rows are produced lazily; long tenures need not be materialized
    let mut long = request.schedule();
    long.next();
    println!("\nrows left after the first: {}", long.len());

    // zero-rate loans repay in equal parts
    let interest_free = generate_schedule(Money::from_major(12_000), dec!(0), 12);
    println!("interest-free installment: {}", interest_free[0].payment().format_inr());

    Ok(())
}
