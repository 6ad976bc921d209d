pub mod compound;

use rust_decimal::Decimal;

pub use compound::{growth_factor, installment_per_unit, principal_per_unit_installment};

/// convert an annual nominal rate in percent into the per-month rate
///
/// `10.5` becomes `0.00875`. Callers validate the input; a zero result must be
/// handled with straight-line division by the dependent calculation.
pub fn monthly_rate(annual_rate_percent: Decimal) -> Decimal {
    annual_rate_percent / Decimal::from(12) / Decimal::ONE_HUNDRED
}
