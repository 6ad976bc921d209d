use rust_decimal::Decimal;

/// calculate `(1 + r)^n` for a per-period rate
///
/// Returns `None` when the factor no longer fits in a `Decimal`, which only
/// happens for very long tenures at high rates.
pub fn growth_factor(period_rate: Decimal, periods: u32) -> Option<Decimal> {
    let mut base = Decimal::ONE + period_rate;
    let mut factor = Decimal::ONE;
    let mut remaining = periods;

    // square and multiply; the base is only squared while higher bits remain
    while remaining > 0 {
        if remaining & 1 == 1 {
            factor = factor.checked_mul(base)?;
        }
        remaining >>= 1;
        if remaining > 0 {
            base = base.checked_mul(base)?;
        }
    }
    Some(factor)
}

/// installment needed to repay one unit of principal over `periods`
///
/// `r (1+r)^n / ((1+r)^n - 1)`, or `1 / n` when the rate is zero. When the
/// growth factor overflows the installment has converged to `r`.
pub fn installment_per_unit(period_rate: Decimal, periods: u32) -> Decimal {
    if periods == 0 {
        return Decimal::ZERO;
    }
    if period_rate.is_zero() {
        return Decimal::ONE / Decimal::from(periods);
    }

    match growth_factor(period_rate, periods) {
        Some(factor) => {
            let denominator = factor - Decimal::ONE;
            if denominator.is_zero() {
                Decimal::ONE / Decimal::from(periods)
            } else {
                period_rate * (factor / denominator)
            }
        }
        None => period_rate,
    }
}

/// principal that one unit of installment repays over `periods`
///
/// Inverse of [`installment_per_unit`]: `((1+r)^n - 1) / (r (1+r)^n)`.
pub fn principal_per_unit_installment(period_rate: Decimal, periods: u32) -> Decimal {
    let per_unit = installment_per_unit(period_rate, periods);
    if per_unit.is_zero() {
        return Decimal::ZERO;
    }
    Decimal::ONE / per_unit
}
