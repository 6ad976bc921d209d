use std::iter::FusedIterator;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::interest::monthly_rate;

use super::emi::exact_emi;
use super::{LoanRequest, PaymentSummary};

/// one period of an amortization schedule, in whole currency units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub period_index: u32,
    pub principal_component: Money,
    pub interest_component: Money,
    pub remaining_balance: Money,
}

impl ScheduleRow {
    pub fn payment(&self) -> Money {
        self.principal_component + self.interest_component
    }
}

/// lazy amortization schedule
///
/// Carries the balance at full precision and rounds only the emitted rows.
/// Each row splits the rounded EMI into rounded interest and the remainder as
/// principal. The final row pays off whatever balance is left, so the
/// schedule always closes at exactly zero.
#[derive(Debug, Clone)]
pub struct ScheduleIter {
    remaining: Decimal,
    monthly_rate: Decimal,
    emi: Decimal,
    rounded_emi: Money,
    period: u32,
    tenure_months: u32,
}

impl ScheduleIter {
    pub fn new(principal: Money, annual_rate_percent: Decimal, tenure_months: u32) -> Self {
        match exact_emi(principal.as_decimal(), annual_rate_percent, tenure_months) {
            Some(emi) => Self {
                remaining: principal.as_decimal(),
                monthly_rate: monthly_rate(annual_rate_percent),
                emi,
                rounded_emi: Money::from_decimal(emi).round_to_unit(),
                period: 0,
                tenure_months,
            },
            // degenerate input amortizes over zero periods
            None => Self {
                remaining: Decimal::ZERO,
                monthly_rate: Decimal::ZERO,
                emi: Decimal::ZERO,
                rounded_emi: Money::ZERO,
                period: 0,
                tenure_months: 0,
            },
        }
    }
}

impl Iterator for ScheduleIter {
    type Item = ScheduleRow;

    fn next(&mut self) -> Option<ScheduleRow> {
        if self.period >= self.tenure_months {
            return None;
        }
        self.period += 1;

        let interest = self.remaining * self.monthly_rate;
        let interest_component = Money::from_decimal(interest).round_to_unit();

        if self.period == self.tenure_months {
            // absorb rounding drift in the final period
            let principal_component = Money::from_decimal(self.remaining).round_to_unit();
            self.remaining = Decimal::ZERO;

            return Some(ScheduleRow {
                period_index: self.period,
                principal_component,
                interest_component,
                remaining_balance: Money::ZERO,
            });
        }

        let principal_part = self.emi - interest;
        self.remaining = (self.remaining - principal_part).max(Decimal::ZERO);

        Some(ScheduleRow {
            period_index: self.period,
            principal_component: self.rounded_emi - interest_component,
            interest_component,
            remaining_balance: Money::from_decimal(self.remaining).round_to_unit(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.tenure_months - self.period) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for ScheduleIter {}

impl FusedIterator for ScheduleIter {}

/// generate the full schedule, one row per month
///
/// Recomputed from scratch on every call. Degenerate input (see
/// [`compute_emi`](super::compute_emi)) gives an empty schedule.
pub fn generate_schedule(principal: Money, annual_rate_percent: Decimal, tenure_months: u32) -> Vec<ScheduleRow> {
    ScheduleIter::new(principal, annual_rate_percent, tenure_months).collect()
}

/// eagerly generated schedule together with its summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub request: LoanRequest,
    pub summary: PaymentSummary,
    pub rows: Vec<ScheduleRow>,
}

impl AmortizationSchedule {
    pub fn generate(request: &LoanRequest) -> Self {
        Self {
            request: *request,
            summary: request.summary(),
            rows: request.schedule().collect(),
        }
    }

    /// get row for a 1-based period
    pub fn row(&self, period_index: u32) -> Option<&ScheduleRow> {
        if period_index == 0 {
            return None;
        }
        self.rows.get((period_index - 1) as usize)
    }

    /// balance outstanding once `periods_paid` installments are in
    pub fn balance_after(&self, periods_paid: u32) -> Money {
        if periods_paid == 0 {
            return self.request.principal;
        }
        self.row(periods_paid)
            .map(|row| row.remaining_balance)
            .unwrap_or(Money::ZERO)
    }

    /// interest across the first `periods` rows
    pub fn interest_through(&self, periods: u32) -> Money {
        self.rows
            .iter()
            .take(periods as usize)
            .fold(Money::ZERO, |acc, row| acc + row.interest_component)
    }
}
