//! Equated monthly installment (EMI) loans.
//!
//! The installment comes from the closed-form annuity formula, but balances
//! are always walked period by period: interest on the running balance, the
//! rest of the installment off the principal. Rounding happens once, after
//! each walk, never inside it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate;
use crate::error::{ensure_non_negative, ensure_nonzero_periods, ensure_positive, FinTrackError};
use crate::time_value::{
    checked_add, checked_mul, checked_sub, level_installment, monthly_rate, round_money, round_money_up,
};
use crate::types::{Money, Rate, RatePct};
use crate::FinTrackResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// User-supplied loan terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanInput {
    /// What the loan is for ("Car", "Home renovation").
    #[serde(default)]
    pub name: String,
    pub principal: Money,
    pub annual_rate_pct: RatePct,
    /// Tenure in months.
    pub total_periods: u32,
    /// Installments already paid.
    #[serde(default)]
    pub periods_paid: u32,
}

/// Balances after `periods_paid` installments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationState {
    pub principal_paid_so_far: Money,
    pub interest_paid_so_far: Money,
    pub remaining_principal: Money,
    pub remaining_interest: Money,
    pub remaining_periods: u32,
}

/// A loan with every derived field populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    #[serde(flatten)]
    pub input: LoanInput,
    pub installment_amount: Money,
    #[serde(flatten)]
    pub state: AmortizationState,
}

/// One installment split into its interest and principal parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub period: u32,
    pub installment: Money,
    pub interest: Money,
    pub principal: Money,
    pub closing_balance: Money,
}

/// Roll-up over all loans of one owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub total_loans: usize,
    pub total_principal: Money,
    pub total_monthly_installment: Money,
    pub total_paid: Money,
    pub remaining_principal: Money,
}

impl LoanInput {
    pub fn validate(&self) -> FinTrackResult<()> {
        ensure_positive("principal", self.principal)?;
        ensure_non_negative("annual_rate_pct", self.annual_rate_pct)?;
        ensure_nonzero_periods("total_periods", self.total_periods)?;
        if self.periods_paid > self.total_periods {
            return Err(FinTrackError::invalid(
                "periods_paid",
                format!("periods_paid must be <= total_periods ({})", self.total_periods),
            ));
        }
        Ok(())
    }
}

impl Loan {
    pub fn monthly_rate(&self) -> Rate {
        monthly_rate(self.input.annual_rate_pct)
    }

    pub fn is_fully_repaid(&self) -> bool {
        self.input.periods_paid >= self.input.total_periods
    }

    /// Principal plus interest paid so far.
    pub fn total_paid(&self) -> Money {
        self.state.principal_paid_so_far + self.state.interest_paid_so_far
    }
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Fixed monthly installment, rounded to cents.
///
/// Rounds half-up unless that would leave `installment * total_periods`
/// short of the principal, which happens at zero and near-zero rates; then
/// the installment is rounded up to the next cent.
pub fn compute_installment(
    principal: Money,
    annual_rate_pct: RatePct,
    total_periods: u32,
) -> FinTrackResult<Money> {
    ensure_positive("principal", principal)?;
    ensure_non_negative("annual_rate_pct", annual_rate_pct)?;
    ensure_nonzero_periods("total_periods", total_periods)?;

    let r = monthly_rate(annual_rate_pct);
    let installment = level_installment(principal, r, total_periods)?;
    let rounded = round_money(installment);
    if rounded * Decimal::from(total_periods) < principal {
        Ok(round_money_up(installment))
    } else {
        Ok(rounded)
    }
}

/// Walk the schedule to get paid and outstanding amounts after
/// `periods_paid` installments.
pub fn compute_amortization_state(
    principal: Money,
    monthly_rate: Rate,
    installment: Money,
    periods_paid: u32,
    total_periods: u32,
) -> FinTrackResult<AmortizationState> {
    if periods_paid > total_periods {
        return Err(FinTrackError::invalid(
            "periods_paid",
            format!("periods_paid must be <= total_periods ({total_periods})"),
        ));
    }

    let mut remaining = principal;
    let mut interest_paid = Decimal::ZERO;
    let mut principal_paid = Decimal::ZERO;

    for _ in 0..periods_paid {
        let (interest, principal_part) = split_installment(remaining, monthly_rate, installment)?;
        interest_paid = checked_add(interest_paid, interest, "interest paid")?;
        principal_paid = checked_add(principal_paid, principal_part, "principal paid")?;
        remaining = checked_sub(remaining, principal_part, "remaining principal")?;
    }

    let remaining_periods = total_periods - periods_paid;

    // Continue from the unrounded balance.
    let mut remaining_interest = Decimal::ZERO;
    let mut balance = remaining;
    for _ in 0..remaining_periods {
        let (interest, principal_part) = split_installment(balance, monthly_rate, installment)?;
        remaining_interest = checked_add(remaining_interest, interest, "remaining interest")?;
        balance = checked_sub(balance, principal_part, "remaining principal")?;
    }

    Ok(AmortizationState {
        principal_paid_so_far: round_money(principal_paid),
        interest_paid_so_far: round_money(interest_paid),
        remaining_principal: round_money(remaining),
        remaining_interest: round_money(remaining_interest),
        remaining_periods,
    })
}

/// Interest on `balance` for one period, and the rest of the installment.
fn split_installment(balance: Money, rate: Rate, installment: Money) -> FinTrackResult<(Money, Money)> {
    let interest = checked_mul(balance, rate, "period interest")?;
    let principal_part = checked_sub(installment, interest, "period principal")?;
    Ok((interest, principal_part))
}

/// Validate the terms and derive every loan field.
pub fn recompute_loan(input: LoanInput) -> FinTrackResult<Loan> {
    input.validate()?;

    let installment = compute_installment(input.principal, input.annual_rate_pct, input.total_periods)?;
    let state = compute_amortization_state(
        input.principal,
        monthly_rate(input.annual_rate_pct),
        installment,
        input.periods_paid,
        input.total_periods,
    )?;

    Ok(Loan {
        input,
        installment_amount: installment,
        state,
    })
}

/// Record one more installment. A fully repaid loan is returned unchanged.
pub fn record_payment(loan: &Loan) -> FinTrackResult<Loan> {
    if loan.is_fully_repaid() {
        return Ok(loan.clone());
    }
    let mut input = loan.input.clone();
    input.periods_paid += 1;
    recompute_loan(input)
}

/// Period-by-period schedule over the full tenure.
pub fn amortization_schedule(loan: &Loan) -> FinTrackResult<AmortizationSchedule> {
    let schedule = AmortizationSchedule {
        rate: loan.monthly_rate(),
        installment: loan.installment_amount,
        balance: loan.input.principal,
        period: 0,
        total_periods: loan.input.total_periods,
    };
    let mut walk = schedule.clone();
    while walk.period < walk.total_periods {
        walk.step()?;
    }
    Ok(schedule)
}

/// Lazy amortization schedule. Clone it to restart from the current row.
#[derive(Debug, Clone)]
pub struct AmortizationSchedule {
    rate: Rate,
    installment: Money,
    balance: Money,
    period: u32,
    total_periods: u32,
}

impl AmortizationSchedule {
    fn step(&mut self) -> FinTrackResult<AmortizationRow> {
        let (interest, principal_part) = split_installment(self.balance, self.rate, self.installment)?;
        self.balance = checked_sub(self.balance, principal_part, "closing balance")?;
        self.period += 1;

        Ok(AmortizationRow {
            period: self.period,
            installment: self.installment,
            interest: round_money(interest),
            principal: round_money(principal_part),
            closing_balance: round_money(self.balance),
        })
    }
}

impl Iterator for AmortizationSchedule {
    type Item = AmortizationRow;

    fn next(&mut self) -> Option<Self::Item> {
        if self.period >= self.total_periods {
            return None;
        }
        // `amortization_schedule` has already walked every period.
        self.step().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.total_periods - self.period) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for AmortizationSchedule {}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

pub fn summarize_loans(loans: &[Loan]) -> LoanSummary {
    LoanSummary {
        total_loans: loans.len(),
        total_principal: round_money(aggregate::sum_by(loans, |l| l.input.principal)),
        total_monthly_installment: round_money(aggregate::sum_by(loans, |l| l.installment_amount)),
        total_paid: round_money(aggregate::sum_by(loans, Loan::total_paid)),
        remaining_principal: round_money(aggregate::sum_by(loans, |l| l.state.remaining_principal)),
    }
}

/// Installments still being paid each month: loans with periods left.
pub fn active_monthly_installment(loans: &[Loan]) -> Money {
    round_money(aggregate::sum_by(
        loans.iter().filter(|l| l.state.remaining_periods > 0),
        |l| l.installment_amount,
    ))
}
