use rust_decimal::prelude::RoundingStrategy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::FinTrackError;
use crate::types::{Money, Rate, RatePct};
use crate::FinTrackResult;

pub const MONTHS_PER_YEAR: u32 = 12;
const PERCENT: Decimal = dec!(100);
const MONEY_DP: u32 = 2;

/// Round a money value to cents, half away from zero.
pub fn round_money(value: Decimal) -> Money {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a money value up to the next cent.
pub fn round_money_up(value: Decimal) -> Money {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::AwayFromZero)
}

/// Monthly fractional rate from an annual percentage (12 -> 0.01).
pub fn monthly_rate(annual_pct: RatePct) -> Rate {
    annual_pct / Decimal::from(MONTHS_PER_YEAR) / PERCENT
}

/// Annual fractional rate from an annual percentage (10 -> 0.10).
pub fn annual_rate(annual_pct: RatePct) -> Rate {
    annual_pct / PERCENT
}

/// `part / whole * 100`, guarded against an empty denominator.
pub fn percent_of(part: Decimal, whole: Decimal, context: &str) -> FinTrackResult<Decimal> {
    checked_mul(checked_div(part, whole, context)?, PERCENT, context)
}

/// Compute (1 + r)^n via iterative multiplication (avoids Decimal::powd drift).
pub fn compound(rate: Rate, n: u32) -> FinTrackResult<Decimal> {
    let factor = Decimal::ONE + rate;
    let mut result = Decimal::ONE;
    for _ in 0..n {
        result = result
            .checked_mul(factor)
            .ok_or_else(|| FinTrackError::overflow(format!("compounding over {n} periods")))?;
    }
    Ok(result)
}

pub(crate) fn checked_add(a: Decimal, b: Decimal, context: &str) -> FinTrackResult<Decimal> {
    a.checked_add(b).ok_or_else(|| FinTrackError::overflow(context))
}

pub(crate) fn checked_sub(a: Decimal, b: Decimal, context: &str) -> FinTrackResult<Decimal> {
    a.checked_sub(b).ok_or_else(|| FinTrackError::overflow(context))
}

pub(crate) fn checked_mul(a: Decimal, b: Decimal, context: &str) -> FinTrackResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| FinTrackError::overflow(context))
}

pub(crate) fn checked_div(a: Decimal, b: Decimal, context: &str) -> FinTrackResult<Decimal> {
    if b.is_zero() {
        return Err(FinTrackError::DivisionByZero {
            context: context.into(),
        });
    }
    a.checked_div(b).ok_or_else(|| FinTrackError::overflow(context))
}

/// Level installment that fully amortizes `principal` over `nper` periods.
///
/// `principal * r * (1+r)^n / ((1+r)^n - 1)`; a zero rate degenerates to
/// straight-line repayment. The result is not rounded.
pub fn level_installment(principal: Money, rate: Rate, nper: u32) -> FinTrackResult<Money> {
    if nper == 0 {
        return Err(FinTrackError::invalid("nper", "Number of periods must be > 0"));
    }
    if rate.is_zero() {
        return checked_div(principal, Decimal::from(nper), "straight-line installment");
    }

    let growth = compound(rate, nper)?;
    let numerator = checked_mul(checked_mul(principal, rate, "installment")?, growth, "installment")?;
    checked_div(numerator, growth - Decimal::ONE, "installment annuity factor")
}

/// Future value of `nper` equal payments made at the start of each period,
/// valued at the end of the last one: `P * ((1+r)^n - 1) / r * (1+r)`.
pub fn annuity_due_future_value(payment: Money, rate: Rate, nper: u32) -> FinTrackResult<Money> {
    if rate.is_zero() {
        return checked_mul(payment, Decimal::from(nper), "annuity-due future value");
    }

    let growth = compound(rate, nper)?;
    let scaled = checked_mul(payment, growth - Decimal::ONE, "annuity-due future value")?;
    let level = checked_div(scaled, rate, "annuity-due future value")?;
    checked_mul(level, Decimal::ONE + rate, "annuity-due future value")
}

/// Payment per period that accumulates to `target` after `nper` end-of-period
/// contributions: `target / (((1+r)^n - 1) / r)`.
pub fn sinking_fund_payment(target: Money, rate: Rate, nper: u32) -> FinTrackResult<Money> {
    if nper == 0 {
        return Err(FinTrackError::invalid("nper", "Number of periods must be > 0"));
    }
    if rate.is_zero() {
        return checked_div(target, Decimal::from(nper), "sinking fund payment");
    }

    let growth = compound(rate, nper)?;
    let factor = checked_div(growth - Decimal::ONE, rate, "sinking fund factor")?;
    checked_div(target, factor, "sinking fund payment")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_money_half_up() {
        assert_eq!(round_money(dec!(2.345)), dec!(2.35));
        assert_eq!(round_money(dec!(2.344)), dec!(2.34));
        assert_eq!(round_money(dec!(-2.345)), dec!(-2.35));
    }

    #[test]
    fn test_round_money_up() {
        assert_eq!(round_money_up(dec!(8333.3333)), dec!(8333.34));
        assert_eq!(round_money_up(dec!(8333.33)), dec!(8333.33));
    }

    #[test]
    fn test_monthly_rate() {
        assert_eq!(monthly_rate(dec!(12)), dec!(0.01));
        assert_eq!(annual_rate(dec!(10)), dec!(0.10));
    }

    #[test]
    fn test_compound_exact_for_short_horizons() {
        assert_eq!(compound(dec!(0.10), 5).unwrap(), dec!(1.61051));
        assert_eq!(compound(dec!(0.01), 0).unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_compound_overflow_is_reported() {
        let err = compound(dec!(100), 40).unwrap_err();
        assert!(matches!(err, FinTrackError::Overflow { .. }));
    }

    #[test]
    fn test_level_installment_basic() {
        // 100k over 12 months at 1% per month: ~8884.88
        let emi = level_installment(dec!(100000), dec!(0.01), 12).unwrap();
        assert_eq!(round_money(emi), dec!(8884.88));
    }

    #[test]
    fn test_level_installment_zero_rate() {
        let emi = level_installment(dec!(1200), Decimal::ZERO, 12).unwrap();
        assert_eq!(emi, dec!(100));
    }

    #[test]
    fn test_annuity_due_zero_rate_is_plain_sum() {
        let fv = annuity_due_future_value(dec!(500), Decimal::ZERO, 24).unwrap();
        assert_eq!(fv, dec!(12000));
    }

    #[test]
    fn test_sinking_fund_zero_rate() {
        let pmt = sinking_fund_payment(dec!(1200), Decimal::ZERO, 12).unwrap();
        assert_eq!(pmt, dec!(100));
    }

    #[test]
    fn test_percent_of_zero_whole() {
        let err = percent_of(dec!(1), Decimal::ZERO, "test").unwrap_err();
        assert!(matches!(err, FinTrackError::DivisionByZero { .. }));
    }
}
