//! One-time investments compounded annually.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::aggregate;
use crate::error::{ensure_in_range, ensure_non_negative, ensure_positive};
use crate::time_value::{annual_rate, checked_mul, checked_sub, compound, percent_of, round_money};
use crate::types::{Money, Rate, RatePct};
use crate::FinTrackResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LumpSumInput {
    #[serde(default)]
    pub name: String,
    pub principal: Money,
    pub years: u32,
    pub annual_return_pct: RatePct,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LumpSum {
    #[serde(flatten)]
    pub input: LumpSumInput,
    pub future_value: Money,
    pub total_gain: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LumpSumProgress {
    pub years_completed: u32,
    pub current_value: Money,
    pub gain_so_far: Money,
    pub remaining_years: u32,
    pub projected_final_value: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LumpSumProjectionRow {
    pub year: u32,
    pub principal: Money,
    pub gain: Money,
    pub value: Money,
    pub gain_pct: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LumpSumSummary {
    pub total_lump_sums: usize,
    pub total_principal: Money,
    pub total_future_value: Money,
    pub total_gain: Money,
    pub average_return_pct: RatePct,
    /// Aggregate gain over aggregate principal, in percent.
    pub total_return_pct: Decimal,
}

/// Ranking entry for [`top_performers`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LumpSumPerformance {
    pub name: String,
    pub principal: Money,
    pub future_value: Money,
    pub total_gain: Money,
    pub return_pct: Decimal,
    pub years: u32,
}

impl LumpSumInput {
    pub fn validate(&self) -> FinTrackResult<()> {
        ensure_positive("principal", self.principal)?;
        ensure_non_negative("annual_return_pct", self.annual_return_pct)?;
        Ok(())
    }
}

impl LumpSum {
    pub fn annual_rate(&self) -> Rate {
        annual_rate(self.input.annual_return_pct)
    }

    /// Total gain as a percentage of principal.
    pub fn return_pct(&self) -> Decimal {
        if self.input.principal.is_zero() {
            return Decimal::ZERO;
        }
        self.total_gain / self.input.principal * dec!(100)
    }
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// `principal * (1 + r)^years`, rounded.
pub fn lump_sum_future_value(principal: Money, annual_return_pct: RatePct, years: u32) -> FinTrackResult<Money> {
    let growth = compound(annual_rate(annual_return_pct), years)?;
    Ok(round_money(checked_mul(principal, growth, "lump sum future value")?))
}

pub fn recompute_lump_sum(input: LumpSumInput) -> FinTrackResult<LumpSum> {
    input.validate()?;

    let future_value = lump_sum_future_value(input.principal, input.annual_return_pct, input.years)?;
    let total_gain = round_money(future_value - input.principal);

    Ok(LumpSum {
        input,
        future_value,
        total_gain,
    })
}

/// Value after `years_completed` years, and the final value it grows into.
pub fn compute_for_elapsed_years(lump_sum: &LumpSum, years_completed: u32) -> FinTrackResult<LumpSumProgress> {
    ensure_in_range(
        "years_completed",
        i64::from(years_completed),
        0,
        i64::from(lump_sum.input.years),
    )?;

    let rate = lump_sum.annual_rate();
    let remaining_years = lump_sum.input.years - years_completed;
    let current = checked_mul(
        lump_sum.input.principal,
        compound(rate, years_completed)?,
        "lump sum current value",
    )?;
    let projected = checked_mul(current, compound(rate, remaining_years)?, "lump sum projected value")?;

    Ok(LumpSumProgress {
        years_completed,
        current_value: round_money(current),
        gain_so_far: round_money(current - lump_sum.input.principal),
        remaining_years,
        projected_final_value: round_money(projected),
    })
}

/// Year-by-year growth, from year 0 (the principal) to the final year.
/// Fails with `Overflow` if any year of the horizon would.
pub fn yearly_projection(lump_sum: &LumpSum) -> FinTrackResult<YearlyProjection> {
    let projection = YearlyProjection {
        principal: lump_sum.input.principal,
        rate: lump_sum.annual_rate(),
        growth: Decimal::ONE,
        next_year: 0,
        years: lump_sum.input.years,
    };
    let mut walk = projection.clone();
    while walk.next_year <= walk.years {
        walk.step()?;
    }
    Ok(projection)
}

/// Lazy, finite projection of `years + 1` rows.
#[derive(Debug, Clone)]
pub struct YearlyProjection {
    principal: Money,
    rate: Rate,
    growth: Decimal,
    next_year: u32,
    years: u32,
}

impl YearlyProjection {
    fn step(&mut self) -> FinTrackResult<LumpSumProjectionRow> {
        let year = self.next_year;
        if year > 0 {
            self.growth = checked_mul(self.growth, Decimal::ONE + self.rate, "lump sum projection")?;
        }
        let value = checked_mul(self.principal, self.growth, "lump sum projection")?;
        let gain = checked_sub(value, self.principal, "lump sum projection")?;
        let gain_pct = if self.principal.is_zero() {
            Decimal::ZERO
        } else {
            percent_of(gain, self.principal, "lump sum projection")?
        };
        self.next_year += 1;

        Ok(LumpSumProjectionRow {
            year,
            principal: round_money(self.principal),
            gain: round_money(gain),
            value: round_money(value),
            gain_pct: round_money(gain_pct),
        })
    }
}

impl Iterator for YearlyProjection {
    type Item = LumpSumProjectionRow;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_year > self.years {
            return None;
        }
        // Already walked without error by `yearly_projection`.
        self.step().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.years + 1).saturating_sub(self.next_year) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for YearlyProjection {}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

pub fn summarize_lump_sums(lump_sums: &[LumpSum]) -> FinTrackResult<LumpSumSummary> {
    let total_principal = aggregate::sum_by(lump_sums, |l| l.input.principal);
    let total_gain = aggregate::sum_by(lump_sums, |l| l.total_gain);
    let total_return_pct = if total_principal > Decimal::ZERO {
        round_money(percent_of(total_gain, total_principal, "lump sum total return")?)
    } else {
        Decimal::ZERO
    };

    Ok(LumpSumSummary {
        total_lump_sums: lump_sums.len(),
        total_principal: round_money(total_principal),
        total_future_value: round_money(aggregate::sum_by(lump_sums, |l| l.future_value)),
        total_gain: round_money(total_gain),
        average_return_pct: round_money(aggregate::average_by(lump_sums, |l| l.input.annual_return_pct)),
        total_return_pct,
    })
}

/// Best `limit` investments by gain relative to principal.
pub fn top_performers(lump_sums: &[LumpSum], limit: usize) -> Vec<LumpSumPerformance> {
    let mut ranked: Vec<&LumpSum> = lump_sums.iter().collect();
    ranked.sort_by(|a, b| b.return_pct().partial_cmp(&a.return_pct()).unwrap_or(Ordering::Equal));

    ranked
        .into_iter()
        .take(limit)
        .map(|l| LumpSumPerformance {
            name: l.input.name.clone(),
            principal: l.input.principal,
            future_value: l.future_value,
            total_gain: l.total_gain,
            return_pct: round_money(l.return_pct()),
            years: l.input.years,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FinTrackError;

    fn fixed_deposit() -> LumpSumInput {
        LumpSumInput {
            name: "Fixed deposit".into(),
            principal: dec!(10000),
            years: 5,
            annual_return_pct: dec!(10),
        }
    }

    #[test]
    fn test_reference_growth() {
        let ls = recompute_lump_sum(fixed_deposit()).unwrap();
        assert_eq!(ls.future_value, dec!(16105.10));
        assert_eq!(ls.total_gain, dec!(6105.10));
    }

    #[test]
    fn test_zero_years_returns_principal() {
        let mut input = fixed_deposit();
        input.years = 0;
        input.principal = dec!(12345.67);
        let ls = recompute_lump_sum(input).unwrap();
        assert_eq!(ls.future_value, dec!(12345.67));
        assert_eq!(ls.total_gain, Decimal::ZERO);
    }

    #[test]
    fn test_zero_return_allowed() {
        let mut input = fixed_deposit();
        input.annual_return_pct = Decimal::ZERO;
        let ls = recompute_lump_sum(input).unwrap();
        assert_eq!(ls.future_value, dec!(10000));
    }

    #[test]
    fn test_monotonic_in_rate() {
        let mut previous = Decimal::ZERO;
        for rate in [dec!(0), dec!(2.5), dec!(7), dec!(10), dec!(18)] {
            let fv = lump_sum_future_value(dec!(10000), rate, 10).unwrap();
            assert!(fv > previous);
            previous = fv;
        }
    }

    #[test]
    fn test_rejects_negative_rate() {
        let mut input = fixed_deposit();
        input.annual_return_pct = dec!(-2);
        assert!(matches!(recompute_lump_sum(input), Err(FinTrackError::InvalidInput { .. })));
    }

    #[test]
    fn test_elapsed_years() {
        let ls = recompute_lump_sum(fixed_deposit()).unwrap();
        let progress = compute_for_elapsed_years(&ls, 2).unwrap();
        assert_eq!(progress.current_value, dec!(12100.00));
        assert_eq!(progress.gain_so_far, dec!(2100.00));
        assert_eq!(progress.remaining_years, 3);
        assert_eq!(progress.projected_final_value, ls.future_value);
    }

    #[test]
    fn test_elapsed_years_out_of_range() {
        let ls = recompute_lump_sum(fixed_deposit()).unwrap();
        assert!(matches!(
            compute_for_elapsed_years(&ls, 6),
            Err(FinTrackError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_yearly_projection_shape() {
        let ls = recompute_lump_sum(fixed_deposit()).unwrap();
        let projection = yearly_projection(&ls).unwrap();
        assert_eq!(projection.len(), 6);

        let rows: Vec<LumpSumProjectionRow> = projection.collect();
        assert_eq!(rows.first().unwrap().value, ls.input.principal);
        assert_eq!(rows.first().unwrap().gain, Decimal::ZERO);
        assert_eq!(rows.last().unwrap().value, ls.future_value);
        assert_eq!(rows.last().unwrap().gain_pct, dec!(61.05));
        assert_eq!(rows[1].value, dec!(11000));
        assert_eq!(rows[1].gain_pct, dec!(10));
    }

    #[test]
    fn test_yearly_projection_restarts() {
        let ls = recompute_lump_sum(fixed_deposit()).unwrap();
        let first: Vec<_> = yearly_projection(&ls).unwrap().collect();
        let second: Vec<_> = yearly_projection(&ls).unwrap().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_yearly_projection_overflow_is_reported_up_front() {
        let runaway = LumpSum {
            input: LumpSumInput {
                name: "Runaway".into(),
                principal: dec!(1_000_000_000_000),
                years: 80,
                annual_return_pct: dec!(200),
            },
            future_value: Decimal::ZERO,
            total_gain: Decimal::ZERO,
        };
        let err = yearly_projection(&runaway).unwrap_err();
        assert!(matches!(err, FinTrackError::Overflow { .. }));
    }

    #[test]
    fn test_summary_and_ranking() {
        let fd = recompute_lump_sum(fixed_deposit()).unwrap();
        let gold = recompute_lump_sum(LumpSumInput {
            name: "Gold".into(),
            principal: dec!(5000),
            years: 3,
            annual_return_pct: dec!(8),
        })
        .unwrap();
        let all = vec![gold, fd];

        let summary = summarize_lump_sums(&all).unwrap();
        assert_eq!(summary.total_lump_sums, 2);
        assert_eq!(summary.total_principal, dec!(15000));
        assert_eq!(summary.average_return_pct, dec!(9));
        // gold: 5000 * 1.08^3 = 6298.56
        assert_eq!(summary.total_gain, dec!(7403.66));
        assert_eq!(summary.total_return_pct, dec!(49.36));

        let top = top_performers(&all, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name, "Fixed deposit");
        assert_eq!(top[0].return_pct, dec!(61.05));
    }
}
