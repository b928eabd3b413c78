//! Systematic investment plans: a fixed contribution at the start of every
//! month, compounded monthly.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate;
use crate::error::{ensure_in_range, ensure_nonzero_periods, ensure_positive};
use crate::time_value::{
    annuity_due_future_value, checked_div, checked_mul, checked_sub, monthly_rate, round_money,
};
use crate::types::{Money, Rate, RatePct};
use crate::FinTrackResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SipInput {
    #[serde(default)]
    pub name: String,
    pub monthly_amount: Money,
    /// Duration in months.
    pub periods: u32,
    pub annual_return_pct: RatePct,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sip {
    #[serde(flatten)]
    pub input: SipInput,
    pub future_value: Money,
    pub total_contributed: Money,
    pub total_gain: Money,
}

/// Position of a plan after some of its months have elapsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SipProgress {
    pub months_completed: u32,
    pub current_value: Money,
    pub invested_so_far: Money,
    pub gain_so_far: Money,
    pub remaining_months: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SipProjectionRow {
    pub month: u32,
    pub monthly_amount: Money,
    pub invested_so_far: Money,
    pub gain_so_far: Money,
    pub value: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SipSummary {
    pub total_sips: usize,
    pub total_monthly_amount: Money,
    pub total_future_value: Money,
    pub total_contributed: Money,
    pub total_expected_gain: Money,
    pub average_return_pct: RatePct,
}

impl SipInput {
    pub fn validate(&self) -> FinTrackResult<()> {
        ensure_positive("monthly_amount", self.monthly_amount)?;
        ensure_nonzero_periods("periods", self.periods)?;
        ensure_positive("annual_return_pct", self.annual_return_pct)?;
        Ok(())
    }
}

impl Sip {
    pub fn monthly_rate(&self) -> Rate {
        monthly_rate(self.input.annual_return_pct)
    }
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Annuity-due future value of `periods` monthly contributions, rounded.
pub fn sip_future_value(
    monthly_amount: Money,
    annual_return_pct: RatePct,
    periods: u32,
) -> FinTrackResult<Money> {
    let fv = annuity_due_future_value(monthly_amount, monthly_rate(annual_return_pct), periods)?;
    Ok(round_money(fv))
}

pub fn recompute_sip(input: SipInput) -> FinTrackResult<Sip> {
    input.validate()?;

    let future_value = sip_future_value(input.monthly_amount, input.annual_return_pct, input.periods)?;
    let total_contributed = round_money(checked_mul(
        input.monthly_amount,
        Decimal::from(input.periods),
        "SIP total contributed",
    )?);

    Ok(Sip {
        input,
        future_value,
        total_contributed,
        total_gain: round_money(future_value - total_contributed),
    })
}

/// Value, contributions and gain after `months_completed` months.
pub fn compute_for_elapsed_periods(sip: &Sip, months_completed: u32) -> FinTrackResult<SipProgress> {
    ensure_in_range(
        "months_completed",
        i64::from(months_completed),
        0,
        i64::from(sip.input.periods),
    )?;

    let current = annuity_due_future_value(sip.input.monthly_amount, sip.monthly_rate(), months_completed)?;
    let invested = checked_mul(sip.input.monthly_amount, Decimal::from(months_completed), "SIP progress")?;

    Ok(SipProgress {
        months_completed,
        current_value: round_money(current),
        invested_so_far: round_money(invested),
        gain_so_far: round_money(checked_sub(current, invested, "SIP progress")?),
        remaining_months: sip.input.periods - months_completed,
    })
}

/// Month-by-month projection from month 1 to the end of the plan. Fails
/// with `Overflow` if any month of the plan would.
pub fn monthly_projection(sip: &Sip) -> FinTrackResult<SipProjection> {
    let projection = SipProjection {
        monthly_amount: sip.input.monthly_amount,
        rate: sip.monthly_rate(),
        growth: Decimal::ONE,
        month: 0,
        periods: sip.input.periods,
    };
    let mut walk = projection.clone();
    while walk.month < walk.periods {
        walk.step()?;
    }
    Ok(projection)
}

/// Lazy month-by-month projection; restart by cloning or calling
/// [`monthly_projection`] again.
#[derive(Debug, Clone)]
pub struct SipProjection {
    monthly_amount: Money,
    rate: Rate,
    /// (1 + r)^month
    growth: Decimal,
    month: u32,
    periods: u32,
}

impl SipProjection {
    fn step(&mut self) -> FinTrackResult<SipProjectionRow> {
        let month = self.month + 1;
        let factor = Decimal::ONE + self.rate;
        self.growth = checked_mul(self.growth, factor, "SIP projection")?;

        let invested = checked_mul(self.monthly_amount, Decimal::from(month), "SIP projection")?;
        let value = if self.rate.is_zero() {
            invested
        } else {
            let grown = checked_mul(
                self.monthly_amount,
                checked_sub(self.growth, Decimal::ONE, "SIP projection")?,
                "SIP projection",
            )?;
            checked_mul(checked_div(grown, self.rate, "SIP projection")?, factor, "SIP projection")?
        };
        let gain = checked_sub(value, invested, "SIP projection")?;
        self.month = month;

        Ok(SipProjectionRow {
            month,
            monthly_amount: self.monthly_amount,
            invested_so_far: round_money(invested),
            gain_so_far: round_money(gain),
            value: round_money(value),
        })
    }
}

impl Iterator for SipProjection {
    type Item = SipProjectionRow;

    fn next(&mut self) -> Option<Self::Item> {
        if self.month >= self.periods {
            return None;
        }
        // Already walked without error by `monthly_projection`.
        self.step().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.periods - self.month) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for SipProjection {}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

pub fn summarize_sips(sips: &[Sip]) -> SipSummary {
    SipSummary {
        total_sips: sips.len(),
        total_monthly_amount: round_money(aggregate::sum_by(sips, |s| s.input.monthly_amount)),
        total_future_value: round_money(aggregate::sum_by(sips, |s| s.future_value)),
        total_contributed: round_money(aggregate::sum_by(sips, |s| s.total_contributed)),
        total_expected_gain: round_money(aggregate::sum_by(sips, |s| s.total_gain)),
        average_return_pct: round_money(aggregate::average_by(sips, |s| s.input.annual_return_pct)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FinTrackError;
    use rust_decimal_macros::dec;

    fn monthly_1000() -> SipInput {
        SipInput {
            name: "Index fund".into(),
            monthly_amount: dec!(1000),
            periods: 12,
            annual_return_pct: dec!(12),
        }
    }

    #[test]
    fn test_reference_plan() {
        let sip = recompute_sip(monthly_1000()).unwrap();
        assert_eq!(sip.total_contributed, dec!(12000.00));
        // 1000 * (1.01^12 - 1) / 0.01 * 1.01
        assert_eq!(sip.future_value, dec!(12809.33));
        assert_eq!(sip.total_gain, dec!(809.33));
    }

    #[test]
    fn test_higher_return_means_higher_value() {
        let mut previous = Decimal::ZERO;
        for rate in [dec!(1), dec!(6), dec!(8), dec!(12), dec!(15)] {
            let fv = sip_future_value(dec!(1000), rate, 60).unwrap();
            assert!(fv > previous, "{rate}% should beat the lower rate");
            previous = fv;
        }
    }

    #[test]
    fn test_zero_return_rejected() {
        let mut input = monthly_1000();
        input.annual_return_pct = Decimal::ZERO;
        assert!(matches!(recompute_sip(input), Err(FinTrackError::InvalidInput { .. })));
    }

    #[test]
    fn test_zero_rate_helper_is_plain_sum() {
        assert_eq!(sip_future_value(dec!(1000), Decimal::ZERO, 12).unwrap(), dec!(12000));
    }

    #[test]
    fn test_elapsed_full_term_matches_recompute() {
        let sip = recompute_sip(monthly_1000()).unwrap();
        let progress = compute_for_elapsed_periods(&sip, 12).unwrap();
        assert_eq!(progress.current_value, sip.future_value);
        assert_eq!(progress.invested_so_far, sip.total_contributed);
        assert_eq!(progress.gain_so_far, sip.total_gain);
        assert_eq!(progress.remaining_months, 0);
    }

    #[test]
    fn test_elapsed_midway() {
        let sip = recompute_sip(monthly_1000()).unwrap();
        let progress = compute_for_elapsed_periods(&sip, 6).unwrap();
        assert_eq!(progress.invested_so_far, dec!(6000));
        assert_eq!(progress.current_value, dec!(6213.54));
        assert_eq!(progress.gain_so_far, dec!(213.54));
        assert_eq!(progress.remaining_months, 6);
    }

    #[test]
    fn test_elapsed_zero_months() {
        let sip = recompute_sip(monthly_1000()).unwrap();
        let progress = compute_for_elapsed_periods(&sip, 0).unwrap();
        assert_eq!(progress.current_value, Decimal::ZERO);
        assert_eq!(progress.remaining_months, 12);
    }

    #[test]
    fn test_elapsed_beyond_term_is_range_error() {
        let sip = recompute_sip(monthly_1000()).unwrap();
        let err = compute_for_elapsed_periods(&sip, 13).unwrap_err();
        assert!(matches!(err, FinTrackError::OutOfRange { max: 12, .. }));
    }

    #[test]
    fn test_projection_agrees_with_elapsed_query() {
        let sip = recompute_sip(monthly_1000()).unwrap();
        let rows: Vec<SipProjectionRow> = monthly_projection(&sip).unwrap().collect();
        assert_eq!(rows.len(), 12);
        for row in &rows {
            let progress = compute_for_elapsed_periods(&sip, row.month).unwrap();
            assert_eq!(row.value, progress.current_value, "month {}", row.month);
            assert_eq!(row.invested_so_far, progress.invested_so_far);
        }
        assert_eq!(rows[0].value, dec!(1010.00));
        assert_eq!(rows.last().unwrap().value, sip.future_value);
    }

    #[test]
    fn test_projection_overflow_is_reported_up_front() {
        let runaway = Sip {
            input: SipInput {
                name: "Runaway".into(),
                monthly_amount: dec!(1_000_000_000),
                periods: 600,
                annual_return_pct: dec!(1200),
            },
            future_value: Decimal::ZERO,
            total_contributed: Decimal::ZERO,
            total_gain: Decimal::ZERO,
        };
        let err = monthly_projection(&runaway).unwrap_err();
        assert!(matches!(err, FinTrackError::Overflow { .. }));
    }

    #[test]
    fn test_projection_length_is_the_plan_length() {
        let sip = recompute_sip(monthly_1000()).unwrap();
        let mut projection = monthly_projection(&sip).unwrap();
        assert_eq!(projection.len(), 12);
        projection.next();
        assert_eq!(projection.len(), 11);
        assert_eq!(projection.count(), 11);
    }

    #[test]
    fn test_summary() {
        let a = recompute_sip(monthly_1000()).unwrap();
        let b = recompute_sip(SipInput {
            name: "Debt fund".into(),
            monthly_amount: dec!(500),
            periods: 24,
            annual_return_pct: dec!(6),
        })
        .unwrap();
        let expected_fv = a.future_value + b.future_value;
        let summary = summarize_sips(&[a, b]);
        assert_eq!(summary.total_sips, 2);
        assert_eq!(summary.total_monthly_amount, dec!(1500));
        assert_eq!(summary.total_contributed, dec!(24000));
        assert_eq!(summary.total_future_value, expected_fv);
        assert_eq!(summary.average_return_pct, dec!(9));
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize_sips(&[]);
        assert_eq!(summary.total_sips, 0);
        assert_eq!(summary.average_return_pct, Decimal::ZERO);
    }
}
