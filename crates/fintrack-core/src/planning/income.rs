//! Income sources growing at a fixed annual rate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate;
use crate::error::{ensure_in_range, ensure_non_negative, ensure_nonzero_periods, ensure_positive};
use crate::time_value::{
    annual_rate, checked_add, checked_mul, checked_sub, compound, percent_of, round_money, MONTHS_PER_YEAR,
};
use crate::types::{Money, Rate, RatePct};
use crate::FinTrackResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeInput {
    #[serde(default)]
    pub name: String,
    pub initial_monthly_income: Money,
    pub annual_growth_pct: RatePct,
    pub years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeSource {
    #[serde(flatten)]
    pub input: IncomeInput,
    /// Monthly income after `years` full years of growth.
    pub projected_monthly_income: Money,
    pub total_amount_received: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeYearRow {
    pub year: u32,
    pub monthly_income: Money,
    pub annual_income: Money,
    pub cumulative_income: Money,
    pub growth_from_start_pct: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeForYear {
    pub year: u32,
    pub monthly_income: Money,
    pub annual_income: Money,
    pub growth_from_previous_pct: RatePct,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeSummary {
    pub total_income_sources: usize,
    pub total_initial_monthly_income: Money,
    pub total_projected_monthly_income: Money,
    pub total_amount_received: Money,
    pub average_growth_pct: RatePct,
    pub total_growth_pct: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeGrowth {
    pub name: String,
    pub initial_monthly_income: Money,
    pub projected_monthly_income: Money,
    pub annual_growth_pct: RatePct,
    pub total_growth_pct: Decimal,
    pub years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceYearIncome {
    pub name: String,
    pub monthly_income: Money,
    pub annual_income: Money,
    pub growth_pct: RatePct,
}

/// Combined income of every source still running in a given year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyIncomeSummary {
    pub year: u32,
    pub total_monthly_income: Money,
    pub total_annual_income: Money,
    pub sources: Vec<SourceYearIncome>,
}

impl IncomeInput {
    pub fn validate(&self) -> FinTrackResult<()> {
        ensure_positive("initial_monthly_income", self.initial_monthly_income)?;
        ensure_non_negative("annual_growth_pct", self.annual_growth_pct)?;
        ensure_nonzero_periods("years", self.years)?;
        Ok(())
    }
}

impl IncomeSource {
    pub fn growth_rate(&self) -> Rate {
        annual_rate(self.input.annual_growth_pct)
    }
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

pub fn recompute_income(input: IncomeInput) -> FinTrackResult<IncomeSource> {
    input.validate()?;
    let growth = Decimal::ONE + annual_rate(input.annual_growth_pct);

    let factor = compound(annual_rate(input.annual_growth_pct), input.years)?;
    let projected = checked_mul(input.initial_monthly_income, factor, "projected income")?;

    // Year 1 is paid at the initial rate; growth applies from year 2.
    let months = Decimal::from(MONTHS_PER_YEAR);
    let mut annual = checked_mul(input.initial_monthly_income, months, "annual income")?;
    let mut total = Decimal::ZERO;
    for _ in 0..input.years {
        total += annual;
        annual = checked_mul(annual, growth, "annual income")?;
    }

    Ok(IncomeSource {
        input,
        projected_monthly_income: round_money(projected),
        total_amount_received: round_money(total),
    })
}

/// Year-by-year income with a running total.
///
/// The whole horizon is walked once up front, so an overflow surfaces here
/// rather than as a short iterator.
pub fn yearly_progression(source: &IncomeSource) -> FinTrackResult<IncomeProgression> {
    ensure_positive("initial_monthly_income", source.input.initial_monthly_income)?;
    let progression = IncomeProgression {
        initial: source.input.initial_monthly_income,
        growth: Decimal::ONE + source.growth_rate(),
        years: source.input.years,
        next_year: 1,
        monthly: source.input.initial_monthly_income,
        cumulative: Decimal::ZERO,
    };
    let mut walk = progression.clone();
    while walk.next_year <= walk.years {
        walk.step()?;
    }
    Ok(progression)
}

/// Lazy yearly income rows. A clone resumes from the same year.
#[derive(Debug, Clone)]
pub struct IncomeProgression {
    initial: Money,
    growth: Decimal,
    years: u32,
    next_year: u32,
    monthly: Decimal,
    cumulative: Decimal,
}

impl IncomeProgression {
    fn step(&mut self) -> FinTrackResult<IncomeYearRow> {
        let year = self.next_year;
        if year > 1 {
            self.monthly = checked_mul(self.monthly, self.growth, "income progression")?;
        }
        let annual = checked_mul(self.monthly, Decimal::from(MONTHS_PER_YEAR), "income progression")?;
        self.cumulative = checked_add(self.cumulative, annual, "income progression")?;
        let growth_from_start = percent_of(
            checked_sub(self.monthly, self.initial, "income progression")?,
            self.initial,
            "income progression",
        )?;
        self.next_year += 1;

        Ok(IncomeYearRow {
            year,
            monthly_income: round_money(self.monthly),
            annual_income: round_money(annual),
            cumulative_income: round_money(self.cumulative),
            growth_from_start_pct: round_money(growth_from_start),
        })
    }
}

impl Iterator for IncomeProgression {
    type Item = IncomeYearRow;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_year > self.years {
            return None;
        }
        // Every step was already taken once in `yearly_progression`.
        self.step().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.years + 1).saturating_sub(self.next_year) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for IncomeProgression {}

/// Income during `year` (1-based), which is `year - 1` years past the start.
pub fn income_for_year(source: &IncomeSource, year: u32) -> FinTrackResult<IncomeForYear> {
    ensure_in_range("year", i64::from(year), 1, i64::from(source.input.years))?;

    let factor = compound(source.growth_rate(), year - 1)?;
    let monthly = checked_mul(source.input.initial_monthly_income, factor, "income for year")?;
    let annual = checked_mul(monthly, Decimal::from(MONTHS_PER_YEAR), "income for year")?;

    Ok(IncomeForYear {
        year,
        monthly_income: round_money(monthly),
        annual_income: round_money(annual),
        growth_from_previous_pct: if year > 1 {
            round_money(source.input.annual_growth_pct)
        } else {
            Decimal::ZERO
        },
    })
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

pub fn summarize_income(sources: &[IncomeSource]) -> FinTrackResult<IncomeSummary> {
    let initial = aggregate::sum_by(sources, |s| s.input.initial_monthly_income);
    let projected = aggregate::sum_by(sources, |s| s.projected_monthly_income);
    let total_growth_pct = if initial > Decimal::ZERO {
        percent_of(projected - initial, initial, "total income growth")?
    } else {
        Decimal::ZERO
    };

    Ok(IncomeSummary {
        total_income_sources: sources.len(),
        total_initial_monthly_income: round_money(initial),
        total_projected_monthly_income: round_money(projected),
        total_amount_received: round_money(aggregate::sum_by(sources, |s| s.total_amount_received)),
        average_growth_pct: round_money(aggregate::average_by(sources, |s| s.input.annual_growth_pct)),
        total_growth_pct: round_money(total_growth_pct),
    })
}

/// Sources with the highest growth rate first, at most `limit` of them.
pub fn fastest_growing(sources: &[IncomeSource], limit: usize) -> FinTrackResult<Vec<IncomeGrowth>> {
    let mut ranked: Vec<&IncomeSource> = sources.iter().collect();
    ranked.sort_by(|a, b| b.input.annual_growth_pct.cmp(&a.input.annual_growth_pct));

    ranked
        .into_iter()
        .take(limit)
        .map(|s| {
            let growth = percent_of(
                s.projected_monthly_income - s.input.initial_monthly_income,
                s.input.initial_monthly_income,
                "income growth",
            )?;
            Ok(IncomeGrowth {
                name: s.input.name.clone(),
                initial_monthly_income: s.input.initial_monthly_income,
                projected_monthly_income: s.projected_monthly_income,
                annual_growth_pct: s.input.annual_growth_pct,
                total_growth_pct: round_money(growth),
                years: s.input.years,
            })
        })
        .collect()
}

/// Income across all sources in `year`. Sources that ended earlier are left
/// out; per-source figures are rounded before being totalled.
pub fn yearly_income_summary(sources: &[IncomeSource], year: u32) -> FinTrackResult<YearlyIncomeSummary> {
    ensure_in_range("year", i64::from(year), 1, i64::from(u32::MAX))?;

    let mut details = Vec::new();
    for source in sources.iter().filter(|s| year <= s.input.years) {
        let at = income_for_year(source, year)?;
        details.push(SourceYearIncome {
            name: source.input.name.clone(),
            monthly_income: at.monthly_income,
            annual_income: at.annual_income,
            growth_pct: source.input.annual_growth_pct,
        });
    }

    Ok(YearlyIncomeSummary {
        year,
        total_monthly_income: round_money(aggregate::sum_by(&details, |d| d.monthly_income)),
        total_annual_income: round_money(aggregate::sum_by(&details, |d| d.annual_income)),
        sources: details,
    })
}
