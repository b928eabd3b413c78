//! Savings goals: inflation-adjusted targets, the monthly saving needed to
//! reach them, and a year-by-year accumulation plan.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::aggregate;
use crate::config::DEFAULT_INFLATION_RATE_PCT;
use crate::error::{ensure_non_negative, ensure_nonzero_periods, ensure_positive, FinTrackError};
use crate::time_value::{
    annual_rate, checked_div, checked_mul, compound, monthly_rate, percent_of, round_money,
    sinking_fund_payment, MONTHS_PER_YEAR,
};
use crate::types::{Money, RatePct};
use crate::FinTrackResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GoalCategory {
    ShortTerm,
    MediumTerm,
    LongTerm,
    Retirement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoalPriority {
    High,
    Medium,
    Low,
    VeryHigh,
}

impl GoalCategory {
    pub fn priority(self) -> GoalPriority {
        match self {
            GoalCategory::ShortTerm => GoalPriority::High,
            GoalCategory::MediumTerm => GoalPriority::Medium,
            GoalCategory::LongTerm => GoalPriority::Low,
            GoalCategory::Retirement => GoalPriority::VeryHigh,
        }
    }
}

fn default_inflation_rate_pct() -> RatePct {
    DEFAULT_INFLATION_RATE_PCT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalInput {
    #[serde(default)]
    pub name: String,
    pub category: GoalCategory,
    pub target_amount: Money,
    pub years: u32,
    #[serde(default = "default_inflation_rate_pct")]
    pub inflation_rate_pct: RatePct,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    #[serde(flatten)]
    pub input: GoalInput,
    pub inflation_adjusted_target: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub current_savings: Money,
    pub target_amount: Money,
    pub percentage: Decimal,
    pub remaining_amount: Money,
    pub is_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningYear {
    pub year: u32,
    pub total_contributed: Money,
    pub balance: Money,
    pub interest_earned: Money,
}

/// Everything needed to put a goal on a savings track at a given return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalPlan {
    pub goal: Goal,
    pub expected_return_pct: RatePct,
    pub monthly_savings_no_return: Money,
    pub monthly_savings_with_return: Money,
    pub total_months: u32,
    pub total_years: u32,
    pub yearly_breakdown: Vec<PlanningYear>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingGoal {
    pub name: String,
    pub category: GoalCategory,
    pub years: u32,
    pub target_amount: Money,
    pub inflation_adjusted_target: Money,
    pub monthly_savings_required: Money,
    pub priority: GoalPriority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalSummary {
    pub total_goals: usize,
    pub total_target_amount: Money,
    pub category_distribution: BTreeMap<GoalCategory, usize>,
    pub category_amounts: BTreeMap<GoalCategory, Money>,
    pub average_years: Decimal,
}

impl GoalInput {
    pub fn validate(&self) -> FinTrackResult<()> {
        ensure_positive("target_amount", self.target_amount)?;
        ensure_nonzero_periods("years", self.years)?;
        ensure_non_negative("inflation_rate_pct", self.inflation_rate_pct)?;
        Ok(())
    }

    fn total_months(&self) -> u32 {
        self.years.saturating_mul(MONTHS_PER_YEAR)
    }
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// `target * (1 + inflation)^years`, rounded to cents.
pub fn inflation_adjusted_target(input: &GoalInput) -> FinTrackResult<Money> {
    let growth = compound(annual_rate(input.inflation_rate_pct), input.years)?;
    Ok(round_money(checked_mul(input.target_amount, growth, "inflation-adjusted target")?))
}

pub fn recompute_goal(input: GoalInput) -> FinTrackResult<Goal> {
    input.validate()?;
    let inflation_adjusted_target = inflation_adjusted_target(&input)?;
    Ok(Goal {
        input,
        inflation_adjusted_target,
    })
}

/// Straight division of the nominal target over the months available.
pub fn required_monthly_savings_no_return(goal: &Goal) -> FinTrackResult<Money> {
    let months = Decimal::from(goal.input.total_months());
    Ok(round_money(checked_div(goal.input.target_amount, months, "monthly savings")?))
}

/// Monthly end-of-period saving that grows to the nominal target at
/// `expected_return_pct`. A zero return falls back to straight division.
pub fn required_monthly_savings_with_return(goal: &Goal, expected_return_pct: RatePct) -> FinTrackResult<Money> {
    if expected_return_pct < Decimal::ZERO {
        return Err(FinTrackError::invalid(
            "expected_return_pct",
            "Expected return cannot be negative",
        ));
    }
    if expected_return_pct.is_zero() {
        return required_monthly_savings_no_return(goal);
    }

    let payment = sinking_fund_payment(
        goal.input.target_amount,
        monthly_rate(expected_return_pct),
        goal.input.total_months(),
    )?;
    Ok(round_money(payment))
}

/// Simulates saving the rounded monthly amount month by month, reporting
/// at each year end. The balance is carried unrounded.
pub fn yearly_planning_breakdown(goal: &Goal, expected_return_pct: RatePct) -> FinTrackResult<Vec<PlanningYear>> {
    let payment = required_monthly_savings_with_return(goal, expected_return_pct)?;
    let growth = Decimal::ONE + monthly_rate(expected_return_pct);
    let yearly_payment = checked_mul(payment, Decimal::from(MONTHS_PER_YEAR), "yearly contribution")?;

    let mut balance = Decimal::ZERO;
    let mut rows = Vec::with_capacity(goal.input.years as usize);
    for year in 1..=goal.input.years {
        for _ in 0..MONTHS_PER_YEAR {
            balance = checked_mul(balance + payment, growth, "planning balance")?;
        }
        let contributed = checked_mul(yearly_payment, Decimal::from(year), "total contributed")?;
        rows.push(PlanningYear {
            year,
            total_contributed: round_money(contributed),
            balance: round_money(balance),
            interest_earned: round_money(balance - contributed),
        });
    }
    Ok(rows)
}

pub fn plan_goal(goal: &Goal, expected_return_pct: RatePct) -> FinTrackResult<GoalPlan> {
    Ok(GoalPlan {
        goal: goal.clone(),
        expected_return_pct,
        monthly_savings_no_return: required_monthly_savings_no_return(goal)?,
        monthly_savings_with_return: required_monthly_savings_with_return(goal, expected_return_pct)?,
        total_months: goal.input.total_months(),
        total_years: goal.input.years,
        yearly_breakdown: yearly_planning_breakdown(goal, expected_return_pct)?,
    })
}

/// Progress against the nominal target. Completion is judged on the
/// unrounded percentage.
pub fn progress(goal: &Goal, current_savings: Money) -> FinTrackResult<GoalProgress> {
    ensure_non_negative("current_savings", current_savings)?;
    let target = goal.input.target_amount;
    let percentage = percent_of(current_savings, target, "goal progress")?;

    Ok(GoalProgress {
        current_savings,
        target_amount: target,
        percentage: round_money(percentage),
        remaining_amount: round_money(target - current_savings),
        is_completed: percentage >= Decimal::ONE_HUNDRED,
    })
}

/// Goals of one category, in their original order.
pub fn goals_in_category(goals: &[Goal], category: GoalCategory) -> Vec<&Goal> {
    goals.iter().filter(|g| g.input.category == category).collect()
}

/// Goals due within `horizon_years`, nearest first.
pub fn upcoming_goals(goals: &[Goal], horizon_years: u32) -> FinTrackResult<Vec<UpcomingGoal>> {
    let mut due: Vec<&Goal> = goals.iter().filter(|g| g.input.years <= horizon_years).collect();
    due.sort_by_key(|g| g.input.years);

    due.into_iter()
        .map(|g| {
            Ok(UpcomingGoal {
                name: g.input.name.clone(),
                category: g.input.category,
                years: g.input.years,
                target_amount: g.input.target_amount,
                inflation_adjusted_target: g.inflation_adjusted_target,
                monthly_savings_required: required_monthly_savings_no_return(g)?,
                priority: g.input.category.priority(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

pub fn summarize_goals(goals: &[Goal]) -> GoalSummary {
    GoalSummary {
        total_goals: goals.len(),
        total_target_amount: round_money(aggregate::sum_by(goals, |g| g.input.target_amount)),
        category_distribution: aggregate::count_by(goals, |g| g.input.category),
        category_amounts: aggregate::sum_grouped_by(goals, |g| g.input.category, |g| g.input.target_amount)
            .into_iter()
            .map(|(category, amount)| (category, round_money(amount)))
            .collect(),
        average_years: round_money(aggregate::average_by(goals, |g| Decimal::from(g.input.years))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn house_deposit() -> GoalInput {
        GoalInput {
            name: "House deposit".into(),
            category: GoalCategory::LongTerm,
            target_amount: dec!(1000000),
            years: 10,
            inflation_rate_pct: dec!(6),
            notes: None,
        }
    }

    fn goal() -> Goal {
        recompute_goal(house_deposit()).unwrap()
    }

    // ------------------------------------------------------------------
    // Targets and savings
    // ------------------------------------------------------------------

    #[test]
    fn test_inflation_adjusted_target() {
        assert_eq!(goal().inflation_adjusted_target, dec!(1790847.70));
    }

    #[test]
    fn test_zero_inflation_keeps_target() {
        let mut input = house_deposit();
        input.inflation_rate_pct = Decimal::ZERO;
        let g = recompute_goal(input).unwrap();
        assert_eq!(g.inflation_adjusted_target, dec!(1000000));
    }

    #[test]
    fn test_default_inflation_from_json() {
        let input: GoalInput = serde_json::from_str(
            r#"{"category":"ShortTerm","target_amount":"50000","years":2}"#,
        )
        .unwrap();
        assert_eq!(input.inflation_rate_pct, dec!(6.0));
    }

    #[test]
    fn test_monthly_savings_without_return() {
        assert_eq!(required_monthly_savings_no_return(&goal()).unwrap(), dec!(8333.33));
    }

    #[test]
    fn test_monthly_savings_with_return() {
        assert_eq!(required_monthly_savings_with_return(&goal(), dec!(12)).unwrap(), dec!(4347.09));
    }

    #[test]
    fn test_zero_return_falls_back_to_straight_division() {
        assert_eq!(
            required_monthly_savings_with_return(&goal(), Decimal::ZERO).unwrap(),
            dec!(8333.33)
        );
    }

    #[test]
    fn test_negative_return_rejected() {
        let err = required_monthly_savings_with_return(&goal(), dec!(-1)).unwrap_err();
        assert!(matches!(err, FinTrackError::InvalidInput { .. }));
    }

    // ------------------------------------------------------------------
    // Breakdown
    // ------------------------------------------------------------------

    #[test]
    fn test_yearly_breakdown() {
        let rows = yearly_planning_breakdown(&goal(), dec!(12)).unwrap();
        assert_eq!(rows.len(), 10);
        assert_eq!(
            rows[0],
            PlanningYear {
                year: 1,
                total_contributed: dec!(52165.08),
                balance: dec!(55683.30),
                interest_earned: dec!(3518.22),
            }
        );
        assert_eq!(rows[9].total_contributed, dec!(521650.80));
        assert_eq!(rows[9].balance, dec!(1009998.88));
        assert_eq!(rows[9].interest_earned, dec!(488348.08));
    }

    #[test]
    fn test_plan_collects_everything() {
        let plan = plan_goal(&goal(), dec!(12)).unwrap();
        assert_eq!(plan.total_months, 120);
        assert_eq!(plan.monthly_savings_no_return, dec!(8333.33));
        assert_eq!(plan.monthly_savings_with_return, dec!(4347.09));
        assert_eq!(plan.yearly_breakdown.len(), 10);
    }

    // ------------------------------------------------------------------
    // Progress
    // ------------------------------------------------------------------

    #[test]
    fn test_progress_partial() {
        let p = progress(&goal(), dec!(250000)).unwrap();
        assert_eq!(p.percentage, dec!(25));
        assert_eq!(p.remaining_amount, dec!(750000));
        assert!(!p.is_completed);
    }

    #[test]
    fn test_progress_completed_when_over_target() {
        let p = progress(&goal(), dec!(1200000)).unwrap();
        assert!(p.is_completed);
        assert_eq!(p.remaining_amount, dec!(-200000));
    }

    #[test]
    fn test_progress_just_below_target_not_completed() {
        // 99.9999% rounds to 100.00 but the goal is not met
        let p = progress(&goal(), dec!(999999)).unwrap();
        assert_eq!(p.percentage, dec!(100.00));
        assert!(!p.is_completed);
    }

    #[test]
    fn test_negative_savings_rejected() {
        assert!(progress(&goal(), dec!(-1)).is_err());
    }

    // ------------------------------------------------------------------
    // Collections
    // ------------------------------------------------------------------

    fn portfolio() -> Vec<Goal> {
        let mut car = house_deposit();
        car.name = "Car".into();
        car.category = GoalCategory::ShortTerm;
        car.target_amount = dec!(600000);
        car.years = 2;

        let mut pension = house_deposit();
        pension.name = "Pension".into();
        pension.category = GoalCategory::Retirement;
        pension.target_amount = dec!(5000000);
        pension.years = 25;

        let mut trip = house_deposit();
        trip.name = "Trip".into();
        trip.category = GoalCategory::ShortTerm;
        trip.target_amount = dec!(120000);
        trip.years = 1;

        [house_deposit(), car, pension, trip]
            .into_iter()
            .map(|i| recompute_goal(i).unwrap())
            .collect()
    }

    #[test]
    fn test_upcoming_goals_sorted_by_years() {
        let upcoming = upcoming_goals(&portfolio(), 5).unwrap();
        let names: Vec<&str> = upcoming.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Trip", "Car"]);
        assert_eq!(upcoming[0].monthly_savings_required, dec!(10000));
        assert_eq!(upcoming[1].monthly_savings_required, dec!(25000));
        assert_eq!(upcoming[0].priority, GoalPriority::High);
    }

    #[test]
    fn test_summary() {
        let summary = summarize_goals(&portfolio());
        assert_eq!(summary.total_goals, 4);
        assert_eq!(summary.total_target_amount, dec!(6720000));
        assert_eq!(summary.category_distribution.get(&GoalCategory::ShortTerm), Some(&2));
        assert_eq!(summary.category_amounts.get(&GoalCategory::ShortTerm), Some(&dec!(720000)));
        assert_eq!(summary.average_years, dec!(9.5));
    }

    #[test]
    fn test_goals_in_category() {
        let all = portfolio();
        let names: Vec<&str> = goals_in_category(&all, GoalCategory::ShortTerm)
            .into_iter()
            .map(|g| g.input.name.as_str())
            .collect();
        assert_eq!(names, vec!["Car", "Trip"]);
        assert!(goals_in_category(&all, GoalCategory::MediumTerm).is_empty());
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize_goals(&[]);
        assert_eq!(summary.total_goals, 0);
        assert_eq!(summary.average_years, Decimal::ZERO);
    }

    #[test]
    fn test_priority_by_category() {
        assert_eq!(GoalCategory::Retirement.priority(), GoalPriority::VeryHigh);
        assert_eq!(GoalCategory::LongTerm.priority(), GoalPriority::Low);
    }
}
