use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::json;
use std::time::Instant;

use fintrack_core::config::EngineConfig;
use fintrack_core::planning::goals::{self, GoalCategory, GoalInput};
use fintrack_core::planning::income::{self, IncomeInput};

use super::{envelope, read_input, CommandResult};

// ---------------------------------------------------------------------------
// Goals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    ShortTerm,
    MediumTerm,
    LongTerm,
    Retirement,
}

impl From<CategoryArg> for GoalCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::ShortTerm => GoalCategory::ShortTerm,
            CategoryArg::MediumTerm => GoalCategory::MediumTerm,
            CategoryArg::LongTerm => GoalCategory::LongTerm,
            CategoryArg::Retirement => GoalCategory::Retirement,
        }
    }
}

/// Arguments describing a savings goal
#[derive(Args)]
pub struct GoalArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Label for the goal
    #[arg(long, default_value = "")]
    pub name: String,

    /// Goal horizon category
    #[arg(long, value_enum, default_value = "medium-term")]
    pub category: CategoryArg,

    /// Target amount in today's money
    #[arg(long, alias = "target")]
    pub target_amount: Option<Decimal>,

    /// Years until the goal is due
    #[arg(long)]
    pub years: Option<u32>,

    /// Annual inflation in percent (defaults to the configured rate)
    #[arg(long, alias = "inflation")]
    pub inflation_rate_pct: Option<Decimal>,
}

impl GoalArgs {
    fn into_input(self, config: &EngineConfig) -> Result<GoalInput, Box<dyn std::error::Error>> {
        if let Some(input) = read_input(self.input.as_deref())? {
            return Ok(input);
        }
        Ok(GoalInput {
            name: self.name,
            category: self.category.into(),
            target_amount: self
                .target_amount
                .ok_or("--target-amount is required (or provide --input)")?,
            years: self.years.ok_or("--years is required (or provide --input)")?,
            inflation_rate_pct: self
                .inflation_rate_pct
                .unwrap_or(config.default_inflation_rate_pct),
            notes: None,
        })
    }
}

/// Arguments for planning savings towards a goal
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct GoalPlanArgs {
    #[command(flatten)]
    pub goal: GoalArgs,

    /// Expected annual return in percent (defaults to the configured rate)
    #[arg(long, alias = "expected-return")]
    pub expected_return_pct: Option<Decimal>,
}

/// Arguments for progress towards a goal
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct GoalProgressArgs {
    #[command(flatten)]
    pub goal: GoalArgs,

    /// Amount saved so far
    #[arg(long)]
    pub current_savings: Decimal,
}

pub fn run_goal(args: GoalArgs, config: &EngineConfig) -> CommandResult {
    let start = Instant::now();
    let goal_input = args.into_input(config)?;
    let goal = goals::recompute_goal(goal_input.clone())?;
    envelope(
        "Inflation-adjusted goal target (annual compounding)",
        &goal_input,
        Vec::new(),
        start,
        goal,
    )
}

pub fn run_goal_plan(args: GoalPlanArgs, config: &EngineConfig) -> CommandResult {
    let start = Instant::now();
    let expected = args
        .expected_return_pct
        .unwrap_or(config.default_expected_return_pct);
    let goal_input = args.goal.into_input(config)?;
    let goal = goals::recompute_goal(goal_input.clone())?;
    let plan = goals::plan_goal(&goal, expected)?;

    let mut warnings = Vec::new();
    if expected.is_zero() {
        warnings.push("Zero expected return: savings computed without growth".to_string());
    }
    warnings.push(format!(
        "Savings target the nominal amount; the inflation-adjusted target is {}",
        goal.inflation_adjusted_target
    ));

    envelope(
        "Goal savings plan (sinking fund, monthly compounding)",
        &json!({ "goal": goal_input, "expected_return_pct": expected }),
        warnings,
        start,
        plan,
    )
}

pub fn run_goal_progress(args: GoalProgressArgs, config: &EngineConfig) -> CommandResult {
    let start = Instant::now();
    let savings = args.current_savings;
    let goal_input = args.goal.into_input(config)?;
    let goal = goals::recompute_goal(goal_input.clone())?;
    let progress = goals::progress(&goal, savings)?;
    envelope(
        "Goal progress against nominal target",
        &json!({ "goal": goal_input, "current_savings": savings }),
        Vec::new(),
        start,
        progress,
    )
}

// ---------------------------------------------------------------------------
// Income
// ---------------------------------------------------------------------------

/// Arguments describing an income source
#[derive(Args)]
pub struct IncomeArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Label for the source
    #[arg(long, default_value = "")]
    pub name: String,

    /// Monthly income in the first year
    #[arg(long, alias = "monthly")]
    pub initial_monthly_income: Option<Decimal>,

    /// Annual growth in percent
    #[arg(long, alias = "growth")]
    pub annual_growth_pct: Option<Decimal>,

    /// Number of years the source runs
    #[arg(long)]
    pub years: Option<u32>,
}

impl IncomeArgs {
    fn into_input(self) -> Result<IncomeInput, Box<dyn std::error::Error>> {
        if let Some(input) = read_input(self.input.as_deref())? {
            return Ok(input);
        }
        Ok(IncomeInput {
            name: self.name,
            initial_monthly_income: self
                .initial_monthly_income
                .ok_or("--initial-monthly-income is required (or provide --input)")?,
            annual_growth_pct: self
                .annual_growth_pct
                .ok_or("--annual-growth-pct is required (or provide --input)")?,
            years: self.years.ok_or("--years is required (or provide --input)")?,
        })
    }
}

/// Arguments for income in one year
#[derive(Args)]
pub struct IncomeYearArgs {
    #[command(flatten)]
    pub income: IncomeArgs,

    /// Year to report (1-based)
    #[arg(long)]
    pub year: u32,
}

pub fn run_income(args: IncomeArgs) -> CommandResult {
    let start = Instant::now();
    let income_input = args.into_input()?;
    let source = income::recompute_income(income_input.clone())?;
    envelope(
        "Income projection (annual growth, year 1 at initial income)",
        &income_input,
        Vec::new(),
        start,
        source,
    )
}

pub fn run_income_progression(args: IncomeArgs) -> CommandResult {
    let start = Instant::now();
    let income_input = args.into_input()?;
    let source = income::recompute_income(income_input.clone())?;
    let rows: Vec<_> = income::yearly_progression(&source)?.collect();
    envelope(
        "Income year-by-year progression",
        &income_input,
        Vec::new(),
        start,
        rows,
    )
}

pub fn run_income_year(args: IncomeYearArgs) -> CommandResult {
    let start = Instant::now();
    let year = args.year;
    let income_input = args.income.into_input()?;
    let source = income::recompute_income(income_input.clone())?;
    let at = income::income_for_year(&source, year)?;
    envelope(
        "Income for a single year",
        &json!({ "source": income_input, "year": year }),
        Vec::new(),
        start,
        at,
    )
}
