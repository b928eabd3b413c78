use clap::{Args, ValueEnum};
use serde_json::json;
use std::time::Instant;

use fintrack_core::config::EngineConfig;
use fintrack_core::investments::lump_sum::{self, LumpSum};
use fintrack_core::investments::options::{self, InvestmentCategory, InvestmentOption, Liquidity, RiskLevel};
use fintrack_core::investments::sip::{self, Sip};
use fintrack_core::loans::emi::{self, Loan};
use fintrack_core::planning::goals::{self, Goal};
use fintrack_core::planning::income::{self, IncomeSource};
use fintrack_core::records::Instrument;

use super::planning::CategoryArg;
use super::{envelope, read_input, CommandResult};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SummaryKind {
    Loans,
    Sips,
    LumpSums,
    Goals,
    Income,
    Options,
}

/// Arguments for summarising a collection of records
#[derive(Args)]
pub struct SummaryArgs {
    /// Which kind of record the input holds
    #[arg(value_enum)]
    pub kind: SummaryKind,

    /// Path to a JSON array of record inputs
    #[arg(long)]
    pub input: Option<String>,

    /// Also report combined income for this year (income only)
    #[arg(long)]
    pub year: Option<u32>,

    /// Rows in ranked listings (defaults to the configured limit)
    #[arg(long)]
    pub limit: Option<usize>,

    /// List the goals in this category (goals only)
    #[arg(long, value_enum)]
    pub goal_category: Option<CategoryArg>,

    /// List the options in this asset class (options only)
    #[arg(long, value_enum)]
    pub asset_class: Option<AssetClassArg>,

    /// List the options at this risk level (options only)
    #[arg(long, value_enum)]
    pub risk: Option<RiskArg>,

    /// List the options with this liquidity (options only)
    #[arg(long, value_enum)]
    pub liquidity: Option<LiquidityArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AssetClassArg {
    Equity,
    FixedIncome,
    RealEstate,
    Commodities,
    Alternative,
}

impl From<AssetClassArg> for InvestmentCategory {
    fn from(arg: AssetClassArg) -> Self {
        match arg {
            AssetClassArg::Equity => InvestmentCategory::Equity,
            AssetClassArg::FixedIncome => InvestmentCategory::FixedIncome,
            AssetClassArg::RealEstate => InvestmentCategory::RealEstate,
            AssetClassArg::Commodities => InvestmentCategory::Commodities,
            AssetClassArg::Alternative => InvestmentCategory::Alternative,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RiskArg {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl From<RiskArg> for RiskLevel {
    fn from(arg: RiskArg) -> Self {
        match arg {
            RiskArg::Low => RiskLevel::Low,
            RiskArg::Medium => RiskLevel::Medium,
            RiskArg::High => RiskLevel::High,
            RiskArg::VeryHigh => RiskLevel::VeryHigh,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LiquidityArg {
    High,
    Medium,
    Low,
}

impl From<LiquidityArg> for Liquidity {
    fn from(arg: LiquidityArg) -> Self {
        match arg {
            LiquidityArg::High => Liquidity::High,
            LiquidityArg::Medium => Liquidity::Medium,
            LiquidityArg::Low => Liquidity::Low,
        }
    }
}

/// Options passing every filter given on the command line.
fn filter_options<'a>(all: &'a [InvestmentOption], args: &SummaryArgs) -> Vec<&'a InvestmentOption> {
    let mut matching: Vec<&InvestmentOption> = all.iter().collect();
    if let Some(class) = args.asset_class {
        let hits = options::options_in_category(all, class.into());
        matching.retain(|o| hits.contains(o));
    }
    if let Some(risk) = args.risk {
        let hits = options::options_with_risk(all, risk.into());
        matching.retain(|o| hits.contains(o));
    }
    if let Some(liquidity) = args.liquidity {
        let hits = options::options_with_liquidity(all, liquidity.into());
        matching.retain(|o| hits.contains(o));
    }
    matching
}

/// Recompute every input so summaries never trust caller-supplied derived
/// fields.
fn load_records<T: Instrument>(path: Option<&str>) -> Result<Vec<T>, Box<dyn std::error::Error>> {
    let inputs: Vec<T::Input> =
        read_input(path)?.ok_or("--input <records.json> or stdin required for summaries")?;
    let mut records = Vec::with_capacity(inputs.len());
    for input in inputs {
        records.push(T::recompute(input)?);
    }
    Ok(records)
}

pub fn run_summary(args: SummaryArgs, config: &EngineConfig) -> CommandResult {
    let start = Instant::now();
    let path = args.input.as_deref();
    let limit = args.limit.unwrap_or(config.ranking_limit);
    let assumptions = json!({ "kind": format!("{:?}", args.kind), "limit": limit });

    match args.kind {
        SummaryKind::Loans => {
            let loans = load_records::<Loan>(path)?;
            let result = json!({
                "summary": emi::summarize_loans(&loans),
                "active_monthly_installment": emi::active_monthly_installment(&loans),
            });
            envelope("Loan summary", &assumptions, Vec::new(), start, result)
        }
        SummaryKind::Sips => {
            let plans = load_records::<Sip>(path)?;
            envelope("SIP summary", &assumptions, Vec::new(), start, sip::summarize_sips(&plans))
        }
        SummaryKind::LumpSums => {
            let investments = load_records::<LumpSum>(path)?;
            let result = json!({
                "summary": lump_sum::summarize_lump_sums(&investments)?,
                "top_performers": lump_sum::top_performers(&investments, limit),
            });
            envelope("Lump sum summary", &assumptions, Vec::new(), start, result)
        }
        SummaryKind::Goals => {
            let all = load_records::<Goal>(path)?;
            let horizon = config.upcoming_goal_horizon_years;
            let result = json!({
                "summary": goals::summarize_goals(&all),
                "upcoming_horizon_years": horizon,
                "upcoming": goals::upcoming_goals(&all, horizon)?,
                "in_category": args.goal_category.map(|c| goals::goals_in_category(&all, c.into())),
            });
            envelope("Goal summary", &assumptions, Vec::new(), start, result)
        }
        SummaryKind::Income => {
            let sources = load_records::<IncomeSource>(path)?;
            let yearly = match args.year {
                Some(year) => Some(income::yearly_income_summary(&sources, year)?),
                None => None,
            };
            let result = json!({
                "summary": income::summarize_income(&sources)?,
                "fastest_growing": income::fastest_growing(&sources, limit)?,
                "yearly": yearly,
            });
            envelope("Income summary", &assumptions, Vec::new(), start, result)
        }
        SummaryKind::Options => {
            let all = load_records::<InvestmentOption>(path)?;
            let filtered = args.asset_class.is_some() || args.risk.is_some() || args.liquidity.is_some();
            let result = json!({
                "summary": options::summarize_options(&all),
                "matching": filtered.then(|| filter_options(&all, &args)),
            });
            envelope(
                "Investment option summary (average CAGR from range midpoints)",
                &assumptions,
                Vec::new(),
                start,
                result,
            )
        }
    }
}
