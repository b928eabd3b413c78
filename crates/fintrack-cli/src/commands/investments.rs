use clap::Args;
use rust_decimal::Decimal;
use serde_json::json;
use std::time::Instant;

use fintrack_core::investments::lump_sum::{self, LumpSumInput};
use fintrack_core::investments::sip::{self, SipInput};

use super::{envelope, read_input, CommandResult};

// ---------------------------------------------------------------------------
// SIP
// ---------------------------------------------------------------------------

/// Arguments describing a systematic investment plan
#[derive(Args)]
pub struct SipArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Label for the plan
    #[arg(long, default_value = "")]
    pub name: String,

    /// Contribution made at the start of each month
    #[arg(long, alias = "amount")]
    pub monthly_amount: Option<Decimal>,

    /// Duration in months
    #[arg(long, alias = "months")]
    pub periods: Option<u32>,

    /// Expected annual return in percent
    #[arg(long, alias = "rate")]
    pub annual_return_pct: Option<Decimal>,
}

impl SipArgs {
    fn into_input(self) -> Result<SipInput, Box<dyn std::error::Error>> {
        if let Some(input) = read_input(self.input.as_deref())? {
            return Ok(input);
        }
        Ok(SipInput {
            name: self.name,
            monthly_amount: self
                .monthly_amount
                .ok_or("--monthly-amount is required (or provide --input)")?,
            periods: self.periods.ok_or("--periods is required (or provide --input)")?,
            annual_return_pct: self
                .annual_return_pct
                .ok_or("--annual-return-pct is required (or provide --input)")?,
        })
    }
}

/// Arguments for a SIP position after some months
#[derive(Args)]
pub struct SipProgressArgs {
    #[command(flatten)]
    pub sip: SipArgs,

    /// Months already invested
    #[arg(long)]
    pub months_completed: u32,
}

pub fn run_sip(args: SipArgs) -> CommandResult {
    let start = Instant::now();
    let sip_input = args.into_input()?;
    let plan = sip::recompute_sip(sip_input.clone())?;
    envelope(
        "SIP future value (annuity-due, monthly compounding)",
        &sip_input,
        Vec::new(),
        start,
        plan,
    )
}

pub fn run_sip_progress(args: SipProgressArgs) -> CommandResult {
    let start = Instant::now();
    let months = args.months_completed;
    let sip_input = args.sip.into_input()?;
    let plan = sip::recompute_sip(sip_input.clone())?;
    let progress = sip::compute_for_elapsed_periods(&plan, months)?;
    envelope(
        "SIP value after elapsed months (annuity-due)",
        &json!({ "plan": sip_input, "months_completed": months }),
        Vec::new(),
        start,
        progress,
    )
}

pub fn run_sip_projection(args: SipArgs) -> CommandResult {
    let start = Instant::now();
    let sip_input = args.into_input()?;
    let plan = sip::recompute_sip(sip_input.clone())?;
    let rows: Vec<_> = sip::monthly_projection(&plan)?.collect();
    envelope(
        "SIP month-by-month projection",
        &sip_input,
        Vec::new(),
        start,
        rows,
    )
}

// ---------------------------------------------------------------------------
// Lump sum
// ---------------------------------------------------------------------------

/// Arguments describing a one-off investment
#[derive(Args)]
pub struct LumpSumArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Label for the investment
    #[arg(long, default_value = "")]
    pub name: String,

    /// Amount invested up front
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Holding period in years
    #[arg(long)]
    pub years: Option<u32>,

    /// Expected annual return in percent
    #[arg(long, alias = "rate")]
    pub annual_return_pct: Option<Decimal>,
}

impl LumpSumArgs {
    fn into_input(self) -> Result<LumpSumInput, Box<dyn std::error::Error>> {
        if let Some(input) = read_input(self.input.as_deref())? {
            return Ok(input);
        }
        Ok(LumpSumInput {
            name: self.name,
            principal: self
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            years: self.years.ok_or("--years is required (or provide --input)")?,
            annual_return_pct: self
                .annual_return_pct
                .ok_or("--annual-return-pct is required (or provide --input)")?,
        })
    }
}

/// Arguments for a lump sum position after some years
#[derive(Args)]
pub struct LumpSumProgressArgs {
    #[command(flatten)]
    pub lump_sum: LumpSumArgs,

    /// Years already held
    #[arg(long)]
    pub years_completed: u32,
}

pub fn run_lump_sum(args: LumpSumArgs) -> CommandResult {
    let start = Instant::now();
    let ls_input = args.into_input()?;
    let investment = lump_sum::recompute_lump_sum(ls_input.clone())?;

    let mut warnings = Vec::new();
    if ls_input.annual_return_pct.is_zero() {
        warnings.push("Zero return: future value equals principal".to_string());
    }

    envelope(
        "Lump sum future value (annual compounding)",
        &ls_input,
        warnings,
        start,
        investment,
    )
}

pub fn run_lump_sum_progress(args: LumpSumProgressArgs) -> CommandResult {
    let start = Instant::now();
    let years = args.years_completed;
    let ls_input = args.lump_sum.into_input()?;
    let investment = lump_sum::recompute_lump_sum(ls_input.clone())?;
    let progress = lump_sum::compute_for_elapsed_years(&investment, years)?;
    envelope(
        "Lump sum value after elapsed years",
        &json!({ "investment": ls_input, "years_completed": years }),
        Vec::new(),
        start,
        progress,
    )
}

pub fn run_lump_sum_projection(args: LumpSumArgs) -> CommandResult {
    let start = Instant::now();
    let ls_input = args.into_input()?;
    let investment = lump_sum::recompute_lump_sum(ls_input.clone())?;
    let rows: Vec<_> = lump_sum::yearly_projection(&investment)?.collect();
    envelope(
        "Lump sum year-by-year projection",
        &ls_input,
        Vec::new(),
        start,
        rows,
    )
}
