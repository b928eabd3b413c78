use clap::Args;
use rust_decimal::Decimal;
use std::time::Instant;

use fintrack_core::loans::emi::{self, LoanInput};

use super::{envelope, read_input, CommandResult};

/// Arguments describing a loan
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct LoanArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Label for the loan
    #[arg(long, default_value = "")]
    pub name: String,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (12 = 12%)
    #[arg(long, alias = "rate")]
    pub annual_rate_pct: Option<Decimal>,

    /// Loan term in months
    #[arg(long, alias = "periods")]
    pub total_periods: Option<u32>,

    /// Installments already paid
    #[arg(long, alias = "paid", default_value_t = 0)]
    pub periods_paid: u32,
}

impl LoanArgs {
    fn into_input(self) -> Result<LoanInput, Box<dyn std::error::Error>> {
        if let Some(input) = read_input(self.input.as_deref())? {
            return Ok(input);
        }
        Ok(LoanInput {
            name: self.name,
            principal: self
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate_pct: self
                .annual_rate_pct
                .ok_or("--annual-rate-pct is required (or provide --input)")?,
            total_periods: self
                .total_periods
                .ok_or("--total-periods is required (or provide --input)")?,
            periods_paid: self.periods_paid,
        })
    }
}

pub fn run_loan(args: LoanArgs) -> CommandResult {
    let start = Instant::now();
    let loan_input = args.into_input()?;
    let loan = emi::recompute_loan(loan_input.clone())?;

    let mut warnings = Vec::new();
    if loan.is_fully_repaid() {
        warnings.push("Loan is fully repaid".to_string());
    }
    if loan_input.annual_rate_pct.is_zero() {
        warnings.push("Zero interest rate: installment rounded up so the term covers the principal".to_string());
    }

    envelope(
        "Level-installment amortization (iterative state, 2dp half-up)",
        &loan_input,
        warnings,
        start,
        loan,
    )
}

pub fn run_loan_schedule(args: LoanArgs) -> CommandResult {
    let start = Instant::now();
    let loan_input = args.into_input()?;
    let loan = emi::recompute_loan(loan_input.clone())?;
    let rows: Vec<_> = emi::amortization_schedule(&loan)?.collect();

    envelope(
        "Level-installment amortization schedule",
        &loan_input,
        Vec::new(),
        start,
        rows,
    )
}
