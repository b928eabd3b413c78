mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use log::debug;
use std::process;

use fintrack_core::config::EngineConfig;

use commands::investments::{LumpSumArgs, LumpSumProgressArgs, SipArgs, SipProgressArgs};
use commands::loans::LoanArgs;
use commands::planning::{GoalArgs, GoalPlanArgs, GoalProgressArgs, IncomeArgs, IncomeYearArgs};
use commands::summary::SummaryArgs;

/// Personal-finance projections with decimal precision
#[derive(Parser)]
#[command(
    name = "fintrack",
    version,
    about = "Personal-finance projections with decimal precision",
    long_about = "A CLI for loan amortization, SIP and lump sum growth, goal planning \
                  and income projection. Every money value is rounded half-up to \
                  two decimal places."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Engine settings file (YAML or JSON)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log debug detail to stderr (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Loan installment and repayment position
    Loan(LoanArgs),
    /// Period-by-period amortization schedule
    LoanSchedule(LoanArgs),
    /// SIP future value
    Sip(SipArgs),
    /// SIP value after some months
    SipProgress(SipProgressArgs),
    /// SIP month-by-month projection
    SipProjection(SipArgs),
    /// Lump sum future value
    LumpSum(LumpSumArgs),
    /// Lump sum value after some years
    LumpSumProgress(LumpSumProgressArgs),
    /// Lump sum year-by-year projection
    LumpSumProjection(LumpSumArgs),
    /// Inflation-adjusted goal target
    Goal(GoalArgs),
    /// Monthly savings plan for a goal
    GoalPlan(GoalPlanArgs),
    /// Progress towards a goal
    GoalProgress(GoalProgressArgs),
    /// Income projection and lifetime total
    Income(IncomeArgs),
    /// Year-by-year income progression
    IncomeProgression(IncomeArgs),
    /// Income in a single year
    IncomeYear(IncomeYearArgs),
    /// Summarise a collection of records
    Summary(SummaryArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn load_config(path: Option<&str>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let config = input::config::load_config(path)?;
            debug!("loaded engine config from {}: {:?}", path, config);
            Ok(config)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            output::print_error(e);
            process::exit(2);
        }
    };

    let result: commands::CommandResult = match cli.command {
        Commands::Loan(args) => commands::loans::run_loan(args),
        Commands::LoanSchedule(args) => commands::loans::run_loan_schedule(args),
        Commands::Sip(args) => commands::investments::run_sip(args),
        Commands::SipProgress(args) => commands::investments::run_sip_progress(args),
        Commands::SipProjection(args) => commands::investments::run_sip_projection(args),
        Commands::LumpSum(args) => commands::investments::run_lump_sum(args),
        Commands::LumpSumProgress(args) => commands::investments::run_lump_sum_progress(args),
        Commands::LumpSumProjection(args) => commands::investments::run_lump_sum_projection(args),
        Commands::Goal(args) => commands::planning::run_goal(args, &config),
        Commands::GoalPlan(args) => commands::planning::run_goal_plan(args, &config),
        Commands::GoalProgress(args) => commands::planning::run_goal_progress(args, &config),
        Commands::Income(args) => commands::planning::run_income(args),
        Commands::IncomeProgression(args) => commands::planning::run_income_progression(args),
        Commands::IncomeYear(args) => commands::planning::run_income_year(args),
        Commands::Summary(args) => commands::summary::run_summary(args, &config),
        Commands::Version => {
            println!("fintrack {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            output::print_error(e);
            process::exit(1);
        }
    }
}
