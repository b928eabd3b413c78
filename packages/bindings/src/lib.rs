use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use fintrack_core::investments::lump_sum::{self, LumpSum, LumpSumInput};
use fintrack_core::investments::options::{
    self, InvestmentCategory, InvestmentOption, Liquidity, RecommendationCriteria, RiskLevel,
};
use fintrack_core::investments::sip::{self, Sip, SipInput};
use fintrack_core::loans::emi::{self, Loan, LoanInput};
use fintrack_core::planning::goals::{self, Goal, GoalCategory, GoalInput};
use fintrack_core::planning::income::{self, IncomeInput, IncomeSource};
use fintrack_core::records::Instrument;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse<T: DeserializeOwned>(input_json: &str) -> NapiResult<T> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

fn emit<T: Serialize>(output: &T) -> NapiResult<String> {
    serde_json::to_string(output).map_err(to_napi_error)
}

/// Validate and recompute every input into a full record.
fn recompute_all<T: Instrument>(inputs: Vec<T::Input>) -> NapiResult<Vec<T>> {
    inputs
        .into_iter()
        .map(|input| T::recompute(input).map_err(to_napi_error))
        .collect()
}

/// Recompute a JSON array of inputs into full records.
fn parse_records<T: Instrument>(input_json: &str) -> NapiResult<Vec<T>> {
    recompute_all::<T>(parse(input_json)?)
}

/// A record plus one query parameter, e.g. `{"record": {...}, "at": 6}`.
#[derive(Deserialize)]
struct At<T, P> {
    record: T,
    at: P,
}

/// A record collection plus one query parameter.
#[derive(Deserialize)]
struct Many<T, P> {
    records: Vec<T>,
    at: P,
}

// ---------------------------------------------------------------------------
// Loans
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_loan(input_json: String) -> NapiResult<String> {
    let input: LoanInput = parse(&input_json)?;
    emit(&emi::recompute_loan(input).map_err(to_napi_error)?)
}

#[napi]
pub fn record_loan_payment(loan_json: String) -> NapiResult<String> {
    let loan: Loan = parse(&loan_json)?;
    // Derived fields in the payload are ignored
    let loan = emi::recompute_loan(loan.input).map_err(to_napi_error)?;
    emit(&emi::record_payment(&loan).map_err(to_napi_error)?)
}

#[napi]
pub fn loan_schedule(input_json: String) -> NapiResult<String> {
    let input: LoanInput = parse(&input_json)?;
    let loan = emi::recompute_loan(input).map_err(to_napi_error)?;
    emit(&emi::amortization_schedule(&loan).map_err(to_napi_error)?.collect::<Vec<_>>())
}

#[napi]
pub fn loan_summary(inputs_json: String) -> NapiResult<String> {
    emit(&emi::summarize_loans(&parse_records::<Loan>(&inputs_json)?))
}

/// Sum of installments over loans that still have periods to pay.
#[napi]
pub fn total_monthly_installment(inputs_json: String) -> NapiResult<String> {
    emit(&emi::active_monthly_installment(&parse_records::<Loan>(&inputs_json)?))
}

// ---------------------------------------------------------------------------
// SIPs
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_sip(input_json: String) -> NapiResult<String> {
    let input: SipInput = parse(&input_json)?;
    emit(&sip::recompute_sip(input).map_err(to_napi_error)?)
}

/// `{"record": <sip input>, "at": <months completed>}`
#[napi]
pub fn sip_progress(request_json: String) -> NapiResult<String> {
    let request: At<SipInput, u32> = parse(&request_json)?;
    let plan = sip::recompute_sip(request.record).map_err(to_napi_error)?;
    emit(&sip::compute_for_elapsed_periods(&plan, request.at).map_err(to_napi_error)?)
}

#[napi]
pub fn sip_projection(input_json: String) -> NapiResult<String> {
    let input: SipInput = parse(&input_json)?;
    let plan = sip::recompute_sip(input).map_err(to_napi_error)?;
    emit(&sip::monthly_projection(&plan).map_err(to_napi_error)?.collect::<Vec<_>>())
}

#[napi]
pub fn sip_summary(inputs_json: String) -> NapiResult<String> {
    emit(&sip::summarize_sips(&parse_records::<Sip>(&inputs_json)?))
}

// ---------------------------------------------------------------------------
// Lump sums
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_lump_sum(input_json: String) -> NapiResult<String> {
    let input: LumpSumInput = parse(&input_json)?;
    emit(&lump_sum::recompute_lump_sum(input).map_err(to_napi_error)?)
}

/// `{"record": <lump sum input>, "at": <years completed>}`
#[napi]
pub fn lump_sum_progress(request_json: String) -> NapiResult<String> {
    let request: At<LumpSumInput, u32> = parse(&request_json)?;
    let investment = lump_sum::recompute_lump_sum(request.record).map_err(to_napi_error)?;
    emit(&lump_sum::compute_for_elapsed_years(&investment, request.at).map_err(to_napi_error)?)
}

#[napi]
pub fn lump_sum_projection(input_json: String) -> NapiResult<String> {
    let input: LumpSumInput = parse(&input_json)?;
    let investment = lump_sum::recompute_lump_sum(input).map_err(to_napi_error)?;
    emit(&lump_sum::yearly_projection(&investment).map_err(to_napi_error)?.collect::<Vec<_>>())
}

#[napi]
pub fn lump_sum_summary(inputs_json: String) -> NapiResult<String> {
    emit(&lump_sum::summarize_lump_sums(&parse_records::<LumpSum>(&inputs_json)?).map_err(to_napi_error)?)
}

/// `{"records": [<lump sum input>...], "at": <limit>}`
#[napi]
pub fn lump_sum_top_performers(request_json: String) -> NapiResult<String> {
    let request: Many<LumpSumInput, usize> = parse(&request_json)?;
    let all: Vec<LumpSum> = recompute_all(request.records)?;
    emit(&lump_sum::top_performers(&all, request.at))
}

// ---------------------------------------------------------------------------
// Goals
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_goal(input_json: String) -> NapiResult<String> {
    let input: GoalInput = parse(&input_json)?;
    emit(&goals::recompute_goal(input).map_err(to_napi_error)?)
}

/// `{"record": <goal input>, "at": <expected annual return %>}`
#[napi]
pub fn goal_plan(request_json: String) -> NapiResult<String> {
    let request: At<GoalInput, Decimal> = parse(&request_json)?;
    let goal = goals::recompute_goal(request.record).map_err(to_napi_error)?;
    emit(&goals::plan_goal(&goal, request.at).map_err(to_napi_error)?)
}

/// `{"record": <goal input>, "at": <current savings>}`
#[napi]
pub fn goal_progress(request_json: String) -> NapiResult<String> {
    let request: At<GoalInput, Decimal> = parse(&request_json)?;
    let goal = goals::recompute_goal(request.record).map_err(to_napi_error)?;
    emit(&goals::progress(&goal, request.at).map_err(to_napi_error)?)
}

/// `{"records": [<goal input>...], "at": <horizon in years>}`
#[napi]
pub fn upcoming_goals(request_json: String) -> NapiResult<String> {
    let request: Many<GoalInput, u32> = parse(&request_json)?;
    let all: Vec<Goal> = recompute_all(request.records)?;
    emit(&goals::upcoming_goals(&all, request.at).map_err(to_napi_error)?)
}

/// `{"records": [<goal input>...], "at": "ShortTerm"}`
#[napi]
pub fn goals_by_category(request_json: String) -> NapiResult<String> {
    let request: Many<GoalInput, GoalCategory> = parse(&request_json)?;
    let all: Vec<Goal> = recompute_all(request.records)?;
    emit(&goals::goals_in_category(&all, request.at))
}

#[napi]
pub fn goal_summary(inputs_json: String) -> NapiResult<String> {
    emit(&goals::summarize_goals(&parse_records::<Goal>(&inputs_json)?))
}

// ---------------------------------------------------------------------------
// Income
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_income(input_json: String) -> NapiResult<String> {
    let input: IncomeInput = parse(&input_json)?;
    emit(&income::recompute_income(input).map_err(to_napi_error)?)
}

#[napi]
pub fn income_progression(input_json: String) -> NapiResult<String> {
    let input: IncomeInput = parse(&input_json)?;
    let source = income::recompute_income(input).map_err(to_napi_error)?;
    emit(&income::yearly_progression(&source).map_err(to_napi_error)?.collect::<Vec<_>>())
}

/// `{"record": <income input>, "at": <year>}`
#[napi]
pub fn income_for_year(request_json: String) -> NapiResult<String> {
    let request: At<IncomeInput, u32> = parse(&request_json)?;
    let source = income::recompute_income(request.record).map_err(to_napi_error)?;
    emit(&income::income_for_year(&source, request.at).map_err(to_napi_error)?)
}

#[napi]
pub fn income_summary(inputs_json: String) -> NapiResult<String> {
    emit(&income::summarize_income(&parse_records::<IncomeSource>(&inputs_json)?).map_err(to_napi_error)?)
}

/// `{"records": [<income input>...], "at": <limit>}`
#[napi]
pub fn fastest_growing_income(request_json: String) -> NapiResult<String> {
    let request: Many<IncomeInput, usize> = parse(&request_json)?;
    let all: Vec<IncomeSource> = recompute_all(request.records)?;
    emit(&income::fastest_growing(&all, request.at).map_err(to_napi_error)?)
}

/// `{"records": [<income input>...], "at": <year>}`
#[napi]
pub fn yearly_income_summary(request_json: String) -> NapiResult<String> {
    let request: Many<IncomeInput, u32> = parse(&request_json)?;
    let all: Vec<IncomeSource> = recompute_all(request.records)?;
    emit(&income::yearly_income_summary(&all, request.at).map_err(to_napi_error)?)
}

// ---------------------------------------------------------------------------
// Investment options
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct CagrRange {
    records: Vec<InvestmentOption>,
    min_cagr_pct: Decimal,
    max_cagr_pct: Decimal,
}

#[derive(Deserialize)]
struct RecommendRequest {
    records: Vec<InvestmentOption>,
    criteria: RecommendationCriteria,
}

#[napi]
pub fn options_in_cagr_range(request_json: String) -> NapiResult<String> {
    let request: CagrRange = parse(&request_json)?;
    let all: Vec<InvestmentOption> = recompute_all(request.records)?;
    emit(&options::filter_by_cagr_range(
        &all,
        request.min_cagr_pct,
        request.max_cagr_pct,
    ))
}

#[napi]
pub fn recommend_options(request_json: String) -> NapiResult<String> {
    let request: RecommendRequest = parse(&request_json)?;
    let all: Vec<InvestmentOption> = recompute_all(request.records)?;
    emit(&options::recommend(&all, &request.criteria))
}

/// `{"records": [<option>...], "at": "Equity"}`
#[napi]
pub fn options_by_category(request_json: String) -> NapiResult<String> {
    let request: Many<InvestmentOption, InvestmentCategory> = parse(&request_json)?;
    let all: Vec<InvestmentOption> = recompute_all(request.records)?;
    emit(&options::options_in_category(&all, request.at))
}

/// `{"records": [<option>...], "at": "Medium"}`
#[napi]
pub fn options_by_risk_level(request_json: String) -> NapiResult<String> {
    let request: Many<InvestmentOption, RiskLevel> = parse(&request_json)?;
    let all: Vec<InvestmentOption> = recompute_all(request.records)?;
    emit(&options::options_with_risk(&all, request.at))
}

/// `{"records": [<option>...], "at": "High"}`
#[napi]
pub fn options_by_liquidity(request_json: String) -> NapiResult<String> {
    let request: Many<InvestmentOption, Liquidity> = parse(&request_json)?;
    let all: Vec<InvestmentOption> = recompute_all(request.records)?;
    emit(&options::options_with_liquidity(&all, request.at))
}

#[napi]
pub fn options_summary(inputs_json: String) -> NapiResult<String> {
    emit(&options::summarize_options(&parse_records::<InvestmentOption>(&inputs_json)?))
}
