use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::investments::lump_sum::{recompute_lump_sum, LumpSum, LumpSumInput};
use crate::investments::options::{recompute_option, InvestmentOption};
use crate::investments::sip::{recompute_sip, Sip, SipInput};
use crate::loans::emi::{recompute_loan, Loan, LoanInput};
use crate::planning::goals::{recompute_goal, Goal, GoalInput};
use crate::planning::income::{recompute_income, IncomeInput, IncomeSource};
use crate::FinTrackResult;

/// A record whose derived fields are a pure function of its inputs.
pub trait Instrument: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Name used in errors and log lines.
    const KIND: &'static str;

    type Input: Clone + Serialize + DeserializeOwned + Send + Sync;

    /// Validate `input` and derive every computed field from it.
    fn recompute(input: Self::Input) -> FinTrackResult<Self>;

    fn input(&self) -> &Self::Input;
}

impl Instrument for Loan {
    const KIND: &'static str = "Loan";
    type Input = LoanInput;

    fn recompute(input: LoanInput) -> FinTrackResult<Self> {
        recompute_loan(input)
    }

    fn input(&self) -> &LoanInput {
        &self.input
    }
}

impl Instrument for Sip {
    const KIND: &'static str = "SIP";
    type Input = SipInput;

    fn recompute(input: SipInput) -> FinTrackResult<Self> {
        recompute_sip(input)
    }

    fn input(&self) -> &SipInput {
        &self.input
    }
}

impl Instrument for LumpSum {
    const KIND: &'static str = "Lump sum";
    type Input = LumpSumInput;

    fn recompute(input: LumpSumInput) -> FinTrackResult<Self> {
        recompute_lump_sum(input)
    }

    fn input(&self) -> &LumpSumInput {
        &self.input
    }
}

impl Instrument for Goal {
    const KIND: &'static str = "Goal";
    type Input = GoalInput;

    fn recompute(input: GoalInput) -> FinTrackResult<Self> {
        recompute_goal(input)
    }

    fn input(&self) -> &GoalInput {
        &self.input
    }
}

impl Instrument for IncomeSource {
    const KIND: &'static str = "Income source";
    type Input = IncomeInput;

    fn recompute(input: IncomeInput) -> FinTrackResult<Self> {
        recompute_income(input)
    }

    fn input(&self) -> &IncomeInput {
        &self.input
    }
}

/// Options have no derived fields; the record is its own input.
impl Instrument for InvestmentOption {
    const KIND: &'static str = "Investment option";
    type Input = InvestmentOption;

    fn recompute(input: InvestmentOption) -> FinTrackResult<Self> {
        recompute_option(input)
    }

    fn input(&self) -> &InvestmentOption {
        self
    }
}
