use log::{debug, info, warn};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::FinTrackError;
use crate::investments::lump_sum::{self, LumpSum, LumpSumPerformance, LumpSumProgress, LumpSumProjectionRow, LumpSumSummary};
use crate::investments::options::{
    self, InvestmentCategory, InvestmentOption, InvestmentOptionSummary, Liquidity, Recommendation,
    RecommendationCriteria, RiskLevel,
};
use crate::investments::sip::{self, Sip, SipProgress, SipProjectionRow, SipSummary};
use crate::loans::emi::{self, AmortizationRow, Loan, LoanSummary};
use crate::planning::goals::{self, Goal, GoalCategory, GoalPlan, GoalProgress, GoalSummary, UpcomingGoal};
use crate::planning::income::{
    self, IncomeForYear, IncomeGrowth, IncomeSource, IncomeSummary, IncomeYearRow, YearlyIncomeSummary,
};
use crate::records::clock::Clock;
use crate::records::identity::IdentityResolver;
use crate::records::instrument::Instrument;
use crate::records::store::{RecordStore, StoredRecord};
use crate::types::{Money, OwnerId, RatePct, RecordId};
use crate::FinTrackResult;

/// Owner-scoped lifecycle of one instrument type.
///
/// Every write recomputes the whole record from its inputs before it reaches
/// the store, so derived fields never drift from the inputs they came from.
pub struct InstrumentService<T, S, I, C>
where
    T: Instrument,
    S: RecordStore<T>,
    I: IdentityResolver,
    C: Clock,
{
    store: Arc<S>,
    identities: Arc<I>,
    clock: Arc<C>,
    _instrument: PhantomData<fn() -> T>,
}

impl<T, S, I, C> InstrumentService<T, S, I, C>
where
    T: Instrument,
    S: RecordStore<T>,
    I: IdentityResolver,
    C: Clock,
{
    pub fn new(store: Arc<S>, identities: Arc<I>, clock: Arc<C>) -> Self {
        InstrumentService {
            store,
            identities,
            clock,
            _instrument: PhantomData,
        }
    }

    pub fn create(&self, principal: &str, input: T::Input) -> FinTrackResult<StoredRecord<T>> {
        let owner = self.identities.resolve(principal)?;
        let record = T::recompute(input)?;
        let stored = self.store.insert(&owner, record, self.clock.now())?;
        info!("created {} {} for {}", T::KIND, stored.id, owner);
        Ok(stored)
    }

    pub fn list(&self, principal: &str) -> FinTrackResult<Vec<StoredRecord<T>>> {
        let owner = self.identities.resolve(principal)?;
        self.store.find_all_by_owner(&owner)
    }

    /// Records owned by someone else are reported as missing.
    pub fn get(&self, principal: &str, id: RecordId) -> FinTrackResult<StoredRecord<T>> {
        let owner = self.identities.resolve(principal)?;
        self.owned(&owner, id)
    }

    /// Replace the inputs of a record and recompute everything derived.
    pub fn update(&self, principal: &str, id: RecordId, input: T::Input) -> FinTrackResult<StoredRecord<T>> {
        let owner = self.identities.resolve(principal)?;
        let current = self.owned(&owner, id)?;
        let record = T::recompute(input)?;
        debug!("recomputed {} {} at version {}", T::KIND, id, current.version);
        self.replace(current, record)
    }

    pub fn delete(&self, principal: &str, id: RecordId) -> FinTrackResult<()> {
        let owner = self.identities.resolve(principal)?;
        if !self.store.delete_by_id_and_owner(id, &owner)? {
            return Err(self.not_found(id));
        }
        info!("deleted {} {} for {}", T::KIND, id, owner);
        Ok(())
    }

    fn owned(&self, owner: &OwnerId, id: RecordId) -> FinTrackResult<StoredRecord<T>> {
        self.store.find_by_id(id, owner)?.ok_or_else(|| self.not_found(id))
    }

    fn replace(&self, current: StoredRecord<T>, record: T) -> FinTrackResult<StoredRecord<T>> {
        let id = current.id;
        let next = StoredRecord {
            record,
            updated_at: self.clock.now(),
            ..current
        };
        let saved = self.store.save(next).map_err(|e| {
            warn!("save of {} {} rejected: {}", T::KIND, id, e);
            e
        })?;
        debug!("saved {} {} as version {}", T::KIND, id, saved.version);
        Ok(saved)
    }

    /// Bare records of the caller, for the calculators' collection queries.
    fn records(&self, principal: &str) -> FinTrackResult<Vec<T>> {
        Ok(self.list(principal)?.into_iter().map(|s| s.record).collect())
    }

    fn not_found(&self, id: RecordId) -> FinTrackError {
        FinTrackError::NotFound {
            kind: T::KIND.into(),
            id,
        }
    }
}

// ---------------------------------------------------------------------------
// Loans
// ---------------------------------------------------------------------------

impl<S, I, C> InstrumentService<Loan, S, I, C>
where
    S: RecordStore<Loan>,
    I: IdentityResolver,
    C: Clock,
{
    /// Advance a loan by one installment. A loan that is already repaid is
    /// returned unchanged and nothing is written.
    pub fn record_payment(&self, principal: &str, id: RecordId) -> FinTrackResult<StoredRecord<Loan>> {
        let owner = self.identities.resolve(principal)?;
        let current = self.owned(&owner, id)?;
        if current.record.is_fully_repaid() {
            warn!("payment on {} {} ignored: already fully repaid", Loan::KIND, id);
            return Ok(current);
        }
        let advanced = emi::record_payment(&current.record)?;
        self.replace(current, advanced)
    }

    pub fn amortization_schedule(&self, principal: &str, id: RecordId) -> FinTrackResult<Vec<AmortizationRow>> {
        let loan = self.get(principal, id)?.record;
        Ok(emi::amortization_schedule(&loan)?.collect())
    }

    /// Monthly outgo across the caller's loans that still have periods left.
    pub fn total_monthly_installment(&self, principal: &str) -> FinTrackResult<Money> {
        Ok(emi::active_monthly_installment(&self.records(principal)?))
    }

    pub fn summary(&self, principal: &str) -> FinTrackResult<LoanSummary> {
        Ok(emi::summarize_loans(&self.records(principal)?))
    }
}

// ---------------------------------------------------------------------------
// SIPs
// ---------------------------------------------------------------------------

impl<S, I, C> InstrumentService<Sip, S, I, C>
where
    S: RecordStore<Sip>,
    I: IdentityResolver,
    C: Clock,
{
    pub fn progress(&self, principal: &str, id: RecordId, months_completed: u32) -> FinTrackResult<SipProgress> {
        sip::compute_for_elapsed_periods(&self.get(principal, id)?.record, months_completed)
    }

    pub fn projection(&self, principal: &str, id: RecordId) -> FinTrackResult<Vec<SipProjectionRow>> {
        let plan = self.get(principal, id)?.record;
        Ok(sip::monthly_projection(&plan)?.collect())
    }

    pub fn summary(&self, principal: &str) -> FinTrackResult<SipSummary> {
        Ok(sip::summarize_sips(&self.records(principal)?))
    }
}

// ---------------------------------------------------------------------------
// Lump sums
// ---------------------------------------------------------------------------

impl<S, I, C> InstrumentService<LumpSum, S, I, C>
where
    S: RecordStore<LumpSum>,
    I: IdentityResolver,
    C: Clock,
{
    pub fn progress(&self, principal: &str, id: RecordId, years_completed: u32) -> FinTrackResult<LumpSumProgress> {
        lump_sum::compute_for_elapsed_years(&self.get(principal, id)?.record, years_completed)
    }

    pub fn projection(&self, principal: &str, id: RecordId) -> FinTrackResult<Vec<LumpSumProjectionRow>> {
        let investment = self.get(principal, id)?.record;
        Ok(lump_sum::yearly_projection(&investment)?.collect())
    }

    pub fn top_performers(&self, principal: &str, limit: usize) -> FinTrackResult<Vec<LumpSumPerformance>> {
        Ok(lump_sum::top_performers(&self.records(principal)?, limit))
    }

    pub fn summary(&self, principal: &str) -> FinTrackResult<LumpSumSummary> {
        lump_sum::summarize_lump_sums(&self.records(principal)?)
    }
}

// ---------------------------------------------------------------------------
// Goals
// ---------------------------------------------------------------------------

impl<S, I, C> InstrumentService<Goal, S, I, C>
where
    S: RecordStore<Goal>,
    I: IdentityResolver,
    C: Clock,
{
    pub fn plan(&self, principal: &str, id: RecordId, expected_return_pct: RatePct) -> FinTrackResult<GoalPlan> {
        goals::plan_goal(&self.get(principal, id)?.record, expected_return_pct)
    }

    pub fn progress(&self, principal: &str, id: RecordId, current_savings: Money) -> FinTrackResult<GoalProgress> {
        goals::progress(&self.get(principal, id)?.record, current_savings)
    }

    pub fn by_category(&self, principal: &str, category: GoalCategory) -> FinTrackResult<Vec<Goal>> {
        let all = self.records(principal)?;
        Ok(goals::goals_in_category(&all, category).into_iter().cloned().collect())
    }

    pub fn upcoming(&self, principal: &str, horizon_years: u32) -> FinTrackResult<Vec<UpcomingGoal>> {
        goals::upcoming_goals(&self.records(principal)?, horizon_years)
    }

    pub fn summary(&self, principal: &str) -> FinTrackResult<GoalSummary> {
        Ok(goals::summarize_goals(&self.records(principal)?))
    }
}

// ---------------------------------------------------------------------------
// Income sources
// ---------------------------------------------------------------------------

impl<S, I, C> InstrumentService<IncomeSource, S, I, C>
where
    S: RecordStore<IncomeSource>,
    I: IdentityResolver,
    C: Clock,
{
    pub fn progression(&self, principal: &str, id: RecordId) -> FinTrackResult<Vec<IncomeYearRow>> {
        let source = self.get(principal, id)?.record;
        Ok(income::yearly_progression(&source)?.collect())
    }

    pub fn income_for_year(&self, principal: &str, id: RecordId, year: u32) -> FinTrackResult<IncomeForYear> {
        income::income_for_year(&self.get(principal, id)?.record, year)
    }

    pub fn fastest_growing(&self, principal: &str, limit: usize) -> FinTrackResult<Vec<IncomeGrowth>> {
        income::fastest_growing(&self.records(principal)?, limit)
    }

    pub fn yearly_summary(&self, principal: &str, year: u32) -> FinTrackResult<YearlyIncomeSummary> {
        income::yearly_income_summary(&self.records(principal)?, year)
    }

    pub fn summary(&self, principal: &str) -> FinTrackResult<IncomeSummary> {
        income::summarize_income(&self.records(principal)?)
    }
}

// ---------------------------------------------------------------------------
// Investment options
// ---------------------------------------------------------------------------

impl<S, I, C> InstrumentService<InvestmentOption, S, I, C>
where
    S: RecordStore<InvestmentOption>,
    I: IdentityResolver,
    C: Clock,
{
    pub fn by_cagr_range(&self, principal: &str, min_pct: RatePct, max_pct: RatePct) -> FinTrackResult<Vec<InvestmentOption>> {
        let all = self.records(principal)?;
        Ok(options::filter_by_cagr_range(&all, min_pct, max_pct).into_iter().cloned().collect())
    }

    pub fn by_category(&self, principal: &str, category: InvestmentCategory) -> FinTrackResult<Vec<InvestmentOption>> {
        let all = self.records(principal)?;
        Ok(options::options_in_category(&all, category).into_iter().cloned().collect())
    }

    pub fn by_risk_level(&self, principal: &str, risk: RiskLevel) -> FinTrackResult<Vec<InvestmentOption>> {
        let all = self.records(principal)?;
        Ok(options::options_with_risk(&all, risk).into_iter().cloned().collect())
    }

    pub fn by_liquidity(&self, principal: &str, liquidity: Liquidity) -> FinTrackResult<Vec<InvestmentOption>> {
        let all = self.records(principal)?;
        Ok(options::options_with_liquidity(&all, liquidity).into_iter().cloned().collect())
    }

    pub fn recommend(&self, principal: &str, criteria: &RecommendationCriteria) -> FinTrackResult<Vec<Recommendation>> {
        Ok(options::recommend(&self.records(principal)?, criteria))
    }

    pub fn summary(&self, principal: &str) -> FinTrackResult<InvestmentOptionSummary> {
        Ok(options::summarize_options(&self.records(principal)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loans::emi::LoanInput;
    use crate::planning::goals::{GoalCategory, GoalInput};
    use crate::records::clock::FixedClock;
    use crate::records::identity::StaticIdentities;
    use crate::records::memory::InMemoryStore;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;

    type Service<T> = InstrumentService<T, InMemoryStore<T>, StaticIdentities, FixedClock>;

    fn service<T: Instrument>() -> (Service<T>, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
        let identities = StaticIdentities::new()
            .with("asha", OwnerId::new("owner-asha"))
            .with("ravi", OwnerId::new("owner-ravi"));
        let svc = InstrumentService::new(Arc::new(InMemoryStore::new()), Arc::new(identities), clock.clone());
        (svc, clock)
    }

    fn car_loan(periods_paid: u32) -> LoanInput {
        LoanInput {
            name: "Car".into(),
            principal: dec!(100000),
            annual_rate_pct: dec!(12),
            total_periods: 12,
            periods_paid,
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    #[test]
    fn test_create_recomputes_derived_fields() {
        let (svc, _) = service::<Loan>();
        let stored = svc.create("asha", car_loan(0)).unwrap();
        assert_eq!(stored.record.installment_amount, dec!(8884.88));
        assert_eq!(stored.owner, OwnerId::new("owner-asha"));
        assert_eq!(stored.created_at, stored.updated_at);
    }

    #[test]
    fn test_create_rejects_invalid_input_without_storing() {
        let (svc, _) = service::<Loan>();
        let mut input = car_loan(0);
        input.principal = dec!(-5);
        assert!(svc.create("asha", input).is_err());
        assert!(svc.list("asha").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_caller_is_unauthorized() {
        let (svc, _) = service::<Loan>();
        let err = svc.create("mallory", car_loan(0)).unwrap_err();
        assert!(matches!(err, FinTrackError::Unauthorized(_)));
    }

    #[test]
    fn test_other_owners_records_are_not_found() {
        let (svc, _) = service::<Loan>();
        let stored = svc.create("asha", car_loan(0)).unwrap();

        let err = svc.get("ravi", stored.id).unwrap_err();
        assert_eq!(err.to_string(), format!("Loan not found with id: {}", stored.id));
        assert!(svc.delete("ravi", stored.id).is_err());
        assert!(svc.list("ravi").unwrap().is_empty());
    }

    #[test]
    fn test_update_recomputes_and_stamps() {
        let (svc, clock) = service::<Loan>();
        let stored = svc.create("asha", car_loan(0)).unwrap();
        clock.advance(Duration::hours(2));

        let updated = svc.update("asha", stored.id, car_loan(5)).unwrap();
        assert_eq!(updated.version, 1);
        assert_eq!(updated.record.state.remaining_principal, dec!(59779.19));
        assert_eq!(updated.created_at, stored.created_at);
        assert_eq!(updated.updated_at, stored.created_at + Duration::hours(2));
    }

    #[test]
    fn test_delete() {
        let (svc, _) = service::<Loan>();
        let stored = svc.create("asha", car_loan(0)).unwrap();
        svc.delete("asha", stored.id).unwrap();
        assert!(matches!(svc.get("asha", stored.id), Err(FinTrackError::NotFound { .. })));
    }

    // ------------------------------------------------------------------
    // Instrument queries
    // ------------------------------------------------------------------

    #[test]
    fn test_record_payment_advances_loan() {
        let (svc, _) = service::<Loan>();
        let stored = svc.create("asha", car_loan(0)).unwrap();
        let paid = svc.record_payment("asha", stored.id).unwrap();
        assert_eq!(paid.record.input.periods_paid, 1);
        assert_eq!(paid.record.state.interest_paid_so_far, dec!(1000.00));
        assert_eq!(paid.version, 1);
    }

    #[test]
    fn test_record_payment_on_repaid_loan_is_noop() {
        let (svc, _) = service::<Loan>();
        let stored = svc.create("asha", car_loan(12)).unwrap();
        let after = svc.record_payment("asha", stored.id).unwrap();
        assert_eq!(after, stored);
    }

    #[test]
    fn test_loan_summary_only_counts_callers_loans() {
        let (svc, _) = service::<Loan>();
        svc.create("asha", car_loan(0)).unwrap();
        svc.create("ravi", car_loan(0)).unwrap();
        let summary = svc.summary("asha").unwrap();
        assert_eq!(summary.total_loans, 1);
        assert_eq!(summary.total_principal, dec!(100000));
    }

    #[test]
    fn test_total_monthly_installment_skips_repaid_loans() {
        let (svc, _) = service::<Loan>();
        svc.create("asha", car_loan(3)).unwrap();
        svc.create("asha", car_loan(12)).unwrap();
        svc.create("ravi", car_loan(0)).unwrap();
        assert_eq!(svc.total_monthly_installment("asha").unwrap(), dec!(8884.88));
        assert_eq!(svc.summary("asha").unwrap().total_monthly_installment, dec!(17769.76));
    }

    #[test]
    fn test_goals_by_category() {
        let (svc, _) = service::<Goal>();
        let goal = |name: &str, category| GoalInput {
            name: name.into(),
            category,
            target_amount: dec!(500000),
            years: 3,
            inflation_rate_pct: dec!(6),
            notes: None,
        };
        svc.create("asha", goal("Car", GoalCategory::MediumTerm)).unwrap();
        svc.create("asha", goal("Pension", GoalCategory::Retirement)).unwrap();
        svc.create("ravi", goal("Bike", GoalCategory::MediumTerm)).unwrap();

        let medium = svc.by_category("asha", GoalCategory::MediumTerm).unwrap();
        assert_eq!(medium.len(), 1);
        assert_eq!(medium[0].input.name, "Car");
        assert!(svc.by_category("asha", GoalCategory::ShortTerm).unwrap().is_empty());
    }

    #[test]
    fn test_goal_plan_through_service() {
        let (svc, _) = service::<Goal>();
        let stored = svc
            .create(
                "asha",
                GoalInput {
                    name: "House".into(),
                    category: GoalCategory::LongTerm,
                    target_amount: dec!(1000000),
                    years: 10,
                    inflation_rate_pct: dec!(6),
                    notes: None,
                },
            )
            .unwrap();
        let plan = svc.plan("asha", stored.id, dec!(12)).unwrap();
        assert_eq!(plan.monthly_savings_with_return, dec!(4347.09));
        assert!(svc.upcoming("asha", 5).unwrap().is_empty());
    }
}
