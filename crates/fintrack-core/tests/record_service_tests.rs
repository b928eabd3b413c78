use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::thread;

use fintrack_core::investments::options::{InvestmentCategory, InvestmentOption, Liquidity, RiskLevel};
use fintrack_core::loans::emi::{Loan, LoanInput};
use fintrack_core::planning::income::{IncomeInput, IncomeSource};
use fintrack_core::records::{
    FixedClock, InMemoryStore, InstrumentService, RecordStore, StaticIdentities, SystemClock,
};
use fintrack_core::{FinTrackError, OwnerId};

fn identities() -> Arc<StaticIdentities> {
    Arc::new(
        StaticIdentities::new()
            .with("meera", OwnerId::new("u-100"))
            .with("arjun", OwnerId::new("u-200")),
    )
}

fn home_loan() -> LoanInput {
    LoanInput {
        name: "Home".into(),
        principal: dec!(2_400_000),
        annual_rate_pct: dec!(8.5),
        total_periods: 240,
        periods_paid: 0,
    }
}

// ===========================================================================
// Loans
// ===========================================================================

#[test]
fn test_payments_walk_the_loan_to_completion() {
    let store = Arc::new(InMemoryStore::<Loan>::new());
    let clock = Arc::new(FixedClock::at(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()));
    let loans = InstrumentService::new(store, identities(), clock);

    let short = LoanInput {
        total_periods: 3,
        ..home_loan()
    };
    let stored = loans.create("meera", short).unwrap();
    for expected in 1..=3 {
        let paid = loans.record_payment("meera", stored.id).unwrap();
        assert_eq!(paid.record.input.periods_paid, expected);
    }
    let done = loans.record_payment("meera", stored.id).unwrap();
    assert_eq!(done.version, 3);
    assert!(done.record.is_fully_repaid());
}

#[test]
fn test_concurrent_payments_never_lose_updates() {
    let store = Arc::new(InMemoryStore::<Loan>::new());
    let loans = Arc::new(InstrumentService::new(store.clone(), identities(), Arc::new(SystemClock)));
    let stored = loans.create("meera", home_loan()).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let loans = Arc::clone(&loans);
            thread::spawn(move || {
                let mut applied = 0u32;
                for _ in 0..5 {
                    match loans.record_payment("meera", stored.id) {
                        Ok(_) => applied += 1,
                        Err(FinTrackError::Conflict { .. }) => {}
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
                applied
            })
        })
        .collect();
    let applied: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();

    // Every accepted save advanced the loan by exactly one installment
    let current = store.find_by_id(stored.id, &OwnerId::new("u-100")).unwrap().unwrap();
    assert_eq!(current.record.input.periods_paid, applied);
    assert_eq!(current.version, u64::from(applied));
}

#[test]
fn test_owners_are_isolated() {
    let loans = InstrumentService::new(
        Arc::new(InMemoryStore::<Loan>::new()),
        identities(),
        Arc::new(SystemClock),
    );
    let mine = loans.create("meera", home_loan()).unwrap();
    loans.create("arjun", home_loan()).unwrap();

    assert_eq!(loans.list("meera").unwrap().len(), 1);
    assert!(matches!(
        loans.record_payment("arjun", mine.id),
        Err(FinTrackError::NotFound { .. })
    ));
    assert!(matches!(
        loans.update("arjun", mine.id, home_loan()),
        Err(FinTrackError::NotFound { .. })
    ));
}

// ===========================================================================
// Income and options
// ===========================================================================

#[test]
fn test_income_queries_over_stored_sources() {
    let incomes = InstrumentService::new(
        Arc::new(InMemoryStore::<IncomeSource>::new()),
        identities(),
        Arc::new(SystemClock),
    );
    let salary = incomes
        .create(
            "meera",
            IncomeInput {
                name: "Salary".into(),
                initial_monthly_income: dec!(50_000),
                annual_growth_pct: dec!(10),
                years: 3,
            },
        )
        .unwrap();
    incomes
        .create(
            "meera",
            IncomeInput {
                name: "Rent".into(),
                initial_monthly_income: dec!(20_000),
                annual_growth_pct: dec!(5),
                years: 2,
            },
        )
        .unwrap();

    let year_two = incomes.yearly_summary("meera", 2).unwrap();
    assert_eq!(year_two.total_monthly_income, dec!(76_000));
    assert_eq!(incomes.income_for_year("meera", salary.id, 3).unwrap().annual_income, dec!(726_000));
    assert_eq!(incomes.fastest_growing("meera", 1).unwrap()[0].name, "Salary");
    assert_eq!(incomes.summary("arjun").unwrap().total_income_sources, 0);
}

#[test]
fn test_invalid_option_update_keeps_stored_record() {
    let options = InstrumentService::new(
        Arc::new(InMemoryStore::<InvestmentOption>::new()),
        identities(),
        Arc::new(SystemClock),
    );
    let gilt = InvestmentOption {
        name: "Gilt fund".into(),
        category: InvestmentCategory::FixedIncome,
        min_cagr_pct: dec!(6),
        max_cagr_pct: dec!(8),
        risk_level: RiskLevel::Low,
        liquidity: Liquidity::High,
        tax_efficiency: None,
        notes: None,
    };
    let stored = options.create("arjun", gilt.clone()).unwrap();

    let broken = InvestmentOption {
        min_cagr_pct: dec!(9),
        ..gilt
    };
    assert!(options.update("arjun", stored.id, broken).is_err());
    assert_eq!(options.get("arjun", stored.id).unwrap(), stored);
    assert_eq!(options.summary("arjun").unwrap().average_cagr_pct, dec!(7));
}

#[test]
fn test_option_lookups_by_category_risk_and_liquidity() {
    let options = InstrumentService::new(
        Arc::new(InMemoryStore::<InvestmentOption>::new()),
        identities(),
        Arc::new(SystemClock),
    );
    let option = |name: &str, category, risk_level, liquidity| InvestmentOption {
        name: name.into(),
        category,
        min_cagr_pct: dec!(6),
        max_cagr_pct: dec!(12),
        risk_level,
        liquidity,
        tax_efficiency: None,
        notes: None,
    };
    options
        .create("meera", option("Index fund", InvestmentCategory::Equity, RiskLevel::High, Liquidity::High))
        .unwrap();
    options
        .create("meera", option("Bond ladder", InvestmentCategory::FixedIncome, RiskLevel::Low, Liquidity::Medium))
        .unwrap();
    options
        .create("meera", option("Small caps", InvestmentCategory::Equity, RiskLevel::VeryHigh, Liquidity::Medium))
        .unwrap();
    options
        .create("arjun", option("Sector fund", InvestmentCategory::Equity, RiskLevel::High, Liquidity::High))
        .unwrap();

    let names = |found: Vec<InvestmentOption>| found.into_iter().map(|o| o.name).collect::<Vec<_>>();
    assert_eq!(
        names(options.by_category("meera", InvestmentCategory::Equity).unwrap()),
        vec!["Index fund", "Small caps"]
    );
    assert_eq!(names(options.by_risk_level("meera", RiskLevel::Low).unwrap()), vec!["Bond ladder"]);
    assert_eq!(
        names(options.by_liquidity("meera", Liquidity::Medium).unwrap()),
        vec!["Bond ladder", "Small caps"]
    );
    assert!(options.by_category("meera", InvestmentCategory::Alternative).unwrap().is_empty());
}
