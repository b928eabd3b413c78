//! Investment options a user is considering, described by a CAGR range,
//! risk and liquidity. No projections; only ranking and roll-ups.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::aggregate;
use crate::error::{ensure_non_negative, FinTrackError};
use crate::time_value::round_money;
use crate::types::RatePct;
use crate::FinTrackResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InvestmentCategory {
    Equity,
    FixedIncome,
    RealEstate,
    Commodities,
    Alternative,
}

/// Ordered from safest to riskiest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

/// Ordered from most to least liquid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Liquidity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentOption {
    pub name: String,
    pub category: InvestmentCategory,
    pub min_cagr_pct: RatePct,
    pub max_cagr_pct: RatePct,
    pub risk_level: RiskLevel,
    pub liquidity: Liquidity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_efficiency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Investor preferences for [`recommend`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationCriteria {
    /// Highest acceptable risk.
    pub max_risk: RiskLevel,
    /// Liquidity floor by ordinal; options at this level or further down
    /// the `High..Low` ordering qualify.
    pub liquidity: Liquidity,
    pub min_expected_cagr_pct: RatePct,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub name: String,
    pub category: InvestmentCategory,
    pub average_cagr_pct: RatePct,
    pub risk_level: RiskLevel,
    pub liquidity: Liquidity,
    pub match_score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentOptionSummary {
    pub total_options: usize,
    pub average_cagr_pct: RatePct,
    pub category_distribution: BTreeMap<InvestmentCategory, usize>,
    pub risk_distribution: BTreeMap<RiskLevel, usize>,
    pub liquidity_distribution: BTreeMap<Liquidity, usize>,
}

impl InvestmentOption {
    pub fn validate(&self) -> FinTrackResult<()> {
        ensure_non_negative("min_cagr_pct", self.min_cagr_pct)?;
        ensure_non_negative("max_cagr_pct", self.max_cagr_pct)?;
        if self.min_cagr_pct > self.max_cagr_pct {
            return Err(FinTrackError::invalid(
                "min_cagr_pct",
                "min_cagr_pct must be <= max_cagr_pct",
            ));
        }
        Ok(())
    }

    /// Midpoint of the CAGR range.
    pub fn average_cagr(&self) -> RatePct {
        (self.min_cagr_pct + self.max_cagr_pct) / dec!(2)
    }
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Options carry no derived fields; recomputing only validates.
pub fn recompute_option(option: InvestmentOption) -> FinTrackResult<InvestmentOption> {
    option.validate()?;
    Ok(option)
}

/// Options whose whole CAGR range lies inside `min_pct..=max_pct`.
pub fn filter_by_cagr_range(
    options: &[InvestmentOption],
    min_pct: RatePct,
    max_pct: RatePct,
) -> Vec<&InvestmentOption> {
    options
        .iter()
        .filter(|o| o.min_cagr_pct >= min_pct && o.max_cagr_pct <= max_pct)
        .collect()
}

pub fn options_in_category(options: &[InvestmentOption], category: InvestmentCategory) -> Vec<&InvestmentOption> {
    options.iter().filter(|o| o.category == category).collect()
}

pub fn options_with_risk(options: &[InvestmentOption], risk: RiskLevel) -> Vec<&InvestmentOption> {
    options.iter().filter(|o| o.risk_level == risk).collect()
}

pub fn options_with_liquidity(options: &[InvestmentOption], liquidity: Liquidity) -> Vec<&InvestmentOption> {
    options.iter().filter(|o| o.liquidity == liquidity).collect()
}

/// Options matching the criteria, best average CAGR first.
pub fn recommend(options: &[InvestmentOption], criteria: &RecommendationCriteria) -> Vec<Recommendation> {
    let mut matching: Vec<&InvestmentOption> = options
        .iter()
        .filter(|o| o.risk_level <= criteria.max_risk)
        .filter(|o| o.liquidity >= criteria.liquidity)
        .filter(|o| o.average_cagr() >= criteria.min_expected_cagr_pct)
        .collect();
    matching.sort_by(|a, b| b.average_cagr().cmp(&a.average_cagr()));

    matching
        .into_iter()
        .map(|o| Recommendation {
            name: o.name.clone(),
            category: o.category,
            average_cagr_pct: round_money(o.average_cagr()),
            risk_level: o.risk_level,
            liquidity: o.liquidity,
            match_score: match_score(o, criteria),
        })
        .collect()
}

/// Lower risk earns 10 per step, extra liquidity 5 per step, and every
/// 0.05 points of CAGR above the floor earns 1.
fn match_score(option: &InvestmentOption, criteria: &RecommendationCriteria) -> i64 {
    let mut score = 0i64;

    if option.risk_level <= criteria.max_risk {
        score += (criteria.max_risk as i64 - option.risk_level as i64) * 10;
    }
    if option.liquidity >= criteria.liquidity {
        score += (option.liquidity as i64 - criteria.liquidity as i64) * 5;
    }
    let excess = option.average_cagr() - criteria.min_expected_cagr_pct;
    if excess >= Decimal::ZERO {
        score += (excess * dec!(20)).trunc().to_i64().unwrap_or(i64::MAX);
    }

    score
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

pub fn summarize_options(options: &[InvestmentOption]) -> InvestmentOptionSummary {
    InvestmentOptionSummary {
        total_options: options.len(),
        average_cagr_pct: round_money(aggregate::average_by(options, InvestmentOption::average_cagr)),
        category_distribution: aggregate::count_by(options, |o| o.category),
        risk_distribution: aggregate::count_by(options, |o| o.risk_level),
        liquidity_distribution: aggregate::count_by(options, |o| o.liquidity),
    }
}
