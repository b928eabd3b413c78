use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::RatePct;

/// Inflation assumed for a goal when none is given.
pub const DEFAULT_INFLATION_RATE_PCT: Decimal = dec!(6.0);

/// Engine-wide defaults. Every field has a default so partial config files
/// deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Inflation applied to new goals that omit one.
    pub default_inflation_rate_pct: RatePct,
    /// Expected return used for goal planning when the caller gives none.
    pub default_expected_return_pct: RatePct,
    /// Horizon for "upcoming goals", in years.
    pub upcoming_goal_horizon_years: u32,
    /// Row limit for ranked listings (top performers, fastest growing).
    pub ranking_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            default_inflation_rate_pct: DEFAULT_INFLATION_RATE_PCT,
            default_expected_return_pct: dec!(12.0),
            upcoming_goal_horizon_years: 5,
            ranking_limit: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"ranking_limit": 3}"#).unwrap();
        assert_eq!(cfg.ranking_limit, 3);
        assert_eq!(cfg.default_inflation_rate_pct, dec!(6.0));
        assert_eq!(cfg.upcoming_goal_horizon_years, 5);
    }
}
