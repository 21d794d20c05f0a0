//! Scenario comparisons and what-if portfolios.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::analysis::{analyse_portfolio, portfolio_summary, PortfolioAnalysis};
use crate::core::config::SimulationParameters;
use crate::core::error::Result;
use crate::core::types::{DcaEntry, DcaSchedule, Position, WatchItem};
use crate::metrics::percentile::ProjectionStats;
use crate::simulation::cache::SimulationCache;
use crate::simulation::paths::PathResult;

/// Named volatility assumption.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilityScenario {
    pub name: &'static str,
    pub sigma: f64,
}

pub const CONSERVATIVE: VolatilityScenario = VolatilityScenario {
    name: "Conservative",
    sigma: 0.10,
};
pub const MODERATE: VolatilityScenario = VolatilityScenario {
    name: "Moderate",
    sigma: 0.15,
};
pub const AGGRESSIVE: VolatilityScenario = VolatilityScenario {
    name: "Aggressive",
    sigma: 0.25,
};

/// Low, medium and high volatility presets.
pub const VOLATILITY_SCENARIOS: [VolatilityScenario; 3] = [CONSERVATIVE, MODERATE, AGGRESSIVE];

/// Horizon of the short-term analysis scenario.
pub const SHORT_TERM_DAYS: usize = 90;
/// Horizon of the long-term analysis scenario.
pub const LONG_TERM_DAYS: usize = 500;

/// Simulated paths and headline statistics for one scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioProjection {
    pub name: String,
    pub sigma: f64,
    pub paths: Arc<PathResult>,
    pub stats: ProjectionStats,
}

/// Run the path simulator under every volatility preset.
///
/// Everything except sigma is taken from `params`; results go through `cache`.
pub fn compare_volatility_scenarios(
    cache: &SimulationCache,
    positions: &[Position],
    params: &SimulationParameters,
) -> Result<Vec<ScenarioProjection>> {
    let initial_value = portfolio_summary(positions).total_value;

    VOLATILITY_SCENARIOS
        .iter()
        .map(|scenario| {
            let scenario_params = params.clone().with_sigma(scenario.sigma);
            let paths = cache.get_or_simulate(positions, &scenario_params)?;
            let stats = ProjectionStats::from_paths(&paths, initial_value)?;
            Ok(ScenarioProjection {
                name: scenario.name.to_string(),
                sigma: scenario.sigma,
                paths,
                stats,
            })
        })
        .collect()
}

/// Portfolio analysis under one named set of parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisScenario {
    pub name: String,
    pub sigma: f64,
    pub days: usize,
    pub analysis: PortfolioAnalysis,
}

/// Analyse the portfolio under the volatility presets and two horizons.
///
/// Horizon scenarios keep the caller's sigma.
pub fn compare_analysis_scenarios(
    positions: &[Position],
    params: &SimulationParameters,
) -> Result<Vec<AnalysisScenario>> {
    let mut variants: Vec<(String, SimulationParameters)> = VOLATILITY_SCENARIOS
        .iter()
        .map(|s| {
            (
                format!("{} (sigma={:.2})", s.name, s.sigma),
                params.clone().with_sigma(s.sigma),
            )
        })
        .collect();
    variants.push((
        format!("Short-term ({} days)", SHORT_TERM_DAYS),
        params.clone().with_days(SHORT_TERM_DAYS),
    ));
    variants.push((
        format!("Long-term ({} days)", LONG_TERM_DAYS),
        params.clone().with_days(LONG_TERM_DAYS),
    ));

    variants
        .into_iter()
        .map(|(name, scenario_params)| {
            let analysis = analyse_portfolio(positions, &scenario_params)?;
            Ok(AnalysisScenario {
                name,
                sigma: scenario_params.sigma,
                days: scenario_params.days,
                analysis,
            })
        })
        .collect()
}

/// How much of a candidate to buy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Allocation {
    /// Cash amount.
    Amount(f64),
    /// Share count at the candidate's current price.
    Shares(f64),
}

impl Allocation {
    /// Cash value of the allocation at `price`.
    pub fn value_at(&self, price: f64) -> f64 {
        match *self {
            Allocation::Amount(amount) => amount,
            Allocation::Shares(shares) => shares * price,
        }
    }
}

/// Historical return assigned to a purchased candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnAssumption {
    /// Longer-horizon return if known, else today's return times 252.
    Watchlist,
    /// Fixed return percentage.
    Manual(f64),
}

impl ReturnAssumption {
    /// Return percentage to use for `item`.
    pub fn return_pct(&self, item: &WatchItem) -> f64 {
        match *self {
            ReturnAssumption::Watchlist => item
                .total_return_pct
                .unwrap_or(item.today_return_pct * 252.0),
            ReturnAssumption::Manual(pct) => pct,
        }
    }
}

/// Editable copy of a portfolio used for what-if projections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhatIfPortfolio {
    positions: Vec<Position>,
    dca_schedule: DcaSchedule,
}

impl WhatIfPortfolio {
    /// Start from existing holdings and contributions.
    pub fn new(positions: Vec<Position>, dca_schedule: DcaSchedule) -> Self {
        Self {
            positions,
            dca_schedule,
        }
    }

    /// Buy a watchlist candidate.
    ///
    /// Buying a ticker already held adds to that position's value at its
    /// existing price and return. An optional contribution replaces any
    /// schedule entry for the ticker.
    pub fn add_from_watchlist(
        &mut self,
        item: &WatchItem,
        allocation: Allocation,
        assumption: ReturnAssumption,
        dca: Option<DcaEntry>,
    ) -> Result<()> {
        if let Some(entry) = &dca {
            entry.validate()?;
        }

        let value = allocation.value_at(item.current_price);
        match self.positions.iter_mut().find(|p| p.ticker == item.ticker) {
            Some(existing) => {
                debug!(ticker = %item.ticker, value, "adding to existing what-if position");
                existing.value += value;
            }
            None => self.positions.push(Position::new(
                item.ticker.clone(),
                value,
                assumption.return_pct(item),
                item.current_price,
            )),
        }

        if let Some(entry) = dca {
            if entry.amount > 0.0 {
                self.dca_schedule.insert(item.ticker.clone(), entry);
            }
        }
        Ok(())
    }

    /// Drop a position and its contributions.
    pub fn remove(&mut self, ticker: &str) -> Option<Position> {
        self.dca_schedule.remove(ticker);
        let idx = self.positions.iter().position(|p| p.ticker == ticker)?;
        Some(self.positions.remove(idx))
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn dca_schedule(&self) -> &DcaSchedule {
        &self.dca_schedule
    }

    /// Current total value.
    pub fn total_value(&self) -> f64 {
        portfolio_summary(&self.positions).total_value
    }
}

/// Original portfolio projected next to a what-if portfolio.
#[derive(Debug, Clone, PartialEq)]
pub struct WhatIfComparison {
    pub original_paths: Arc<PathResult>,
    pub what_if_paths: Arc<PathResult>,
    pub original: ProjectionStats,
    pub what_if: ProjectionStats,
    /// What-if total value minus original total value today.
    pub value_change: f64,
    /// `value_change` relative to the original total, 0 when that is not positive.
    pub value_change_pct: f64,
    /// What-if median final value minus original median final value.
    pub median_difference: f64,
    /// `median_difference` relative to the original median, 0 when that is not positive.
    pub median_difference_pct: f64,
}

/// Project both portfolios with the same sigma, horizon, path count and seed.
///
/// The original uses `params.dca_schedule`; the what-if portfolio uses its own.
pub fn compare_what_if(
    cache: &SimulationCache,
    original_positions: &[Position],
    params: &SimulationParameters,
    what_if: &WhatIfPortfolio,
) -> Result<WhatIfComparison> {
    let what_if_params = params
        .clone()
        .with_dca_schedule(what_if.dca_schedule().clone());

    let original_paths = cache.get_or_simulate(original_positions, params)?;
    let what_if_paths = cache.get_or_simulate(what_if.positions(), &what_if_params)?;

    let original_value = portfolio_summary(original_positions).total_value;
    let what_if_value = what_if.total_value();

    let original = ProjectionStats::from_paths(&original_paths, original_value)?;
    let what_if_stats = ProjectionStats::from_paths(&what_if_paths, what_if_value)?;

    let value_change = what_if_value - original_value;
    let median_difference = what_if_stats.median - original.median;

    Ok(WhatIfComparison {
        original_paths,
        what_if_paths,
        original,
        what_if: what_if_stats,
        value_change,
        value_change_pct: relative_pct(value_change, original_value),
        median_difference,
        median_difference_pct: relative_pct(median_difference, original.median),
    })
}

#[inline]
fn relative_pct(delta: f64, base: f64) -> f64 {
    if base > 0.0 {
        delta / base * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_positions() -> Vec<Position> {
        vec![
            Position::new("AAPL", 1500.0, 12.0, 150.0),
            Position::new("MSFT", 3000.0, 8.0, 300.0),
        ]
    }

    #[test]
    fn test_volatility_scenarios_spread() {
        let cache = SimulationCache::new();
        let params = SimulationParameters::new(0.15, 120, 400).with_seed(21);
        let scenarios = compare_volatility_scenarios(&cache, &sample_positions(), &params).unwrap();

        assert_eq!(scenarios.len(), 3);
        assert_eq!(scenarios[0].sigma, 0.10);
        assert_eq!(scenarios[2].sigma, 0.25);
        let spread = |s: &ScenarioProjection| s.stats.best_case - s.stats.worst_case;
        assert!(spread(&scenarios[0]) < spread(&scenarios[2]));

        // The moderate preset shares its cache entry with the caller's own run.
        assert_eq!(cache.len(), 3);
        let base = cache.get_or_simulate(&sample_positions(), &params).unwrap();
        assert!(Arc::ptr_eq(&base, &scenarios[1].paths));
    }

    #[test]
    fn test_analysis_scenarios() {
        let params = SimulationParameters::new(0.2, 252, 50).with_seed(4);
        let scenarios = compare_analysis_scenarios(&sample_positions(), &params).unwrap();
        assert_eq!(scenarios.len(), 5);
        assert_eq!(scenarios[3].days, SHORT_TERM_DAYS);
        assert_eq!(scenarios[3].sigma, 0.2);
        assert_eq!(scenarios[4].days, LONG_TERM_DAYS);
        assert_eq!(scenarios[1].sigma, 0.15);
    }

    #[test]
    fn test_return_assumption() {
        let item = WatchItem::new("MRK", "Merck", 100.0, 0.1);
        assert!((ReturnAssumption::Watchlist.return_pct(&item) - 25.2).abs() < 1e-9);
        let item = item.with_total_return(7.5);
        assert_eq!(ReturnAssumption::Watchlist.return_pct(&item), 7.5);
        assert_eq!(ReturnAssumption::Manual(3.0).return_pct(&item), 3.0);
    }

    #[test]
    fn test_what_if_merge_and_append() {
        let mut what_if = WhatIfPortfolio::new(sample_positions(), DcaSchedule::new());
        let aapl = WatchItem::new("AAPL", "Apple", 160.0, 1.0);
        let mrk = WatchItem::new("MRK", "Merck", 100.0, 1.0);

        what_if
            .add_from_watchlist(&aapl, Allocation::Amount(500.0), ReturnAssumption::Manual(99.0), None)
            .unwrap();
        what_if
            .add_from_watchlist(
                &mrk,
                Allocation::Shares(5.0),
                ReturnAssumption::Manual(10.0),
                Some(DcaEntry::new(100.0, 30)),
            )
            .unwrap();

        let positions = what_if.positions();
        assert_eq!(positions.len(), 3);
        assert_eq!(positions[0].value, 2000.0);
        assert_eq!(positions[0].current_price, 150.0);
        assert_eq!(positions[0].return_pct, 12.0);
        assert_eq!(positions[2], Position::new("MRK", 500.0, 10.0, 100.0));
        assert_eq!(what_if.dca_schedule().get("MRK"), Some(&DcaEntry::new(100.0, 30)));
        assert_eq!(what_if.total_value(), 5500.0);

        assert!(what_if.remove("MRK").is_some());
        assert!(what_if.dca_schedule().is_empty());
        assert!(what_if.remove("MRK").is_none());
    }

    #[test]
    fn test_what_if_rejects_bad_dca() {
        let mut what_if = WhatIfPortfolio::default();
        let item = WatchItem::new("MRK", "Merck", 100.0, 1.0);
        let err = what_if.add_from_watchlist(
            &item,
            Allocation::Amount(100.0),
            ReturnAssumption::Watchlist,
            Some(DcaEntry::new(100.0, 0)),
        );
        assert!(err.is_err());
        assert!(what_if.positions().is_empty());
    }

    #[test]
    fn test_what_if_comparison_flat_market() {
        let cache = SimulationCache::new();
        let positions = vec![Position::new("A", 1000.0, 0.0, 100.0)];
        let params = SimulationParameters::new(0.0, 60, 3).with_seed(1);

        let mut what_if = WhatIfPortfolio::new(positions.clone(), params.dca_schedule.clone());
        let item = WatchItem::new("B", "B", 50.0, 0.0);
        what_if
            .add_from_watchlist(&item, Allocation::Amount(1000.0), ReturnAssumption::Manual(0.0), None)
            .unwrap();

        let cmp = compare_what_if(&cache, &positions, &params, &what_if).unwrap();
        assert!((cmp.original.median - 1000.0).abs() < 1e-9);
        assert!((cmp.what_if.median - 2000.0).abs() < 1e-9);
        assert!((cmp.value_change - 1000.0).abs() < 1e-12);
        assert!((cmp.value_change_pct - 100.0).abs() < 1e-9);
        assert!((cmp.median_difference - 1000.0).abs() < 1e-9);
        assert!((cmp.median_difference_pct - 100.0).abs() < 1e-6);
        assert_eq!(cache.len(), 2);
    }
}
