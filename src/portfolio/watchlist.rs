//! Watchlist ranking and conversion of candidates into positions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::config::SimulationParameters;
use crate::core::error::Result;
use crate::core::rng::rng_from_seed;
use crate::core::types::{Position, Price, WatchItem};
use crate::simulation::terminal::{expected_return_pct, simulate_terminal_prices};

/// Lower bound of the drift inferred from a single day's return.
pub const MIN_WATCHLIST_MU: f64 = -0.05;
/// Upper bound of the drift inferred from a single day's return.
pub const MAX_WATCHLIST_MU: f64 = 0.20;

/// Turn a one-day return percentage into a modest annualized drift.
///
/// The fraction is doubled (not annualized) and clamped to `[-0.05, 0.20]`.
/// A NaN input carries no signal and maps to 0.
pub fn compute_mu_from_today_return(today_return_pct: f64) -> f64 {
    if today_return_pct.is_nan() {
        return 0.0;
    }
    ((today_return_pct / 100.0) * 2.0).clamp(MIN_WATCHLIST_MU, MAX_WATCHLIST_MU)
}

/// Predicted outcome for one watchlist candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistRanking {
    pub ticker: String,
    pub expected_return_pct: f64,
    pub expected_price: Price,
}

/// Simulate every candidate and rank by expected return, best first.
///
/// Each candidate replays the seed from the start. Ties keep input order.
pub fn analyse_watchlist(watchlist: &[WatchItem], params: &SimulationParameters) -> Result<Vec<WatchlistRanking>> {
    params.validate_terminal()?;

    let mut results = watchlist
        .iter()
        .map(|item| {
            let mu = compute_mu_from_today_return(item.today_return_pct);
            let mut rng = rng_from_seed(params.random_seed);
            let prices = simulate_terminal_prices(
                &mut rng,
                item.current_price,
                mu,
                params.sigma,
                params.days,
                params.n_sims,
            )?;
            let expected_price = prices.iter().sum::<f64>() / prices.len() as f64;
            Ok(WatchlistRanking {
                ticker: item.ticker.clone(),
                expected_return_pct: expected_return_pct(expected_price, item.current_price),
                expected_price,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    results.sort_by(|a, b| b.expected_return_pct.total_cmp(&a.expected_return_pct));
    Ok(results)
}

/// Index watchlist items by ticker. Later duplicates win.
pub fn watchlist_map(watchlist: &[WatchItem]) -> HashMap<String, WatchItem> {
    watchlist
        .iter()
        .map(|item| (item.ticker.clone(), item.clone()))
        .collect()
}

/// Append a position worth `allocation_value` for every requested ticker
/// found on the watchlist.
///
/// New positions start with a 0% historical return. Unknown tickers are
/// skipped.
pub fn add_positions<S: AsRef<str>>(
    current_positions: &[Position],
    watchlist_map: &HashMap<String, WatchItem>,
    tickers_to_add: &[S],
    allocation_value: f64,
) -> Vec<Position> {
    let mut positions = current_positions.to_vec();
    for ticker in tickers_to_add {
        match watchlist_map.get(ticker.as_ref()) {
            Some(item) => positions.push(item.to_position(allocation_value)),
            None => debug!(ticker = ticker.as_ref(), "skipping ticker not on watchlist"),
        }
    }
    positions
}
