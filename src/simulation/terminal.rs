//! Single-asset terminal price simulation.
//!
//! Every path sums `days` independent daily log-returns and exponentiates
//! once, which reproduces the discretized GBM terminal distribution for a
//! constant drift and volatility.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::gbm::GbmStep;
use crate::core::config::{validate_n_sims, validate_sigma};
use crate::core::error::{GrowthError, Result};
use crate::core::rng::{rng_from_seed, standard_normal};
use crate::core::types::Price;
use crate::metrics::percentile::percentile_sorted;

/// Simulate `n_sims` terminal prices after `days` trading days.
///
/// Draws are consumed path by path, day by day, from `rng`.
pub fn simulate_terminal_prices<R: Rng + ?Sized>(
    rng: &mut R,
    current_price: Price,
    mu: f64,
    sigma: f64,
    days: usize,
    n_sims: usize,
) -> Result<Vec<Price>> {
    validate_sigma(sigma)?;
    validate_n_sims(n_sims)?;
    if !mu.is_finite() {
        return Err(GrowthError::invalid_parameter(format!(
            "mu must be finite, got {}",
            mu
        )));
    }

    debug!(current_price, mu, sigma, days, n_sims, "simulating terminal prices");

    let step = GbmStep::new(mu, sigma);
    let mut prices = Vec::with_capacity(n_sims);
    for _ in 0..n_sims {
        let mut log_return = 0.0;
        for _ in 0..days {
            log_return += step.log_return(standard_normal(rng));
        }
        prices.push(current_price * log_return.exp());
    }

    Ok(prices)
}

/// Seeded convenience wrapper around [`simulate_terminal_prices`].
///
/// A fresh generator is built for every call, so the same seed always
/// replays the same stream regardless of what ran before.
pub fn simulate_gbm_price(
    current_price: Price,
    mu: f64,
    sigma: f64,
    days: usize,
    n_sims: usize,
    random_seed: Option<u64>,
) -> Result<Vec<Price>> {
    let mut rng = rng_from_seed(random_seed);
    simulate_terminal_prices(&mut rng, current_price, mu, sigma, days, n_sims)
}

/// Distribution summary of simulated terminal prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerminalSummary {
    /// Arithmetic mean of the simulated prices.
    pub expected_price: Price,
    /// Mean price relative to the start, in percent. 0 when the start price is not positive.
    pub expected_return_pct: f64,
    /// 5th percentile price.
    pub p5: Price,
    /// 95th percentile price.
    pub p95: Price,
}

impl TerminalSummary {
    /// Summarize simulated prices against the starting price.
    pub fn from_prices(prices: &[Price], current_price: Price) -> Result<Self> {
        if prices.is_empty() {
            return Err(GrowthError::empty_data("terminal price summary"));
        }

        let expected_price = prices.iter().sum::<f64>() / prices.len() as f64;
        let expected_return_pct = expected_return_pct(expected_price, current_price);

        let mut sorted = prices.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Ok(Self {
            expected_price,
            expected_return_pct,
            p5: percentile_sorted(&sorted, 5.0),
            p95: percentile_sorted(&sorted, 95.0),
        })
    }
}

/// `(expected / current - 1) * 100`, guarded against a non-positive start price.
#[inline]
pub fn expected_return_pct(expected_price: Price, current_price: Price) -> f64 {
    if current_price > 0.0 {
        (expected_price / current_price - 1.0) * 100.0
    } else {
        0.0
    }
}
