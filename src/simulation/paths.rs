//! Multi-asset path simulation with recurring contributions.
//!
//! Each path walks every day of the horizon. On a day, scheduled
//! contributions are converted into shares first, priced at the previous
//! day's simulated close, and only then is the day's price drawn for every
//! asset. Portfolio value is recorded on checkpoint days only.

use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::gbm::GbmStep;
use crate::core::config::{ExecutionMode, SimulationParameters};
use crate::core::error::{GrowthError, Result};
use crate::core::rng::{rng_from_seed, standard_normal, SimRng};
use crate::core::types::{DcaEntry, Position};

/// Target number of checkpoint intervals across the horizon.
pub const TARGET_CHECKPOINTS: usize = 50;

/// Simulated portfolio values on checkpoint days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathResult {
    /// One row per path, one column per checkpoint.
    pub values: Vec<Vec<f64>>,
    /// Checkpoint day indices, strictly increasing from 0 to the horizon.
    pub time_points: Vec<usize>,
}

impl PathResult {
    /// Number of simulated paths.
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.values.len()
    }

    /// Check that every row has one value per checkpoint.
    pub fn validate_shape(&self) -> Result<()> {
        let width = self.time_points.len();
        match self.values.iter().find(|row| row.len() != width) {
            Some(row) => Err(GrowthError::length_mismatch(width, row.len())),
            None => Ok(()),
        }
    }

    /// Values of every path at checkpoint `index`.
    ///
    /// # Panics
    ///
    /// Panics if a row is shorter than `index + 1`; see [`Self::validate_shape`].
    pub fn column(&self, index: usize) -> Vec<f64> {
        self.values.iter().map(|row| row[index]).collect()
    }

    /// Values of every path on the last checkpoint.
    pub fn final_values(&self) -> Vec<f64> {
        match self.time_points.len() {
            0 => Vec::new(),
            n => self.column(n - 1),
        }
    }
}

/// Checkpoint days for a horizon.
///
/// Days are sampled every `ceil(days / 50)` (at least 1) and the horizon is
/// appended when the interval misses it. The sequence starts at 0, ends at
/// `days` and never has more than 51 entries.
pub fn checkpoint_days(days: usize) -> Vec<usize> {
    let interval = checkpoint_interval(days);
    let mut points: Vec<usize> = (0..=days).step_by(interval).collect();
    if points.last() != Some(&days) {
        points.push(days);
    }
    points
}

/// Sampling interval between checkpoints.
#[inline]
pub fn checkpoint_interval(days: usize) -> usize {
    ((days + TARGET_CHECKPOINTS - 1) / TARGET_CHECKPOINTS).max(1)
}

/// Per-asset constants shared by every path.
#[derive(Debug, Clone)]
struct AssetPlan {
    start_price: f64,
    start_shares: f64,
    step: GbmStep,
}

/// Everything a single path needs, precomputed once per call.
#[derive(Debug, Clone)]
struct PathPlan {
    assets: Vec<AssetPlan>,
    /// Contributions resolved to asset indices, in ticker order.
    contributions: Vec<(usize, DcaEntry)>,
    initial_value: f64,
    days: usize,
    time_points: Vec<usize>,
}

impl PathPlan {
    fn new(positions: &[Position], params: &SimulationParameters) -> Self {
        let assets = positions
            .iter()
            .map(|pos| AssetPlan {
                start_price: pos.current_price,
                start_shares: pos.shares(),
                step: GbmStep::new(pos.mu(), params.sigma),
            })
            .collect();

        let contributions = params
            .dca_schedule
            .iter()
            .filter_map(|(ticker, entry)| {
                match positions.iter().position(|p| p.ticker == ticker) {
                    Some(idx) => Some((idx, *entry)),
                    None => {
                        debug!(ticker, "ignoring DCA entry for ticker not in portfolio");
                        None
                    }
                }
            })
            .collect();

        Self {
            assets,
            contributions,
            initial_value: positions.iter().map(|p| p.value).sum(),
            days: params.days,
            time_points: checkpoint_days(params.days),
        }
    }

    /// Run one path, drawing from `rng`, and return its checkpoint values.
    fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.time_points.len());
        row.push(self.initial_value);

        let mut cumulative_log_returns = vec![0.0_f64; self.assets.len()];
        let mut shares: Vec<f64> = self.assets.iter().map(|a| a.start_shares).collect();
        let mut next_checkpoint = 1;

        for day in 1..=self.days {
            for &(idx, entry) in &self.contributions {
                if entry.is_due(day) {
                    // Priced at yesterday's close.
                    let price = self.assets[idx].start_price * cumulative_log_returns[idx].exp();
                    if price > 0.0 {
                        shares[idx] += entry.amount / price;
                    }
                }
            }

            let mut total_value = 0.0;
            for (idx, asset) in self.assets.iter().enumerate() {
                cumulative_log_returns[idx] += asset.step.log_return(standard_normal(rng));
                let price = asset.start_price * cumulative_log_returns[idx].exp();
                total_value += shares[idx] * price;
            }

            if self.time_points.get(next_checkpoint) == Some(&day) {
                row.push(total_value);
                next_checkpoint += 1;
            }
        }

        row
    }
}

/// Simulate portfolio value paths drawing from a caller-supplied generator.
///
/// In [`ExecutionMode::Sequential`] every draw comes from `rng` in path order.
/// In [`ExecutionMode::Parallel`] `rng` only seeds one generator per path.
pub fn simulate_portfolio_paths<R: Rng + ?Sized>(
    rng: &mut R,
    positions: &[Position],
    params: &SimulationParameters,
) -> Result<PathResult> {
    params.validate()?;
    Ok(run_paths(rng, positions, params))
}

/// Seeded convenience wrapper around [`simulate_portfolio_paths`].
pub fn simulate_portfolio_growth(
    positions: &[Position],
    params: &SimulationParameters,
) -> Result<PathResult> {
    let mut rng = rng_from_seed(params.random_seed);
    simulate_portfolio_paths(&mut rng, positions, params)
}

/// Path simulation for already validated parameters.
pub(crate) fn run_paths<R: Rng + ?Sized>(
    rng: &mut R,
    positions: &[Position],
    params: &SimulationParameters,
) -> PathResult {
    let plan = PathPlan::new(positions, params);

    debug!(
        n_sims = params.n_sims,
        days = params.days,
        assets = plan.assets.len(),
        contributions = plan.contributions.len(),
        checkpoints = plan.time_points.len(),
        execution = ?params.execution,
        "simulating portfolio paths"
    );

    let values = match params.execution {
        ExecutionMode::Sequential => (0..params.n_sims).map(|_| plan.run(&mut *rng)).collect(),
        ExecutionMode::Parallel => {
            let path_seeds: Vec<u64> = (0..params.n_sims).map(|_| rng.gen()).collect();
            path_seeds
                .into_par_iter()
                .map(|seed| plan.run(&mut SimRng::seed_from_u64(seed)))
                .collect()
        }
    };

    PathResult {
        values,
        time_points: plan.time_points,
    }
}
