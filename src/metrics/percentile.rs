//! Percentile reduction of simulated outcomes.
//!
//! Percentiles use linear interpolation between the two nearest ranks, so the
//! 50th percentile is the usual median and every band is monotone in rank.

use serde::{Deserialize, Serialize};

use crate::core::error::{GrowthError, Result};
use crate::simulation::paths::PathResult;

/// Percentile of an ascending slice, `pct` in `[0, 100]`.
///
/// The slice must be non-empty.
pub fn percentile_sorted(sorted: &[f64], pct: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let t = rank - lo as f64;
    lerp(sorted[lo], sorted[hi], t)
}

/// Percentile of unsorted values.
pub fn percentile(values: &[f64], pct: f64) -> Result<f64> {
    if values.is_empty() {
        return Err(GrowthError::empty_data("percentile"));
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Ok(percentile_sorted(&sorted, pct))
}

/// Median of unsorted values.
pub fn median(values: &[f64]) -> Result<f64> {
    percentile(values, 50.0)
}

// Interpolate from whichever end is closer so results stay within [a, b].
#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let diff = b - a;
    if t >= 0.5 {
        b - diff * (1.0 - t)
    } else {
        a + diff * t
    }
}

/// Outcome range at one checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileBand {
    /// Checkpoint day.
    pub day: usize,
    pub p5: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
}

/// Reduce a path table to one percentile band per checkpoint.
pub fn percentile_bands(result: &PathResult) -> Result<Vec<PercentileBand>> {
    if result.values.is_empty() {
        return Err(GrowthError::empty_data("percentile bands"));
    }

    result.validate_shape()?;

    let bands = result
        .time_points
        .iter()
        .enumerate()
        .map(|(idx, &day)| {
            let mut column = result.column(idx);
            column.sort_by(|a, b| a.total_cmp(b));
            PercentileBand {
                day,
                p5: percentile_sorted(&column, 5.0),
                p25: percentile_sorted(&column, 25.0),
                p50: percentile_sorted(&column, 50.0),
                p75: percentile_sorted(&column, 75.0),
                p95: percentile_sorted(&column, 95.0),
            }
        })
        .collect();

    Ok(bands)
}

/// Headline statistics of simulated final values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionStats {
    /// Starting portfolio value the projection is measured against.
    pub initial_value: f64,
    /// Median final value (expected outcome).
    pub median: f64,
    /// 95th percentile final value (best case).
    pub best_case: f64,
    /// 5th percentile final value (worst case).
    pub worst_case: f64,
    /// Median return over the horizon in percent, 0 when the start is not positive.
    pub expected_return_pct: f64,
    /// Fraction of paths ending below the starting value.
    pub probability_of_loss: f64,
}

impl ProjectionStats {
    /// Compute statistics from final values.
    pub fn from_final_values(final_values: &[f64], initial_value: f64) -> Result<Self> {
        if final_values.is_empty() {
            return Err(GrowthError::empty_data("projection statistics"));
        }

        let mut sorted = final_values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let median = percentile_sorted(&sorted, 50.0);
        let expected_return_pct = if initial_value > 0.0 {
            (median / initial_value - 1.0) * 100.0
        } else {
            0.0
        };
        let losses = sorted.iter().filter(|&&v| v < initial_value).count();

        Ok(Self {
            initial_value,
            median,
            best_case: percentile_sorted(&sorted, 95.0),
            worst_case: percentile_sorted(&sorted, 5.0),
            expected_return_pct,
            probability_of_loss: losses as f64 / sorted.len() as f64,
        })
    }

    /// Compute statistics from the last checkpoint of a path table.
    pub fn from_paths(result: &PathResult, initial_value: f64) -> Result<Self> {
        result.validate_shape()?;
        Self::from_final_values(&result.final_values(), initial_value)
    }
}
