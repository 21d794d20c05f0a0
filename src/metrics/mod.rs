//! Outcome statistics for simulated portfolios.

pub mod percentile;

pub use percentile::{median, percentile, percentile_bands, PercentileBand, ProjectionStats};
