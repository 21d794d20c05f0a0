// Suppress warning from PyO3 macro expansion (fixed in newer PyO3 versions)
#![cfg_attr(feature = "python", allow(non_local_definitions))]

//! GrowthCast - Monte Carlo growth projection for stock portfolios.
//!
//! This crate provides:
//! - Geometric Brownian motion price simulation
//! - Portfolio path simulation with dollar-cost averaging
//! - Percentile bands and projection statistics
//! - Portfolio analysis, watchlist ranking and what-if comparison
//! - A thread-safe simulation cache

pub mod core;
pub mod metrics;
pub mod portfolio;
#[cfg(feature = "python")]
pub mod python;
pub mod simulation;

pub use crate::core::{
    DcaEntry, DcaSchedule, ExecutionMode, GrowthError, PortfolioSummary, Position, Result,
    SimulationParameters, WatchItem,
};
pub use crate::metrics::{percentile_bands, PercentileBand, ProjectionStats};
pub use crate::simulation::{
    simulate_gbm_price, simulate_portfolio_growth, PathResult, SimulationCache,
};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module entry point
#[cfg(feature = "python")]
#[pymodule]
fn _growthcast(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    use python::bindings;

    // Register input classes
    m.add_class::<bindings::PyPosition>()?;
    m.add_class::<bindings::PyWatchItem>()?;
    m.add_class::<bindings::PySimulationConfig>()?;

    // Register result classes
    m.add_class::<bindings::PyPathResult>()?;
    m.add_class::<bindings::PySimulationCache>()?;

    // Register simulation functions
    m.add_function(wrap_pyfunction!(bindings::simulate_gbm_price, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::summarize_terminal_prices, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::simulate_portfolio_growth, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::percentile_bands, m)?)?;

    // Register portfolio functions
    m.add_function(wrap_pyfunction!(bindings::portfolio_summary, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::predict_position, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::position_terminal_summary, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::analyse_portfolio, m)?)?;

    // Register watchlist functions
    m.add_function(wrap_pyfunction!(bindings::compute_mu_from_today_return, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::analyse_watchlist, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::add_positions, m)?)?;

    Ok(())
}
