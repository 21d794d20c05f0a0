//! PyO3 function bindings for GrowthCast.

use std::sync::Arc;

use numpy::{PyArray1, PyArray2, PyReadonlyArray1, PyReadonlyArray2};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::core::config::{
    ExecutionMode, SimulationParameters, DEFAULT_DAYS, DEFAULT_N_SIMS, DEFAULT_SIGMA,
};
use crate::core::types::{DcaEntry, DcaSchedule, Position, WatchItem};
use crate::metrics::percentile::{percentile_bands as reduce_bands, PercentileBand, ProjectionStats};
use crate::portfolio::analysis::{self, PortfolioAnalysis};
use crate::portfolio::watchlist;
use crate::simulation::cache::SimulationCache;
use crate::simulation::paths::{self, PathResult};
use crate::simulation::terminal::{self, TerminalSummary};

use super::numpy_bridge::*;

// ============================================================================
// Input Classes
// ============================================================================

/// Python-exposed portfolio holding.
#[pyclass(name = "Position")]
#[derive(Debug, Clone)]
pub struct PyPosition {
    #[pyo3(get, set)]
    pub ticker: String,
    #[pyo3(get, set)]
    pub value: f64,
    #[pyo3(get, set)]
    pub return_pct: f64,
    #[pyo3(get, set)]
    pub current_price: f64,
}

#[pymethods]
impl PyPosition {
    #[new]
    fn new(ticker: String, value: f64, return_pct: f64, current_price: f64) -> Self {
        Self {
            ticker,
            value,
            return_pct,
            current_price,
        }
    }

    /// Shares derived from value and price.
    #[getter]
    fn shares(&self) -> f64 {
        Position::from(self).shares()
    }

    fn __repr__(&self) -> String {
        format!(
            "Position(ticker={}, value={:.2}, return={:.2}%, price={:.2})",
            self.ticker, self.value, self.return_pct, self.current_price
        )
    }
}

impl From<&PyPosition> for Position {
    fn from(p: &PyPosition) -> Self {
        Position::new(p.ticker.clone(), p.value, p.return_pct, p.current_price)
    }
}

impl From<Position> for PyPosition {
    fn from(p: Position) -> Self {
        Self {
            ticker: p.ticker,
            value: p.value,
            return_pct: p.return_pct,
            current_price: p.current_price,
        }
    }
}

/// Python-exposed watchlist entry.
#[pyclass(name = "WatchItem")]
#[derive(Debug, Clone)]
pub struct PyWatchItem {
    #[pyo3(get, set)]
    pub ticker: String,
    #[pyo3(get, set)]
    pub name: String,
    #[pyo3(get, set)]
    pub current_price: f64,
    #[pyo3(get, set)]
    pub today_return_pct: f64,
    #[pyo3(get, set)]
    pub total_return_pct: Option<f64>,
}

#[pymethods]
impl PyWatchItem {
    #[new]
    #[pyo3(signature = (ticker, name, current_price, today_return_pct, total_return_pct=None))]
    fn new(
        ticker: String,
        name: String,
        current_price: f64,
        today_return_pct: f64,
        total_return_pct: Option<f64>,
    ) -> Self {
        Self {
            ticker,
            name,
            current_price,
            today_return_pct,
            total_return_pct,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "WatchItem(ticker={}, price={:.2}, today={:.2}%)",
            self.ticker, self.current_price, self.today_return_pct
        )
    }
}

impl From<&PyWatchItem> for WatchItem {
    fn from(w: &PyWatchItem) -> Self {
        WatchItem {
            ticker: w.ticker.clone(),
            name: w.name.clone(),
            current_price: w.current_price,
            today_return_pct: w.today_return_pct,
            total_return_pct: w.total_return_pct,
        }
    }
}

/// Python-exposed simulation configuration.
#[pyclass(name = "SimulationConfig")]
#[derive(Debug, Clone)]
pub struct PySimulationConfig {
    #[pyo3(get, set)]
    pub sigma: f64,
    #[pyo3(get, set)]
    pub days: usize,
    #[pyo3(get, set)]
    pub n_sims: usize,
    #[pyo3(get, set)]
    pub random_seed: Option<u64>,
    #[pyo3(get, set)]
    pub parallel: bool,
    dca: DcaSchedule,
}

#[pymethods]
impl PySimulationConfig {
    #[new]
    #[pyo3(signature = (sigma=DEFAULT_SIGMA, days=DEFAULT_DAYS, n_sims=DEFAULT_N_SIMS, random_seed=None, parallel=false))]
    fn new(sigma: f64, days: usize, n_sims: usize, random_seed: Option<u64>, parallel: bool) -> Self {
        Self {
            sigma,
            days,
            n_sims,
            random_seed,
            parallel,
            dca: DcaSchedule::new(),
        }
    }

    /// Schedule a recurring contribution for a ticker.
    fn set_dca(&mut self, ticker: String, amount: f64, frequency_days: usize) -> PyResult<()> {
        let entry = DcaEntry::new(amount, frequency_days);
        entry.validate()?;
        self.dca.insert(ticker, entry);
        Ok(())
    }

    /// Remove a ticker's recurring contribution.
    fn remove_dca(&mut self, ticker: &str) {
        self.dca.remove(ticker);
    }

    fn __repr__(&self) -> String {
        format!(
            "SimulationConfig(sigma={:.3}, days={}, n_sims={}, seed={:?}, dca={})",
            self.sigma,
            self.days,
            self.n_sims,
            self.random_seed,
            self.dca.len()
        )
    }
}

impl From<&PySimulationConfig> for SimulationParameters {
    fn from(py_config: &PySimulationConfig) -> Self {
        SimulationParameters {
            sigma: py_config.sigma,
            days: py_config.days,
            n_sims: py_config.n_sims,
            random_seed: py_config.random_seed,
            dca_schedule: py_config.dca.clone(),
            execution: if py_config.parallel {
                ExecutionMode::Parallel
            } else {
                ExecutionMode::Sequential
            },
        }
    }
}

fn params_from(config: Option<&PySimulationConfig>) -> SimulationParameters {
    config.map(SimulationParameters::from).unwrap_or_default()
}

fn positions_from(positions: &[PyPosition]) -> Vec<Position> {
    positions.iter().map(Position::from).collect()
}

// ============================================================================
// Result Classes
// ============================================================================

/// Python-exposed path simulation output.
#[pyclass(name = "PathResult")]
#[derive(Debug, Clone)]
pub struct PyPathResult {
    inner: Arc<PathResult>,
}

#[pymethods]
impl PyPathResult {
    /// Simulated values as an (n_sims, n_checkpoints) array.
    fn values<'py>(&self, py: Python<'py>) -> PyResult<&'py PyArray2<f64>> {
        table_to_numpy_f64(py, &self.inner.values)
    }

    /// Checkpoint day indices.
    fn time_points<'py>(&self, py: Python<'py>) -> &'py PyArray1<i64> {
        days_to_numpy(py, &self.inner.time_points)
    }

    /// Values on the last checkpoint.
    fn final_values<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        vec_to_numpy_f64(py, self.inner.final_values())
    }

    /// 5/25/50/75/95 percentile bands as a dict of arrays.
    fn percentile_bands(&self, py: Python) -> PyResult<PyObject> {
        bands_to_dict(py, &self.inner)
    }

    /// Median, best/worst case and loss probability against `initial_value`.
    fn stats(&self, py: Python, initial_value: f64) -> PyResult<PyObject> {
        let stats = ProjectionStats::from_paths(&self.inner, initial_value)?;
        let dict = PyDict::new(py);
        dict.set_item("initial_value", stats.initial_value)?;
        dict.set_item("median", stats.median)?;
        dict.set_item("best_case", stats.best_case)?;
        dict.set_item("worst_case", stats.worst_case)?;
        dict.set_item("expected_return_pct", stats.expected_return_pct)?;
        dict.set_item("probability_of_loss", stats.probability_of_loss)?;
        Ok(dict.into())
    }

    fn __repr__(&self) -> String {
        format!(
            "PathResult(paths={}, checkpoints={})",
            self.inner.n_paths(),
            self.inner.time_points.len()
        )
    }
}

/// Python-exposed simulation cache.
///
/// Lives as long as the Python object holding it.
#[pyclass(name = "SimulationCache")]
#[derive(Debug, Clone, Default)]
pub struct PySimulationCache {
    inner: Arc<SimulationCache>,
}

#[pymethods]
impl PySimulationCache {
    #[new]
    fn new() -> Self {
        Self::default()
    }

    /// Simulate portfolio paths, reusing a stored result for identical inputs.
    #[pyo3(signature = (positions, config=None))]
    fn simulate(
        &self,
        py: Python<'_>,
        positions: Vec<PyPosition>,
        config: Option<&PySimulationConfig>,
    ) -> PyResult<PyPathResult> {
        let positions = positions_from(&positions);
        let params = params_from(config);
        let cache = Arc::clone(&self.inner);
        let inner = py.allow_threads(move || cache.get_or_simulate(&positions, &params))?;
        Ok(PyPathResult { inner })
    }

    #[getter]
    fn hits(&self) -> u64 {
        self.inner.hits()
    }

    #[getter]
    fn misses(&self) -> u64 {
        self.inner.misses()
    }

    fn clear(&self) {
        self.inner.clear();
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }
}

fn bands_to_dict(py: Python, result: &PathResult) -> PyResult<PyObject> {
    let bands = reduce_bands(result)?;
    let column = |f: fn(&PercentileBand) -> f64| -> Vec<f64> {
        bands.iter().map(f).collect()
    };

    let dict = PyDict::new(py);
    dict.set_item("time_points", days_to_numpy(py, &result.time_points))?;
    dict.set_item("p5", vec_to_numpy_f64(py, column(|b| b.p5)))?;
    dict.set_item("p25", vec_to_numpy_f64(py, column(|b| b.p25)))?;
    dict.set_item("p50", vec_to_numpy_f64(py, column(|b| b.p50)))?;
    dict.set_item("p75", vec_to_numpy_f64(py, column(|b| b.p75)))?;
    dict.set_item("p95", vec_to_numpy_f64(py, column(|b| b.p95)))?;
    Ok(dict.into())
}

fn terminal_summary_to_dict(py: Python, summary: &TerminalSummary) -> PyResult<PyObject> {
    let dict = PyDict::new(py);
    dict.set_item("expected_price", summary.expected_price)?;
    dict.set_item("expected_return_pct", summary.expected_return_pct)?;
    dict.set_item("p5", summary.p5)?;
    dict.set_item("p95", summary.p95)?;
    Ok(dict.into())
}

fn analysis_to_dict(py: Python, analysis: &PortfolioAnalysis) -> PyResult<PyObject> {
    let predictions = PyDict::new(py);
    for p in &analysis.predictions {
        let entry = PyDict::new(py);
        entry.set_item("expected_price", p.prediction.expected_price)?;
        entry.set_item("expected_return_pct", p.prediction.expected_return_pct)?;
        predictions.set_item(&p.ticker, entry)?;
    }

    let ranked = |list: &[analysis::RankedPosition]| -> Vec<(String, f64)> {
        list.iter().map(|r| (r.ticker.clone(), r.return_pct)).collect()
    };

    let dict = PyDict::new(py);
    dict.set_item("total_value", analysis.total_value)?;
    dict.set_item("weighted_return_pct", analysis.weighted_return_pct)?;
    dict.set_item("predicted_portfolio_value", analysis.predicted_portfolio_value)?;
    dict.set_item(
        "predicted_portfolio_return_pct",
        analysis.predicted_portfolio_return_pct,
    )?;
    dict.set_item("predictions", predictions)?;
    dict.set_item("top_performers", ranked(&analysis.top_performers))?;
    dict.set_item("laggards", ranked(&analysis.laggards))?;
    Ok(dict.into())
}

// ============================================================================
// Simulation Functions
// ============================================================================

/// Simulate terminal prices of one asset under GBM.
#[pyfunction]
#[pyo3(signature = (current_price, mu, sigma=DEFAULT_SIGMA, days=DEFAULT_DAYS, n_sims=DEFAULT_N_SIMS, random_seed=None))]
pub fn simulate_gbm_price<'py>(
    py: Python<'py>,
    current_price: f64,
    mu: f64,
    sigma: f64,
    days: usize,
    n_sims: usize,
    random_seed: Option<u64>,
) -> PyResult<&'py PyArray1<f64>> {
    let prices = py.allow_threads(|| {
        terminal::simulate_gbm_price(current_price, mu, sigma, days, n_sims, random_seed)
    })?;
    Ok(vec_to_numpy_f64(py, prices))
}

/// Summarize simulated terminal prices (mean, return, 5th/95th percentile).
#[pyfunction]
pub fn summarize_terminal_prices(
    py: Python,
    prices: PyReadonlyArray1<f64>,
    current_price: f64,
) -> PyResult<PyObject> {
    let summary = TerminalSummary::from_prices(&numpy_to_vec_f64(prices), current_price)?;
    terminal_summary_to_dict(py, &summary)
}

/// Simulate portfolio value paths, optionally through a cache.
#[pyfunction]
#[pyo3(signature = (positions, config=None, cache=None))]
pub fn simulate_portfolio_growth(
    py: Python<'_>,
    positions: Vec<PyPosition>,
    config: Option<&PySimulationConfig>,
    cache: Option<&PySimulationCache>,
) -> PyResult<PyPathResult> {
    if let Some(cache) = cache {
        return cache.simulate(py, positions, config);
    }
    let positions = positions_from(&positions);
    let params = params_from(config);
    let result = py.allow_threads(move || paths::simulate_portfolio_growth(&positions, &params))?;
    Ok(PyPathResult {
        inner: Arc::new(result),
    })
}

/// Percentile bands of an (n_sims, n_checkpoints) value table.
#[pyfunction]
pub fn percentile_bands(
    py: Python,
    values: PyReadonlyArray2<f64>,
    time_points: PyReadonlyArray1<i64>,
) -> PyResult<PyObject> {
    let result = PathResult {
        values: numpy_to_table_f64(values),
        time_points: numpy_to_days(time_points)?,
    };
    bands_to_dict(py, &result)
}

// ============================================================================
// Portfolio Functions
// ============================================================================

/// Total value and value-weighted historical return.
#[pyfunction]
pub fn portfolio_summary(py: Python, positions: Vec<PyPosition>) -> PyResult<PyObject> {
    let summary = analysis::portfolio_summary(&positions_from(&positions));
    let dict = PyDict::new(py);
    dict.set_item("total_value", summary.total_value)?;
    dict.set_item("weighted_return_pct", summary.weighted_return_pct)?;
    Ok(dict.into())
}

/// Expected price and return of one position.
#[pyfunction]
#[pyo3(signature = (position, config=None))]
pub fn predict_position(
    py: Python,
    position: PyPosition,
    config: Option<&PySimulationConfig>,
) -> PyResult<PyObject> {
    let prediction = analysis::predict_position(&Position::from(&position), &params_from(config))?;
    let dict = PyDict::new(py);
    dict.set_item("expected_price", prediction.expected_price)?;
    dict.set_item("expected_return_pct", prediction.expected_return_pct)?;
    Ok(dict.into())
}

/// Terminal price distribution (mean, return, 5th/95th percentile) of one position.
#[pyfunction]
#[pyo3(signature = (position, config=None))]
pub fn position_terminal_summary(
    py: Python,
    position: PyPosition,
    config: Option<&PySimulationConfig>,
) -> PyResult<PyObject> {
    let summary = analysis::position_terminal_summary(&Position::from(&position), &params_from(config))?;
    terminal_summary_to_dict(py, &summary)
}

/// Analyse a portfolio and predict its value at the horizon.
#[pyfunction]
#[pyo3(signature = (positions, config=None))]
pub fn analyse_portfolio(
    py: Python,
    positions: Vec<PyPosition>,
    config: Option<&PySimulationConfig>,
) -> PyResult<PyObject> {
    let positions = positions_from(&positions);
    let params = params_from(config);
    let result = py.allow_threads(|| analysis::analyse_portfolio(&positions, &params))?;
    analysis_to_dict(py, &result)
}

// ============================================================================
// Watchlist Functions
// ============================================================================

/// Drift estimate from a one-day return percentage.
#[pyfunction]
pub fn compute_mu_from_today_return(today_return_pct: f64) -> f64 {
    watchlist::compute_mu_from_today_return(today_return_pct)
}

/// Rank watchlist candidates by expected return.
#[pyfunction]
#[pyo3(signature = (items, config=None))]
pub fn analyse_watchlist(
    py: Python<'_>,
    items: Vec<PyWatchItem>,
    config: Option<&PySimulationConfig>,
) -> PyResult<Vec<(String, f64, f64)>> {
    let items: Vec<WatchItem> = items.iter().map(WatchItem::from).collect();
    let params = params_from(config);
    let ranked = py.allow_threads(|| watchlist::analyse_watchlist(&items, &params))?;
    Ok(ranked
        .into_iter()
        .map(|r| (r.ticker, r.expected_return_pct, r.expected_price))
        .collect())
}

/// Append positions bought from the watchlist.
#[pyfunction]
pub fn add_positions(
    positions: Vec<PyPosition>,
    items: Vec<PyWatchItem>,
    tickers: Vec<String>,
    allocation_value: f64,
) -> Vec<PyPosition> {
    let items: Vec<WatchItem> = items.iter().map(WatchItem::from).collect();
    let map = watchlist::watchlist_map(&items);
    watchlist::add_positions(&positions_from(&positions), &map, tickers.as_slice(), allocation_value)
        .into_iter()
        .map(PyPosition::from)
        .collect()
}
