//! Simulation parameters.

use serde::{Deserialize, Serialize};

use super::error::{GrowthError, Result};
use super::types::{DcaEntry, DcaSchedule};

/// Default annualized volatility (15%).
pub const DEFAULT_SIGMA: f64 = 0.15;
/// Default horizon in trading days (one year).
pub const DEFAULT_DAYS: usize = 252;
/// Default Monte Carlo path count.
pub const DEFAULT_N_SIMS: usize = 1000;

/// How the outer path loop of the path simulator is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One generator stream shared by every path, consumed in path order.
    Sequential,
    /// Paths run on the rayon pool, each with a generator seeded from the
    /// master stream in path order.
    Parallel,
}

impl Default for ExecutionMode {
    fn default() -> Self {
        ExecutionMode::Sequential
    }
}

/// Parameters shared by the terminal and path simulators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Annualized volatility.
    pub sigma: f64,
    /// Horizon in trading days.
    pub days: usize,
    /// Number of Monte Carlo paths.
    pub n_sims: usize,
    /// Seed for reproducible output.
    pub random_seed: Option<u64>,
    /// Recurring contributions (path simulator only).
    pub dca_schedule: DcaSchedule,
    /// Path loop execution.
    pub execution: ExecutionMode,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            sigma: DEFAULT_SIGMA,
            days: DEFAULT_DAYS,
            n_sims: DEFAULT_N_SIMS,
            random_seed: None,
            dca_schedule: DcaSchedule::new(),
            execution: ExecutionMode::Sequential,
        }
    }
}

impl SimulationParameters {
    /// Create parameters with the given volatility, horizon and path count.
    pub fn new(sigma: f64, days: usize, n_sims: usize) -> Self {
        Self {
            sigma,
            days,
            n_sims,
            ..Self::default()
        }
    }

    /// Set volatility.
    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    /// Set horizon.
    pub fn with_days(mut self, days: usize) -> Self {
        self.days = days;
        self
    }

    /// Set path count.
    pub fn with_n_sims(mut self, n_sims: usize) -> Self {
        self.n_sims = n_sims;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Replace the DCA schedule.
    pub fn with_dca_schedule(mut self, schedule: DcaSchedule) -> Self {
        self.dca_schedule = schedule;
        self
    }

    /// Add a single DCA entry.
    pub fn with_dca(mut self, ticker: impl Into<String>, amount: f64, frequency_days: usize) -> Self {
        self.dca_schedule
            .insert(ticker, DcaEntry::new(amount, frequency_days));
        self
    }

    /// Set execution mode.
    pub fn with_execution(mut self, execution: ExecutionMode) -> Self {
        self.execution = execution;
        self
    }

    /// Reject parameters that would produce meaningless output.
    pub fn validate(&self) -> Result<()> {
        self.validate_terminal()?;
        self.dca_schedule.validate()
    }

    /// Validate only the fields the terminal simulator reads.
    ///
    /// The DCA schedule is ignored.
    pub fn validate_terminal(&self) -> Result<()> {
        validate_sigma(self.sigma)?;
        validate_n_sims(self.n_sims)
    }
}

pub(crate) fn validate_sigma(sigma: f64) -> Result<()> {
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(GrowthError::invalid_parameter(format!(
            "sigma must be a non-negative number, got {}",
            sigma
        )));
    }
    Ok(())
}

pub(crate) fn validate_n_sims(n_sims: usize) -> Result<()> {
    if n_sims == 0 {
        return Err(GrowthError::invalid_parameter("n_sims must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = SimulationParameters::default();
        assert_eq!(params.sigma, 0.15);
        assert_eq!(params.days, 252);
        assert_eq!(params.n_sims, 1000);
        assert!(params.random_seed.is_none());
        assert!(params.dca_schedule.is_empty());
        assert_eq!(params.execution, ExecutionMode::Sequential);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert!(SimulationParameters::new(0.0, 10, 1).validate().is_ok());
        assert!(SimulationParameters::new(0.2, 0, 1).validate().is_ok());
        assert!(SimulationParameters::new(0.2, 10, 0).validate().is_err());
        assert!(SimulationParameters::new(-0.1, 10, 1).validate().is_err());
        assert!(SimulationParameters::new(f64::INFINITY, 10, 1).validate().is_err());
        assert!(SimulationParameters::default()
            .with_dca("AAPL", 100.0, 0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_terminal_validation_ignores_dca() {
        let params = SimulationParameters::new(0.2, 10, 5).with_dca("AAPL", 100.0, 0);
        assert!(params.validate().is_err());
        assert!(params.validate_terminal().is_ok());
        assert!(SimulationParameters::new(0.2, 10, 0).validate_terminal().is_err());
        assert!(SimulationParameters::new(f64::NAN, 10, 1).validate_terminal().is_err());
    }

    #[test]
    fn test_partial_deserialize_fills_defaults() {
        let params: SimulationParameters =
            serde_json::from_str(r#"{"sigma": 0.25, "random_seed": 7, "execution": "parallel"}"#)
                .unwrap();
        assert_eq!(params.sigma, 0.25);
        assert_eq!(params.days, 252);
        assert_eq!(params.random_seed, Some(7));
        assert_eq!(params.execution, ExecutionMode::Parallel);
    }
}
