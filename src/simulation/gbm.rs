//! Discretized geometric Brownian motion step.

/// Trading days per year used to annualize drift and volatility.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Length of one simulated day in years.
pub const DT: f64 = 1.0 / TRADING_DAYS_PER_YEAR;

/// Per-day log-return constants for one asset.
///
/// A day's log-return is `drift + diffusion * z` with `z ~ N(0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GbmStep {
    /// Deterministic part, `(mu - sigma^2 / 2) * dt`.
    pub drift: f64,
    /// Standard deviation of the random part, `sigma * sqrt(dt)`.
    pub diffusion: f64,
}

impl GbmStep {
    /// Precompute step constants from annualized drift and volatility.
    pub fn new(mu: f64, sigma: f64) -> Self {
        Self {
            drift: (mu - 0.5 * sigma * sigma) * DT,
            diffusion: sigma * DT.sqrt(),
        }
    }

    /// Log-return for one day given a standard normal draw.
    #[inline]
    pub fn log_return(&self, z: f64) -> f64 {
        self.drift + self.diffusion * z
    }
}
