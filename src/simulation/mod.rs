//! Monte Carlo price and portfolio simulation.
//!
//! Both simulators use geometric Brownian motion with 252 trading days per
//! year. The terminal simulator draws one end-of-horizon price per path for a
//! single asset; the path simulator walks a whole portfolio day by day,
//! applying recurring contributions, and records values on checkpoint days.

pub mod cache;
pub mod gbm;
pub mod paths;
pub mod terminal;

pub use cache::{SimulationCache, SimulationKey};
pub use gbm::{GbmStep, DT, TRADING_DAYS_PER_YEAR};
pub use paths::{checkpoint_days, simulate_portfolio_growth, simulate_portfolio_paths, PathResult};
pub use terminal::{simulate_gbm_price, simulate_terminal_prices, TerminalSummary};
