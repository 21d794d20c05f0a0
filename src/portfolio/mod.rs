//! Portfolio analysis built on the simulators.

pub mod analysis;
pub mod scenarios;
pub mod watchlist;

pub use analysis::{
    analyse_portfolio, portfolio_summary, position_details, predict_position, PortfolioAnalysis,
    PositionDetail, PositionPrediction,
};
pub use scenarios::{
    compare_analysis_scenarios, compare_volatility_scenarios, compare_what_if, Allocation,
    ReturnAssumption, WhatIfComparison, WhatIfPortfolio,
};
pub use watchlist::{
    add_positions, analyse_watchlist, compute_mu_from_today_return, watchlist_map,
    WatchlistRanking,
};
