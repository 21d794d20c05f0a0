//! Portfolio-level aggregation of per-position price predictions.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::config::SimulationParameters;
use crate::core::error::Result;
use crate::core::rng::rng_from_seed;
use crate::core::types::{PortfolioSummary, Position, Price};
use crate::simulation::terminal::{expected_return_pct, simulate_terminal_prices, TerminalSummary};

/// Number of entries reported in the top and bottom performer lists.
pub const PERFORMER_COUNT: usize = 5;

/// Total value and value-weighted historical return.
///
/// The weighted return is 0 when the portfolio has no value.
pub fn portfolio_summary(positions: &[Position]) -> PortfolioSummary {
    let total_value: f64 = positions.iter().map(|p| p.value).sum();
    let total_return_value: f64 = positions.iter().map(|p| p.value * p.mu()).sum();

    let weighted_return_pct = if total_value > 0.0 {
        (total_return_value / total_value) * 100.0
    } else {
        0.0
    };

    PortfolioSummary {
        total_value,
        weighted_return_pct,
    }
}

/// Expected terminal price of one asset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionPrediction {
    /// Mean simulated terminal price.
    pub expected_price: Price,
    /// Mean terminal price relative to the current price, in percent.
    pub expected_return_pct: f64,
}

/// Prediction tagged with its ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerPrediction {
    pub ticker: String,
    #[serde(flatten)]
    pub prediction: PositionPrediction,
}

/// Position ranked by historical return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPosition {
    pub ticker: String,
    pub return_pct: f64,
}

/// Full analysis of a portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioAnalysis {
    /// Current total value.
    pub total_value: f64,
    /// Value-weighted historical return.
    pub weighted_return_pct: f64,
    /// Sum of shares times expected price over all positions.
    pub predicted_portfolio_value: f64,
    /// Predicted value relative to the current value, in percent.
    pub predicted_portfolio_return_pct: f64,
    /// One prediction per position, in input order.
    pub predictions: Vec<TickerPrediction>,
    /// Up to five best historical returns, best first.
    pub top_performers: Vec<RankedPosition>,
    /// Up to five worst historical returns, in descending order.
    pub laggards: Vec<RankedPosition>,
}

impl PortfolioAnalysis {
    /// Prediction for the first position with this ticker.
    pub fn prediction(&self, ticker: &str) -> Option<&PositionPrediction> {
        self.predictions
            .iter()
            .find(|p| p.ticker == ticker)
            .map(|p| &p.prediction)
    }
}

/// Simulate one position with drift taken from its historical return.
///
/// The generator is rebuilt from `params.random_seed` on every call.
pub fn predict_position(position: &Position, params: &SimulationParameters) -> Result<PositionPrediction> {
    let mut rng = rng_from_seed(params.random_seed);
    let prices = simulate_terminal_prices(
        &mut rng,
        position.current_price,
        position.mu(),
        params.sigma,
        params.days,
        params.n_sims,
    )?;

    let expected_price = prices.iter().sum::<f64>() / prices.len() as f64;
    Ok(PositionPrediction {
        expected_price,
        expected_return_pct: expected_return_pct(expected_price, position.current_price),
    })
}

/// Terminal price distribution of one position.
pub fn position_terminal_summary(
    position: &Position,
    params: &SimulationParameters,
) -> Result<TerminalSummary> {
    let mut rng = rng_from_seed(params.random_seed);
    let prices = simulate_terminal_prices(
        &mut rng,
        position.current_price,
        position.mu(),
        params.sigma,
        params.days,
        params.n_sims,
    )?;
    TerminalSummary::from_prices(&prices, position.current_price)
}

/// Positions sorted by historical return, best first. Ties keep input order.
pub fn rank_by_return(positions: &[Position]) -> Vec<&Position> {
    let mut ranked: Vec<&Position> = positions.iter().collect();
    ranked.sort_by(|a, b| b.return_pct.total_cmp(&a.return_pct));
    ranked
}

/// Analyse a portfolio and predict its value at the horizon.
///
/// With fewer than five positions the performer lists are shorter and may
/// overlap.
pub fn analyse_portfolio(positions: &[Position], params: &SimulationParameters) -> Result<PortfolioAnalysis> {
    params.validate_terminal()?;

    let summary = portfolio_summary(positions);

    let ranked = rank_by_return(positions);
    let to_ranked = |p: &&Position| RankedPosition {
        ticker: p.ticker.clone(),
        return_pct: p.return_pct,
    };
    let top_performers = ranked.iter().take(PERFORMER_COUNT).map(to_ranked).collect();
    let laggards = ranked[ranked.len().saturating_sub(PERFORMER_COUNT)..]
        .iter()
        .map(to_ranked)
        .collect();

    let predictions = positions
        .iter()
        .map(|pos| {
            predict_position(pos, params).map(|prediction| TickerPrediction {
                ticker: pos.ticker.clone(),
                prediction,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let predicted_portfolio_value: f64 = positions
        .iter()
        .zip(&predictions)
        .map(|(pos, pred)| pos.shares() * pred.prediction.expected_price)
        .sum();

    let predicted_portfolio_return_pct = if summary.total_value > 0.0 {
        (predicted_portfolio_value / summary.total_value - 1.0) * 100.0
    } else {
        0.0
    };

    info!(
        positions = positions.len(),
        total_value = summary.total_value,
        predicted_portfolio_value,
        predicted_portfolio_return_pct,
        "portfolio analysis complete"
    );

    Ok(PortfolioAnalysis {
        total_value: summary.total_value,
        weighted_return_pct: summary.weighted_return_pct,
        predicted_portfolio_value,
        predicted_portfolio_return_pct,
        predictions,
        top_performers,
        laggards,
    })
}

/// Per-position detail row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionDetail {
    pub ticker: String,
    pub value: f64,
    pub shares: f64,
    pub current_price: Price,
    pub return_pct: f64,
    pub expected_price: Price,
    pub expected_return_pct: f64,
    /// Share of total portfolio value, in percent. 0 for an empty portfolio.
    pub weight_pct: f64,
}

/// Detail rows for every position, in input order.
pub fn position_details(positions: &[Position], params: &SimulationParameters) -> Result<Vec<PositionDetail>> {
    params.validate_terminal()?;
    let total_value = portfolio_summary(positions).total_value;

    positions
        .iter()
        .map(|pos| {
            let prediction = predict_position(pos, params)?;
            Ok(PositionDetail {
                ticker: pos.ticker.clone(),
                value: pos.value,
                shares: pos.shares(),
                current_price: pos.current_price,
                return_pct: pos.return_pct,
                expected_price: prediction.expected_price,
                expected_return_pct: prediction.expected_return_pct,
                weight_pct: if total_value > 0.0 {
                    pos.value / total_value * 100.0
                } else {
                    0.0
                },
            })
        })
        .collect()
}
