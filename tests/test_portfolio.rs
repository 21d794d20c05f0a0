//! Integration tests for GrowthCast portfolio analysis and watchlist ranking.

use growthcast::core::config::SimulationParameters;
use growthcast::core::types::{DcaEntry, Position, WatchItem};
use growthcast::portfolio::analysis::{analyse_portfolio, portfolio_summary, position_details, predict_position};
use growthcast::portfolio::scenarios::{
    compare_analysis_scenarios, compare_volatility_scenarios, compare_what_if, Allocation,
    ReturnAssumption, WhatIfPortfolio,
};
use growthcast::portfolio::watchlist::{
    add_positions, analyse_watchlist, compute_mu_from_today_return, watchlist_map,
};
use growthcast::simulation::cache::SimulationCache;

fn sample_portfolio() -> Vec<Position> {
    vec![
        Position::new("IBM", 28.35, 18.92, 302.50),
        Position::new("AVAV", 37.06, 23.54, 287.82),
        Position::new("ORA", 109.40, 23.54, 109.21),
        Position::new("TSLA", 52.10, -12.40, 248.00),
        Position::new("KO", 64.00, 3.10, 64.00),
        Position::new("XOM", 110.00, -4.75, 110.00),
        Position::new("NVDA", 120.00, 61.00, 120.00),
    ]
}

fn sample_watchlist() -> Vec<WatchItem> {
    vec![
        WatchItem::new("MRK", "Merck & Co", 94.18, 1.79),
        WatchItem::new("GEV", "GE Vernova Inc", 585.82, 1.94),
        WatchItem::new("MOD", "Modine Manufacturing", 134.22, 1.97),
        WatchItem::new("PFE", "Pfizer", 25.10, -0.85),
        WatchItem::new("ZETA", "Zeta Global", 18.40, 12.0),
    ]
}

#[test]
fn test_summary_of_empty_portfolio() {
    let summary = portfolio_summary(&[]);
    assert_eq!(summary.total_value, 0.0);
    assert_eq!(summary.weighted_return_pct, 0.0);

    let zero = portfolio_summary(&[Position::new("Z", 0.0, 50.0, 10.0)]);
    assert_eq!(zero.weighted_return_pct, 0.0);
    assert!(!zero.weighted_return_pct.is_nan());
}

#[test]
fn test_analysis_report() {
    let params = SimulationParameters::new(0.15, 252, 300).with_seed(42);
    let positions = sample_portfolio();
    let analysis = analyse_portfolio(&positions, &params).unwrap();

    assert_eq!(analysis.predictions.len(), positions.len());
    assert_eq!(analysis.top_performers.len(), 5);
    assert_eq!(analysis.laggards.len(), 5);
    assert_eq!(analysis.top_performers[0].ticker, "NVDA");
    assert_eq!(analysis.laggards.last().unwrap().ticker, "TSLA");
    assert!(analysis.predicted_portfolio_value > 0.0);

    let ibm = analysis.prediction("IBM").unwrap();
    let direct = predict_position(&positions[0], &params).unwrap();
    assert_eq!(*ibm, direct);
}

#[test]
fn test_analysis_is_reproducible() {
    let params = SimulationParameters::new(0.2, 126, 200).with_seed(17);
    let a = analyse_portfolio(&sample_portfolio(), &params).unwrap();
    let b = analyse_portfolio(&sample_portfolio(), &params).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_flat_market_prediction_matches_drift() {
    let params = SimulationParameters::new(0.0, 252, 10).with_seed(1);
    let position = Position::new("A", 1000.0, 10.0, 50.0);
    let prediction = predict_position(&position, &params).unwrap();
    let expected = 50.0 * 0.1f64.exp();
    assert!((prediction.expected_price - expected).abs() < 1e-9);
    assert!((prediction.expected_return_pct - (0.1f64.exp() - 1.0) * 100.0).abs() < 1e-6);
}

#[test]
fn test_position_details_weights_sum_to_100() {
    let params = SimulationParameters::new(0.15, 60, 50).with_seed(3);
    let details = position_details(&sample_portfolio(), &params).unwrap();
    let total: f64 = details.iter().map(|d| d.weight_pct).sum();
    assert!((total - 100.0).abs() < 1e-9);
}

#[test]
fn test_watchlist_sorted_descending() {
    let params = SimulationParameters::new(0.15, 252, 500).with_seed(42);
    let ranked = analyse_watchlist(&sample_watchlist(), &params).unwrap();
    assert_eq!(ranked.len(), 5);
    for i in 0..ranked.len() {
        for j in i + 1..ranked.len() {
            assert!(ranked[i].expected_return_pct >= ranked[j].expected_return_pct);
        }
    }
    assert_eq!(ranked[0].ticker, "ZETA");
}

#[test]
fn test_mu_heuristic_clamps_extremes() {
    assert_eq!(compute_mu_from_today_return(1000.0), 0.20);
    assert_eq!(compute_mu_from_today_return(-1000.0), -0.05);
    assert!((compute_mu_from_today_return(1.0) - 0.02).abs() < 1e-12);

    let inputs = [-1e9, -50.0, -2.5, -1.0, 0.0, 0.5, 1.0, 5.0, 10.0, 1e9];
    let outputs: Vec<f64> = inputs.iter().map(|&x| compute_mu_from_today_return(x)).collect();
    assert!(outputs.windows(2).all(|w| w[0] <= w[1]));
    assert!(outputs.iter().all(|&mu| (-0.05..=0.20).contains(&mu)));
}

#[test]
fn test_add_positions_from_watchlist() {
    let current = sample_portfolio();
    let map = watchlist_map(&sample_watchlist());

    let unchanged = add_positions(&current, &map, &["NOT_LISTED"], 10.0);
    assert_eq!(unchanged, current);

    let updated = add_positions(&current, &map, &["MRK", "GEV"], 10.0);
    assert_eq!(updated.len(), current.len() + 2);
    assert_eq!(&updated[..current.len()], &current[..]);
    assert_eq!(updated[current.len()], Position::new("MRK", 10.0, 0.0, 94.18));
    assert_eq!(updated[current.len() + 1].current_price, 585.82);
}

#[test]
fn test_scenario_comparisons() {
    let cache = SimulationCache::new();
    let params = SimulationParameters::new(0.15, 252, 200).with_seed(10);

    let volatility = compare_volatility_scenarios(&cache, &sample_portfolio(), &params).unwrap();
    assert_eq!(volatility.len(), 3);
    assert!(volatility.iter().all(|s| s.paths.n_paths() == 200));

    let analysis = compare_analysis_scenarios(&sample_portfolio(), &params).unwrap();
    assert_eq!(analysis.len(), 5);
    assert!(analysis.iter().all(|s| s.analysis.predictions.len() == sample_portfolio().len()));
}

#[test]
fn test_what_if_with_new_contribution() {
    let cache = SimulationCache::new();
    let positions = vec![Position::new("A", 1000.0, 0.0, 100.0)];
    let params = SimulationParameters::new(0.0, 60, 2).with_seed(4);

    let mut what_if = WhatIfPortfolio::new(positions.clone(), params.dca_schedule.clone());
    let item = WatchItem::new("A", "A", 100.0, 0.0);
    what_if
        .add_from_watchlist(
            &item,
            Allocation::Shares(0.0),
            ReturnAssumption::Watchlist,
            Some(DcaEntry::new(100.0, 30)),
        )
        .unwrap();

    let cmp = compare_what_if(&cache, &positions, &params, &what_if).unwrap();
    assert_eq!(cmp.value_change, 0.0);
    assert!((cmp.original.median - 1000.0).abs() < 1e-9);
    assert!((cmp.what_if.median - 1200.0).abs() < 1e-9);
    assert!((cmp.median_difference_pct - 20.0).abs() < 1e-6);
}
