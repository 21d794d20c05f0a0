//! Memoization of path simulations.
//!
//! Results are keyed by every input that influences the output. Floats are
//! compared by bit pattern, so the key has a well-defined structural hash.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::trace;

use super::paths::{run_paths, PathResult};
use crate::core::config::{ExecutionMode, SimulationParameters};
use crate::core::error::Result;
use crate::core::rng::rng_from_seed;
use crate::core::types::Position;

/// Hashable identity of one position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PositionKey {
    pub ticker: String,
    pub value_bits: u64,
    pub return_pct_bits: u64,
    pub current_price_bits: u64,
}

impl From<&Position> for PositionKey {
    fn from(pos: &Position) -> Self {
        Self {
            ticker: pos.ticker.clone(),
            value_bits: pos.value.to_bits(),
            return_pct_bits: pos.return_pct.to_bits(),
            current_price_bits: pos.current_price.to_bits(),
        }
    }
}

/// Hashable identity of one DCA entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DcaKey {
    pub ticker: String,
    pub amount_bits: u64,
    pub frequency_days: usize,
}

/// Cache key for a path simulation.
///
/// Positions keep their order; DCA entries are sorted by ticker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimulationKey {
    pub positions: Vec<PositionKey>,
    pub sigma_bits: u64,
    pub days: usize,
    pub n_sims: usize,
    pub random_seed: Option<u64>,
    pub dca: Vec<DcaKey>,
    pub execution: ExecutionMode,
}

impl SimulationKey {
    /// Build the key for a simulation request.
    pub fn new(positions: &[Position], params: &SimulationParameters) -> Self {
        Self {
            positions: positions.iter().map(PositionKey::from).collect(),
            sigma_bits: params.sigma.to_bits(),
            days: params.days,
            n_sims: params.n_sims,
            random_seed: params.random_seed,
            dca: params
                .dca_schedule
                .iter()
                .map(|(ticker, entry)| DcaKey {
                    ticker: ticker.to_string(),
                    amount_bits: entry.amount.to_bits(),
                    frequency_days: entry.frequency_days,
                })
                .collect(),
            execution: params.execution,
        }
    }
}

type Slot = Arc<OnceLock<Arc<PathResult>>>;

/// Process-lifetime store of simulated path tables.
///
/// Safe to share between threads. Concurrent requests for the same key run
/// the simulation once; the others wait for and share its result.
#[derive(Debug, Default)]
pub struct SimulationCache {
    slots: Mutex<HashMap<SimulationKey, Slot>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SimulationCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached result for these inputs, simulating on first use.
    ///
    /// Unseeded requests are cached too: repeating one returns the first draw.
    pub fn get_or_simulate(
        &self,
        positions: &[Position],
        params: &SimulationParameters,
    ) -> Result<Arc<PathResult>> {
        params.validate()?;

        let key = SimulationKey::new(positions, params);
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(slots.entry(key).or_default())
        };

        let mut computed = false;
        let result = slot.get_or_init(|| {
            computed = true;
            let mut rng = rng_from_seed(params.random_seed);
            Arc::new(run_paths(&mut rng, positions, params))
        });

        if computed {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(n_sims = params.n_sims, days = params.days, "simulation cache miss");
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(n_sims = params.n_sims, days = params.days, "simulation cache hit");
        }

        Ok(Arc::clone(result))
    }

    /// Check whether a result is stored for these inputs.
    pub fn contains(&self, positions: &[Position], params: &SimulationParameters) -> bool {
        let key = SimulationKey::new(positions, params);
        self.slots
            .lock()
            .get(&key)
            .map_or(false, |slot| slot.get().is_some())
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Check whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Requests served from the cache.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Requests that ran a simulation.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Drop every stored result.
    pub fn clear(&self) {
        self.slots.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{DcaEntry, DcaSchedule};
    use crate::simulation::paths::simulate_portfolio_growth;

    fn sample_positions() -> Vec<Position> {
        vec![
            Position::new("AAPL", 1000.0, 12.0, 150.0),
            Position::new("MSFT", 2000.0, 8.0, 300.0),
        ]
    }

    #[test]
    fn test_key_ignores_dca_insertion_order() {
        let positions = sample_positions();
        let mut a = DcaSchedule::new();
        a.insert("MSFT", DcaEntry::new(50.0, 7));
        a.insert("AAPL", DcaEntry::new(100.0, 30));
        let b = DcaSchedule::new()
            .with_entry("AAPL", 100.0, 30)
            .with_entry("MSFT", 50.0, 7);

        let pa = SimulationParameters::default().with_dca_schedule(a);
        let pb = SimulationParameters::default().with_dca_schedule(b);
        assert_eq!(SimulationKey::new(&positions, &pa), SimulationKey::new(&positions, &pb));
    }

    #[test]
    fn test_key_distinguishes_inputs() {
        let positions = sample_positions();
        let base = SimulationParameters::new(0.15, 30, 10).with_seed(1);
        let key = SimulationKey::new(&positions, &base);

        assert_ne!(key, SimulationKey::new(&positions, &base.clone().with_sigma(0.25)));
        assert_ne!(key, SimulationKey::new(&positions, &base.clone().with_seed(2)));
        assert_ne!(key, SimulationKey::new(&positions[..1], &base));
        assert_ne!(
            key,
            SimulationKey::new(&positions, &base.clone().with_dca("AAPL", 10.0, 5))
        );
    }

    #[test]
    fn test_cache_hit_returns_same_result() {
        let cache = SimulationCache::new();
        let positions = sample_positions();
        let params = SimulationParameters::new(0.2, 40, 16).with_seed(11);

        let first = cache.get_or_simulate(&positions, &params).unwrap();
        let second = cache.get_or_simulate(&positions, &params).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&positions, &params));

        cache.clear();
        assert!(cache.is_empty());
        assert!(!cache.contains(&positions, &params));
    }

    #[test]
    fn test_cached_matches_direct_simulation() {
        let cache = SimulationCache::new();
        let positions = sample_positions();
        let params = SimulationParameters::new(0.2, 40, 16)
            .with_seed(11)
            .with_dca("AAPL", 100.0, 10);

        let cached = cache.get_or_simulate(&positions, &params).unwrap();
        let direct = simulate_portfolio_growth(&positions, &params).unwrap();
        assert_eq!(*cached, direct);
    }

    #[test]
    fn test_invalid_request_not_cached() {
        let cache = SimulationCache::new();
        let params = SimulationParameters::new(0.2, 40, 0);
        assert!(cache.get_or_simulate(&sample_positions(), &params).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_requests_simulate_once() {
        let cache = Arc::new(SimulationCache::new());
        let positions = sample_positions();
        let params = SimulationParameters::new(0.2, 100, 50).with_seed(3);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let positions = positions.clone();
                let params = params.clone();
                std::thread::spawn(move || cache.get_or_simulate(&positions, &params).unwrap())
            })
            .collect();

        let results: Vec<Arc<PathResult>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 7);
    }
}
