//! Seedable random number generation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Generator used by every simulation.
pub type SimRng = StdRng;

/// Build a generator from an optional seed.
///
/// A seed gives a reproducible stream; `None` draws fresh entropy so repeated
/// calls differ.
pub fn rng_from_seed(seed: Option<u64>) -> SimRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Draw one standard normal increment.
#[inline]
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.sample(StandardNormal)
}
