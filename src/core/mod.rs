//! Core types and utilities for GrowthCast.

pub mod config;
pub mod error;
pub mod rng;
pub mod types;

pub use config::{ExecutionMode, SimulationParameters};
pub use error::{GrowthError, Result};
pub use rng::{rng_from_seed, SimRng};
pub use types::*;
