//! Python bindings via PyO3.

pub mod bindings;
pub mod numpy_bridge;
