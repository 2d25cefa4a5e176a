//! Reference strategy implementations.

pub mod sma_crossover;
pub mod mean_reversion;

pub use mean_reversion::MeanReversion;
pub use sma_crossover::SmaCrossover;
