// =============================================================================
// Signals Module
// =============================================================================
//
// Discrete buy/sell markers derived from the merged timeline.

pub mod crossover;

pub use crossover::{apply_crossovers, CrossoverEvent, CrossoverRule};
