// =============================================================================
// Timeline Module
// =============================================================================
//
// Unifies independently sampled indicator series onto one sorted timestamp
// axis.  A merged row only carries the indicators that were sampled at exactly
// that instant; there is no interpolation and no forward fill.

pub mod merger;
pub mod point;

pub use merger::{merge, merge_in};
pub use point::{IndicatorValues, MergedPoint, Signal};
