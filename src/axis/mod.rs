// =============================================================================
// Axis Module
// =============================================================================
//
// Everything the renderer needs to scale and label a value axis: a padded
// domain over the visible series and magnitude-adaptive number formatting.

pub mod domain;
pub mod format;

pub use domain::{estimate_domain, ValueDomain, DEFAULT_DOMAIN};
pub use format::{format_axis_value, format_tooltip_value, FormatProfile};
