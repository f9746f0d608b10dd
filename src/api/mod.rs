// =============================================================================
// API Module
// =============================================================================
//
// HTTP surface consumed by the chart renderer.

pub mod rest;
