//! Verdicts on live readings.
//!
//! Submodules:
//! - `seasonal_band`: compares a live temperature with the current
//!   season's historical mean ± k standard deviations.

pub mod seasonal_band;
