//! Statistical core of the monitoring service.
//!
//! Every function here is a pure transformation of its arguments: no I/O,
//! no logging, no clock reads, and no shared state. Independent series can
//! be processed from any number of threads.
//!
//! Submodules:
//! - `moments`: mean and sample standard deviation of a slice.
//! - `rolling`: trailing-window statistics aligned with a series.
//! - `anomalies`: rolling z-score band check and series annotation.
//! - `seasonal`: per-season baselines built from a city's history.
//! - `summary`: descriptive statistics of a series' temperatures.

pub mod anomalies;
pub mod moments;
pub mod rolling;
pub mod seasonal;
pub mod summary;
