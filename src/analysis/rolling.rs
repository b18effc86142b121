//! Trailing-window statistics.

use std::num::NonZeroUsize;

use crate::analysis::moments::{mean, sample_stddev};
use crate::model::{RollingStat, RollingWindowResult, Series};

/// Rolling mean and sample standard deviation over `series`.
///
/// Position `i` covers readings `[i + 1 - window, i]`. Positions with fewer
/// than `window` readings of history are left undefined, as is every
/// standard deviation when `window` is 1. The result has exactly one entry
/// per reading.
pub fn compute_rolling(series: &Series, window: NonZeroUsize) -> RollingWindowResult {
    let temperatures: Vec<f64> = series.temperatures().collect();
    rolling_over(&temperatures, window)
}

/// `compute_rolling` over a bare slice of values.
pub fn rolling_over(values: &[f64], window: NonZeroUsize) -> RollingWindowResult {
    let w = window.get();

    let points = (0..values.len())
        .map(|i| {
            if i + 1 < w {
                return RollingStat::default();
            }
            let slice = &values[i + 1 - w..=i];
            RollingStat {
                mean: mean(slice),
                stddev: sample_stddev(slice),
            }
        })
        .collect();

    RollingWindowResult { window, points }
}
