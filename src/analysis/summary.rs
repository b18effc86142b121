//! Descriptive statistics of a series' temperatures.

use crate::analysis::moments::{mean, sample_stddev};
use crate::model::Series;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesSummary {
    pub count: usize,
    pub mean: f64,
    pub stddev: Option<f64>, // None for a single reading
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Count, mean, sample standard deviation, extremes and quartiles of the
/// temperatures in `series`. `None` for an empty series.
///
/// Quartiles interpolate linearly between the two closest ranks.
pub fn describe(series: &Series) -> Option<SeriesSummary> {
    let mut sorted: Vec<f64> = series.temperatures().collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    Some(SeriesSummary {
        count: sorted.len(),
        mean: mean(&sorted)?,
        stddev: sample_stddev(&sorted),
        min: sorted[0],
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    })
}

// `sorted` must be non-empty and ascending
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}
