//! Rolling z-score anomaly detection.
//!
//! A reading is anomalous when it falls strictly outside
//! `[mean - k*stddev, mean + k*stddev]` of its trailing window. Readings
//! without a full window of history are never flagged. The comparison never
//! divides by the standard deviation, so a zero deviation is handled without
//! NaNs: every value other than the mean is then outside the band.

use crate::analysis::rolling::compute_rolling;
use crate::config::AnalysisConfig;
use crate::model::{AnnotatedPoint, AnnotatedSeries, MonitorError, RollingStat, RollingWindowResult, Series};

/// Returns `true` if `value` lies in the closed band `mean ± k*stddev`.
pub fn within_band(value: f64, mean: f64, stddev: f64, sigma_multiplier: f64) -> bool {
    let half_width = sigma_multiplier * stddev;
    mean - half_width <= value && value <= mean + half_width
}

fn flag(temperature: f64, stat: &RollingStat, sigma_multiplier: f64) -> bool {
    match (stat.mean, stat.stddev) {
        (Some(mean), Some(stddev)) => !within_band(temperature, mean, stddev, sigma_multiplier),
        _ => false,
    }
}

fn check_alignment(series: &Series, rolling: &RollingWindowResult) -> Result<(), MonitorError> {
    if series.len() != rolling.len() {
        return Err(MonitorError::MisalignedRolling {
            series_len: series.len(),
            rolling_len: rolling.len(),
        });
    }
    Ok(())
}

/// One flag per reading of `series`, in the series' order.
///
/// Fails with `MisalignedRolling` if `rolling` was not computed for a series
/// of the same length.
pub fn detect_anomalies(
    series: &Series,
    rolling: &RollingWindowResult,
    sigma_multiplier: f64,
) -> Result<Vec<bool>, MonitorError> {
    check_alignment(series, rolling)?;

    Ok(series
        .temperatures()
        .zip(&rolling.points)
        .map(|(t, stat)| flag(t, stat, sigma_multiplier))
        .collect())
}

fn zip_annotated(
    series: &Series,
    rolling: &RollingWindowResult,
    sigma_multiplier: f64,
) -> AnnotatedSeries {
    let points = series
        .readings()
        .iter()
        .zip(&rolling.points)
        .map(|(reading, stat)| AnnotatedPoint {
            reading: reading.clone(),
            mean: stat.mean,
            stddev: stat.stddev,
            is_anomaly: flag(reading.temperature, stat, sigma_multiplier),
        })
        .collect();

    AnnotatedSeries {
        city: series.city().to_string(),
        window: rolling.window,
        sigma_multiplier,
        points,
    }
}

/// Zips `series` with `rolling` and the anomaly flags into a new value.
pub fn annotate(
    series: &Series,
    rolling: &RollingWindowResult,
    sigma_multiplier: f64,
) -> Result<AnnotatedSeries, MonitorError> {
    check_alignment(series, rolling)?;
    Ok(zip_annotated(series, rolling, sigma_multiplier))
}

/// Computes rolling statistics with the configured window and annotates.
pub fn annotate_series(series: &Series, config: &AnalysisConfig) -> AnnotatedSeries {
    let rolling = compute_rolling(series, config.window);
    zip_annotated(series, &rolling, config.sigma_multiplier)
}
