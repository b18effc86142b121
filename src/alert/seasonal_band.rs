//! Live temperature classification against the seasonal baseline.
//!
//! # Clock injection
//! `classify` and `classify_with` take the instant explicitly; the season is
//! derived from it through the shared `SeasonMapping`. `classify_now` is the
//! only entry point that reads the wall clock. Use the explicit forms in
//! tests to keep them deterministic.

use chrono::{DateTime, Utc};

use crate::analysis::anomalies::within_band;
use crate::model::{ClassificationVerdict, SeasonalProfile, DEFAULT_SIGMA_MULTIPLIER};
use crate::season::SeasonMapping;

/// Classifies `value` with the default two-sigma band.
pub fn classify(
    profile: &SeasonalProfile,
    seasons: &SeasonMapping,
    instant: DateTime<Utc>,
    value: f64,
) -> ClassificationVerdict {
    classify_with(profile, seasons, instant, value, DEFAULT_SIGMA_MULTIPLIER)
}

/// Classifies `value` against the profile entry for the season of `instant`.
///
/// - fewer than two readings for that season → `Indeterminate`
/// - `mean - k*stddev <= value <= mean + k*stddev` → `Normal`
/// - anything else → `Anomalous`
///
/// A non-finite `value` cannot be compared and is `Indeterminate`.
pub fn classify_with(
    profile: &SeasonalProfile,
    seasons: &SeasonMapping,
    instant: DateTime<Utc>,
    value: f64,
    sigma_multiplier: f64,
) -> ClassificationVerdict {
    if !value.is_finite() {
        return ClassificationVerdict::Indeterminate;
    }

    let season = seasons.season_of(instant);
    match profile.baseline(season) {
        Ok(baseline) => {
            if within_band(value, baseline.mean, baseline.stddev, sigma_multiplier) {
                ClassificationVerdict::Normal
            } else {
                ClassificationVerdict::Anomalous
            }
        }
        Err(_) => ClassificationVerdict::Indeterminate,
    }
}

/// Convenience wrapper that uses the real current time.
/// Use `classify_with` in tests to keep them deterministic.
pub fn classify_now(
    profile: &SeasonalProfile,
    seasons: &SeasonMapping,
    value: f64,
    sigma_multiplier: f64,
) -> ClassificationVerdict {
    classify_with(profile, seasons, Utc::now(), value, sigma_multiplier)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
