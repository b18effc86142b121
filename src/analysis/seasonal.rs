//! Per-season temperature baselines.

use std::collections::BTreeMap;

use crate::analysis::moments::{mean, sample_stddev};
use crate::model::{SeasonStats, SeasonalProfile, Series};
use crate::season::{Season, SeasonMapping};

/// Groups the readings of `series` by the season `seasons` assigns to each
/// timestamp and summarizes every group.
///
/// All four seasons appear in the result; a season without readings has a
/// zero count and undefined statistics. The counts always sum to
/// `series.len()`.
pub fn build_seasonal_profile(series: &Series, seasons: &SeasonMapping) -> SeasonalProfile {
    let mut grouped: BTreeMap<Season, Vec<f64>> =
        Season::ALL.iter().map(|s| (*s, Vec::new())).collect();

    for reading in series.readings() {
        grouped
            .entry(seasons.season_of(reading.timestamp))
            .or_default()
            .push(reading.temperature);
    }

    let entries = grouped.into_iter().map(|(season, temps)| {
        (
            season,
            SeasonStats {
                mean: mean(&temps),
                stddev: sample_stddev(&temps),
                count: temps.len(),
            },
        )
    });

    SeasonalProfile::from_entries(series.city(), entries)
}
