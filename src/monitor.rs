//! Per-city monitoring reports
//!
//! Ties the statistical core to its collaborators: one `CityReport` per
//! historical series, and one `LiveCheck` per live temperature fetched
//! through a `LiveTemperatureProvider`. An upstream failure never aborts a
//! run; it leaves the check without a temperature or verdict.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::alert::seasonal_band::classify_with;
use crate::analysis::anomalies::annotate_series;
use crate::analysis::seasonal::build_seasonal_profile;
use crate::analysis::summary::{describe, SeriesSummary};
use crate::config::AnalysisConfig;
use crate::ingest::openweather::LiveTemperatureProvider;
use crate::logging::{self, DataSource};
use crate::model::{AnnotatedSeries, ClassificationVerdict, SeasonalProfile, Series};
use crate::season::{Season, SeasonMapping};

// ============================================================================
// Historical Analysis
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CityReport {
    pub city: String,
    pub summary: Option<SeriesSummary>, // None for an empty series
    pub annotated: AnnotatedSeries,
    pub profile: SeasonalProfile,
}

impl CityReport {
    pub fn anomaly_count(&self) -> usize {
        self.annotated.anomaly_count()
    }
}

/// Summary, rolling anomalies and seasonal profile for one city.
pub fn analyze_city(series: &Series, analysis: &AnalysisConfig, seasons: &SeasonMapping) -> CityReport {
    CityReport {
        city: series.city().to_string(),
        summary: describe(series),
        annotated: annotate_series(series, analysis),
        profile: build_seasonal_profile(series, seasons),
    }
}

/// `analyze_city` for every series, keyed by city. Cities share no state,
/// so the order of evaluation does not affect any report.
pub fn analyze_all(
    series: &BTreeMap<String, Series>,
    analysis: &AnalysisConfig,
    seasons: &SeasonMapping,
) -> BTreeMap<String, CityReport> {
    series
        .iter()
        .map(|(city, s)| {
            let report = analyze_city(s, analysis, seasons);
            logging::debug(
                DataSource::Analysis,
                Some(city),
                &format!("{} readings, {} anomalies", s.len(), report.anomaly_count()),
            );
            (city.clone(), report)
        })
        .collect()
}

// ============================================================================
// Live Classification
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct LiveCheck {
    pub city: String,
    pub instant: DateTime<Utc>,
    pub season: Season,
    pub temperature: Option<f64>,              // None when the provider failed
    pub verdict: Option<ClassificationVerdict>, // None when the provider failed
}

/// Fetch the current temperature for the profile's city and classify it as
/// of `instant`.
pub fn live_check<P: LiveTemperatureProvider + ?Sized>(
    provider: &P,
    profile: &SeasonalProfile,
    seasons: &SeasonMapping,
    analysis: &AnalysisConfig,
    instant: DateTime<Utc>,
) -> LiveCheck {
    let city = profile.city().to_string();
    let season = seasons.season_of(instant);

    let mut check = LiveCheck {
        city,
        instant,
        season,
        temperature: None,
        verdict: None,
    };

    match provider.current_temperature(&check.city) {
        Ok(value) => {
            let verdict = classify_with(profile, seasons, instant, value, analysis.sigma_multiplier);
            logging::info(
                DataSource::OpenWeather,
                Some(&check.city),
                &format!("{:.1} in {} is {}", value, season, verdict),
            );
            check.temperature = Some(value);
            check.verdict = Some(verdict);
        }
        Err(e) => logging::log_upstream_failure(&check.city, "live temperature", &e),
    }

    check
}

// ============================================================================
// Tests
// ============================================================================
