//! Core data types for the temperature monitoring service.
//!
//! This module defines the shared domain model imported by all other modules:
//! validated readings, per-city series, the statistics derived from them and
//! the error type. It contains no I/O.

use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroUsize;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::season::{Season, SeasonMapping};

// ---------------------------------------------------------------------------
// Analysis defaults
// ---------------------------------------------------------------------------

/// Rolling window length, in readings, used when none is configured.
pub const DEFAULT_WINDOW: NonZeroUsize = NonZeroUsize::new(30).unwrap();

/// Width of the normal band, in standard deviations, used when none is configured.
pub const DEFAULT_SIGMA_MULTIPLIER: f64 = 2.0;

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// A single historical temperature observation for one city.
///
/// `season` is always the value the shared [`SeasonMapping`] assigns to
/// `timestamp`; build readings through [`Reading::new`] to keep it that way.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub city: String,
    pub timestamp: DateTime<Utc>,
    pub temperature: f64, // degrees, whatever unit the history was recorded in
    pub season: Season,
}

impl Reading {
    pub fn new(
        city: impl Into<String>,
        timestamp: DateTime<Utc>,
        temperature: f64,
        seasons: &SeasonMapping,
    ) -> Self {
        Self {
            city: city.into(),
            timestamp,
            temperature,
            season: seasons.season_of(timestamp),
        }
    }
}

/// The readings of exactly one city, ordered by timestamp.
///
/// A `Series` is immutable once built. Every computation over it produces a
/// new value instead of annotating the series in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    city: String,
    readings: Vec<Reading>,
}

impl Series {
    /// Validates and sorts `readings` into a series for `city`.
    ///
    /// Readings with equal timestamps keep their input order. Fails with
    /// `MalformedInput` if any reading belongs to another city or carries a
    /// non-finite temperature.
    pub fn new(city: impl Into<String>, mut readings: Vec<Reading>) -> Result<Self, MonitorError> {
        let city = city.into();

        for reading in &readings {
            if reading.city != city {
                return Err(MonitorError::malformed(
                    None,
                    format!("reading for '{}' in series for '{}'", reading.city, city),
                ));
            }
            if !reading.temperature.is_finite() {
                return Err(MonitorError::malformed(
                    None,
                    format!(
                        "non-finite temperature {} at {} for '{}'",
                        reading.temperature, reading.timestamp, city
                    ),
                ));
            }
        }

        readings.sort_by_key(|r| r.timestamp);
        Ok(Self { city, readings })
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn temperatures(&self) -> impl Iterator<Item = f64> + '_ {
        self.readings.iter().map(|r| r.temperature)
    }
}

// ---------------------------------------------------------------------------
// Rolling statistics
// ---------------------------------------------------------------------------

/// Windowed statistics at one series position.
///
/// Both fields are `None` until a full window of history is available;
/// `stddev` also stays `None` for a window of one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RollingStat {
    pub mean: Option<f64>,
    pub stddev: Option<f64>,
}

/// Rolling statistics aligned index-for-index with the series they were
/// computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingWindowResult {
    pub window: NonZeroUsize,
    pub points: Vec<RollingStat>,
}

impl RollingWindowResult {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// One reading together with its rolling statistics and anomaly flag.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedPoint {
    pub reading: Reading,
    pub mean: Option<f64>,
    pub stddev: Option<f64>,
    pub is_anomaly: bool,
}

/// A series annotated with rolling statistics, in the series' order.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedSeries {
    pub city: String,
    pub window: NonZeroUsize,
    pub sigma_multiplier: f64,
    pub points: Vec<AnnotatedPoint>,
}

impl AnnotatedSeries {
    /// The flagged points, oldest first.
    pub fn anomalies(&self) -> impl Iterator<Item = &AnnotatedPoint> + '_ {
        self.points.iter().filter(|p| p.is_anomaly)
    }

    pub fn anomaly_count(&self) -> usize {
        self.anomalies().count()
    }
}

// ---------------------------------------------------------------------------
// Seasonal baselines
// ---------------------------------------------------------------------------

/// Aggregate statistics for one season of a city's history.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SeasonStats {
    pub mean: Option<f64>,   // None when count == 0
    pub stddev: Option<f64>, // None when count < 2
    pub count: usize,
}

/// A season entry whose mean and standard deviation are both defined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonalBaseline {
    pub season: Season,
    pub mean: f64,
    pub stddev: f64,
}

/// Per-season baselines for one city. Every season has an entry, possibly
/// with a zero count.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalProfile {
    city: String,
    seasons: BTreeMap<Season, SeasonStats>,
}

impl SeasonalProfile {
    /// Builds a profile from known entries; seasons missing from `entries`
    /// get an empty entry.
    pub fn from_entries(
        city: impl Into<String>,
        entries: impl IntoIterator<Item = (Season, SeasonStats)>,
    ) -> Self {
        let mut seasons: BTreeMap<Season, SeasonStats> =
            Season::ALL.iter().map(|s| (*s, SeasonStats::default())).collect();
        seasons.extend(entries);
        Self {
            city: city.into(),
            seasons,
        }
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn get(&self, season: Season) -> SeasonStats {
        self.seasons.get(&season).copied().unwrap_or_default()
    }

    /// Returns the usable baseline for `season`, or `NoDataForSeason` when
    /// the season has fewer than two readings.
    pub fn baseline(&self, season: Season) -> Result<SeasonalBaseline, MonitorError> {
        let stats = self.get(season);
        match (stats.mean, stats.stddev) {
            (Some(mean), Some(stddev)) => Ok(SeasonalBaseline {
                season,
                mean,
                stddev,
            }),
            _ => Err(MonitorError::NoDataForSeason(season)),
        }
    }

    /// Entries in calendar order of the seasons.
    pub fn iter(&self) -> impl Iterator<Item = (Season, SeasonStats)> + '_ {
        self.seasons.iter().map(|(s, stats)| (*s, *stats))
    }

    pub fn total_count(&self) -> usize {
        self.seasons.values().map(|s| s.count).sum()
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Outcome of comparing a live temperature with its seasonal baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassificationVerdict {
    Normal,
    Anomalous,
    /// The season has too little history to judge against.
    Indeterminate,
}

impl fmt::Display for ClassificationVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationVerdict::Normal => write!(f, "normal"),
            ClassificationVerdict::Anomalous => write!(f, "anomalous"),
            ClassificationVerdict::Indeterminate => write!(f, "indeterminate"),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised while loading history, fetching live data or aligning
/// derived statistics.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// A history row or reading failed validation at the load boundary.
    #[error("malformed input{}: {reason}", .line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    MalformedInput { line: Option<u64>, reason: String },

    /// The requested season has fewer than two historical readings.
    #[error("no data for season {0}")]
    NoDataForSeason(Season),

    /// Rolling statistics were computed for a different series.
    #[error("rolling result has {rolling_len} points but the series has {series_len}")]
    MisalignedRolling { series_len: usize, rolling_len: usize },

    /// The live temperature source could not produce a value.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MonitorError {
    pub fn malformed(line: Option<u64>, reason: impl Into<String>) -> Self {
        MonitorError::MalformedInput {
            line,
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
