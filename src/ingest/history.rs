//! Historical temperature loader
//!
//! Reads a CSV history file with a header row. Required columns are
//! `city`, `timestamp` and `temperature`; an optional `season` column is
//! checked against the configured season mapping but never trusted over it.
//!
//! Rows may arrive in any order and interleave cities. The loader groups
//! them by city and hands each group to `Series::new`, which sorts by
//! timestamp.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::logging::{self, DataSource};
use crate::model::{MonitorError, Reading, Series};
use crate::season::{Season, SeasonMapping};

// ============================================================================
// Loader Output
// ============================================================================

/// Counters gathered while loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub rows_read: usize,
    pub cities: usize,
    /// Rows whose `season` column disagreed with the mapping.
    pub season_mismatches: usize,
}

/// One validated series per city, keyed and ordered by city name.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedHistory {
    pub series: BTreeMap<String, Series>,
    pub report: LoadReport,
}

impl LoadedHistory {
    /// Distinct city names in sorted order.
    pub fn city_names(&self) -> Vec<&str> {
        self.series.keys().map(String::as_str).collect()
    }

    /// Exact-match lookup first, then a case-insensitive one.
    pub fn series(&self, city: &str) -> Option<&Series> {
        self.series.get(city).or_else(|| {
            self.series
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(city.trim()))
                .map(|(_, s)| s)
        })
    }

    pub fn into_series(self) -> BTreeMap<String, Series> {
        self.series
    }
}

// ============================================================================
// Parsing Helpers
// ============================================================================

/// Parse a history timestamp into a UTC instant.
///
/// Accepts RFC 3339 (`2024-07-15T12:00:00Z`, any offset), naive
/// `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DDTHH:MM:SS` taken as UTC, and a bare
/// `YYYY-MM-DD` taken as midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn csv_error(err: csv::Error) -> MonitorError {
    let line = err.position().map(|p| p.line());
    MonitorError::malformed(line, err.to_string())
}

struct Columns {
    city: usize,
    timestamp: usize,
    temperature: usize,
    season: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, MonitorError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| {
                MonitorError::malformed(Some(1), format!("missing required column '{}'", name))
            })
        };

        Ok(Self {
            city: require("city")?,
            timestamp: require("timestamp")?,
            temperature: require("temperature")?,
            season: find("season"),
        })
    }
}

// ============================================================================
// Loader
// ============================================================================

/// Load CSV history from any reader.
///
/// Fails with `MalformedInput` (carrying the 1-based file line) on a
/// missing column, empty city, unparseable timestamp, unparseable or
/// non-finite temperature, or unknown season label.
pub fn load_history<R: Read>(reader: R, seasons: &SeasonMapping) -> Result<LoadedHistory, MonitorError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::from_headers(rdr.headers().map_err(csv_error)?)?;

    let mut grouped: BTreeMap<String, Vec<Reading>> = BTreeMap::new();
    let mut report = LoadReport::default();

    for (idx, record) in rdr.records().enumerate() {
        let record = record.map_err(csv_error)?;
        let line = record.position().map(|p| p.line()).unwrap_or(idx as u64 + 2);
        let field = |i: usize| record.get(i).unwrap_or("");

        let city = field(columns.city);
        if city.is_empty() {
            return Err(MonitorError::malformed(Some(line), "empty city"));
        }

        let raw_ts = field(columns.timestamp);
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| {
            MonitorError::malformed(Some(line), format!("unparseable timestamp '{}'", raw_ts))
        })?;

        let raw_temp = field(columns.temperature);
        let temperature = raw_temp
            .parse::<f64>()
            .ok()
            .filter(|t| t.is_finite())
            .ok_or_else(|| {
                MonitorError::malformed(Some(line), format!("invalid temperature '{}'", raw_temp))
            })?;

        let reading = Reading::new(city, timestamp, temperature, seasons);

        if let Some(raw_season) = columns.season.map(field).filter(|s| !s.is_empty()) {
            let stated = Season::from_str(raw_season)
                .map_err(|reason| MonitorError::malformed(Some(line), reason))?;
            if stated != reading.season {
                report.season_mismatches += 1;
                logging::debug(
                    DataSource::History,
                    Some(city),
                    &format!(
                        "line {}: season column says {}, mapping assigns {}",
                        line, stated, reading.season
                    ),
                );
            }
        }

        grouped.entry(city.to_string()).or_default().push(reading);
        report.rows_read += 1;
    }

    let series = grouped
        .into_iter()
        .map(|(city, readings)| Series::new(city.clone(), readings).map(|s| (city, s)))
        .collect::<Result<BTreeMap<_, _>, _>>()?;
    report.cities = series.len();

    logging::log_load_summary(report.rows_read, report.cities, report.season_mismatches);

    Ok(LoadedHistory { series, report })
}

/// Load CSV history from a file on disk.
pub fn load_history_file<P: AsRef<Path>>(
    path: P,
    seasons: &SeasonMapping,
) -> Result<LoadedHistory, MonitorError> {
    let file = File::open(path.as_ref())?;
    load_history(file, seasons)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn load(csv: &str) -> Result<LoadedHistory, MonitorError> {
        load_history(csv.as_bytes(), &SeasonMapping::default())
    }

    #[test]
    fn test_parse_timestamp_shapes() {
        let expected = Utc.with_ymd_and_hms(2023, 1, 5, 6, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2023-01-05T06:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2023-01-05T07:30:00+01:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-01-05 06:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-01-05T06:30:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2023-01-05"),
            Some(Utc.with_ymd_and_hms(2023, 1, 5, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("05/01/2023"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_groups_and_sorts_by_city() {
        let history = load(
            "city,timestamp,temperature\n\
             Oslo,2023-01-02,-4.0\n\
             Cairo,2023-01-01,18.5\n\
             Oslo,2023-01-01,-6.5\n",
        )
        .unwrap();

        assert_eq!(history.city_names(), vec!["Cairo", "Oslo"]);
        let oslo = history.series("Oslo").unwrap();
        let temps: Vec<f64> = oslo.temperatures().collect();
        assert_eq!(temps, vec![-6.5, -4.0]);
        assert_eq!(history.report.rows_read, 3);
        assert_eq!(history.report.cities, 2);
    }

    #[test]
    fn test_series_lookup_ignores_case() {
        let history = load("city,timestamp,temperature\nOslo,2023-01-02,-4.0\n").unwrap();
        assert!(history.series("oslo").is_some());
        assert!(history.series("Bergen").is_none());
    }

    #[test]
    fn test_column_order_and_header_case_are_free() {
        let history = load("Temperature,City,Timestamp\n12.5,Lima,2023-03-01 10:00:00\n").unwrap();
        assert_eq!(history.series("Lima").unwrap().len(), 1);
    }

    #[test]
    fn test_missing_column_is_malformed_at_header() {
        let err = load("city,timestamp\nOslo,2023-01-02\n").unwrap_err();
        match err {
            MonitorError::MalformedInput { line, reason } => {
                assert_eq!(line, Some(1));
                assert!(reason.contains("temperature"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_bad_values_report_their_line() {
        let cases = [
            "city,timestamp,temperature\nOslo,2023-01-02,1.0\nOslo,yesterday,2.0\n",
            "city,timestamp,temperature\nOslo,2023-01-02,1.0\nOslo,2023-01-03,warm\n",
            "city,timestamp,temperature\nOslo,2023-01-02,1.0\nOslo,2023-01-03,NaN\n",
            "city,timestamp,temperature\nOslo,2023-01-02,1.0\n,2023-01-03,2.0\n",
        ];
        for csv in cases {
            match load(csv).unwrap_err() {
                MonitorError::MalformedInput { line, .. } => assert_eq!(line, Some(3), "{csv}"),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_mapping_overrides_season_column() {
        let history = load(
            "city,timestamp,temperature,season\n\
             Oslo,2023-01-02,-4.0,winter\n\
             Oslo,2023-07-02,19.0,spring\n\
             Oslo,2023-10-02,8.0,\n",
        )
        .unwrap();
        assert_eq!(history.report.season_mismatches, 1);
        let seasons: Vec<Season> = history.series("Oslo").unwrap().readings().iter().map(|r| r.season).collect();
        assert_eq!(seasons, vec![Season::Winter, Season::Summer, Season::Autumn]);
    }

    #[test]
    fn test_unknown_season_label_is_malformed() {
        let err = load("city,timestamp,temperature,season\nOslo,2023-01-02,-4.0,monsoon\n").unwrap_err();
        assert!(matches!(err, MonitorError::MalformedInput { line: Some(2), .. }));
    }

    #[test]
    fn test_header_only_file_is_empty_history() {
        let history = load("city,timestamp,temperature\n").unwrap();
        assert!(history.series.is_empty());
        assert_eq!(history.report, LoadReport::default());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_history_file("/nonexistent/history.csv", &SeasonMapping::default()).unwrap_err();
        assert!(matches!(err, MonitorError::Io(_)));
    }
}
