//! End-to-end checks of the statistical core through the public API.
//!
//! Each scenario builds a small synthetic history, runs it through rolling
//! statistics, anomaly detection, seasonal profiling and classification, and
//! checks the documented outcome.
//!
//! Run with: cargo test --test core_scenarios

use std::num::NonZeroUsize;

use chrono::{DateTime, Duration, TimeZone, Utc};

use tempmon_service::config::{load_config, AnalysisConfig};
use tempmon_service::model::{SeasonStats, DEFAULT_WINDOW};
use tempmon_service::{
    annotate, build_seasonal_profile, classify, compute_rolling, detect_anomalies,
    ClassificationVerdict, MonitorError, Reading, Season, SeasonMapping, SeasonalProfile, Series,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn daily_series(city: &str, start: DateTime<Utc>, temps: &[f64]) -> Series {
    let seasons = SeasonMapping::default();
    let readings = temps
        .iter()
        .enumerate()
        .map(|(i, t)| Reading::new(city, start + Duration::days(i as i64), *t, &seasons))
        .collect();
    Series::new(city, readings).expect("synthetic series is valid")
}

fn spring_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 3, 1, 0, 0, 0).unwrap()
}

fn window(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

// ---------------------------------------------------------------------------
// Rolling Window Scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_constant_series_has_zero_spread_and_no_anomalies() {
    let series = daily_series("Quito", spring_start(), &[10.0; 35]);
    let rolling = compute_rolling(&series, DEFAULT_WINDOW);

    let defined: Vec<f64> = rolling.points.iter().filter_map(|p| p.stddev).collect();
    assert_eq!(defined.len(), 6);
    assert!(defined.iter().all(|s| *s == 0.0));
    assert!(rolling.points[29..].iter().all(|p| p.mean == Some(10.0)));

    let flags = detect_anomalies(&series, &rolling, 2.0).unwrap();
    assert!(flags.iter().all(|f| !f));
}

#[test]
fn test_series_shorter_than_window_is_never_flagged() {
    let temps: Vec<f64> = (0..29).map(|i| if i == 28 { 90.0 } else { 10.0 + i as f64 * 0.1 }).collect();
    let series = daily_series("Quito", spring_start(), &temps);
    let rolling = compute_rolling(&series, DEFAULT_WINDOW);

    assert_eq!(rolling.len(), 29);
    assert!(rolling.points.iter().all(|p| p.mean.is_none() && p.stddev.is_none()));
    assert!(detect_anomalies(&series, &rolling, 2.0).unwrap().iter().all(|f| !f));
}

#[test]
fn test_single_spike_after_flat_history_is_the_only_anomaly() {
    let mut temps = vec![10.0; 29];
    temps.push(100.0);
    let series = daily_series("Quito", spring_start(), &temps);
    let rolling = compute_rolling(&series, DEFAULT_WINDOW);
    let annotated = annotate(&series, &rolling, 2.0).unwrap();

    let flagged: Vec<f64> = annotated.anomalies().map(|p| p.reading.temperature).collect();
    assert_eq!(flagged, vec![100.0]);
    assert_eq!(annotated.window, DEFAULT_WINDOW);
}

#[test]
fn test_window_equal_to_length_defines_only_the_last_position() {
    let series = daily_series("Quito", spring_start(), &[1.0, 4.0, 2.0, 8.0, 5.0]);
    let rolling = compute_rolling(&series, window(5));
    let defined: Vec<usize> = (0..rolling.len()).filter(|i| rolling.points[*i].mean.is_some()).collect();
    assert_eq!(defined, vec![4]);
    assert_eq!(rolling.points[4].mean, Some(4.0));
}

#[test]
fn test_rolling_result_from_other_series_is_rejected() {
    let long = daily_series("Quito", spring_start(), &[1.0; 10]);
    let short = daily_series("Quito", spring_start(), &[1.0; 9]);
    let rolling = compute_rolling(&short, window(3));
    assert!(matches!(
        detect_anomalies(&long, &rolling, 2.0),
        Err(MonitorError::MisalignedRolling { series_len: 10, rolling_len: 9 })
    ));
}

#[test]
fn test_unsorted_input_is_analyzed_in_time_order() {
    let seasons = SeasonMapping::default();
    let t = |d: i64| spring_start() + Duration::days(d);
    let series = Series::new(
        "Quito",
        vec![
            Reading::new("Quito", t(2), 30.0, &seasons),
            Reading::new("Quito", t(0), 10.0, &seasons),
            Reading::new("Quito", t(1), 20.0, &seasons),
        ],
    )
    .unwrap();

    let rolling = compute_rolling(&series, window(2));
    assert_eq!(rolling.points[1].mean, Some(15.0));
    assert_eq!(rolling.points[2].mean, Some(25.0));
}

// ---------------------------------------------------------------------------
// Seasonal Classification Scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_season_with_single_reading_is_indeterminate() {
    let seasons = SeasonMapping::default();
    let series = Series::new(
        "Helsinki",
        vec![
            Reading::new("Helsinki", Utc.with_ymd_and_hms(2022, 1, 10, 6, 0, 0).unwrap(), -8.0, &seasons),
            Reading::new("Helsinki", Utc.with_ymd_and_hms(2022, 7, 10, 6, 0, 0).unwrap(), 18.0, &seasons),
            Reading::new("Helsinki", Utc.with_ymd_and_hms(2022, 7, 11, 6, 0, 0).unwrap(), 21.0, &seasons),
        ],
    )
    .unwrap();
    let profile = build_seasonal_profile(&series, &seasons);
    assert_eq!(profile.get(Season::Winter).count, 1);
    assert!(matches!(profile.baseline(Season::Winter), Err(MonitorError::NoDataForSeason(Season::Winter))));

    let january = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
    assert_eq!(classify(&profile, &seasons, january, -5.0), ClassificationVerdict::Indeterminate);
}

#[test]
fn test_two_sigma_band_is_inclusive() {
    // summer readings -5, 0, 5: mean 0, sample stddev exactly 5
    let seasons = SeasonMapping::default();
    let series = daily_series("Lisbon", Utc.with_ymd_and_hms(2022, 7, 1, 12, 0, 0).unwrap(), &[-5.0, 0.0, 5.0]);
    let profile = build_seasonal_profile(&series, &seasons);
    let summer = profile.baseline(Season::Summer).unwrap();
    assert_eq!(summer.mean, 0.0);
    assert_eq!(summer.stddev, 5.0);

    let august = Utc.with_ymd_and_hms(2024, 8, 2, 14, 0, 0).unwrap();
    assert_eq!(classify(&profile, &seasons, august, 10.0), ClassificationVerdict::Normal);
    assert_eq!(classify(&profile, &seasons, august, -10.0), ClassificationVerdict::Normal);
    assert_eq!(classify(&profile, &seasons, august, 10.01), ClassificationVerdict::Anomalous);
    assert_eq!(classify(&profile, &seasons, august, -10.01), ClassificationVerdict::Anomalous);
}

#[test]
fn test_accept_region_is_one_contiguous_interval() {
    let profile = SeasonalProfile::from_entries(
        "Lisbon",
        [(Season::Spring, SeasonStats { mean: Some(16.0), stddev: Some(2.5), count: 300 })],
    );
    let seasons = SeasonMapping::default();
    let april = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();

    let verdicts: Vec<ClassificationVerdict> = (0..=320)
        .map(|i| classify(&profile, &seasons, april, i as f64 * 0.1))
        .collect();

    // anomalous prefix, normal block, anomalous suffix
    let first_normal = verdicts.iter().position(|v| *v == ClassificationVerdict::Normal).unwrap();
    let last_normal = verdicts.iter().rposition(|v| *v == ClassificationVerdict::Normal).unwrap();
    assert!(verdicts[..first_normal].iter().all(|v| *v == ClassificationVerdict::Anomalous));
    assert!(verdicts[first_normal..=last_normal].iter().all(|v| *v == ClassificationVerdict::Normal));
    assert!(verdicts[last_normal + 1..].iter().all(|v| *v == ClassificationVerdict::Anomalous));
}

#[test]
fn test_profile_counts_cover_every_reading() {
    let start = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
    let temps: Vec<f64> = (0..730).map(|d| 12.0 + 10.0 * ((d as f64) / 58.0).sin()).collect();
    let series = daily_series("Lisbon", start, &temps);
    let seasons = SeasonMapping::default();

    let profile = build_seasonal_profile(&series, &seasons);
    assert_eq!(profile.total_count(), 730);
    assert!(Season::ALL.iter().all(|s| profile.baseline(*s).is_ok()));
    assert_eq!(profile, build_seasonal_profile(&series, &seasons));
}

// ---------------------------------------------------------------------------
// Shipped Configuration
// ---------------------------------------------------------------------------

#[test]
fn test_shipped_config_matches_defaults() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/tempmon.toml");
    let config = load_config(path).expect("shipped config must parse");
    assert_eq!(config.analysis, AnalysisConfig::default());
    assert_eq!(config.season_mapping().unwrap(), SeasonMapping::default());
    assert!(config.city_registry().unwrap().find_city("tokyo").is_some());
}
