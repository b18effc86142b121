//! Temperature anomaly monitoring.
//!
//! Loads per-city temperature history, flags readings outside a rolling
//! z-score band, builds per-season baselines and classifies live readings
//! against them.

pub mod alert;
pub mod analysis;
pub mod cities;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod monitor;
pub mod season;

pub use alert::seasonal_band::{classify, classify_now, classify_with};
pub use analysis::anomalies::{annotate, detect_anomalies};
pub use analysis::rolling::compute_rolling;
pub use analysis::seasonal::build_seasonal_profile;
pub use model::{
    AnnotatedSeries, ClassificationVerdict, MonitorError, Reading, RollingWindowResult,
    SeasonalProfile, Series,
};
pub use season::{Season, SeasonMapping};
