//! Structured logging for the temperature monitoring service
//!
//! Thin layer over `tracing`: every event carries the data source and, when
//! relevant, the city it concerns. `init_logger` installs a fmt subscriber
//! writing either to the console or to an append-mode log file.

use std::fmt;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::model::MonitorError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    History,
    OpenWeather,
    Analysis,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::History => write!(f, "CSV"),
            DataSource::OpenWeather => write!(f, "OWM"),
            DataSource::Analysis => write!(f, "CORE"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - the city is unknown upstream or no key is configured
    Expected,
    /// Unexpected failure - indicates service degradation or a configuration issue
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Subscriber Setup
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to open log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to install subscriber: {0}")]
    Install(String),
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logger(min_level: LogLevel, log_file: Option<&Path>) -> Result<(), LoggingError> {
    let builder = tracing_subscriber::fmt()
        .with_max_level(min_level.as_filter())
        .with_target(false);

    let installed = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.try_init(),
    };

    installed.map_err(|e| LoggingError::Install(e.to_string()))
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Log a general informational message
pub fn info(source: DataSource, city: Option<&str>, message: &str) {
    tracing::info!(source = %source, city = city.unwrap_or("-"), "{}", message);
}

/// Log a warning message
pub fn warn(source: DataSource, city: Option<&str>, message: &str) {
    tracing::warn!(source = %source, city = city.unwrap_or("-"), "{}", message);
}

/// Log an error message
pub fn error(source: DataSource, city: Option<&str>, message: &str) {
    tracing::error!(source = %source, city = city.unwrap_or("-"), "{}", message);
}

/// Log a debug message
pub fn debug(source: DataSource, city: Option<&str>, message: &str) {
    tracing::debug!(source = %source, city = city.unwrap_or("-"), "{}", message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a live-temperature failure from its error message
pub fn classify_upstream_failure(error_message: &str) -> FailureType {
    // 404 means the provider does not know the city, a missing key means
    // live checks were never configured
    if error_message.contains("HTTP 404") || error_message.contains("is not set") {
        FailureType::Expected
    }
    // Other HTTP errors might indicate service issues or a revoked key
    else if error_message.contains("HTTP") {
        FailureType::Unexpected
    }
    // Parse errors suggest API changes
    else if error_message.contains("unparseable") {
        FailureType::Unexpected
    }
    else {
        FailureType::Unknown
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a live-temperature failure with automatic classification
pub fn log_upstream_failure(city: &str, operation: &str, err: &MonitorError) {
    let error_msg = err.to_string();
    let failure_type = classify_upstream_failure(&error_msg);

    let message = format!(
        "{} failed [{}]: {}",
        operation,
        failure_type,
        error_msg
    );

    match failure_type {
        FailureType::Expected => debug(DataSource::OpenWeather, Some(city), &message),
        FailureType::Unexpected => error(DataSource::OpenWeather, Some(city), &message),
        FailureType::Unknown => warn(DataSource::OpenWeather, Some(city), &message),
    }
}

// ---------------------------------------------------------------------------
// Load Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of a history load
pub fn log_load_summary(rows: usize, cities: usize, season_mismatches: usize) {
    let message = format!(
        "History loaded: {} rows across {} cities, {} rows re-seasoned",
        rows,
        cities,
        season_mismatches
    );

    if season_mismatches == 0 {
        info(DataSource::History, None, &message);
    } else {
        warn(DataSource::History, None, &message);
    }
}
