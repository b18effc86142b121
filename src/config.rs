//! Configuration parsing for the monitoring service.
//!
//! Every section of the TOML file is optional; a missing section takes the
//! defaults documented on each field.

use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::cities::{City, CityRegistry};
use crate::logging::LogLevel;
use crate::model::{DEFAULT_SIGMA_MULTIPLIER, DEFAULT_WINDOW};
use crate::season::{Season, SeasonMapping};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

// Main config structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub seasons: SeasonsConfig,

    // geography available to the live provider
    #[serde(default)]
    pub cities: Vec<City>,

    #[serde(default)]
    pub live: LiveConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MonitorConfig {
    /// Checks every section; `load_config` and `parse_config` call this.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analysis.validate()?;
        self.season_mapping()?;
        self.city_registry()?;
        self.live.validate()
    }

    pub fn season_mapping(&self) -> Result<SeasonMapping, ConfigError> {
        self.seasons.mapping()
    }

    pub fn city_registry(&self) -> Result<CityRegistry, ConfigError> {
        CityRegistry::new(self.cities.clone())
    }
}

// Rolling detector and classification band parameters
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AnalysisConfig {
    // readings per rolling window
    #[serde(default = "default_window")]
    pub window: NonZeroUsize,

    // half-width of the normal band, in standard deviations
    #[serde(default = "default_sigma_multiplier")]
    pub sigma_multiplier: f64,
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.sigma_multiplier.is_finite() || self.sigma_multiplier < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "sigma_multiplier must be finite and non-negative, got {}",
                self.sigma_multiplier
            )));
        }
        Ok(())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            sigma_multiplier: default_sigma_multiplier(),
        }
    }
}

// Month lists per season (1 = January)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeasonsConfig {
    #[serde(default = "default_winter")]
    pub winter: Vec<u32>,
    #[serde(default = "default_spring")]
    pub spring: Vec<u32>,
    #[serde(default = "default_summer")]
    pub summer: Vec<u32>,
    #[serde(default = "default_autumn")]
    pub autumn: Vec<u32>,
}

impl SeasonsConfig {
    pub fn mapping(&self) -> Result<SeasonMapping, ConfigError> {
        SeasonMapping::from_month_lists(&[
            (Season::Winter, self.winter.clone()),
            (Season::Spring, self.spring.clone()),
            (Season::Summer, self.summer.clone()),
            (Season::Autumn, self.autumn.clone()),
        ])
        .map_err(ConfigError::Invalid)
    }
}

impl Default for SeasonsConfig {
    fn default() -> Self {
        Self {
            winter: default_winter(),
            spring: default_spring(),
            summer: default_summer(),
            autumn: default_autumn(),
        }
    }
}

// OpenWeatherMap client settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LiveConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    // name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    // "metric", "imperial" or "standard"; must match the history's unit
    #[serde(default = "default_units")]
    pub units: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl LiveConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.units.as_str(), "metric" | "imperial" | "standard") {
            return Err(ConfigError::Invalid(format!(
                "units must be metric, imperial or standard, got '{}'",
                self.units
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".to_string()));
        }
        if self.api_key_env.trim().is_empty() {
            return Err(ConfigError::Invalid("api_key_env must not be empty".to_string()));
        }
        Ok(())
    }
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            units: default_units(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,

    // append log lines here instead of the console
    #[serde(default)]
    pub file: Option<PathBuf>,
}

// default value helpers for serde
fn default_window() -> NonZeroUsize {
    DEFAULT_WINDOW
}

fn default_sigma_multiplier() -> f64 {
    DEFAULT_SIGMA_MULTIPLIER
}

fn default_winter() -> Vec<u32> {
    vec![12, 1, 2]
}

fn default_spring() -> Vec<u32> {
    vec![3, 4, 5]
}

fn default_summer() -> Vec<u32> {
    vec![6, 7, 8]
}

fn default_autumn() -> Vec<u32> {
    vec![9, 10, 11]
}

fn default_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_api_key_env() -> String {
    "OPENWEATHER_API_KEY".to_string()
}

fn default_units() -> String {
    "metric".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<MonitorConfig, ConfigError> {
    let config: MonitorConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a TOML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<MonitorConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}
