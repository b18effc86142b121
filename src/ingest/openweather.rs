//! OpenWeatherMap current-conditions client
//!
//! Fetches the current temperature for a monitored city from the
//! OpenWeatherMap "current weather" endpoint. Registered cities are queried
//! by coordinates; any other name is passed through as a `q=` city query.
//!
//! API Documentation: https://openweathermap.org/current

use std::env;
use std::time::Duration;

use serde::Deserialize;

use crate::cities::CityRegistry;
use crate::config::LiveConfig;
use crate::model::MonitorError;

// ============================================================================
// Provider Seam
// ============================================================================

/// Source of one current temperature per city.
///
/// The monitor only depends on this trait, so tests can classify against a
/// fixed value without touching the network.
pub trait LiveTemperatureProvider {
    /// Current temperature for `city`, in the configured unit.
    fn current_temperature(&self, city: &str) -> Result<f64, MonitorError>;
}

// ============================================================================
// OpenWeatherMap Response Structures
// ============================================================================

/// Subset of the current-weather response the monitor reads.
#[derive(Debug, Deserialize)]
pub struct OwmCurrentResponse {
    pub main: OwmMain,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OwmMain {
    pub temp: f64,
    pub feels_like: Option<f64>,
    pub humidity: Option<f64>,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
struct OwmErrorBody {
    message: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

pub struct OpenWeatherClient {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    units: String,
    cities: CityRegistry,
}

impl OpenWeatherClient {
    pub fn new(config: &LiveConfig, api_key: impl Into<String>, cities: CityRegistry) -> Result<Self, MonitorError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MonitorError::UpstreamUnavailable(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            units: config.units.clone(),
            cities,
        })
    }

    /// Reads the API key from the environment variable named in `config`.
    pub fn from_env(config: &LiveConfig, cities: CityRegistry) -> Result<Self, MonitorError> {
        let api_key = env::var(&config.api_key_env).map_err(|_| {
            MonitorError::UpstreamUnavailable(format!(
                "environment variable {} is not set",
                config.api_key_env
            ))
        })?;
        Self::new(config, api_key, cities)
    }

    /// Request URL for `city`, coordinates when registered.
    pub fn build_current_url(&self, city: &str) -> Result<reqwest::Url, MonitorError> {
        let endpoint = format!("{}/weather", self.base_url);

        let mut params: Vec<(&str, String)> = match self.cities.find_city(city) {
            Some(known) => vec![
                ("lat", known.latitude.to_string()),
                ("lon", known.longitude.to_string()),
            ],
            None => vec![("q", city.trim().to_string())],
        };
        params.push(("appid", self.api_key.clone()));
        params.push(("units", self.units.clone()));

        reqwest::Url::parse_with_params(&endpoint, &params)
            .map_err(|e| MonitorError::UpstreamUnavailable(format!("invalid URL {}: {}", endpoint, e)))
    }
}

impl LiveTemperatureProvider for OpenWeatherClient {
    fn current_temperature(&self, city: &str) -> Result<f64, MonitorError> {
        let url = self.build_current_url(city)?;

        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .map_err(|e| MonitorError::UpstreamUnavailable(format!("request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| MonitorError::UpstreamUnavailable(format!("cannot read body: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<OwmErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("no reason").to_string());
            return Err(MonitorError::UpstreamUnavailable(format!(
                "HTTP {}: {}",
                status.as_u16(),
                message
            )));
        }

        parse_current_response(&body)
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Extract `main.temp` from a current-weather JSON body.
pub fn parse_current_response(body: &str) -> Result<f64, MonitorError> {
    let response: OwmCurrentResponse = serde_json::from_str(body)
        .map_err(|e| MonitorError::UpstreamUnavailable(format!("unparseable response: {}", e)))?;

    let temp = response.main.temp;
    if !temp.is_finite() {
        return Err(MonitorError::UpstreamUnavailable(format!(
            "unparseable response: non-finite temperature {}",
            temp
        )));
    }
    Ok(temp)
}

// ============================================================================
// Tests
// ============================================================================
