//! City registry for the temperature monitoring service.
//!
//! Holds the geography the live provider needs: each monitored city's name
//! and WGS84 coordinates. The registry is built from configuration
//! (`[[cities]]` in the TOML file) rather than compiled-in tables, so tests
//! and deployments can substitute their own geography.
//!
//! Cities that appear in the history but not in the registry are still
//! analyzed; the live provider then falls back to querying by name.

use serde::Deserialize;

use crate::config::ConfigError;

// ---------------------------------------------------------------------------
// City metadata
// ---------------------------------------------------------------------------

/// Metadata for a single monitored city.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct City {
    /// Name as it appears in the `city` column of the history file.
    pub name: String,
    /// WGS84 latitude.
    pub latitude: f64,
    /// WGS84 longitude.
    pub longitude: f64,
}

/// Validated set of cities, in configuration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CityRegistry {
    cities: Vec<City>,
}

impl CityRegistry {
    /// Validates coordinates and rejects duplicate names (case-insensitive).
    pub fn new(cities: Vec<City>) -> Result<Self, ConfigError> {
        let mut seen = std::collections::HashSet::new();

        for city in &cities {
            if city.name.trim().is_empty() {
                return Err(ConfigError::Invalid("city with empty name".to_string()));
            }
            if !seen.insert(city.name.to_lowercase()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate city '{}' in registry",
                    city.name
                )));
            }
            if !(-90.0..=90.0).contains(&city.latitude) {
                return Err(ConfigError::Invalid(format!(
                    "latitude {} for '{}' is outside [-90, 90]",
                    city.latitude, city.name
                )));
            }
            if !(-180.0..=180.0).contains(&city.longitude) {
                return Err(ConfigError::Invalid(format!(
                    "longitude {} for '{}' is outside [-180, 180]",
                    city.longitude, city.name
                )));
            }
        }

        Ok(Self { cities })
    }

    /// Looks up a city by name, ignoring case. Returns `None` if not found.
    pub fn find_city(&self, name: &str) -> Option<&City> {
        self.cities
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Names of all registered cities, in configuration order.
    pub fn city_names(&self) -> Vec<&str> {
        self.cities.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
