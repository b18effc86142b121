//! Data collaborators feeding the statistical core.
//!
//! Submodules:
//! - `history`: CSV history loader, one validated `Series` per city.
//! - `openweather`: OpenWeatherMap client for current temperatures.

pub mod history;
pub mod openweather;
