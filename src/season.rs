//! Calendar month → season assignment.
//!
//! The same `SeasonMapping` value must be used when building seasonal
//! profiles and when classifying a live reading; a profile built under one
//! taxonomy and queried under another compares against the wrong baseline.
//! The mapping is configuration (see `config::SeasonsConfig`) and is never
//! inferred from the data.
//!
//! Months are taken from the instant in UTC.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Autumn];

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = String;

    /// Case-insensitive; accepts "fall" for autumn.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "winter" => Ok(Season::Winter),
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "autumn" | "fall" => Ok(Season::Autumn),
            other => Err(format!("unknown season '{}'", other)),
        }
    }
}

/// Fixed assignment of each calendar month to a season.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonMapping {
    by_month: [Season; 12], // index 0 = January
}

impl SeasonMapping {
    pub fn new(by_month: [Season; 12]) -> Self {
        Self { by_month }
    }

    /// Builds a mapping from per-season month lists (1 = January).
    ///
    /// Every month must be assigned exactly once.
    pub fn from_month_lists(lists: &[(Season, Vec<u32>)]) -> Result<Self, String> {
        let mut slots: [Option<Season>; 12] = [None; 12];

        for (season, months) in lists {
            for &month in months {
                if !(1..=12).contains(&month) {
                    return Err(format!("month {} for {} is outside 1..=12", month, season));
                }
                let slot = &mut slots[(month - 1) as usize];
                if let Some(existing) = slot {
                    return Err(format!(
                        "month {} assigned to both {} and {}",
                        month, existing, season
                    ));
                }
                *slot = Some(*season);
            }
        }

        let mut by_month = [Season::Winter; 12];
        for (i, slot) in slots.iter().enumerate() {
            by_month[i] = slot.ok_or_else(|| format!("month {} has no season", i + 1))?;
        }
        Ok(Self { by_month })
    }

    pub fn season_of(&self, instant: DateTime<Utc>) -> Season {
        self.by_month[instant.month0() as usize]
    }

    /// Season for a 1-based month number, `None` outside 1..=12.
    pub fn season_of_month(&self, month: u32) -> Option<Season> {
        month
            .checked_sub(1)
            .and_then(|i| self.by_month.get(i as usize))
            .copied()
    }

    /// Months assigned to `season`, ascending.
    pub fn months_of(&self, season: Season) -> Vec<u32> {
        (1..=12u32)
            .filter(|m| self.by_month[(m - 1) as usize] == season)
            .collect()
    }
}

impl Default for SeasonMapping {
    /// Meteorological seasons: Dec–Feb winter, Mar–May spring, Jun–Aug
    /// summer, Sep–Nov autumn.
    fn default() -> Self {
        use Season::*;
        Self::new([
            Winter, Winter, Spring, Spring, Spring, Summer, Summer, Summer, Autumn, Autumn,
            Autumn, Winter,
        ])
    }
}
