//! Reading history with a rolling day window.
//!
//! Advisories are never stored: viewing history re-runs the classifier
//! against each reading's stored value, time and meal tag.

use crate::classifier::Advisor;
use crate::types::{AlertResult, MeasuredAt, Reading};
use crate::{Error, Result};
use chrono::Duration;
use std::path::Path;
use std::str::FromStr;

/// Reporting period
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Period {
    Day,
    #[default]
    Week,
    Month,
}

impl Period {
    pub fn days(&self) -> i64 {
        match self {
            Period::Day => 1,
            Period::Week => 7,
            Period::Month => 30,
        }
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "24h" => Ok(Period::Day),
            "7d" => Ok(Period::Week),
            "30d" => Ok(Period::Month),
            other => Err(Error::Other(format!(
                "Unknown period '{}' (expected 24h, 7d or 30d)",
                other
            ))),
        }
    }
}

/// A reading with its freshly computed advisory
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    pub reading: Reading,
    pub advisory: AlertResult,
}

/// Load readings measured within the last `days` days of `now`
///
/// Returns readings sorted by measured_at (newest first).
pub fn load_recent_readings(path: &Path, now: MeasuredAt, days: i64) -> Result<Vec<Reading>> {
    let cutoff = now - Duration::days(days);

    let mut readings: Vec<Reading> = crate::wal::read_readings(path)?
        .into_iter()
        .filter(|r| r.measured_at >= cutoff)
        .collect();

    readings.sort_by(|a, b| b.measured_at.cmp(&a.measured_at));

    tracing::info!(
        "Loaded {} readings from last {} days",
        readings.len(),
        days
    );

    Ok(readings)
}

/// Most recently measured reading
pub fn latest_reading(readings: &[Reading]) -> Option<&Reading> {
    readings.iter().max_by_key(|r| r.measured_at)
}

/// Attach a recomputed advisory to each reading
pub fn with_advisories(readings: Vec<Reading>, advisor: &Advisor) -> Vec<HistoryEntry> {
    readings
        .into_iter()
        .map(|reading| {
            let advisory = advisor.classify(&reading.measurement());
            HistoryEntry { reading, advisory }
        })
        .collect()
}
