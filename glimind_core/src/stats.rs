//! Summary statistics over a set of readings.
//!
//! Distribution buckets follow the usual time-in-range reporting bands and
//! are independent of the dosage table.

use crate::classifier::Advisor;
use crate::labels::MealType;
use crate::types::{AlertResult, MeasuredAt, Reading, Severity};
use chrono::Duration;
use serde::Serialize;
use std::collections::BTreeMap;

/// Lower bound (inclusive) of the target range
pub const TARGET_RANGE_MIN: i32 = 70;
/// Upper bound (inclusive) of the target range
pub const TARGET_RANGE_MAX: i32 = 180;

/// Reading counts per reporting band
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Distribution {
    /// < 54
    pub very_low: usize,
    /// 54 ..= 69
    pub low: usize,
    /// 70 ..= 180
    pub normal: usize,
    /// 181 ..= 250
    pub high: usize,
    /// > 250
    pub very_high: usize,
}

impl Distribution {
    fn record(&mut self, value: i32) {
        match value {
            v if v < 54 => self.very_low += 1,
            v if v < 70 => self.low += 1,
            v if v <= 180 => self.normal += 1,
            v if v <= 250 => self.high += 1,
            _ => self.very_high += 1,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MealTypeStats {
    pub count: usize,
    pub average: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GlucoseStats {
    pub total: usize,
    pub average: i32,
    pub min: i32,
    pub max: i32,
    pub in_range: usize,
    pub total_insulin: u32,
    pub distribution: Distribution,
    pub by_meal_type: BTreeMap<MealType, MealTypeStats>,
}

fn rounded_mean(sum: i64, count: usize) -> i32 {
    if count == 0 {
        return 0;
    }
    (sum as f64 / count as f64).round() as i32
}

impl GlucoseStats {
    /// Compute statistics; an empty slice yields all zeros
    pub fn from_readings(readings: &[Reading]) -> Self {
        if readings.is_empty() {
            return Self::default();
        }

        let mut stats = GlucoseStats {
            total: readings.len(),
            min: i32::MAX,
            max: i32::MIN,
            ..Self::default()
        };

        let mut sum: i64 = 0;
        let mut meal_sums: BTreeMap<MealType, (usize, i64)> = BTreeMap::new();

        for reading in readings {
            let value = reading.glucose_mg_dl;
            sum += i64::from(value);
            stats.min = stats.min.min(value);
            stats.max = stats.max.max(value);

            if (TARGET_RANGE_MIN..=TARGET_RANGE_MAX).contains(&value) {
                stats.in_range += 1;
            }
            stats.distribution.record(value);

            if reading.insulin_applied {
                stats.total_insulin = stats
                    .total_insulin
                    .saturating_add(reading.insulin_units.unwrap_or(0));
            }

            let entry = meal_sums.entry(reading.meal_type).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += i64::from(value);
        }

        stats.average = rounded_mean(sum, readings.len());
        stats.by_meal_type = meal_sums
            .into_iter()
            .map(|(meal, (count, sum))| {
                (
                    meal,
                    MealTypeStats {
                        count,
                        average: rounded_mean(sum, count),
                    },
                )
            })
            .collect();

        stats
    }

    /// Share of readings in the target range, 0..=100
    pub fn time_in_range_percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.in_range as f64 / self.total as f64) * 100.0).round() as u32
    }
}

/// Whether it is time for a new measurement
///
/// True when the latest reading is more than `hours` away from `now`.
/// No readings at all also means a check is due.
pub fn needs_check(latest: Option<&Reading>, now: MeasuredAt, hours: i64) -> bool {
    match latest {
        Some(reading) => {
            let elapsed = now - reading.measured_at;
            elapsed.num_seconds().abs() > Duration::hours(hours).num_seconds()
        }
        None => true,
    }
}

/// Advisory for a reading in a critical band (below 70 or above 250)
pub fn critical_alert(reading: &Reading, advisor: &Advisor) -> Option<AlertResult> {
    let alert = advisor.classify(&reading.measurement());
    (alert.severity == Severity::Danger).then_some(alert)
}
