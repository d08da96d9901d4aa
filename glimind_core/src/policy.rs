//! Dosage policy table.
//!
//! Holds the band thresholds and unit counts in one place so the classifier
//! is a table lookup plus a midday predicate.
//!
//! | Band                 | mg/dL       | Severity | Midday | Other |
//! |----------------------|-------------|----------|--------|-------|
//! | Hypoglycemia         | < 70        | Danger   | -      | -     |
//! | Normal               | 70 ..= 139  | Success  | 1      | 0     |
//! | Elevated             | 140 ..= 250 | Warning  | 2      | 1     |
//! | Severe hyperglycemia | > 250       | Danger   | 3      | 2     |

use crate::types::{Band, Severity};
use once_cell::sync::Lazy;

/// First hour (inclusive) of the midday window
pub const MIDDAY_START_HOUR: u32 = 11;
/// Last hour (inclusive) of the midday window
pub const MIDDAY_END_HOUR: u32 = 14;

/// Insulin units prescribed for a band
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dose {
    pub midday: u32,
    pub other: u32,
}

/// One row of the dosage table. Bounds are inclusive; `None` is unbounded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DosageBand {
    pub band: Band,
    pub severity: Severity,
    pub min: Option<i32>,
    pub max: Option<i32>,
    pub dose: Option<Dose>,
}

impl DosageBand {
    pub fn contains(&self, level: i32) -> bool {
        self.min.map_or(true, |min| level >= min) && self.max.map_or(true, |max| level <= max)
    }

    pub fn units(&self, midday: bool) -> Option<u32> {
        self.dose
            .map(|dose| if midday { dose.midday } else { dose.other })
    }
}

/// Ordered, non-overlapping set of glucose bands
#[derive(Clone, Debug)]
pub struct DosageTable {
    bands: Vec<DosageBand>,
}

/// Cached standard table - built once and shared
static STANDARD_TABLE: Lazy<DosageTable> = Lazy::new(DosageTable::build_standard);

impl DosageTable {
    /// The canonical table
    pub fn standard() -> &'static DosageTable {
        &STANDARD_TABLE
    }

    fn build_standard() -> DosageTable {
        DosageTable {
            bands: vec![
                DosageBand {
                    band: Band::Hypoglycemia,
                    severity: Severity::Danger,
                    min: None,
                    max: Some(69),
                    dose: None,
                },
                DosageBand {
                    band: Band::Normal,
                    severity: Severity::Success,
                    min: Some(70),
                    max: Some(139),
                    dose: Some(Dose { midday: 1, other: 0 }),
                },
                DosageBand {
                    band: Band::Elevated,
                    severity: Severity::Warning,
                    min: Some(140),
                    max: Some(250),
                    dose: Some(Dose { midday: 2, other: 1 }),
                },
                DosageBand {
                    band: Band::SevereHyperglycemia,
                    severity: Severity::Danger,
                    min: Some(251),
                    max: None,
                    dose: Some(Dose { midday: 3, other: 2 }),
                },
            ],
        }
    }

    pub fn bands(&self) -> &[DosageBand] {
        &self.bands
    }

    /// Row for a band index, if any
    pub fn row(&self, index: usize) -> Option<&DosageBand> {
        self.bands.get(index)
    }

    /// Band containing `level`
    pub fn band_for(&self, level: i32) -> Band {
        self.bands
            .iter()
            .find(|row| row.contains(level))
            .map(|row| row.band)
            .unwrap_or(Band::Hypoglycemia)
    }

    /// Unit count for a band index and midday flag
    pub fn units_for(&self, index: usize, midday: bool) -> Option<u32> {
        self.row(index).and_then(|row| row.units(midday))
    }

    /// Validate the table for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let Some(first) = self.bands.first() else {
            errors.push("Dosage table has no bands".to_string());
            return errors;
        };
        if first.min.is_some() {
            errors.push(format!("Lowest band {:?} must be unbounded below", first.band));
        }
        if first.dose.is_some() {
            errors.push(format!("Lowest band {:?} must not prescribe insulin", first.band));
        }

        if let Some(last) = self.bands.last() {
            if last.max.is_some() {
                errors.push(format!("Highest band {:?} must be unbounded above", last.band));
            }
        }

        for (index, row) in self.bands.iter().enumerate() {
            if row.band.index() != index {
                errors.push(format!(
                    "Band {:?} is at position {} but has index {}",
                    row.band,
                    index,
                    row.band.index()
                ));
            }
            if let (Some(min), Some(max)) = (row.min, row.max) {
                if min > max {
                    errors.push(format!("Band {:?} has min {} > max {}", row.band, min, max));
                }
            }
            if let Some(dose) = row.dose {
                if dose.midday < dose.other {
                    errors.push(format!(
                        "Band {:?} prescribes fewer midday units than otherwise",
                        row.band
                    ));
                }
            }
        }

        for pair in self.bands.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            match (lower.max, upper.min) {
                (Some(max), Some(min)) if max + 1 == min => {}
                _ => errors.push(format!(
                    "Bands {:?} and {:?} are not contiguous",
                    lower.band, upper.band
                )),
            }
        }

        errors
    }
}

/// Band containing `level` in the standard table
pub fn band_for(level: i32) -> Band {
    DosageTable::standard().band_for(level)
}

/// Unit count for a band index and midday flag in the standard table
pub fn units_for(index: usize, midday: bool) -> Option<u32> {
    DosageTable::standard().units_for(index, midday)
}

/// Severity of a band in the standard table
pub fn severity_for(band: Band) -> Severity {
    DosageTable::standard()
        .row(band.index())
        .map(|row| row.severity)
        .unwrap_or(Severity::Danger)
}

/// Whether an hour of day falls in the lunch window
pub fn is_midday_hour(hour: u32) -> bool {
    (MIDDAY_START_HOUR..=MIDDAY_END_HOUR).contains(&hour)
}
