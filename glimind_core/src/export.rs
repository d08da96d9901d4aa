//! CSV export of readings.
//!
//! Advisory columns are recomputed at export time from the stored value,
//! timestamp and meal tag.

use crate::classifier::{Advisor, MEASURED_AT_FORMAT};
use crate::{Error, Reading, Result};
use std::path::Path;
use tempfile::NamedTempFile;

/// Column names, in `CsvRow` field order
const HEADERS: [&str; 11] = [
    "id",
    "measured_at",
    "glucose_mg_dl",
    "meal_type",
    "meal_label",
    "insulin_applied",
    "insulin_units",
    "severity",
    "suggested_units",
    "foods",
    "notes",
];

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    measured_at: String,
    glucose_mg_dl: i32,
    meal_type: &'static str,
    meal_label: &'static str,
    insulin_applied: bool,
    insulin_units: Option<u32>,
    severity: &'static str,
    suggested_units: Option<u32>,
    foods: String,
    notes: Option<String>,
}

impl CsvRow {
    fn new(reading: &Reading, advisor: &Advisor) -> Self {
        let advisory = advisor.classify(&reading.measurement());
        let foods = reading
            .food_items
            .iter()
            .map(|f| {
                if f.high_glycemic {
                    format!("{} (Alto IG)", f.name)
                } else {
                    f.name.clone()
                }
            })
            .collect::<Vec<_>>()
            .join("; ");

        CsvRow {
            id: reading.id.to_string(),
            measured_at: reading.measured_at.format(MEASURED_AT_FORMAT).to_string(),
            glucose_mg_dl: reading.glucose_mg_dl,
            meal_type: reading.meal_type.key(),
            meal_label: reading.meal_type.label(),
            insulin_applied: reading.insulin_applied,
            insulin_units: reading.insulin_units,
            severity: advisory.severity.as_str(),
            suggested_units: advisory.insulin_units,
            foods,
            notes: reading.notes.clone(),
        }
    }
}

/// Write readings to a CSV file, replacing it atomically
///
/// This function:
/// 1. Writes header and rows to a temp file in the target directory
/// 2. Syncs the temp file to disk
/// 3. Renames it over the target
///
/// Returns the number of rows written.
pub fn export_csv(readings: &[Reading], advisor: &Advisor, path: &Path) -> Result<usize> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir()?,
    };
    std::fs::create_dir_all(&parent)?;

    let temp = NamedTempFile::new_in(&parent)?;

    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(temp.as_file());

        writer.write_record(HEADERS)?;
        for reading in readings {
            writer.serialize(CsvRow::new(reading, advisor))?;
        }
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Exported {} readings to {:?}", readings.len(), path);
    Ok(readings.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FoodItem;
    use crate::wal::tests::create_test_reading;

    #[test]
    fn test_export_writes_rows() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("out").join("readings.csv");

        let mut lunch = create_test_reading(200, "2024-03-10T12:30");
        lunch.insulin_applied = true;
        lunch.insulin_units = Some(2);
        lunch.food_items = vec![
            FoodItem {
                name: "Tapioca".into(),
                is_custom: false,
                high_glycemic: true,
                category: "Café da manhã".into(),
            },
            FoodItem {
                name: "Ovo cozido".into(),
                is_custom: false,
                high_glycemic: false,
                category: "Proteínas".into(),
            },
        ];
        let readings = vec![lunch, create_test_reading(60, "2024-03-10T08:00")];

        let count = export_csv(&readings, &Advisor::default(), &path).unwrap();
        assert_eq!(count, 2);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "id");
        assert_eq!(&headers[2], "glucose_mg_dl");

        let rows: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "2024-03-10T12:30");
        assert_eq!(&rows[0][7], "warning");
        assert_eq!(&rows[0][8], "2");
        assert_eq!(&rows[0][9], "Tapioca (Alto IG); Ovo cozido");
        assert_eq!(&rows[1][7], "danger");
        assert_eq!(&rows[1][8], "");
    }

    #[test]
    fn test_export_replaces_existing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("readings.csv");
        std::fs::write(&path, "old contents\n").unwrap();

        export_csv(&[], &Advisor::default(), &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("old contents"));
        assert_eq!(contents, format!("{}\n", HEADERS.join(",")));

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "readings.csv")
            .collect();
        assert!(extras.is_empty(), "Stray temp files: {:?}", extras);
    }
}
