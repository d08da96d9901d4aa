//! Append-only reading log.
//!
//! Readings are appended to a JSONL (JSON Lines) file with file locking
//! to ensure safe concurrent access.

use crate::{Reading, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Default file name of the reading log inside the data directory
pub const READINGS_FILE: &str = "readings.jsonl";

/// Reading sink trait for persisting readings
pub trait ReadingSink {
    fn append(&mut self, reading: &Reading) -> Result<()>;
}

/// JSONL-based reading sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl ReadingSink for JsonlSink {
    fn append(&mut self, reading: &Reading) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(reading)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended reading {} to {:?}", reading.id, self.path);
        Ok(())
    }
}

/// Read all readings from a log file
///
/// Missing file means no readings. Corrupt lines are skipped with a warning.
pub fn read_readings(path: &Path) -> Result<Vec<Reading>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut readings = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Reading>(&line) {
            Ok(reading) => readings.push(reading),
            Err(e) => {
                tracing::warn!("Failed to parse reading at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} readings from {:?}", readings.len(), path);
    Ok(readings)
}
