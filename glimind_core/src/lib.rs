#![forbid(unsafe_code)]

//! Core domain model and advisory logic for GliMind.
//!
//! This crate provides:
//! - Domain types (alerts, readings, food items)
//! - Dosage policy table and glucose classifier
//! - Reading ingestion with user-confirmed insulin suggestions
//! - Persistence (JSONL reading log, CSV export)
//! - History loading and summary statistics

pub mod types;
pub mod error;
pub mod labels;
pub mod config;
pub mod logging;
pub mod policy;
pub mod classifier;
pub mod ingest;
pub mod wal;
pub mod history;
pub mod stats;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use labels::MealType;
pub use config::Config;
pub use policy::{band_for, is_midday_hour, units_for, DosageTable};
pub use classifier::{classify, classify_checked, classify_str, parse_measured_at, Advisor};
pub use ingest::{prepare, Confirmation, PreparedReading};
pub use wal::{JsonlSink, ReadingSink};
pub use history::{load_recent_readings, with_advisories, HistoryEntry, Period};
pub use stats::GlucoseStats;
pub use export::export_csv;
