//! Core domain types for GliMind.
//!
//! This module defines the fundamental types used throughout the system:
//! - Alert severities, glucose bands and advisory results
//! - Advisory policy switches (timing source, wording)
//! - Readings and the food items attached to them

use crate::labels::MealType;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Local wall-clock time of a measurement. No timezone is attached.
pub type MeasuredAt = NaiveDateTime;

// ============================================================================
// Advisory Types
// ============================================================================

/// Visual/clinical urgency of an alert
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Danger,
    Warning,
    Success,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Danger => "danger",
            Severity::Warning => "warning",
            Severity::Success => "success",
        }
    }
}

/// Glucose band, in ascending threshold order
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Hypoglycemia,
    Normal,
    Elevated,
    SevereHyperglycemia,
}

impl Band {
    /// All bands, lowest first
    pub const ALL: [Band; 4] = [
        Band::Hypoglycemia,
        Band::Normal,
        Band::Elevated,
        Band::SevereHyperglycemia,
    ];

    /// Position of this band in the dosage table
    pub fn index(self) -> usize {
        match self {
            Band::Hypoglycemia => 0,
            Band::Normal => 1,
            Band::Elevated => 2,
            Band::SevereHyperglycemia => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Band> {
        Band::ALL.get(index).copied()
    }
}

/// Result of classifying one glucose measurement
///
/// Computed on demand and never persisted. `insulin_units` is `None` only
/// for hypoglycemia.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertResult {
    pub band: Band,
    pub severity: Severity,
    pub message: String,
    pub recommendation: Option<String>,
    pub insulin_units: Option<u32>,
}

/// Source of the "midday" flag used to pick a dose
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimingPolicy {
    /// Hour-of-day of the measurement (11:00 through 14:59)
    #[default]
    Clock,
    /// Meal tag of the reading (pre/post lunch)
    MealTag,
}

/// Recommendation text style. Never affects severity or units.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Wording {
    /// "Apply insulin as medically advised"
    #[default]
    Generic,
    /// Spells out the unit count in the recommendation
    Dosed,
}

/// Input to the classifier
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Measurement {
    pub glucose_mg_dl: i32,
    pub measured_at: MeasuredAt,
    pub meal_type: Option<MealType>,
}

impl Measurement {
    pub fn new(glucose_mg_dl: i32, measured_at: MeasuredAt) -> Self {
        Self {
            glucose_mg_dl,
            measured_at,
            meal_type: None,
        }
    }

    pub fn with_meal_type(mut self, meal_type: MealType) -> Self {
        self.meal_type = Some(meal_type);
        self
    }
}

// ============================================================================
// Reading Types
// ============================================================================

/// A food item attached to a reading
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FoodItem {
    pub name: String,
    pub is_custom: bool,
    pub high_glycemic: bool,
    pub category: String,
}

/// A persisted glucose reading
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Reading {
    pub id: Uuid,
    pub glucose_mg_dl: i32,
    pub measured_at: MeasuredAt,
    pub meal_type: MealType,
    pub insulin_applied: bool,
    pub insulin_units: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub food_items: Vec<FoodItem>,
    pub recorded_at: DateTime<Utc>,
}

impl Reading {
    /// Classifier input for re-deriving this reading's advisory
    pub fn measurement(&self) -> Measurement {
        Measurement::new(self.glucose_mg_dl, self.measured_at).with_meal_type(self.meal_type)
    }
}
