//! Reading ingestion.
//!
//! Turns raw form input into a [`Reading`] in two steps:
//! 1. [`prepare`] validates the value and timestamp and runs the classifier
//!    as an advisory step. Nothing is saved.
//! 2. [`PreparedReading::confirm`] applies the user's decision about insulin.
//!    A suggested unit count is only ever a pre-fill; the user confirms or
//!    edits it.

use crate::classifier::{parse_measured_at, Advisor};
use crate::config::ValidationConfig;
use crate::labels::{MealType, CUSTOM_FOOD_CATEGORY};
use crate::types::{AlertResult, FoodItem, MeasuredAt, Measurement, Reading};
use crate::{Error, Result};
use chrono::Utc;
use std::str::FromStr;
use uuid::Uuid;

/// A food picked in the form
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FoodSelection {
    /// Item from the food catalog, carrying its catalog metadata
    Catalog {
        name: String,
        category: String,
        high_glycemic: bool,
    },
    /// Free-text item typed by the user
    Custom(String),
}

impl FoodSelection {
    /// Convert to a stored item; blank names yield `None`
    fn into_item(self) -> Option<FoodItem> {
        match self {
            FoodSelection::Catalog {
                name,
                category,
                high_glycemic,
            } => Some(FoodItem {
                name,
                is_custom: false,
                high_glycemic,
                category,
            }),
            FoodSelection::Custom(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Some(FoodItem {
                    name: name.to_string(),
                    is_custom: true,
                    high_glycemic: false,
                    category: CUSTOM_FOOD_CATEGORY.to_string(),
                })
            }
        }
    }
}

/// Parses `custom:NAME` or `NAME@CATEGORY`, with a trailing `!` marking a
/// high-glycemic catalog item.
impl FromStr for FoodSelection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(name) = s.strip_prefix("custom:") {
            return Ok(FoodSelection::Custom(name.to_string()));
        }

        let (name, category) = s.split_once('@').ok_or_else(|| {
            Error::Ingestion(format!(
                "Food '{}' must be NAME@CATEGORY or custom:NAME",
                s
            ))
        })?;

        let (category, high_glycemic) = match category.strip_suffix('!') {
            Some(category) => (category, true),
            None => (category, false),
        };

        let name = name.trim();
        let category = category.trim();
        if name.is_empty() || category.is_empty() {
            return Err(Error::Ingestion(format!(
                "Food '{}' has an empty name or category",
                s
            )));
        }

        Ok(FoodSelection::Catalog {
            name: name.to_string(),
            category: category.to_string(),
            high_glycemic,
        })
    }
}

/// Raw form input for a new reading
#[derive(Clone, Debug)]
pub struct ReadingDraft {
    pub glucose: String,
    pub measured_at: String,
    pub meal_type: MealType,
    pub foods: Vec<FoodSelection>,
    pub notes: Option<String>,
}

/// User's decision about insulin for a prepared reading
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Confirmation {
    pub insulin_applied: bool,
    /// Units entered by the user; overrides the suggestion
    pub units: Option<u32>,
}

impl Confirmation {
    pub fn not_applied() -> Self {
        Self::default()
    }

    /// Applied with whatever the advisory suggested
    pub fn accept_suggestion() -> Self {
        Self {
            insulin_applied: true,
            units: None,
        }
    }

    pub fn applied(units: u32) -> Self {
        Self {
            insulin_applied: true,
            units: Some(units),
        }
    }
}

/// A validated draft plus its advisory, awaiting confirmation
#[derive(Clone, Debug)]
pub struct PreparedReading {
    pub glucose_mg_dl: i32,
    pub measured_at: MeasuredAt,
    pub meal_type: MealType,
    pub food_items: Vec<FoodItem>,
    pub notes: Option<String>,
    pub advisory: AlertResult,
}

impl PreparedReading {
    /// Units to pre-fill in the insulin field
    pub fn suggested_units(&self) -> Option<u32> {
        self.advisory.insulin_units
    }

    /// Whether any selected food is high glycemic
    pub fn has_high_glycemic_food(&self) -> bool {
        self.food_items.iter().any(|f| f.high_glycemic)
    }

    /// Build the reading to persist from the user's confirmation
    ///
    /// A confirmation that resolves to zero units is stored as not applied.
    pub fn confirm(self, confirmation: Confirmation) -> Result<Reading> {
        let insulin_units = if confirmation.insulin_applied {
            let units = confirmation
                .units
                .or(self.advisory.insulin_units)
                .ok_or_else(|| {
                    Error::Ingestion(
                        "Insulin marked as applied but no unit count was given".into(),
                    )
                })?;
            Some(units).filter(|&u| u > 0)
        } else {
            None
        };
        let insulin_applied = insulin_units.is_some();

        if insulin_applied
            && confirmation.units.is_some()
            && confirmation.units != self.advisory.insulin_units
        {
            tracing::info!(
                suggested = ?self.advisory.insulin_units,
                entered = ?confirmation.units,
                "User changed suggested insulin units"
            );
        }

        Ok(Reading {
            id: Uuid::new_v4(),
            glucose_mg_dl: self.glucose_mg_dl,
            measured_at: self.measured_at,
            meal_type: self.meal_type,
            insulin_applied,
            insulin_units,
            notes: self.notes,
            food_items: self.food_items,
            recorded_at: Utc::now(),
        })
    }
}

/// Parse a user-entered glucose value
///
/// Accepts only whole numbers between 0 and the configured ceiling.
pub fn parse_glucose(input: &str, limits: &ValidationConfig) -> Result<i32> {
    let trimmed = input.trim();
    let value: i32 = trimmed
        .parse()
        .map_err(|_| Error::InvalidGlucose(format!("'{}' is not a whole number", input)))?;

    if value < 0 {
        return Err(Error::InvalidGlucose(format!("{} mg/dL is negative", value)));
    }
    if value > limits.max_glucose_mg_dl {
        return Err(Error::InvalidGlucose(format!(
            "{} mg/dL is above the plausible maximum of {}",
            value, limits.max_glucose_mg_dl
        )));
    }
    Ok(value)
}

/// Validate a draft and compute its advisory
pub fn prepare(
    draft: ReadingDraft,
    advisor: &Advisor,
    limits: &ValidationConfig,
) -> Result<PreparedReading> {
    let glucose_mg_dl = parse_glucose(&draft.glucose, limits)?;
    let measured_at = parse_measured_at(&draft.measured_at)?;

    let measurement =
        Measurement::new(glucose_mg_dl, measured_at).with_meal_type(draft.meal_type);
    let advisory = advisor.classify(&measurement);

    let food_items: Vec<FoodItem> = draft
        .foods
        .into_iter()
        .filter_map(FoodSelection::into_item)
        .collect();

    let notes = draft
        .notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    tracing::debug!(
        glucose = glucose_mg_dl,
        foods = food_items.len(),
        suggested = ?advisory.insulin_units,
        "Prepared reading"
    );

    Ok(PreparedReading {
        glucose_mg_dl,
        measured_at,
        meal_type: draft.meal_type,
        food_items,
        notes,
        advisory,
    })
}
