//! Meal-context tags and their display labels.
//!
//! Labels live in a table built once and never mutated.

use crate::{Error, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Category assigned to foods the user typed in by hand
pub const CUSTOM_FOOD_CATEGORY: &str = "Personalizado";

/// Meal context a reading was taken in
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Fasting,
    PreBreakfast,
    PostBreakfast,
    PreLunch,
    PostLunch,
    PreDinner,
    PostDinner,
    Bedtime,
}

static MEAL_TYPE_LABELS: Lazy<HashMap<MealType, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (MealType::Fasting, "Ao acordar"),
        (MealType::PreBreakfast, "Pré café"),
        (MealType::PostBreakfast, "Pós café"),
        (MealType::PreLunch, "Pré almoço"),
        (MealType::PostLunch, "Pós almoço"),
        (MealType::PreDinner, "Pré jantar"),
        (MealType::PostDinner, "Pós jantar"),
        (MealType::Bedtime, "Antes de dormir"),
    ])
});

impl MealType {
    /// All meal types in display order
    pub const ALL: [MealType; 8] = [
        MealType::Fasting,
        MealType::PreBreakfast,
        MealType::PostBreakfast,
        MealType::PreLunch,
        MealType::PostLunch,
        MealType::PreDinner,
        MealType::PostDinner,
        MealType::Bedtime,
    ];

    /// Storage key (matches the serde representation)
    pub fn key(&self) -> &'static str {
        match self {
            MealType::Fasting => "fasting",
            MealType::PreBreakfast => "pre_breakfast",
            MealType::PostBreakfast => "post_breakfast",
            MealType::PreLunch => "pre_lunch",
            MealType::PostLunch => "post_lunch",
            MealType::PreDinner => "pre_dinner",
            MealType::PostDinner => "post_dinner",
            MealType::Bedtime => "bedtime",
        }
    }

    /// User-facing label
    pub fn label(&self) -> &'static str {
        MEAL_TYPE_LABELS.get(self).copied().unwrap_or_else(|| self.key())
    }

    /// Whether this tag marks a lunch event
    pub fn is_lunch(&self) -> bool {
        matches!(self, MealType::PreLunch | MealType::PostLunch)
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MealType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase().replace('-', "_");
        MealType::ALL
            .iter()
            .copied()
            .find(|m| m.key() == key)
            .ok_or_else(|| Error::Other(format!("Unknown meal type: {}", s)))
    }
}
