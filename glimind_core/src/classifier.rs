//! Glucose classifier.
//!
//! Maps a measurement to an [`AlertResult`]: band and severity from the
//! dosage table, units from the table and the midday flag, text from the
//! selected wording. Pure and deterministic; safe to call from any thread.

use crate::policy::{self, DosageTable};
use crate::types::{AlertResult, Band, MeasuredAt, Measurement, TimingPolicy, Wording};
use crate::{Error, Result};
use chrono::{NaiveDateTime, Timelike};

/// Format produced by a `datetime-local` form control
pub const MEASURED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M";
const MEASURED_AT_FORMAT_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";

const GENERIC_INSULIN_ADVICE: &str = "Aplique insulina conforme orientação médica.";
const HYPO_ADVICE: &str = "Ingerir imediatamente um carboidrato de rápida absorção \
(como suco, mel ou balas). Reavaliar em 15 minutos.";

/// Classifier configured with a timing source and wording
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Advisor {
    pub timing: TimingPolicy,
    pub wording: Wording,
}

impl Advisor {
    pub fn new(timing: TimingPolicy, wording: Wording) -> Self {
        Self { timing, wording }
    }

    /// Whether the measurement counts as a lunch-time measurement
    pub fn is_midday(&self, measurement: &Measurement) -> bool {
        match self.timing {
            TimingPolicy::Clock => policy::is_midday_hour(measurement.measured_at.hour()),
            TimingPolicy::MealTag => measurement.meal_type.is_some_and(|m| m.is_lunch()),
        }
    }

    /// Classify a measurement. Total over all integers.
    pub fn classify(&self, measurement: &Measurement) -> AlertResult {
        let table = DosageTable::standard();
        let band = table.band_for(measurement.glucose_mg_dl);
        let midday = self.is_midday(measurement);
        let insulin_units = table.units_for(band.index(), midday);

        tracing::debug!(
            glucose = measurement.glucose_mg_dl,
            ?band,
            midday,
            "Classified glucose measurement"
        );

        AlertResult {
            band,
            severity: policy::severity_for(band),
            message: headline(band).to_string(),
            recommendation: Some(self.recommendation(band, midday, insulin_units)),
            insulin_units,
        }
    }

    fn recommendation(&self, band: Band, midday: bool, units: Option<u32>) -> String {
        if band == Band::Hypoglycemia {
            return HYPO_ADVICE.to_string();
        }

        match self.wording {
            Wording::Generic => GENERIC_INSULIN_ADVICE.to_string(),
            Wording::Dosed => dosed_recommendation(band, midday, units.unwrap_or(0)),
        }
    }
}

fn headline(band: Band) -> &'static str {
    match band {
        Band::Hypoglycemia => "Glicemia muito baixa!",
        Band::Normal => "Glicemia dentro do esperado",
        Band::Elevated => "Glicemia alta",
        Band::SevereHyperglycemia => "Glicemia muito alta!",
    }
}

fn units_phrase(units: u32) -> String {
    if units == 1 {
        "1 unidade".to_string()
    } else {
        format!("{} unidades", units)
    }
}

fn dosed_recommendation(band: Band, midday: bool, units: u32) -> String {
    match band {
        Band::Normal if units == 0 => "Não é necessário aplicar insulina.".to_string(),
        Band::Normal => format!("Aplique {} de insulina para a refeição.", units_phrase(units)),
        Band::SevereHyperglycemia if midday => format!(
            "Aplique {} de insulina rápida e monitore após a refeição.",
            units_phrase(units)
        ),
        Band::SevereHyperglycemia => format!(
            "Aplique {} de insulina rápida e monitore após 2 horas.",
            units_phrase(units)
        ),
        _ => format!("Aplique {} de insulina rápida.", units_phrase(units)),
    }
}

/// Parse a local `YYYY-MM-DDTHH:mm` timestamp (seconds tolerated)
pub fn parse_measured_at(input: &str) -> Result<MeasuredAt> {
    let trimmed = input.trim();
    NaiveDateTime::parse_from_str(trimmed, MEASURED_AT_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, MEASURED_AT_FORMAT_SECONDS))
        .map_err(|e| Error::InvalidTimestamp(format!("'{}': {}", input, e)))
}

/// Classify with the canonical rules (clock timing, generic wording)
pub fn classify(glucose_mg_dl: i32, measured_at: MeasuredAt) -> AlertResult {
    Advisor::default().classify(&Measurement::new(glucose_mg_dl, measured_at))
}

/// Like [`classify`], but rejects negative readings
pub fn classify_checked(glucose_mg_dl: i32, measured_at: MeasuredAt) -> Result<AlertResult> {
    if glucose_mg_dl < 0 {
        return Err(Error::InvalidGlucose(format!(
            "{} mg/dL is negative",
            glucose_mg_dl
        )));
    }
    Ok(classify(glucose_mg_dl, measured_at))
}

/// Classify from a raw form timestamp
pub fn classify_str(glucose_mg_dl: i32, measured_at: &str) -> Result<AlertResult> {
    Ok(classify(glucose_mg_dl, parse_measured_at(measured_at)?))
}
