use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::period::Period;

/// One lot's meter data for one billing month.
///
/// `consumption` and `cost` are derived from the other fields and stored
/// alongside them; the validation path is the only place they are computed,
/// so they never drift from the formulas.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReadingRecord {
    pub id: Uuid,
    pub period: Period,
    pub previous_reading: f64,
    pub current_reading: f64,
    pub consumption: f64,
    pub tariff: f64,
    pub cost: f64,
}

impl ReadingRecord {
    /// Consumption expressed in liters (readings are m³).
    pub fn consumption_liters(&self) -> f64 {
        self.consumption * 1000.0
    }
}

/// Unvalidated form input. Fields that were left blank or did not parse as
/// numbers stay `None`; validation turns that into `IncompleteInput`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingDraft {
    pub period: Option<Period>,
    pub previous_reading: Option<f64>,
    pub current_reading: Option<f64>,
    pub tariff: Option<f64>,
}
