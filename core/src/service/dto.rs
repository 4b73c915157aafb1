use serde::{Deserialize, Serialize};

use crate::model::lot::LotKey;
use crate::model::period::Period;
use crate::model::record::ReadingRecord;

/// Pre-fill values for the next data-entry form. Advisory: the user may
/// still submit any period, subject to the duplicate check.
#[derive(Debug, Clone, PartialEq)]
pub struct EntrySuggestion {
    pub period: Period,
    pub previous_reading: Option<f64>,
    pub tariff: Option<f64>,
}

/// One lot's record for the dashboard's reference month.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LotReading {
    pub lot: LotKey,
    pub record: ReadingRecord,
}

/// Fleet-wide aggregates over the latest recorded month.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct DashboardData {
    pub total_lots: usize,
    pub all_lots: Vec<LotKey>,
    pub latest_period: Option<Period>,
    pub verified_count: usize,
    pub verified_lots: Vec<LotKey>,
    pub total_consumption: f64,
    pub average_consumption: f64,
    /// Latest-month snapshot sorted by consumption, highest first. Ties keep
    /// numeric lot order.
    pub ranking: Vec<LotReading>,
    /// Consumption above 1.5x the month's average, in ranking order.
    pub high_anomalies: Vec<LotReading>,
    /// Non-zero consumption below 0.5x the average, in ranking order.
    pub low_anomalies: Vec<LotReading>,
}

/// One row of a bulk-import dump: a reading without derived fields, which
/// are recomputed on the way in.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ImportEntry {
    pub period: Period,
    pub previous_reading: f64,
    pub current_reading: f64,
    #[serde(default)]
    pub tariff: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub lots: usize,
    pub records: usize,
}
