use crate::model::record::ReadingRecord;

/// Consumption held steady when the month-over-month delta is within this
/// band (m³); readings only carry two decimals.
const STABLE_BAND: f64 = 0.001;

/// How the latest month compares to the one before it. Deltas are
/// magnitudes, in m³.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsumptionTrend {
    FirstRecord { consumption: f64 },
    Increase { delta: f64 },
    Decrease { delta: f64 },
    Stable { consumption: f64 },
}

/// Classify the latest record against its predecessor, chronologically.
/// `None` when the lot has no records at all.
pub fn consumption_trend(records: &[ReadingRecord]) -> Option<ConsumptionTrend> {
    let mut sorted: Vec<&ReadingRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.period);

    let last = sorted.last()?;
    let Some(previous) = sorted.len().checked_sub(2).and_then(|i| sorted.get(i)) else {
        return Some(ConsumptionTrend::FirstRecord {
            consumption: last.consumption,
        });
    };

    let delta = last.consumption - previous.consumption;
    if delta > STABLE_BAND {
        Some(ConsumptionTrend::Increase { delta })
    } else if delta < -STABLE_BAND {
        Some(ConsumptionTrend::Decrease { delta: delta.abs() })
    } else {
        Some(ConsumptionTrend::Stable {
            consumption: last.consumption,
        })
    }
}

/// Records in chronological order, for charts and month-over-month views.
pub fn chronological(records: &[ReadingRecord]) -> Vec<ReadingRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(|r| r.period);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::ReadingDraft;
    use crate::service::ledger_service::validate_and_build;

    fn record(period: &str, previous: f64, current: f64) -> ReadingRecord {
        let draft = ReadingDraft {
            period: Some(period.parse().unwrap()),
            previous_reading: Some(previous),
            current_reading: Some(current),
            tariff: Some(5.0),
        };
        validate_and_build(&draft, &[], None).unwrap()
    }

    #[test]
    fn test_no_records_no_trend() {
        assert_eq!(consumption_trend(&[]), None);
    }

    #[test]
    fn test_single_record_is_first() {
        let trend = consumption_trend(&[record("2025-01", 10.0, 22.0)]);
        assert_eq!(
            trend,
            Some(ConsumptionTrend::FirstRecord { consumption: 12.0 })
        );
    }

    #[test]
    fn test_increase_and_decrease() {
        let jan = record("2025-01", 10.0, 20.0); // 10 m³
        let feb = record("2025-02", 20.0, 35.0); // 15 m³
        assert_eq!(
            consumption_trend(&[jan.clone(), feb.clone()]),
            Some(ConsumptionTrend::Increase { delta: 5.0 })
        );

        let mar = record("2025-03", 35.0, 39.0); // 4 m³
        assert_eq!(
            consumption_trend(&[jan, feb, mar]),
            Some(ConsumptionTrend::Decrease { delta: 11.0 })
        );
    }

    #[test]
    fn test_stable_within_band() {
        let jan = record("2025-01", 10.0, 20.0);
        let feb = record("2025-02", 20.0, 30.0);
        assert_eq!(
            consumption_trend(&[jan, feb]),
            Some(ConsumptionTrend::Stable { consumption: 10.0 })
        );
    }

    #[test]
    fn test_trend_uses_chronology_not_vec_order() {
        let feb = record("2025-02", 20.0, 35.0); // 15 m³
        let jan = record("2025-01", 10.0, 20.0); // 10 m³
        assert_eq!(
            consumption_trend(&[feb, jan]),
            Some(ConsumptionTrend::Increase { delta: 5.0 })
        );
    }

    #[test]
    fn test_chronological_sorts_by_period() {
        let out = chronological(&[
            record("2025-03", 2.0, 3.0),
            record("2025-01", 0.0, 1.0),
            record("2025-02", 1.0, 2.0),
        ]);
        let periods: Vec<String> = out.iter().map(|r| r.period.to_string()).collect();
        assert_eq!(periods, vec!["2025-01", "2025-02", "2025-03"]);
    }
}
