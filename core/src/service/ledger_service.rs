use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::model::lot::{Ledger, LotKey};
use crate::model::period::Period;
use crate::model::record::{ReadingDraft, ReadingRecord};
use crate::repository::LotRepository;
use crate::service::dto::{EntrySuggestion, ImportEntry, ImportSummary};

/// Mutation side of the ledger engine. Every operation reads the lot's
/// current collection, applies the change, and writes the whole collection
/// back; validation failures leave the store untouched.
pub struct LedgerService<R: LotRepository> {
    repo: R,
}

impl<R: LotRepository> LedgerService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn ledger(&self) -> Result<Ledger> {
        self.repo.load_all()
    }

    pub fn records(&self, lot: &LotKey) -> Result<Vec<ReadingRecord>> {
        self.repo.records(lot)
    }

    pub fn add_record(&self, lot: &LotKey, draft: &ReadingDraft) -> Result<ReadingRecord> {
        let mut records = self.repo.records(lot)?;
        let record = validate_and_build(draft, &records, None)?;
        records.push(record.clone());
        self.repo.put(lot, &records)?;
        Ok(record)
    }

    pub fn edit_record(
        &self,
        lot: &LotKey,
        id: Uuid,
        draft: &ReadingDraft,
    ) -> Result<ReadingRecord> {
        let mut records = self.repo.records(lot)?;
        let pos = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| anyhow!("Record {} not found for lot {}", id, lot))?;
        let record = validate_and_build(draft, &records, Some(id))?;
        records[pos] = record.clone();
        self.repo.put(lot, &records)?;
        Ok(record)
    }

    pub fn delete_record(&self, lot: &LotKey, id: Uuid) -> Result<()> {
        let mut records = self.repo.records(lot)?;
        let initial_len = records.len();
        records.retain(|r| r.id != id);

        if records.len() == initial_len {
            return Err(anyhow!("Record {} not found for lot {}", id, lot));
        }

        // The remaining collection may be empty; the lot itself stays.
        self.repo.put(lot, &records)
    }

    pub fn suggestion(&self, lot: &LotKey) -> Result<EntrySuggestion> {
        let records = self.repo.records(lot)?;
        Ok(next_entry_suggestion(&records, Period::current()))
    }

    /// Bulk-load a ledger dump, one document write per lot. Each lot's
    /// entries replace whatever the store held for it; derived fields are
    /// recomputed through the normal validation path.
    pub fn import_from_json(&self, json: &str) -> Result<ImportSummary> {
        let dump: BTreeMap<String, Vec<ImportEntry>> = serde_json::from_str(json)?;
        let mut summary = ImportSummary::default();

        for (key, entries) in dump {
            let lot = LotKey::parse(&key)?;
            let mut records: Vec<ReadingRecord> = Vec::with_capacity(entries.len());
            for entry in entries {
                let draft = ReadingDraft {
                    period: Some(entry.period),
                    previous_reading: Some(entry.previous_reading),
                    current_reading: Some(entry.current_reading),
                    tariff: Some(entry.tariff),
                };
                let record = validate_and_build(&draft, &records, None)
                    .map_err(|e| anyhow!("lot {}, {}: {}", lot, entry.period, e))?;
                records.push(record);
            }
            summary.records += records.len();
            summary.lots += 1;
            self.repo.put(&lot, &records)?;
        }
        Ok(summary)
    }
}

// Standalone functions for pure logic

/// Turn a draft into a full record, or say why it cannot be one.
///
/// With `editing_id`, the result reuses that id and the duplicate-period
/// check ignores the record being edited; otherwise a fresh id is minted.
pub fn validate_and_build(
    draft: &ReadingDraft,
    existing: &[ReadingRecord],
    editing_id: Option<Uuid>,
) -> Result<ReadingRecord, ValidationError> {
    let (Some(period), Some(previous), Some(current), Some(tariff)) = (
        draft.period,
        draft.previous_reading,
        draft.current_reading,
        draft.tariff,
    ) else {
        return Err(ValidationError::IncompleteInput);
    };
    if previous < 0.0 || current < 0.0 || tariff < 0.0 {
        return Err(ValidationError::IncompleteInput);
    }
    if current < previous {
        return Err(ValidationError::NegativeConsumption);
    }
    if existing
        .iter()
        .any(|r| r.period == period && Some(r.id) != editing_id)
    {
        return Err(ValidationError::DuplicatePeriod(period));
    }

    let consumption = current - previous;
    Ok(ReadingRecord {
        id: editing_id.unwrap_or_else(Uuid::new_v4),
        period,
        previous_reading: previous,
        current_reading: current,
        consumption,
        tariff,
        cost: consumption * tariff,
    })
}

/// Pre-fill for the next entry: one month after the latest record, carrying
/// its closing reading and tariff forward. `today` is the fallback period
/// for a lot with no history; it is passed in to keep the function pure.
pub fn next_entry_suggestion(records: &[ReadingRecord], today: Period) -> EntrySuggestion {
    match records.iter().max_by_key(|r| r.period) {
        Some(last) => EntrySuggestion {
            period: last.period.next(),
            previous_reading: Some(last.current_reading),
            tariff: Some(last.tariff),
        },
        None => EntrySuggestion {
            period: today,
            previous_reading: None,
            tariff: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(period: &str, previous: f64, current: f64, tariff: f64) -> ReadingDraft {
        ReadingDraft {
            period: Some(period.parse().unwrap()),
            previous_reading: Some(previous),
            current_reading: Some(current),
            tariff: Some(tariff),
        }
    }

    #[test]
    fn test_build_computes_consumption_and_cost() {
        let record = validate_and_build(&draft("2025-03", 100.0, 112.5, 5.5), &[], None).unwrap();
        assert_eq!(record.consumption, 12.5);
        assert_eq!(record.cost, 12.5 * 5.5);
        assert_eq!(record.period.to_string(), "2025-03");
    }

    #[test]
    fn test_missing_field_is_incomplete() {
        let mut d = draft("2025-03", 100.0, 110.0, 5.0);
        d.current_reading = None;
        assert_eq!(
            validate_and_build(&d, &[], None),
            Err(ValidationError::IncompleteInput)
        );
        assert_eq!(
            validate_and_build(&ReadingDraft::default(), &[], None),
            Err(ValidationError::IncompleteInput)
        );
    }

    #[test]
    fn test_negative_values_rejected() {
        let d = draft("2025-03", -1.0, 110.0, 5.0);
        assert_eq!(
            validate_and_build(&d, &[], None),
            Err(ValidationError::IncompleteInput)
        );
    }

    #[test]
    fn test_shrinking_reading_is_negative_consumption() {
        assert_eq!(
            validate_and_build(&draft("2025-03", 110.0, 100.0, 5.0), &[], None),
            Err(ValidationError::NegativeConsumption)
        );
    }

    #[test]
    fn test_equal_readings_are_zero_consumption() {
        let record = validate_and_build(&draft("2025-03", 110.0, 110.0, 5.0), &[], None).unwrap();
        assert_eq!(record.consumption, 0.0);
        assert_eq!(record.cost, 0.0);
    }

    #[test]
    fn test_duplicate_period_rejected() {
        let existing = validate_and_build(&draft("2025-03", 100.0, 110.0, 5.0), &[], None).unwrap();
        let result = validate_and_build(&draft("2025-03", 110.0, 120.0, 5.0), &[existing], None);
        assert_eq!(
            result,
            Err(ValidationError::DuplicatePeriod("2025-03".parse().unwrap()))
        );
    }

    #[test]
    fn test_edit_keeps_id_and_ignores_own_period() {
        let existing = validate_and_build(&draft("2025-03", 100.0, 110.0, 5.0), &[], None).unwrap();
        let id = existing.id;

        // Same period, same record: not a duplicate of itself.
        let edited = validate_and_build(
            &draft("2025-03", 100.0, 115.0, 6.0),
            std::slice::from_ref(&existing),
            Some(id),
        )
        .unwrap();
        assert_eq!(edited.id, id);
        assert_eq!(edited.consumption, 15.0);
        assert_eq!(edited.cost, 90.0);
    }

    #[test]
    fn test_edit_into_other_records_period_rejected() {
        let march = validate_and_build(&draft("2025-03", 100.0, 110.0, 5.0), &[], None).unwrap();
        let april =
            validate_and_build(&draft("2025-04", 110.0, 120.0, 5.0), &[march.clone()], None)
                .unwrap();

        let result = validate_and_build(
            &draft("2025-03", 110.0, 125.0, 5.0),
            &[march, april.clone()],
            Some(april.id),
        );
        assert_eq!(
            result,
            Err(ValidationError::DuplicatePeriod("2025-03".parse().unwrap()))
        );
    }

    #[test]
    fn test_suggestion_continues_from_latest_record() {
        let nov = validate_and_build(&draft("2025-11", 90.0, 100.0, 5.0), &[], None).unwrap();
        let today = "2030-06".parse().unwrap();

        let suggestion = next_entry_suggestion(&[nov], today);
        assert_eq!(suggestion.period.to_string(), "2025-12");
        assert_eq!(suggestion.previous_reading, Some(100.0));
        assert_eq!(suggestion.tariff, Some(5.0));
    }

    #[test]
    fn test_suggestion_rolls_year_over() {
        let dec = validate_and_build(&draft("2025-12", 100.0, 108.0, 4.5), &[], None).unwrap();
        let suggestion = next_entry_suggestion(&[dec], "2030-06".parse().unwrap());
        assert_eq!(suggestion.period.to_string(), "2026-01");
        assert_eq!(suggestion.previous_reading, Some(108.0));
        assert_eq!(suggestion.tariff, Some(4.5));
    }

    #[test]
    fn test_suggestion_picks_chronological_latest_not_insertion_order() {
        let mar = validate_and_build(&draft("2025-03", 50.0, 60.0, 5.0), &[], None).unwrap();
        let jan =
            validate_and_build(&draft("2025-01", 30.0, 40.0, 4.0), &[mar.clone()], None).unwrap();

        // March was entered first but January sits first in the vec.
        let suggestion = next_entry_suggestion(&[jan, mar], "2030-06".parse().unwrap());
        assert_eq!(suggestion.period.to_string(), "2025-04");
        assert_eq!(suggestion.previous_reading, Some(60.0));
    }

    #[test]
    fn test_suggestion_for_empty_lot_is_today() {
        let today: Period = "2026-08".parse().unwrap();
        let suggestion = next_entry_suggestion(&[], today);
        assert_eq!(suggestion.period, today);
        assert_eq!(suggestion.previous_reading, None);
        assert_eq!(suggestion.tariff, None);
    }
}

#[cfg(test)]
mod store_tests {
    use super::*;
    use crate::repository::FileLotRepository;
    use std::{env, fs};

    fn temp_service(tag: &str) -> (LedgerService<FileLotRepository>, std::path::PathBuf) {
        let dir = env::temp_dir().join(format!("hidrotrack-svc-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let repo = FileLotRepository::new(Some(dir.clone())).unwrap();
        (LedgerService::new(repo), dir)
    }

    fn draft(period: &str, previous: f64, current: f64, tariff: f64) -> ReadingDraft {
        ReadingDraft {
            period: Some(period.parse().unwrap()),
            previous_reading: Some(previous),
            current_reading: Some(current),
            tariff: Some(tariff),
        }
    }

    #[test]
    fn test_add_edit_delete_round_trip() {
        let (service, dir) = temp_service("crud");
        let lot = LotKey::parse("12").unwrap();

        let first = service.add_record(&lot, &draft("2025-03", 100.0, 110.0, 5.0)).unwrap();
        service.add_record(&lot, &draft("2025-04", 110.0, 122.0, 5.0)).unwrap();
        assert_eq!(service.records(&lot).unwrap().len(), 2);

        let edited = service
            .edit_record(&lot, first.id, &draft("2025-03", 100.0, 112.0, 5.0))
            .unwrap();
        assert_eq!(edited.id, first.id);
        let stored = service.records(&lot).unwrap();
        assert_eq!(stored[0].consumption, 12.0);
        assert_eq!(stored[0].cost, 60.0);

        // Delete removes exactly that id.
        service.delete_record(&lot, first.id).unwrap();
        let remaining = service.records(&lot).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].period.to_string(), "2025-04");
        assert!(service.delete_record(&lot, first.id).is_err());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_rejected_save_leaves_store_unchanged() {
        let (service, dir) = temp_service("reject");
        let lot = LotKey::parse("8").unwrap();
        service.add_record(&lot, &draft("2025-03", 100.0, 110.0, 5.0)).unwrap();
        let before = service.records(&lot).unwrap();

        // Shrinking reading and duplicate period both bounce.
        assert!(service.add_record(&lot, &draft("2025-04", 120.0, 110.0, 5.0)).is_err());
        assert!(service.add_record(&lot, &draft("2025-03", 110.0, 120.0, 5.0)).is_err());

        assert_eq!(service.records(&lot).unwrap(), before);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_import_replaces_lots_and_recomputes_derived_fields() {
        let (service, dir) = temp_service("import");
        let lot = LotKey::parse("78").unwrap();
        service.add_record(&lot, &draft("2024-12", 0.0, 5.0, 1.0)).unwrap();

        let json = r#"{
            "78": [
                {"period": "2025-01", "previous_reading": 472, "current_reading": 482, "tariff": 2.0},
                {"period": "2025-02", "previous_reading": 482, "current_reading": 490}
            ],
            "83": [
                {"period": "2025-01", "previous_reading": 527, "current_reading": 537, "tariff": 2.0}
            ]
        }"#;
        let summary = service.import_from_json(json).unwrap();
        assert_eq!(summary.lots, 2);
        assert_eq!(summary.records, 3);

        let imported = service.records(&lot).unwrap();
        assert_eq!(imported.len(), 2);
        assert_eq!(imported[0].consumption, 10.0);
        assert_eq!(imported[0].cost, 20.0);
        // Missing tariff defaults to zero, so the cost is zero too.
        assert_eq!(imported[1].tariff, 0.0);
        assert_eq!(imported[1].cost, 0.0);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_import_rejects_duplicate_periods_in_dump() {
        let (service, dir) = temp_service("import-dup");
        let json = r#"{
            "5": [
                {"period": "2025-01", "previous_reading": 0, "current_reading": 1},
                {"period": "2025-01", "previous_reading": 1, "current_reading": 2}
            ]
        }"#;
        assert!(service.import_from_json(json).is_err());
        let _ = fs::remove_dir_all(dir);
    }
}
