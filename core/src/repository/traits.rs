use anyhow::Result;

use crate::model::lot::{Ledger, LotKey};
use crate::model::record::ReadingRecord;

/// The document-store collaborator. One document per lot, holding that lot's
/// whole record collection; `put` replaces the document in full.
///
/// Two writers updating the same lot race as last-writer-wins. That matches
/// the hosted store this stands in for and is accepted as-is.
pub trait LotRepository {
    fn load_all(&self) -> Result<Ledger>;
    fn records(&self, lot: &LotKey) -> Result<Vec<ReadingRecord>>;
    fn put(&self, lot: &LotKey, records: &[ReadingRecord]) -> Result<()>;
}
