use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde_json;

use crate::model::lot::{Ledger, LotKey};
use crate::model::record::ReadingRecord;
use crate::repository::traits::LotRepository;

const LOTS_DIR_NAME: &str = "lotes";

/// File-backed lot store: one JSON document per lot under
/// `<data-dir>/lotes/<key>.json`, mirroring the per-document atomicity of
/// the hosted store it replaces.
#[derive(Clone)]
pub struct FileLotRepository {
    lots_dir: PathBuf,
}

impl FileLotRepository {
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self> {
        let base = match base_dir {
            Some(dir) => dir,
            None => {
                let home_dir = dirs::home_dir()
                    .ok_or_else(|| anyhow!("Could not determine home directory"))?;
                home_dir.join(".hidrotrack")
            }
        };
        let lots_dir = base.join(LOTS_DIR_NAME);
        fs::create_dir_all(&lots_dir)?;
        Ok(FileLotRepository { lots_dir })
    }

    fn lot_path(&self, lot: &LotKey) -> PathBuf {
        self.lots_dir.join(format!("{}.json", lot.as_str()))
    }

    fn read_records(&self, lot: &LotKey) -> Result<Vec<ReadingRecord>> {
        let path = self.lot_path(lot);
        if !path.exists() {
            // Lots come into existence on first save.
            return Ok(Vec::new());
        }
        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        let records = serde_json::from_reader(reader)?;
        Ok(records)
    }

    fn write_records(&self, lot: &LotKey, records: &[ReadingRecord]) -> Result<()> {
        let file = File::create(self.lot_path(lot))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, records)?;
        writer.flush()?;
        Ok(())
    }
}

impl LotRepository for FileLotRepository {
    fn load_all(&self) -> Result<Ledger> {
        let mut ledger = Ledger::new();
        for entry in fs::read_dir(&self.lots_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Ok(lot) = LotKey::parse(stem) else {
                // Stray files in the data directory are not ours to touch.
                continue;
            };
            ledger.insert(lot.clone(), self.read_records(&lot)?);
        }
        Ok(ledger)
    }

    fn records(&self, lot: &LotKey) -> Result<Vec<ReadingRecord>> {
        self.read_records(lot)
    }

    fn put(&self, lot: &LotKey, records: &[ReadingRecord]) -> Result<()> {
        self.write_records(lot, records)
    }
}
