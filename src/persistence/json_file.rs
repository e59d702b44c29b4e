//! Local JSON record file

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{GameRecord, RecordStore};
use crate::error::StoreError;

const FILE_VERSION: u8 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct RecordFile {
    version: u8,
    records: Vec<GameRecord>,
}

/// Records kept in one pretty-printed JSON file. A missing file reads as empty.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<GameRecord>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let file: RecordFile = serde_json::from_str(&text)?;
        if file.version != FILE_VERSION {
            log::warn!(
                "Unsupported record file version {} at {}",
                file.version,
                self.path.display()
            );
            return Err(StoreError::Unavailable);
        }
        Ok(file.records)
    }

    fn write(&self, records: Vec<GameRecord>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = RecordFile {
            version: FILE_VERSION,
            records,
        };
        let text = serde_json::to_string_pretty(&file)?;
        // Write then rename so a crash never leaves a half-written file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn fetch_records(&self) -> Result<Vec<GameRecord>, StoreError> {
        self.read()
    }

    fn save_record(&mut self, record: &GameRecord) -> bool {
        let result = self.read().and_then(|mut records| {
            records.push(record.clone());
            self.write(records)
        });
        match result {
            Ok(()) => {
                log::debug!("Saved round {} for {}", record.round, record.player_code);
                true
            }
            Err(e) => {
                log::warn!("Failed to save record to {}: {}", self.path.display(), e);
                false
            }
        }
    }
}
