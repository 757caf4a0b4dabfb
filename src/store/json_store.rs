use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use tracing::debug;

use crate::store::error::{StoreError, StoreResult};
use crate::store::schema::{PlayerProgress, ProgressRecord};
use crate::store::{ProgressRepository, new_record_id};

const COLLECTION_FILE: &str = "player_progress.json";

/// Progress collection kept as one JSON file in the data directory.
pub struct JsonStore {
    base_dir: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl JsonStore {
    pub fn with_base_dir(base_dir: PathBuf) -> StoreResult<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self {
            base_dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self) -> PathBuf {
        self.base_dir.join(COLLECTION_FILE)
    }

    fn load(&self) -> StoreResult<Vec<ProgressRecord>> {
        let path = self.file_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, records: &[ProgressRecord]) -> StoreResult<()> {
        let path = self.file_path();
        let tmp_path = path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(records)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        debug!(path = %path.display(), records = records.len(), "progress file written");
        Ok(())
    }

    fn locked<T>(&self, f: impl FnOnce() -> StoreResult<T>) -> StoreResult<T> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        f()
    }
}

impl ProgressRepository for JsonStore {
    fn list(&self) -> StoreResult<Vec<ProgressRecord>> {
        self.load()
    }

    fn create(&self, initial: &PlayerProgress) -> StoreResult<ProgressRecord> {
        self.locked(|| {
            let mut records = self.load()?;
            let record = ProgressRecord {
                id: new_record_id(),
                version: 1,
                updated_at: Utc::now(),
                progress: initial.clone(),
            };
            records.push(record.clone());
            self.save(&records)?;
            Ok(record)
        })
    }

    fn update(
        &self,
        id: &str,
        expected_version: u64,
        progress: &PlayerProgress,
    ) -> StoreResult<ProgressRecord> {
        self.locked(|| {
            let mut records = self.load()?;
            let record = records
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            if record.version != expected_version {
                return Err(StoreError::VersionConflict {
                    expected: expected_version,
                    found: record.version,
                });
            }
            record.version += 1;
            record.updated_at = Utc::now();
            record.progress = progress.clone();
            let updated = record.clone();
            self.save(&records)?;
            Ok(updated)
        })
    }
}
