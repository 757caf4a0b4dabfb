use std::sync::Mutex;

use chrono::Utc;

use crate::store::error::{StoreError, StoreResult};
use crate::store::schema::{PlayerProgress, ProgressRecord};
use crate::store::{ProgressRepository, new_record_id};

/// In-process store. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<ProgressRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, Vec<ProgressRecord>>> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl ProgressRepository for MemoryStore {
    fn list(&self) -> StoreResult<Vec<ProgressRecord>> {
        Ok(self.lock()?.clone())
    }

    fn create(&self, initial: &PlayerProgress) -> StoreResult<ProgressRecord> {
        let record = ProgressRecord {
            id: new_record_id(),
            version: 1,
            updated_at: Utc::now(),
            progress: initial.clone(),
        };
        self.lock()?.push(record.clone());
        Ok(record)
    }

    fn update(
        &self,
        id: &str,
        expected_version: u64,
        progress: &PlayerProgress,
    ) -> StoreResult<ProgressRecord> {
        let mut records = self.lock()?;
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
        Ok(record.clone())
    }
}
