use std::collections::VecDeque;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::engine::scoring::{ProgressUpdate, apply_level_result};
use crate::session::result::LevelOutcome;
use crate::store::ProgressRepository;
use crate::store::error::{StoreError, StoreResult};
use crate::store::schema::{PlayerProgress, ProgressRecord};

pub const DEFAULT_WRITE_ATTEMPTS: u32 = 3;
const DEFAULT_BACKOFF: Duration = Duration::from_millis(150);

/// Keeps the player's progress in step with a repository.
///
/// Finished levels are queued first and written afterwards, so the caller can
/// show the result straight away and retry a failed write later. Each write
/// re-applies the queued outcome to the stored record and uses the record
/// version as an optimistic lock, so a concurrent writer is merged instead of
/// silently overwritten.
pub struct ProgressSync<R: ProgressRepository> {
    repo: R,
    record: Option<ProgressRecord>,
    local: PlayerProgress,
    pending: VecDeque<LevelOutcome>,
    max_attempts: u32,
    backoff: Duration,
}

impl<R: ProgressRepository> ProgressSync<R> {
    pub fn new(repo: R, max_attempts: u32) -> Self {
        Self {
            repo,
            record: None,
            local: PlayerProgress::default(),
            pending: VecDeque::new(),
            max_attempts: max_attempts.max(1),
            backoff: DEFAULT_BACKOFF,
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Progress as the player should see it: stored record plus queued results.
    pub fn progress(&self) -> &PlayerProgress {
        &self.local
    }

    pub fn record(&self) -> Option<&ProgressRecord> {
        self.record.as_ref()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Fetch the player's record, creating a fresh one on first visit.
    pub fn load_or_create(&mut self) -> StoreResult<&ProgressRecord> {
        let record = self.fetch_record(None)?;
        self.record = Some(record);
        self.rebuild_local();
        self.record
            .as_ref()
            .ok_or_else(|| StoreError::Unavailable("progress record missing".to_string()))
    }

    /// Queue a finished level and return the resulting progress.
    ///
    /// If the record was never loaded, it is fetched first so the update is
    /// computed against what the player already owns.
    pub fn record_outcome(&mut self, outcome: LevelOutcome) -> ProgressUpdate {
        if self.record.is_none() {
            match self.fetch_record(None) {
                Ok(record) => {
                    info!(id = %record.id, version = record.version, "progress loaded late");
                    self.record = Some(record);
                    self.rebuild_local();
                }
                Err(e) => warn!(error = %e, "progress still unavailable, scoring against local view"),
            }
        }
        let update = apply_level_result(&self.local, &outcome);
        self.local = update.progress.clone();
        info!(
            level = outcome.level,
            score = outcome.score,
            questions = outcome.question_count,
            stars = update.stars_earned,
            xp = update.xp_earned,
            new_badges = update.new_badges.len(),
            "level result recorded"
        );
        self.pending.push_back(outcome);
        update
    }

    /// Write every queued outcome, oldest first. Stops at the first failure and
    /// keeps that outcome and everything after it queued.
    pub fn flush(&mut self) -> StoreResult<()> {
        while let Some(outcome) = self.pending.front().cloned() {
            if let Err(e) = self.write_outcome(&outcome) {
                warn!(
                    error = %e,
                    pending = self.pending.len(),
                    "progress write failed, keeping result queued"
                );
                return Err(e);
            }
            self.pending.pop_front();
        }
        self.rebuild_local();
        Ok(())
    }

    /// Alias of `flush` for a user-triggered retry.
    pub fn retry_pending(&mut self) -> StoreResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        info!(pending = self.pending.len(), "retrying queued progress writes");
        self.flush()
    }

    fn write_outcome(&mut self, outcome: &LevelOutcome) -> StoreResult<()> {
        let mut last_err = None;

        for attempt in 1..=self.max_attempts {
            let record = match self.record.take() {
                Some(record) => record,
                None => match self.fetch_record(None) {
                    Ok(record) => record,
                    Err(e) if e.is_retryable() => {
                        last_err = Some(e);
                        self.pause(attempt);
                        continue;
                    }
                    Err(e) => return Err(e),
                },
            };

            let next = apply_level_result(&record.progress, outcome).progress;
            match self.repo.update(&record.id, record.version, &next) {
                Ok(saved) => {
                    info!(id = %saved.id, version = saved.version, "progress saved");
                    self.record = Some(saved);
                    return Ok(());
                }
                Err(StoreError::VersionConflict { expected, found }) => {
                    warn!(expected, found, attempt, "stale progress record, re-reading");
                    match self.fetch_record(Some(&record.id)) {
                        Ok(fresh) => self.record = Some(fresh),
                        Err(e) if e.is_retryable() => self.record = None,
                        Err(e) => return Err(e),
                    }
                    last_err = Some(StoreError::VersionConflict { expected, found });
                }
                Err(StoreError::NotFound(id)) => {
                    warn!(%id, attempt, "progress record vanished, will adopt another or create one");
                    last_err = Some(StoreError::NotFound(id));
                }
                Err(e) if e.is_retryable() => {
                    warn!(error = %e, attempt, "progress write failed");
                    self.record = Some(record);
                    last_err = Some(e);
                    self.pause(attempt);
                }
                Err(e) => {
                    self.record = Some(record);
                    return Err(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| StoreError::Unavailable("no write attempted".to_string())))
    }

    /// The record with `id` if given and present, else the first record,
    /// else a newly created one.
    fn fetch_record(&self, id: Option<&str>) -> StoreResult<ProgressRecord> {
        let mut records = self.repo.list()?;
        if records.len() > 1 {
            warn!(count = records.len(), "more than one progress record, using the first");
        }
        if let Some(id) = id
            && let Some(pos) = records.iter().position(|r| r.id == id)
        {
            return Ok(records.swap_remove(pos));
        }
        if !records.is_empty() {
            return Ok(records.swap_remove(0));
        }
        let created = self.repo.create(&PlayerProgress::default())?;
        info!(id = %created.id, "created progress record for new player");
        Ok(created)
    }

    fn rebuild_local(&mut self) {
        let mut local = self
            .record
            .as_ref()
            .map(|r| r.progress.clone())
            .unwrap_or_default();
        for outcome in &self.pending {
            local = apply_level_result(&local, outcome).progress;
        }
        self.local = local;
    }

    fn pause(&self, attempt: u32) {
        if attempt < self.max_attempts && !self.backoff.is_zero() {
            thread::sleep(self.backoff * attempt);
        }
    }
}
