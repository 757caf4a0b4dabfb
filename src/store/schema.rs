use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::level::ALL_LEVELS_CLEARED;

/// Entity name of the progress collection, shared by every backend.
pub const COLLECTION: &str = "PlayerProgress";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerProgress {
    pub total_problems_solved: u32,
    pub total_attempts: u32,
    pub current_streak: u32,
    pub best_streak: u32,
    pub total_stars: u32,
    pub xp_points: u32,
    pub accuracy_percentage: u32,
    pub current_level: u32,
    pub completed_levels: BTreeSet<u32>,
    pub badges: BTreeSet<String>,
    /// Best star rating per level, indexed by `level - 1`.
    pub best_stars: Vec<u8>,
}

impl Default for PlayerProgress {
    fn default() -> Self {
        Self {
            total_problems_solved: 0,
            total_attempts: 0,
            current_streak: 0,
            best_streak: 0,
            total_stars: 0,
            xp_points: 0,
            accuracy_percentage: 0,
            current_level: 1,
            completed_levels: BTreeSet::new(),
            badges: BTreeSet::new(),
            best_stars: Vec::new(),
        }
    }
}

impl PlayerProgress {
    pub fn is_level_unlocked(&self, level: u32) -> bool {
        level == 1 || level <= self.current_level || self.completed_levels.contains(&(level - 1))
    }

    pub fn is_level_completed(&self, level: u32) -> bool {
        self.completed_levels.contains(&level)
    }

    pub fn level_stars(&self, level: u32) -> u8 {
        level
            .checked_sub(1)
            .and_then(|i| self.best_stars.get(i as usize))
            .copied()
            .unwrap_or(0)
    }

    pub fn record_stars(&mut self, level: u32, stars: u8) {
        let Some(idx) = level.checked_sub(1).map(|i| i as usize) else {
            return;
        };
        if self.best_stars.len() <= idx {
            self.best_stars.resize(idx + 1, 0);
        }
        self.best_stars[idx] = self.best_stars[idx].max(stars);
    }

    pub fn all_levels_cleared(&self) -> bool {
        self.current_level >= ALL_LEVELS_CLEARED
    }

    /// Level to offer from "continue", capped to a playable one.
    pub fn continue_level(&self) -> u32 {
        self.current_level.clamp(1, ALL_LEVELS_CLEARED - 1)
    }
}

/// A stored progress document plus the store's bookkeeping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub id: String,
    /// Bumped by the store on every write; used as the optimistic lock token.
    #[serde(default)]
    pub version: u64,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub progress: PlayerProgress,
}
