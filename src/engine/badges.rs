use std::collections::BTreeSet;

use crate::store::schema::PlayerProgress;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BadgeId {
    FirstProblem,
    Streak5,
    Streak10,
    Level5,
    Level10,
    Accuracy90,
    Problems50,
    Problems100,
    SpeedDemon,
    PerfectLevel,
}

pub struct BadgeInfo {
    pub id: BadgeId,
    pub name: &'static str,
    pub description: &'static str,
}

/// Display order for the badge collection.
pub const BADGE_CATALOG: [BadgeInfo; 10] = [
    BadgeInfo {
        id: BadgeId::FirstProblem,
        name: "First Steps",
        description: "Solved your first problem!",
    },
    BadgeInfo {
        id: BadgeId::Streak5,
        name: "On Fire",
        description: "5 correct answers in a row!",
    },
    BadgeInfo {
        id: BadgeId::Streak10,
        name: "Unstoppable",
        description: "10 correct answers in a row!",
    },
    BadgeInfo {
        id: BadgeId::Level5,
        name: "Halfway There",
        description: "Reached level 5!",
    },
    BadgeInfo {
        id: BadgeId::Level10,
        name: "Math Master",
        description: "Completed all levels!",
    },
    BadgeInfo {
        id: BadgeId::Accuracy90,
        name: "Sharpshooter",
        description: "90% accuracy achieved!",
    },
    BadgeInfo {
        id: BadgeId::Problems50,
        name: "Problem Solver",
        description: "Solved 50 problems!",
    },
    BadgeInfo {
        id: BadgeId::Problems100,
        name: "Century",
        description: "Solved 100 problems!",
    },
    BadgeInfo {
        id: BadgeId::SpeedDemon,
        name: "Speed Demon",
        description: "Answered in under 3 seconds!",
    },
    BadgeInfo {
        id: BadgeId::PerfectLevel,
        name: "Perfect Score",
        description: "Completed a level with 100%!",
    },
];

impl BadgeId {
    pub fn as_str(self) -> &'static str {
        match self {
            BadgeId::FirstProblem => "first_problem",
            BadgeId::Streak5 => "streak_5",
            BadgeId::Streak10 => "streak_10",
            BadgeId::Level5 => "level_5",
            BadgeId::Level10 => "level_10",
            BadgeId::Accuracy90 => "accuracy_90",
            BadgeId::Problems50 => "problems_50",
            BadgeId::Problems100 => "problems_100",
            BadgeId::SpeedDemon => "speed_demon",
            BadgeId::PerfectLevel => "perfect_level",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        BADGE_CATALOG
            .iter()
            .map(|b| b.id)
            .find(|id| id.as_str() == key)
    }

    pub fn info(self) -> &'static BadgeInfo {
        // Catalog covers every variant.
        BADGE_CATALOG
            .iter()
            .find(|b| b.id == self)
            .unwrap_or(&BADGE_CATALOG[0])
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BadgeAward {
    pub badges: BTreeSet<String>,
    /// Every badge this pass added, in rule order.
    pub unlocked: Vec<BadgeId>,
    /// The single badge to celebrate, if any.
    pub announced: Option<BadgeId>,
}

impl BadgeAward {
    /// Add `id` if absent. The first badge granted becomes the announced one.
    pub fn grant(&mut self, id: BadgeId) -> bool {
        if !self.badges.insert(id.as_str().to_string()) {
            return false;
        }
        self.unlocked.push(id);
        if self.announced.is_none() {
            self.announced = Some(id);
        }
        true
    }
}

/// Run the counter-based badge rules against already-updated progress.
///
/// `level` is the level just attempted, not `current_level`.
pub fn evaluate(progress: &PlayerProgress, level: u32) -> BadgeAward {
    let mut award = BadgeAward {
        badges: progress.badges.clone(),
        unlocked: Vec::new(),
        announced: None,
    };

    let rules: [(BadgeId, bool); 8] = [
        (BadgeId::FirstProblem, progress.total_problems_solved == 1),
        (BadgeId::Streak5, progress.current_streak >= 5),
        (BadgeId::Streak10, progress.current_streak >= 10),
        (BadgeId::Level5, level >= 5),
        (BadgeId::Level10, level >= 10),
        (BadgeId::Problems50, progress.total_problems_solved >= 50),
        (BadgeId::Problems100, progress.total_problems_solved >= 100),
        (BadgeId::Accuracy90, progress.accuracy_percentage >= 90),
    ];

    for (id, earned) in rules {
        if earned {
            award.grant(id);
        }
    }

    award
}
