use crate::engine::badges::{self, BadgeId};
use crate::session::result::LevelOutcome;
use crate::store::schema::PlayerProgress;

pub const XP_PER_CORRECT: u32 = 10;
pub const XP_PER_STAR: u32 = 20;

/// Star rating for `score` out of `questions`, thresholds inclusive.
pub fn stars_for(score: u32, questions: u32) -> u8 {
    if questions == 0 {
        return 0;
    }
    // Integer comparisons avoid float rounding at exact thresholds.
    let pct_x100 = score as u64 * 100;
    let q = questions as u64;
    if pct_x100 >= 90 * q {
        3
    } else if pct_x100 >= 70 * q {
        2
    } else if pct_x100 >= 50 * q {
        1
    } else {
        0
    }
}

pub fn xp_for(score: u32, stars: u8) -> u32 {
    score
        .saturating_mul(XP_PER_CORRECT)
        .saturating_add(stars as u32 * XP_PER_STAR)
}

/// Rounded percentage, capped at 100 for records where solved > attempts.
pub fn accuracy_percentage(solved: u32, attempts: u32) -> u32 {
    if attempts == 0 {
        return 0;
    }
    let pct = (100.0 * solved as f64 / attempts as f64).round() as u32;
    pct.min(100)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Full replacement record.
    pub progress: PlayerProgress,
    pub stars_earned: u8,
    pub xp_earned: u32,
    pub new_badges: Vec<BadgeId>,
    pub announced_badge: Option<BadgeId>,
}

/// Fold one finished level attempt into the prior progress.
///
/// Counters accumulate, the streak is replaced, and the next level unlocks
/// whatever the score.
pub fn apply_level_result(prior: &PlayerProgress, outcome: &LevelOutcome) -> ProgressUpdate {
    let stars_earned = stars_for(outcome.score, outcome.question_count);
    let xp_earned = xp_for(outcome.score, stars_earned);

    let mut progress = prior.clone();
    // Stored counters are not validated, so never let them wrap.
    progress.total_problems_solved = prior.total_problems_solved.saturating_add(outcome.score);
    progress.total_attempts = prior.total_attempts.saturating_add(outcome.question_count);
    progress.total_stars = prior.total_stars.saturating_add(stars_earned as u32);
    progress.xp_points = prior.xp_points.saturating_add(xp_earned);
    progress.current_streak = outcome.final_streak;
    progress.best_streak = prior.best_streak.max(outcome.final_streak);
    progress.accuracy_percentage =
        accuracy_percentage(progress.total_problems_solved, progress.total_attempts);
    progress.current_level = prior.current_level.max(outcome.level + 1);
    progress.completed_levels.insert(outcome.level);
    progress.record_stars(outcome.level, stars_earned);

    let mut award = badges::evaluate(&progress, outcome.level);
    if outcome.is_perfect() {
        award.grant(BadgeId::PerfectLevel);
    }
    if outcome.speed_bonus() {
        award.grant(BadgeId::SpeedDemon);
    }
    progress.badges = award.badges;

    ProgressUpdate {
        progress,
        stars_earned,
        xp_earned,
        new_badges: award.unlocked,
        announced_badge: award.announced,
    }
}
