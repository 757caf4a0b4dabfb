use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tempfile::TempDir;

use mathchamp::engine::badges::BadgeId;
use mathchamp::engine::level::{ALL_LEVELS_CLEARED, LEVEL_COUNT, parse_level_param};
use mathchamp::generator::OPTION_COUNT;
use mathchamp::generator::arithmetic::ArithmeticGenerator;
use mathchamp::session::level_session::{DEFAULT_RESULT_DELAY, LevelSession, SessionEvent};
use mathchamp::session::result::LevelOutcome;
use mathchamp::store::json_store::JsonStore;
use mathchamp::store::sync::ProgressSync;

/// Play one level to completion. `correct(i)` decides whether question `i`
/// gets the right option; `None` lets the countdown run out.
fn play_level(
    level: u32,
    seed: u64,
    gap: Duration,
    choose: impl Fn(u32) -> Option<bool>,
) -> LevelOutcome {
    let generator = ArithmeticGenerator::new(SmallRng::seed_from_u64(seed));
    let mut now = Instant::now();
    let mut session = LevelSession::new(level, Box::new(generator), now, DEFAULT_RESULT_DELAY);
    let limit = Duration::from_secs(session.config().time_limit_secs as u64);

    loop {
        let index = session.question_index();
        let right_slot = session
            .options()
            .position(session.problem().answer)
            .expect("answer among options");

        match choose(index) {
            Some(true) => {
                now += gap;
                session.select_option(right_slot, now);
            }
            Some(false) => {
                now += gap;
                session.select_option((right_slot + 1) % OPTION_COUNT, now);
            }
            None => {
                now += limit;
                let event = session.tick(now);
                assert!(matches!(
                    event,
                    Some(SessionEvent::Answered { chosen: None, .. })
                ));
            }
        }

        now += DEFAULT_RESULT_DELAY;
        match session.tick(now) {
            Some(SessionEvent::Completed(outcome)) => return outcome,
            Some(SessionEvent::NextQuestion { .. }) => {}
            other => panic!("unexpected event {other:?}"),
        }
    }
}

fn open_sync(dir: &TempDir) -> ProgressSync<JsonStore> {
    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let mut sync = ProgressSync::new(store, 3).with_backoff(Duration::ZERO);
    sync.load_or_create().unwrap();
    sync
}

#[test]
fn fresh_player_clears_level_one() {
    let dir = TempDir::new().unwrap();
    let mut sync = open_sync(&dir);
    assert_eq!(sync.progress().current_level, 1);

    let outcome = play_level(1, 1, Duration::from_secs(4), |_| Some(true));
    assert_eq!(outcome.score, 10);
    assert!(!outcome.speed_bonus());

    let update = sync.record_outcome(outcome);
    sync.flush().unwrap();

    assert_eq!(update.stars_earned, 3);
    assert_eq!(update.xp_earned, 10 * 10 + 3 * 20);
    assert_eq!(update.announced_badge, Some(BadgeId::Streak5));
    assert!(update.new_badges.contains(&BadgeId::Streak10));
    assert!(update.new_badges.contains(&BadgeId::PerfectLevel));
    assert!(!update.new_badges.contains(&BadgeId::FirstProblem));
    assert!(!update.new_badges.contains(&BadgeId::SpeedDemon));

    // A second process sees the same record.
    let reopened = open_sync(&dir);
    let progress = reopened.progress();
    assert_eq!(progress.current_level, 2);
    assert!(progress.completed_levels.contains(&1));
    assert_eq!(progress.level_stars(1), 3);
    assert_eq!(progress.xp_points, 160);
    assert_eq!(progress.accuracy_percentage, 100);
    assert!(progress.is_level_unlocked(2));
    assert!(!progress.is_level_unlocked(3));
    assert_eq!(reopened.record().unwrap().version, 2);
}

#[test]
fn fifty_problems_over_five_levels() {
    let dir = TempDir::new().unwrap();
    let mut sync = open_sync(&dir);

    for level in 1..=5 {
        let outcome = play_level(level, level as u64, Duration::from_secs(2), |_| Some(true));
        let update = sync.record_outcome(outcome);
        sync.flush().unwrap();
        if level == 1 {
            assert!(update.new_badges.contains(&BadgeId::SpeedDemon));
        }
        if level == 5 {
            assert!(update.new_badges.contains(&BadgeId::Level5));
            assert!(update.new_badges.contains(&BadgeId::Problems50));
        }
    }

    let progress = open_sync(&dir).progress().clone();
    assert_eq!(progress.total_problems_solved, 50);
    assert_eq!(progress.total_stars, 15);
    assert_eq!(progress.current_level, 6);
    assert!(!progress.badges.contains("problems_100"));
}

#[test]
fn mixed_results_and_timeouts() {
    let dir = TempDir::new().unwrap();
    let mut sync = open_sync(&dir);

    // 6 right, 2 wrong, 2 timeouts; ends on a right answer.
    let outcome = play_level(3, 9, Duration::from_secs(5), |i| match i {
        2 | 5 => Some(false),
        3 | 7 => None,
        _ => Some(true),
    });
    assert_eq!(outcome.score, 6);
    assert_eq!(outcome.final_streak, 2);

    let update = sync.record_outcome(outcome);
    sync.flush().unwrap();
    assert_eq!(update.stars_earned, 1);
    assert_eq!(update.xp_earned, 6 * 10 + 20);
    assert_eq!(update.announced_badge, None);

    let progress = sync.progress();
    assert_eq!(progress.accuracy_percentage, 60);
    assert_eq!(progress.current_streak, 2);
    assert_eq!(progress.current_level, 4);
}

#[test]
fn deep_link_to_master_level() {
    let level = parse_level_param(Some("10"));
    assert_eq!(level, LEVEL_COUNT);
    assert_eq!(parse_level_param(Some("eleven")), 1);
    assert_eq!(parse_level_param(None), 1);

    let dir = TempDir::new().unwrap();
    let mut sync = open_sync(&dir);

    let outcome = play_level(level, 42, Duration::from_secs(3), |i| Some(i % 10 != 0));
    assert_eq!(outcome.question_count, 20);
    assert_eq!(outcome.score, 18);

    let update = sync.record_outcome(outcome);
    sync.flush().unwrap();
    assert_eq!(update.stars_earned, 3);
    assert!(update.new_badges.contains(&BadgeId::Level5));
    assert!(update.new_badges.contains(&BadgeId::Level10));
    assert!(!update.new_badges.contains(&BadgeId::PerfectLevel));
    // Exactly 3s is not under the limit.
    assert!(!update.new_badges.contains(&BadgeId::SpeedDemon));

    let progress = open_sync(&dir).progress().clone();
    assert_eq!(progress.current_level, ALL_LEVELS_CLEARED);
    assert!(progress.all_levels_cleared());
    assert_eq!(progress.continue_level(), LEVEL_COUNT);
}
