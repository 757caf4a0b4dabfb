use std::time::Instant;

use anyhow::Result;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use tracing::{info, warn};

use mathchamp::config::{Config, StoreBackend};
use mathchamp::engine::badges::BadgeId;
use mathchamp::engine::level::LEVEL_COUNT;
use mathchamp::engine::scoring::ProgressUpdate;
use mathchamp::generator::arithmetic::ArithmeticGenerator;
use mathchamp::session::level_session::{LevelSession, SessionEvent};
use mathchamp::session::result::{AnswerRecord, LevelOutcome};
use mathchamp::store::ProgressRepository;
use mathchamp::store::json_store::JsonStore;
use mathchamp::store::memory_store::MemoryStore;
use mathchamp::store::schema::PlayerProgress;
use mathchamp::store::sync::ProgressSync;

use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Play,
    LevelComplete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuTab {
    Levels,
    Progress,
    Badges,
}

impl MenuTab {
    pub const ALL: [MenuTab; 3] = [MenuTab::Levels, MenuTab::Progress, MenuTab::Badges];

    pub fn title(self) -> &'static str {
        match self {
            MenuTab::Levels => "Levels",
            MenuTab::Progress => "Progress",
            MenuTab::Badges => "Badges",
        }
    }

    pub fn next(self) -> Self {
        match self {
            MenuTab::Levels => MenuTab::Progress,
            MenuTab::Progress => MenuTab::Badges,
            MenuTab::Badges => MenuTab::Levels,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            MenuTab::Levels => MenuTab::Badges,
            MenuTab::Progress => MenuTab::Levels,
            MenuTab::Badges => MenuTab::Progress,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    Failed(String),
}

/// What the completion screen shows for a finished attempt.
pub struct LevelSummary {
    pub outcome: LevelOutcome,
    pub update: ProgressUpdate,
    pub answers: Vec<AnswerRecord>,
}

pub type Repository = Box<dyn ProgressRepository>;

pub struct App {
    pub screen: AppScreen,
    pub menu_tab: MenuTab,
    pub selected_level: u32,
    pub session: Option<LevelSession>,
    pub summary: Option<LevelSummary>,
    pub badge_popup: Option<BadgeId>,
    pub save_status: Option<SaveStatus>,
    pub notice: Option<String>,
    pub store_label: String,
    pub theme: &'static Theme,
    pub config: Config,
    pub should_quit: bool,
    sync: ProgressSync<Repository>,
    rng: SmallRng,
}

/// Open the configured progress store. Falls back to an in-memory store (with
/// a notice for the player) when the configured one cannot be opened.
pub fn open_repository(config: &Config) -> (Repository, String, Option<String>) {
    let opened: Result<(Repository, String)> = match config.store {
        StoreBackend::Local => JsonStore::with_base_dir(config.data_path())
            .map(|s| (Box::new(s) as Repository, format!("local: {}", config.data_dir)))
            .map_err(Into::into),
        StoreBackend::Remote => open_remote(config),
    };

    match opened {
        Ok((repo, label)) => (repo, label, None),
        Err(e) => {
            warn!(error = %e, "progress store unavailable, progress will not be kept");
            (
                Box::new(MemoryStore::new()),
                "memory (not saved)".to_string(),
                Some(format!("Progress store unavailable: {e}")),
            )
        }
    }
}

#[cfg(feature = "network")]
fn open_remote(config: &Config) -> Result<(Repository, String)> {
    use mathchamp::store::http_store::HttpStore;
    let store = HttpStore::new(&config.remote_url, config.remote_token.clone())?;
    Ok((Box::new(store), format!("remote: {}", config.remote_url)))
}

#[cfg(not(feature = "network"))]
fn open_remote(_config: &Config) -> Result<(Repository, String)> {
    anyhow::bail!("remote store support was not compiled in (enable the `network` feature)")
}

impl App {
    pub fn new(config: Config, theme: &'static Theme) -> Self {
        let (repo, store_label, notice) = open_repository(&config);
        let mut app = Self::with_repository(config, theme, repo, store_label);
        if notice.is_some() {
            app.notice = notice;
        }
        app
    }

    pub fn with_repository(
        config: Config,
        theme: &'static Theme,
        repo: Repository,
        store_label: String,
    ) -> Self {
        let mut sync = ProgressSync::new(repo, config.write_retries);
        let notice = match sync.load_or_create() {
            Ok(record) => {
                info!(id = %record.id, version = record.version, "progress loaded");
                None
            }
            Err(e) => {
                warn!(error = %e, "could not load progress");
                Some(format!("Could not load progress: {e}"))
            }
        };
        let selected_level = sync.progress().continue_level();

        Self {
            screen: AppScreen::Menu,
            menu_tab: MenuTab::Levels,
            selected_level,
            session: None,
            summary: None,
            badge_popup: None,
            save_status: None,
            notice,
            store_label,
            theme,
            config,
            should_quit: false,
            sync,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn progress(&self) -> &PlayerProgress {
        self.sync.progress()
    }

    pub fn pending_saves(&self) -> usize {
        self.sync.pending()
    }

    pub fn start_level(&mut self, level: u32, now: Instant) {
        let generator = ArithmeticGenerator::new(SmallRng::seed_from_u64(self.rng.next_u64()));
        let session = LevelSession::new(level, Box::new(generator), now, self.config.result_delay());
        info!(level = session.level(), "level started");
        self.selected_level = session.level();
        self.session = Some(session);
        self.summary = None;
        self.badge_popup = None;
        self.save_status = None;
        self.screen = AppScreen::Play;
    }

    /// Start the selected level from the menu; locked levels stay shut.
    pub fn start_selected(&mut self, now: Instant) {
        if self.progress().is_level_unlocked(self.selected_level) {
            self.start_level(self.selected_level, now);
        }
    }

    pub fn continue_playing(&mut self, now: Instant) {
        let level = self.progress().continue_level();
        self.start_level(level, now);
    }

    pub fn select_option(&mut self, slot: usize, now: Instant) {
        if let Some(session) = self.session.as_mut() {
            session.select_option(slot, now);
        }
    }

    pub fn tick(&mut self, now: Instant) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Some(SessionEvent::Completed(outcome)) = session.tick(now) {
            let answers = session.history().to_vec();
            self.finish_level(outcome, answers);
        }
    }

    fn finish_level(&mut self, outcome: LevelOutcome, answers: Vec<AnswerRecord>) {
        let update = self.sync.record_outcome(outcome.clone());
        self.save_status = Some(match self.sync.flush() {
            Ok(()) => SaveStatus::Saved,
            Err(e) => SaveStatus::Failed(e.to_string()),
        });
        if let Some(badge) = update.announced_badge {
            info!(badge = badge.as_str(), "badge unlocked");
        }
        self.badge_popup = update.announced_badge;
        self.summary = Some(LevelSummary {
            outcome,
            update,
            answers,
        });
        self.session = None;
        self.screen = AppScreen::LevelComplete;
    }

    pub fn retry_save(&mut self) {
        if self.sync.pending() == 0 {
            return;
        }
        self.save_status = Some(match self.sync.retry_pending() {
            Ok(()) => SaveStatus::Saved,
            Err(e) => SaveStatus::Failed(e.to_string()),
        });
    }

    fn last_level(&self) -> Option<u32> {
        self.summary.as_ref().map(|s| s.outcome.level)
    }

    pub fn retry_level(&mut self, now: Instant) {
        if let Some(level) = self.last_level() {
            self.start_level(level, now);
        }
    }

    pub fn next_level(&mut self, now: Instant) {
        if let Some(level) = self.last_level()
            && level < LEVEL_COUNT
        {
            self.start_level(level + 1, now);
        }
    }

    /// Leave whatever is in progress. An unfinished attempt is dropped.
    pub fn go_to_menu(&mut self) {
        if let Some(session) = self.session.take() {
            info!(level = session.level(), "level abandoned");
        }
        self.summary = None;
        self.badge_popup = None;
        self.screen = AppScreen::Menu;
    }

    pub fn move_selection(&mut self, delta: i32) {
        let next = self.selected_level as i32 + delta;
        self.selected_level = next.clamp(1, LEVEL_COUNT as i32) as u32;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn theme() -> &'static Theme {
        Box::leak(Box::new(Theme::default()))
    }

    fn test_app() -> App {
        App::with_repository(
            Config::default(),
            theme(),
            Box::new(MemoryStore::new()),
            "memory".to_string(),
        )
    }

    /// Answer every question correctly, `gap` after it appears.
    fn play_through(app: &mut App, start: Instant, gap: Duration) -> Instant {
        let mut now = start;
        while app.screen == AppScreen::Play {
            let session = app.session.as_ref().unwrap();
            let slot = session
                .options()
                .position(session.problem().answer)
                .unwrap();
            now += gap;
            app.select_option(slot, now);
            now += app.config.result_delay();
            app.tick(now);
        }
        now
    }

    #[test]
    fn test_fresh_app_starts_on_menu_at_level_one() {
        let app = test_app();
        assert_eq!(app.screen, AppScreen::Menu);
        assert_eq!(app.selected_level, 1);
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_locked_level_does_not_start() {
        let mut app = test_app();
        app.move_selection(3);
        assert_eq!(app.selected_level, 4);
        app.start_selected(Instant::now());
        assert_eq!(app.screen, AppScreen::Menu);
        assert!(app.session.is_none());
    }

    #[test]
    fn test_full_level_saves_and_shows_summary() {
        let mut app = test_app();
        let t0 = Instant::now();
        app.start_selected(t0);
        assert_eq!(app.screen, AppScreen::Play);

        play_through(&mut app, t0, Duration::from_secs(4));

        assert_eq!(app.screen, AppScreen::LevelComplete);
        assert_eq!(app.save_status, Some(SaveStatus::Saved));
        let summary = app.summary.as_ref().unwrap();
        assert_eq!(summary.update.stars_earned, 3);
        assert_eq!(summary.answers.len(), 10);
        assert_eq!(app.progress().current_level, 2);
        assert_eq!(app.badge_popup, Some(BadgeId::Streak5));
        assert_eq!(app.pending_saves(), 0);
    }

    #[test]
    fn test_next_level_after_completion() {
        let mut app = test_app();
        let t0 = Instant::now();
        app.start_level(1, t0);
        let now = play_through(&mut app, t0, Duration::from_secs(1));
        assert!(app.progress().badges.contains("speed_demon"));

        app.next_level(now);
        assert_eq!(app.screen, AppScreen::Play);
        assert_eq!(app.session.as_ref().unwrap().level(), 2);
    }

    #[test]
    fn test_leaving_mid_level_keeps_progress_untouched() {
        let mut app = test_app();
        let t0 = Instant::now();
        app.start_level(1, t0);
        app.select_option(0, t0 + Duration::from_secs(1));
        app.go_to_menu();
        assert_eq!(app.screen, AppScreen::Menu);
        assert!(app.session.is_none());
        assert_eq!(app.progress(), &PlayerProgress::default());
    }

    #[test]
    fn test_menu_tabs_cycle() {
        let mut tab = MenuTab::Levels;
        for _ in 0..3 {
            tab = tab.next();
        }
        assert_eq!(tab, MenuTab::Levels);
        assert_eq!(MenuTab::Levels.prev(), MenuTab::Badges);
    }
}
