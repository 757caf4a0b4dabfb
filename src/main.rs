mod app;
mod event;
mod ui;

use std::fs::{self, File};
use std::io;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mathchamp::config::{Config, StoreBackend};
use mathchamp::engine::level::parse_level_param;

use app::{App, AppScreen, MenuTab};
use event::{AppEvent, EventHandler};
use ui::components::badge_list::BadgeList;
use ui::components::level_complete::LevelComplete;
use ui::components::level_grid::{GRID_COLUMNS, LevelGrid};
use ui::components::play_sidebar::PlaySidebar;
use ui::components::problem_card::ProblemCard;
use ui::components::progress_panel::ProgressPanel;
use ui::components::timer_bar::TimerBar;
use ui::layout::{AppLayout, pack_hint_lines};
use ui::theme::Theme;

#[derive(Parser)]
#[command(name = "mathchamp", version, about = "Terminal arithmetic drills with levels, stars and badges")]
struct Cli {
    #[arg(short, long, help = "Jump straight into a level (1-10)")]
    level: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, value_enum, help = "Where progress is kept")]
    store: Option<StoreBackend>,

    #[arg(long, help = "Base URL of the remote entity API")]
    remote_url: Option<String>,

    #[arg(long, help = "Directory for progress data and the log file")]
    data_dir: Option<String>,

    #[arg(long, help = "Write the effective settings to the config file and exit")]
    save_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    if let Some(store) = cli.store {
        config.store = store;
    }
    if let Some(url) = cli.remote_url {
        config.remote_url = url;
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    config.normalize();

    if cli.save_config {
        config.save()?;
        println!("Saved settings to {}", Config::config_path().display());
        return Ok(());
    }

    init_logging(&config)?;
    info!(version = env!("CARGO_PKG_VERSION"), "mathchamp starting");
    if let Some(e) = config_error {
        warn!(error = %e, path = %Config::config_path().display(), "config unreadable, using defaults");
    }

    let theme = Theme::load(&config.theme).unwrap_or_else(|e| {
        warn!(theme = %config.theme, error = %e, available = ?Theme::available_themes(), "theme unavailable");
        Theme::default()
    });
    let theme: &'static Theme = Box::leak(Box::new(theme));

    let mut app = App::new(config, theme);
    if cli.level.is_some() {
        app.start_level(parse_level_param(cli.level.as_deref()), Instant::now());
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }
    info!("mathchamp exiting");

    Ok(())
}

/// Log to a file in the data dir; the terminal belongs to the UI.
fn init_logging(config: &Config) -> Result<()> {
    fs::create_dir_all(config.data_path())?;
    let file = File::options()
        .create(true)
        .append(true)
        .open(config.log_path())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app, Instant::now()))?;

        match events.next()? {
            AppEvent::Key(key, at) => handle_key(app, key, at),
            AppEvent::Tick(at) => app.tick(at),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent, at: Instant) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key, at),
        AppScreen::Play => handle_play_key(app, key, at),
        AppScreen::LevelComplete => handle_complete_key(app, key, at),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent, at: Instant) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Tab => app.menu_tab = app.menu_tab.next(),
        KeyCode::BackTab => app.menu_tab = app.menu_tab.prev(),
        KeyCode::Char('c') => app.continue_playing(at),
        KeyCode::Char('s') => app.retry_save(),
        _ if app.menu_tab == MenuTab::Levels => handle_level_grid_key(app, key, at),
        _ => {}
    }
}

fn handle_level_grid_key(app: &mut App, key: KeyEvent, at: Instant) {
    let row = GRID_COLUMNS as i32;
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => app.move_selection(-1),
        KeyCode::Right | KeyCode::Char('l') => app.move_selection(1),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-row),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(row),
        KeyCode::Enter | KeyCode::Char(' ') => app.start_selected(at),
        _ => {}
    }
}

fn handle_play_key(app: &mut App, key: KeyEvent, at: Instant) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        KeyCode::Char(ch @ '1'..='4') => {
            let slot = ch as usize - '1' as usize;
            app.select_option(slot, at);
        }
        _ => {}
    }
}

fn handle_complete_key(app: &mut App, key: KeyEvent, at: Instant) {
    match key.code {
        KeyCode::Char('r') => app.retry_level(at),
        KeyCode::Char('n') | KeyCode::Enter => app.next_level(at),
        KeyCode::Char('s') => app.retry_save(),
        KeyCode::Char('q') | KeyCode::Esc | KeyCode::Char('m') => app.go_to_menu(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App, now: Instant) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Menu => render_menu(frame, app),
        AppScreen::Play => render_play(frame, app, now),
        AppScreen::LevelComplete => render_complete(frame, app),
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect, extra: &str) {
    let colors = &app.theme.colors;
    let progress = app.progress();
    let info = format!(
        " \u{2605} {} | XP {} | Streak {}{extra}",
        progress.total_stars, progress.xp_points, progress.current_streak,
    );
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " mathchamp ",
            Style::default()
                .fg(colors.header_fg)
                .bg(colors.header_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info,
            Style::default().fg(colors.muted).bg(colors.header_bg),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect, hints: &[&str]) {
    let colors = &app.theme.colors;
    let lines: Vec<Line> = pack_hint_lines(hints, area.width as usize)
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.muted))))
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(frame, app, layout[0], "");

    let mut tabs: Vec<Span> = vec![Span::raw(" ")];
    for tab in MenuTab::ALL {
        let style = if tab == app.menu_tab {
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(colors.muted)
        };
        tabs.push(Span::styled(format!(" {} ", tab.title()), style));
    }
    frame.render_widget(Paragraph::new(Line::from(tabs)), layout[1]);

    let body = ui::layout::centered_rect(90, 100, layout[2]);
    match app.menu_tab {
        MenuTab::Levels => {
            frame.render_widget(LevelGrid::new(app.progress(), app.selected_level, app.theme), body)
        }
        MenuTab::Progress => frame.render_widget(
            ProgressPanel::new(app.progress(), &app.store_label, app.theme),
            body,
        ),
        MenuTab::Badges => frame.render_widget(BadgeList::new(app.progress(), app.theme), body),
    }

    let status = if let Some(ref notice) = app.notice {
        Line::from(Span::styled(format!(" {notice}"), Style::default().fg(colors.warning)))
    } else if app.pending_saves() > 0 {
        Line::from(Span::styled(
            format!(" {} result(s) not saved yet, press [s] to retry", app.pending_saves()),
            Style::default().fg(colors.warning),
        ))
    } else if app.progress().all_levels_cleared() {
        Line::from(Span::styled(
            " All levels cleared!",
            Style::default().fg(colors.star),
        ))
    } else {
        Line::from("")
    };
    frame.render_widget(Paragraph::new(status), layout[3]);

    let continue_hint = format!("[c] Continue level {}", app.progress().continue_level());
    render_footer(
        frame,
        app,
        layout[4],
        &[
            "[\u{2190}\u{2191}\u{2192}\u{2193}] Select",
            "[Enter] Play",
            continue_hint.as_str(),
            "[Tab] Switch tab",
            "[q] Quit",
        ],
    );
}

fn render_play(frame: &mut ratatui::Frame, app: &App, now: Instant) {
    let Some(ref session) = app.session else {
        return;
    };
    let app_layout = AppLayout::new(frame.area());

    let extra = format!(" | Level {}", session.level());
    render_header(frame, app, app_layout.header, &extra);

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(11)])
        .split(app_layout.main);

    frame.render_widget(
        TimerBar::new(session.time_left(now), session.time_ratio(now), app.theme),
        main[0],
    );
    frame.render_widget(ProblemCard::new(session, app.theme), main[1]);

    if let Some(sidebar) = app_layout.sidebar {
        frame.render_widget(PlaySidebar::new(session, app.theme), sidebar);
    }

    render_footer(frame, app, app_layout.footer, &["[1-4] Answer", "[Esc] Leave level"]);
}

fn render_complete(frame: &mut ratatui::Frame, app: &App) {
    let Some(ref summary) = app.summary else {
        return;
    };
    let area = ui::layout::centered_rect(60, 60, frame.area());
    frame.render_widget(
        LevelComplete::new(
            summary,
            app.badge_popup,
            app.save_status.as_ref(),
            app.pending_saves(),
            app.theme,
        ),
        area,
    );
}
