use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use mathchamp::session::level_session::LevelSession;

use crate::ui::theme::Theme;

/// Running numbers for the attempt in progress, plus the answer trail.
pub struct PlaySidebar<'a> {
    session: &'a LevelSession,
    theme: &'a Theme,
}

impl<'a> PlaySidebar<'a> {
    pub fn new(session: &'a LevelSession, theme: &'a Theme) -> Self {
        Self { session, theme }
    }
}

impl Widget for PlaySidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let config = self.session.config();

        let block = Block::bordered()
            .title(format!(" {} ", config.label))
            .border_style(Style::default().fg(colors.border));
        let inner = block.inner(area);
        block.render(area, buf);

        let value = Style::default()
            .fg(colors.fg)
            .add_modifier(Modifier::BOLD);
        let label = Style::default().fg(colors.muted);

        let trail: Vec<Span> = self
            .session
            .history()
            .iter()
            .map(|record| {
                if record.is_correct() {
                    Span::styled("\u{25cf}", Style::default().fg(colors.success))
                } else if record.timed_out() {
                    Span::styled("\u{25cb}", Style::default().fg(colors.warning))
                } else {
                    Span::styled("\u{25cf}", Style::default().fg(colors.error))
                }
            })
            .collect();

        let lines = vec![
            Line::from(vec![
                Span::styled("  Score   ", label),
                Span::styled(
                    format!("{}/{}", self.session.score(), config.question_count),
                    value,
                ),
            ]),
            Line::from(vec![
                Span::styled("  Streak  ", label),
                Span::styled(self.session.streak().to_string(), value),
            ]),
            Line::from(vec![
                Span::styled("  Limit   ", label),
                Span::styled(format!("{}s", config.time_limit_secs), value),
            ]),
            Line::from(""),
            Line::from(
                std::iter::once(Span::raw("  "))
                    .chain(trail)
                    .collect::<Vec<_>>(),
            ),
        ];

        Paragraph::new(lines).render(inner, buf);
    }
}
