use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use mathchamp::session::level_session::{LevelSession, SessionState};

use crate::ui::theme::Theme;

/// The current problem, its four numbered options and, once answered, the
/// feedback line.
pub struct ProblemCard<'a> {
    session: &'a LevelSession,
    theme: &'a Theme,
}

impl<'a> ProblemCard<'a> {
    pub fn new(session: &'a LevelSession, theme: &'a Theme) -> Self {
        Self { session, theme }
    }

    fn feedback(&self) -> Option<Line<'static>> {
        let colors = &self.theme.colors;
        let SessionState::ShowingResult { chosen, .. } = self.session.state() else {
            return None;
        };
        let answer = self.session.problem().answer;
        let line = match chosen {
            Some(value) if value == answer => Line::from(Span::styled(
                "Correct!",
                Style::default()
                    .fg(colors.success)
                    .add_modifier(Modifier::BOLD),
            )),
            Some(_) => Line::from(vec![
                Span::styled(
                    "Try again! ",
                    Style::default()
                        .fg(colors.error)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("The answer was {answer}"),
                    Style::default().fg(colors.fg),
                ),
            ]),
            None => Line::from(vec![
                Span::styled(
                    "Time's up! ",
                    Style::default()
                        .fg(colors.warning)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("The answer was {answer}"),
                    Style::default().fg(colors.fg),
                ),
            ]),
        };
        Some(line)
    }
}

impl Widget for ProblemCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let count = self.session.config().question_count;
        let title = format!(
            " Question {} of {count} ",
            (self.session.question_index() + 1).min(count)
        );
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(colors.accent))
            .style(Style::default().bg(colors.bg));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        Paragraph::new(Line::from(Span::styled(
            self.session.problem().display_text(),
            Style::default()
                .fg(colors.fg)
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(layout[1], buf);

        let answered = match self.session.state() {
            SessionState::ShowingResult { chosen, .. } => Some(chosen),
            _ => None,
        };
        let answer = self.session.problem().answer;

        let rows = [layout[3], layout[4]];
        for (row_idx, row) in rows.into_iter().enumerate() {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(row);
            for (col_idx, cell) in cells.iter().enumerate() {
                let slot = row_idx * 2 + col_idx;
                let Some(value) = self.session.options().get(slot) else {
                    continue;
                };

                let border = match answered {
                    Some(_) if value == answer => colors.success,
                    Some(Some(chosen)) if chosen == value => colors.error,
                    Some(_) => colors.locked,
                    None => colors.border,
                };
                let option_block =
                    Block::bordered().border_style(Style::default().fg(border));
                let option_inner = option_block.inner(*cell);
                option_block.render(*cell, buf);

                Paragraph::new(Line::from(vec![
                    Span::styled(
                        format!("[{}] ", slot + 1),
                        Style::default().fg(colors.muted),
                    ),
                    Span::styled(
                        value.to_string(),
                        Style::default()
                            .fg(colors.fg)
                            .add_modifier(Modifier::BOLD),
                    ),
                ]))
                .alignment(Alignment::Center)
                .render(option_inner, buf);
            }
        }

        if let Some(line) = self.feedback() {
            Paragraph::new(line)
                .alignment(Alignment::Center)
                .render(layout[5], buf);
        }
    }
}
