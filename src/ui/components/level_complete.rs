use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use mathchamp::engine::badges::BadgeId;
use mathchamp::engine::level::LEVEL_COUNT;

use crate::app::{LevelSummary, SaveStatus};
use crate::ui::components::level_grid::star_string;
use crate::ui::theme::Theme;

pub struct LevelComplete<'a> {
    summary: &'a LevelSummary,
    badge: Option<BadgeId>,
    save_status: Option<&'a SaveStatus>,
    pending_saves: usize,
    theme: &'a Theme,
}

impl<'a> LevelComplete<'a> {
    pub fn new(
        summary: &'a LevelSummary,
        badge: Option<BadgeId>,
        save_status: Option<&'a SaveStatus>,
        pending_saves: usize,
        theme: &'a Theme,
    ) -> Self {
        Self {
            summary,
            badge,
            save_status,
            pending_saves,
            theme,
        }
    }
}

impl Widget for LevelComplete<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let outcome = &self.summary.outcome;
        let update = &self.summary.update;

        let block = Block::bordered()
            .title(format!(" Level {} Complete ", outcome.level))
            .border_style(Style::default().fg(colors.accent))
            .style(Style::default().bg(colors.bg));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        Paragraph::new(Line::from(Span::styled(
            star_string(update.stars_earned),
            Style::default()
                .fg(colors.star)
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(layout[0], buf);

        let headline = match update.stars_earned {
            3 => "Outstanding!",
            2 => "Great job!",
            1 => "Good effort!",
            _ => "Keep practicing!",
        };
        Paragraph::new(Line::from(Span::styled(
            headline,
            Style::default()
                .fg(colors.fg)
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(layout[1], buf);

        let score_color = if outcome.is_perfect() {
            colors.success
        } else if update.stars_earned > 0 {
            colors.warning
        } else {
            colors.error
        };
        Paragraph::new(Line::from(vec![
            Span::styled("  Score:  ", Style::default().fg(colors.fg)),
            Span::styled(
                format!("{}/{}", outcome.score, outcome.question_count),
                Style::default()
                    .fg(score_color)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ({}%)", outcome.percentage()),
                Style::default().fg(colors.muted),
            ),
        ]))
        .render(layout[2], buf);

        Paragraph::new(Line::from(vec![
            Span::styled("  XP:     ", Style::default().fg(colors.fg)),
            Span::styled(
                format!("+{}", update.xp_earned),
                Style::default()
                    .fg(colors.accent)
                    .add_modifier(Modifier::BOLD),
            ),
        ]))
        .render(layout[3], buf);

        Paragraph::new(Line::from(vec![
            Span::styled("  Streak: ", Style::default().fg(colors.fg)),
            Span::styled(
                outcome.final_streak.to_string(),
                Style::default().fg(colors.fg),
            ),
        ]))
        .render(layout[4], buf);

        if let Some(badge) = self.badge {
            let info = badge.info();
            let mut spans = vec![
                Span::styled("  New badge: ", Style::default().fg(colors.fg)),
                Span::styled(
                    info.name,
                    Style::default()
                        .fg(colors.star)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {}", info.description),
                    Style::default().fg(colors.muted),
                ),
            ];
            if update.new_badges.len() > 1 {
                spans.push(Span::styled(
                    format!(" (+{} more)", update.new_badges.len() - 1),
                    Style::default().fg(colors.muted),
                ));
            }
            Paragraph::new(Line::from(spans)).render(layout[5], buf);
        }

        let save_line = match self.save_status {
            Some(SaveStatus::Saved) => Line::from(Span::styled(
                "  Progress saved",
                Style::default().fg(colors.success),
            )),
            Some(SaveStatus::Failed(err)) => Line::from(vec![
                Span::styled(
                    format!("  Save failed ({} pending): ", self.pending_saves),
                    Style::default()
                        .fg(colors.error)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(err.clone(), Style::default().fg(colors.muted)),
            ]),
            None => Line::from(""),
        };
        Paragraph::new(save_line).render(layout[6], buf);

        let missed: Vec<Line> = self
            .summary
            .answers
            .iter()
            .filter(|record| !record.is_correct())
            .take(layout[7].height as usize)
            .map(|record| {
                let given = match record.chosen {
                    Some(value) => value.to_string(),
                    None => "no answer".to_string(),
                };
                Line::from(vec![
                    Span::styled(
                        format!("  {}", record.question.replace('?', &record.correct_answer.to_string())),
                        Style::default().fg(colors.fg),
                    ),
                    Span::styled(
                        format!("  (you: {given})"),
                        Style::default().fg(colors.muted),
                    ),
                ])
            })
            .collect();
        Paragraph::new(missed).render(layout[7], buf);

        let mut hints = vec![Span::styled(
            "  [r] Retry  ",
            Style::default().fg(colors.accent),
        )];
        if outcome.level < LEVEL_COUNT {
            hints.push(Span::styled(
                "[n] Next level  ",
                Style::default().fg(colors.accent),
            ));
        }
        if self.pending_saves > 0 {
            hints.push(Span::styled(
                "[s] Retry save  ",
                Style::default().fg(colors.warning),
            ));
        }
        hints.push(Span::styled(
            "[Esc] Menu",
            Style::default().fg(colors.accent),
        ));
        Paragraph::new(Line::from(hints)).render(layout[8], buf);
    }
}
