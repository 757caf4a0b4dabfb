use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use mathchamp::engine::level::LEVEL_COUNT;
use mathchamp::store::schema::PlayerProgress;

use crate::ui::theme::Theme;

/// Lifetime totals from the progress record.
pub struct ProgressPanel<'a> {
    progress: &'a PlayerProgress,
    store_label: &'a str,
    theme: &'a Theme,
}

impl<'a> ProgressPanel<'a> {
    pub fn new(progress: &'a PlayerProgress, store_label: &'a str, theme: &'a Theme) -> Self {
        Self {
            progress,
            store_label,
            theme,
        }
    }
}

impl Widget for ProgressPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let p = self.progress;

        let block = Block::bordered()
            .title(" Progress ")
            .border_style(Style::default().fg(colors.border));
        let inner = block.inner(area);
        block.render(area, buf);

        let label = Style::default().fg(colors.muted);
        let value = Style::default()
            .fg(colors.fg)
            .add_modifier(Modifier::BOLD);

        let acc_color = if p.total_attempts == 0 {
            colors.muted
        } else if p.accuracy_percentage >= 90 {
            colors.success
        } else if p.accuracy_percentage >= 70 {
            colors.warning
        } else {
            colors.error
        };

        let rows: Vec<(&str, String, Style)> = vec![
            ("XP", p.xp_points.to_string(), value.fg(colors.accent)),
            ("Stars", p.total_stars.to_string(), value.fg(colors.star)),
            (
                "Levels",
                format!("{}/{LEVEL_COUNT}", p.completed_levels.len()),
                value,
            ),
            ("Solved", p.total_problems_solved.to_string(), value),
            ("Attempts", p.total_attempts.to_string(), value),
            (
                "Accuracy",
                format!("{}%", p.accuracy_percentage),
                value.fg(acc_color),
            ),
            ("Best streak", p.best_streak.to_string(), value),
        ];

        let mut lines: Vec<Line> = rows
            .into_iter()
            .map(|(name, text, style)| {
                Line::from(vec![
                    Span::styled(format!("  {name:<12}"), label),
                    Span::styled(text, style),
                ])
            })
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  Saved to {}", self.store_label),
            label,
        )));

        Paragraph::new(lines).render(inner, buf);
    }
}
