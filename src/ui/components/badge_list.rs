use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use mathchamp::engine::badges::BADGE_CATALOG;
use mathchamp::store::schema::PlayerProgress;

use crate::ui::theme::Theme;

pub struct BadgeList<'a> {
    progress: &'a PlayerProgress,
    theme: &'a Theme,
}

impl<'a> BadgeList<'a> {
    pub fn new(progress: &'a PlayerProgress, theme: &'a Theme) -> Self {
        Self { progress, theme }
    }

    fn earned_count(&self) -> usize {
        BADGE_CATALOG
            .iter()
            .filter(|b| self.progress.badges.contains(b.id.as_str()))
            .count()
    }
}

impl Widget for BadgeList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(
                " Badges {}/{} ",
                self.earned_count(),
                BADGE_CATALOG.len()
            ))
            .border_style(Style::default().fg(colors.border));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = Vec::with_capacity(BADGE_CATALOG.len() * 2);
        for badge in &BADGE_CATALOG {
            let earned = self.progress.badges.contains(badge.id.as_str());
            let (marker, name_style) = if earned {
                (
                    Span::styled(" \u{2605} ", Style::default().fg(colors.star)),
                    Style::default()
                        .fg(colors.fg)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                (
                    Span::styled(" \u{00b7} ", Style::default().fg(colors.locked)),
                    Style::default().fg(colors.locked),
                )
            };
            lines.push(Line::from(vec![
                marker,
                Span::styled(badge.name, name_style),
                Span::styled(
                    format!("  {}", badge.description),
                    Style::default().fg(colors.muted),
                ),
            ]));
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
