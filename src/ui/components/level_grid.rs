use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use mathchamp::engine::level::{LEVEL_COUNT, LEVELS};
use mathchamp::store::schema::PlayerProgress;

use crate::ui::theme::Theme;

pub const GRID_COLUMNS: u32 = 5;

/// Two rows of five level cells showing lock state and best stars.
pub struct LevelGrid<'a> {
    progress: &'a PlayerProgress,
    selected: u32,
    theme: &'a Theme,
}

impl<'a> LevelGrid<'a> {
    pub fn new(progress: &'a PlayerProgress, selected: u32, theme: &'a Theme) -> Self {
        Self {
            progress,
            selected,
            theme,
        }
    }
}

pub fn star_string(stars: u8) -> String {
    (0..3)
        .map(|i| if i < stars { '\u{2605}' } else { '\u{2606}' })
        .collect()
}

impl Widget for LevelGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let rows = LEVEL_COUNT.div_ceil(GRID_COLUMNS);

        let row_areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints((0..rows).map(|_| Constraint::Length(5)).collect::<Vec<_>>())
            .split(area);

        for (row, row_area) in row_areas.iter().enumerate() {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(
                    (0..GRID_COLUMNS)
                        .map(|_| Constraint::Ratio(1, GRID_COLUMNS))
                        .collect::<Vec<_>>(),
                )
                .split(*row_area);

            for (col, cell) in cells.iter().enumerate() {
                let idx = row * GRID_COLUMNS as usize + col;
                let Some(config) = LEVELS.get(idx) else {
                    continue;
                };
                let level = config.level;
                let unlocked = self.progress.is_level_unlocked(level);
                let completed = self.progress.is_level_completed(level);
                let is_selected = level == self.selected;

                let border = if is_selected {
                    colors.accent
                } else if unlocked {
                    colors.border
                } else {
                    colors.locked
                };
                let block = Block::bordered()
                    .border_style(Style::default().fg(border))
                    .title(format!(" {level} "));
                let inner = block.inner(*cell);
                block.render(*cell, buf);

                let label_style = if unlocked {
                    Style::default().fg(colors.fg)
                } else {
                    Style::default().fg(colors.locked)
                };
                let label_style = if is_selected {
                    label_style.add_modifier(Modifier::BOLD)
                } else {
                    label_style
                };

                let status = if !unlocked {
                    Span::styled("locked", Style::default().fg(colors.locked))
                } else if completed {
                    Span::styled(
                        star_string(self.progress.level_stars(level)),
                        Style::default().fg(colors.star),
                    )
                } else {
                    Span::styled("play", Style::default().fg(colors.muted))
                };

                Paragraph::new(vec![
                    Line::from(Span::styled(config.label, label_style)),
                    Line::from(status),
                ])
                .alignment(Alignment::Center)
                .render(inner, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_string() {
        assert_eq!(star_string(0), "\u{2606}\u{2606}\u{2606}");
        assert_eq!(star_string(2), "\u{2605}\u{2605}\u{2606}");
        assert_eq!(star_string(3), "\u{2605}\u{2605}\u{2605}");
    }

    #[test]
    fn test_grid_marks_locked_levels() {
        let theme = Theme::default();
        let progress = PlayerProgress::default();
        let area = Rect::new(0, 0, 80, 10);
        let mut buf = Buffer::empty(area);
        LevelGrid::new(&progress, 1, &theme).render(area, &mut buf);

        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Addition"));
        assert!(text.contains("locked"));
    }
}
