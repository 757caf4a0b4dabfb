use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Theme;

/// Countdown for the current question. Drains left to right and turns
/// warning/error coloured as time runs out.
pub struct TimerBar<'a> {
    pub seconds_left: u32,
    pub ratio: f64,
    pub theme: &'a Theme,
}

impl<'a> TimerBar<'a> {
    pub fn new(seconds_left: u32, ratio: f64, theme: &'a Theme) -> Self {
        Self {
            seconds_left,
            ratio: ratio.clamp(0.0, 1.0),
            theme,
        }
    }
}

impl Widget for TimerBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Time ")
            .border_style(Style::default().fg(colors.border));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let fill = if self.ratio <= 0.25 {
            colors.error
        } else if self.ratio <= 0.5 {
            colors.warning
        } else {
            colors.bar_filled
        };
        let filled_width = (self.ratio * inner.width as f64).round() as u16;
        let label = format!("{}s", self.seconds_left);

        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg).bg(fill)
            } else {
                Style::default().fg(colors.fg).bg(colors.bar_empty)
            };
            buf[(x, inner.y)].set_style(style);
        }

        let label_x = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        buf.set_string(label_x, inner.y, &label, Style::default().fg(colors.fg));
    }
}
