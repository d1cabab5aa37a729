//! Chat bar: the editable question and the send button

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const PLACEHOLDER: &str = "Your question will appear here...";

pub struct ChatBarWidget<'a> {
    input: &'a str,
    loading: bool,
}

impl<'a> ChatBarWidget<'a> {
    pub fn new(input: &'a str, loading: bool) -> Self {
        Self { input, loading }
    }

    fn button(&self) -> &'static str {
        if self.loading {
            " … "
        } else {
            " ↩ "
        }
    }
}

/// Trailing part of `input` that fits in `width` columns, so the end of a
/// long question stays visible while typing
fn visible_tail(input: &str, width: usize) -> String {
    let mut used = 0;
    let mut start = input.len();
    for (idx, c) in input.char_indices().rev() {
        used += c.width().unwrap_or(0);
        if used > width {
            break;
        }
        start = idx;
    }
    input[start..].to_string()
}

impl Widget for ChatBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }

        let block = Block::default()
            .title(" Ask ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if self.loading {
                Color::DarkGray
            } else {
                Color::Cyan
            }));
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.is_empty() {
            return;
        }

        let button = self.button();
        let button_width = button.width() as u16;
        let text_width = inner.width.saturating_sub(button_width);

        let text = if self.input.is_empty() {
            Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray))
        } else {
            Span::raw(visible_tail(self.input, text_width as usize))
        };
        Paragraph::new(Line::from(text)).render(
            Rect::new(inner.x, inner.y, text_width, 1),
            buf,
        );

        if inner.width >= button_width {
            buf.set_string(
                inner.right() - button_width,
                inner.y,
                button,
                Style::default().fg(Color::Black).bg(if self.loading {
                    Color::DarkGray
                } else {
                    Color::Cyan
                }),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_tail_short_input_unchanged() {
        assert_eq!(visible_tail("Top drivers?", 40), "Top drivers?");
    }

    #[test]
    fn test_visible_tail_keeps_end() {
        assert_eq!(visible_tail("abcdefgh", 3), "fgh");
        assert_eq!(visible_tail("abc", 0), "");
    }
}
