//! Template card: the question text with its pills

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Widget},
};

use crate::disclosure::PresentationMode;
use crate::tui::layout::{pill_label, CardLayout, PlacedKind};

/// Style of a pill for the given mode and open state
pub fn pill_style(mode: PresentationMode, open: bool) -> Style {
    match (mode, open) {
        (PresentationMode::Inline, false) => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        (PresentationMode::Inline, true) => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        (PresentationMode::Popup, false) => Style::default().fg(Color::White).bg(Color::DarkGray),
        (PresentationMode::Popup, true) => Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    }
}

/// Renders one card at the positions computed by the page layout
pub struct TemplateCardWidget<'a> {
    card: &'a CardLayout,
    mode: PresentationMode,
}

impl<'a> TemplateCardWidget<'a> {
    pub fn new(card: &'a CardLayout, mode: PresentationMode) -> Self {
        Self { card, mode }
    }
}

impl Widget for TemplateCardWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let card_area = self.card.area.intersection(area);
        if card_area.is_empty() {
            return;
        }

        Block::default()
            .title(format!(" {} ", self.card.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .render(card_area, buf);

        for item in &self.card.items {
            let item_area = item.area.intersection(card_area);
            if item_area.is_empty() {
                continue;
            }
            let (text, style) = match &item.kind {
                PlacedKind::Literal(text) => (text.clone(), Style::default()),
                PlacedKind::Pill { value, open, .. } => {
                    (pill_label(value, self.mode), pill_style(self.mode, *open))
                }
            };
            buf.set_stringn(
                item_area.x,
                item_area.y,
                text,
                item_area.width as usize,
                style,
            );
        }
    }
}
