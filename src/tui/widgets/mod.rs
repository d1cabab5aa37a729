//! Widgets for the ask page

mod answer_view;
mod card;
mod chat_bar;
mod option_panel;

pub use answer_view::{AnswerWidget, LOADING_TEXT};
pub use card::{pill_style, TemplateCardWidget};
pub use chat_bar::{ChatBarWidget, PLACEHOLDER};
pub use option_panel::OptionPanelWidget;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::disclosure::PresentationMode;
use crate::page::AskPage;

use super::layout::PageLayout;

/// The whole page, drawn from a precomputed layout
pub struct PageWidget<'a> {
    page: &'a AskPage,
    layout: &'a PageLayout,
}

impl<'a> PageWidget<'a> {
    pub fn new(page: &'a AskPage, layout: &'a PageLayout) -> Self {
        Self { page, layout }
    }

    fn header(&self) -> Line<'static> {
        let hint = match self.layout.mode {
            PresentationMode::Inline => "hover a value to change it",
            PresentationMode::Popup => "click a value to change it",
        };
        Line::from(vec![
            Span::styled(
                " Ask a question ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("· {} · Enter to send · Esc to quit", hint),
                Style::default().fg(Color::DarkGray),
            ),
        ])
    }
}

impl Widget for PageWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let header = self.layout.header.intersection(area);
        if !header.is_empty() {
            buf.set_line(header.x, header.y, &self.header(), header.width);
        }

        for card in &self.layout.cards {
            TemplateCardWidget::new(card, self.layout.mode).render(area, buf);
        }

        let input = self.page.chat_input();
        ChatBarWidget::new(&input, self.page.is_loading())
            .render(self.layout.chat_bar.intersection(area), buf);
        AnswerWidget::new(self.page.status()).render(self.layout.answer.intersection(area), buf);

        // Panels go last so they cover the cards and chat bar below them
        for panel in self.layout.cards.iter().filter_map(|c| c.panel.as_ref()) {
            OptionPanelWidget::new(panel).render(area, buf);
        }
    }
}
