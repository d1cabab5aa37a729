//! Option panel shown under an open pill

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};

use crate::tui::layout::PanelLayout;

pub struct OptionPanelWidget<'a> {
    panel: &'a PanelLayout,
}

impl<'a> OptionPanelWidget<'a> {
    pub fn new(panel: &'a PanelLayout) -> Self {
        Self { panel }
    }
}

impl Widget for OptionPanelWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let panel_area = self.panel.area.intersection(area);
        if panel_area.is_empty() {
            return;
        }

        // Panels float over whatever was drawn below
        Clear.render(panel_area, buf);
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .render(panel_area, buf);

        for (option, row) in &self.panel.options {
            let row = row.intersection(panel_area);
            if row.is_empty() {
                continue;
            }
            let is_selected = *option == self.panel.selected;
            let (indicator, name_style) = if is_selected {
                (
                    Span::styled("▶ ", Style::default().fg(Color::Cyan)),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                (Span::raw("  "), Style::default().fg(Color::White))
            };
            let line = Line::from(vec![indicator, Span::styled(option.clone(), name_style)]);
            buf.set_line(row.x, row.y, &line, row.width);
        }
    }
}
