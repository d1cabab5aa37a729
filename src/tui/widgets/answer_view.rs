//! Answer area below the chat bar

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::page::AnswerStatus;

pub const LOADING_TEXT: &str = "Generating insights, please wait...";

pub struct AnswerWidget<'a> {
    status: &'a AnswerStatus,
}

impl<'a> AnswerWidget<'a> {
    pub fn new(status: &'a AnswerStatus) -> Self {
        Self { status }
    }

    fn lines(&self) -> Vec<Line<'a>> {
        match self.status {
            AnswerStatus::Idle => vec![Line::from(Span::styled(
                "Pick values in a question, or type your own, then press Enter.",
                Style::default().fg(Color::DarkGray),
            ))],
            AnswerStatus::Loading => vec![Line::from(Span::styled(
                LOADING_TEXT,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            ))],
            AnswerStatus::Failed(message) => vec![Line::from(Span::styled(
                format!("Error: {}", message),
                Style::default().fg(Color::Red),
            ))],
            AnswerStatus::Answered(answer) => {
                let mut lines: Vec<Line> = answer.text.lines().map(Line::raw).collect();
                if !answer.charts.is_empty() {
                    lines.push(Line::default());
                    let noun = if answer.charts.len() == 1 { "chart" } else { "charts" };
                    lines.push(Line::from(Span::styled(
                        format!("[{} {} attached]", answer.charts.len(), noun),
                        Style::default().fg(Color::Cyan),
                    )));
                }
                lines
            }
        }
    }
}

impl Widget for AnswerWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let block = Block::default()
            .title(" Answer ")
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray));
        Paragraph::new(self.lines())
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
