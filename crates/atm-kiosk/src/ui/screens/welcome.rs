//! Welcome screen

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use super::screen_block;
use crate::ui::Theme;

pub fn draw(frame: &mut Frame, area: Rect, notice: Option<&str>, theme: &Theme) {
    let block = screen_block("Welcome", theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(3), // Greeting
            Constraint::Length(2), // Instructions
            Constraint::Length(2), // Notice
            Constraint::Min(1),
        ])
        .split(inner);

    let greeting = Paragraph::new("Welcome to your bank")
        .style(theme.title())
        .alignment(Alignment::Center);
    frame.render_widget(greeting, chunks[1]);

    let instructions = Paragraph::new("Press Enter PIN to begin")
        .style(theme.text_secondary())
        .alignment(Alignment::Center);
    frame.render_widget(instructions, chunks[2]);

    if let Some(notice) = notice {
        let notice = Paragraph::new(notice)
            .style(theme.warning())
            .alignment(Alignment::Center);
        frame.render_widget(notice, chunks[3]);
    }
}
