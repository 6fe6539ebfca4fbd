//! Main menu

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use super::screen_block;
use crate::ui::Theme;

pub fn draw(frame: &mut Frame, area: Rect, greeting: &str, theme: &Theme) {
    let block = screen_block("Main Menu", theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(inner);

    frame.render_widget(
        Paragraph::new(greeting.to_string())
            .style(theme.title())
            .alignment(Alignment::Center),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new("Please make a choice...")
            .style(theme.text_secondary())
            .alignment(Alignment::Center),
        chunks[1],
    );
}
