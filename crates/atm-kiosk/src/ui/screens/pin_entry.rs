//! PIN entry screen

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use atm_core::screen::PinPad;

use super::screen_block;
use crate::ui::layout::centered_rect;
use crate::ui::Theme;

/// Draw the PIN entry screen
pub fn draw(frame: &mut Frame, area: Rect, pad: &PinPad, theme: &Theme) {
    let dialog = centered_rect(70, 60, area);

    let block = screen_block("Enter PIN", theme);
    let inner = block.inner(dialog);
    frame.render_widget(block, dialog);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Instructions
            Constraint::Length(2), // PIN display
            Constraint::Length(2), // Status message
            Constraint::Min(0),
        ])
        .split(inner);

    let instructions = Paragraph::new(format!("Enter your {}-digit PIN", pad.max_len()))
        .style(theme.text_secondary())
        .alignment(Alignment::Center);
    frame.render_widget(instructions, chunks[0]);

    // Masked: one dot per digit entered
    let spans: Vec<Span> = (0..pad.max_len())
        .map(|i| {
            if i < pad.entered() {
                Span::styled("● ", theme.pin_dot())
            } else {
                Span::styled("○ ", theme.pin_placeholder())
            }
        })
        .collect();
    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        chunks[1],
    );

    let status = if pad.is_verifying() {
        Some(Paragraph::new("Verifying...").style(theme.text_secondary()))
    } else {
        pad.message()
            .map(|message| Paragraph::new(message.to_string()).style(theme.danger()))
    };
    if let Some(status) = status {
        frame.render_widget(status.alignment(Alignment::Center), chunks[2]);
    }
}
