//! Lockout overlay displayed when too many PIN attempts fail

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use atm_core::kiosk::LockoutView;

use crate::ui::layout::centered_rect;
use crate::ui::Theme;

/// Draw the lockout overlay in place of the screen
pub fn draw(frame: &mut Frame, area: Rect, lockout: &LockoutView, theme: &Theme) {
    let dialog = centered_rect(80, 60, area);

    let block = Block::default()
        .title(" PIN Locked ")
        .title_style(theme.danger())
        .borders(Borders::ALL)
        .border_style(theme.danger());

    let inner = block.inner(dialog);
    frame.render_widget(block, dialog);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Warning icon
            Constraint::Length(3), // Message
            Constraint::Length(2), // Countdown
            Constraint::Min(0),
        ])
        .split(inner);

    let icon = Paragraph::new("⚠  LOCKED  ⚠")
        .style(theme.danger())
        .alignment(Alignment::Center);
    frame.render_widget(icon, chunks[0]);

    let message = Paragraph::new("Too many incorrect PIN attempts.\nPlease wait before trying again.")
        .style(theme.text())
        .alignment(Alignment::Center);
    frame.render_widget(message, chunks[1]);

    let mins = lockout.remaining_secs / 60;
    let secs = lockout.remaining_secs % 60;
    let countdown = match lockout.until {
        Some(until) => format!(
            "Time remaining: {:02}:{:02} (until {})",
            mins,
            secs,
            until.with_timezone(&chrono::Local).format("%H:%M:%S")
        ),
        None => "Lockout over".to_string(),
    };
    frame.render_widget(
        Paragraph::new(countdown)
            .style(theme.warning())
            .alignment(Alignment::Center),
        chunks[2],
    );
}
