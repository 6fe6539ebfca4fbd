//! Screen geometry

use ratatui::prelude::*;

/// Width of each button label column
const BUTTON_COLUMN_WIDTH: u16 = 20;

/// Areas of one kiosk frame
///
/// The button columns flank the screen at all times. Full-screen views
/// give up the header.
pub struct KioskLayout {
    pub header: Option<Rect>,
    pub left: Rect,
    pub screen: Rect,
    pub right: Rect,
    pub footer: Rect,
}

impl KioskLayout {
    pub fn new(area: Rect, full_screen: bool) -> Self {
        let header_height = if full_screen { 0 } else { 3 };
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(header_height), // Header
                Constraint::Min(8),                // Buttons and screen
                Constraint::Length(2),             // Footer
            ])
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(BUTTON_COLUMN_WIDTH),
                Constraint::Min(20),
                Constraint::Length(BUTTON_COLUMN_WIDTH),
            ])
            .split(rows[1]);

        Self {
            header: (!full_screen).then_some(rows[0]),
            left: columns[0],
            screen: columns[1],
            right: columns[2],
            footer: rows[2],
        }
    }
}

/// Create a centered box for dialogs
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
