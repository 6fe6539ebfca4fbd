//! Balance screen

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use atm_core::screen::BalanceView;

use super::screen_block;
use crate::ui::Theme;

pub fn draw(frame: &mut Frame, area: Rect, balance: &BalanceView, theme: &Theme) {
    let block = screen_block("Balance", theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(1),
        ])
        .split(inner);

    let (caption, value) = match balance {
        BalanceView::Loading => (
            Paragraph::new("Loading...").style(theme.text_secondary()),
            None,
        ),
        BalanceView::Ready(amount) => (
            Paragraph::new("Your balance is").style(theme.text_secondary()),
            Some(Paragraph::new(format!("${}", amount)).style(theme.amount())),
        ),
        BalanceView::Error(message) => (
            Paragraph::new(message.clone()).style(theme.danger()),
            None,
        ),
    };

    frame.render_widget(caption.alignment(Alignment::Center), chunks[1]);
    if let Some(value) = value {
        frame.render_widget(value.alignment(Alignment::Center), chunks[2]);
    }
}
