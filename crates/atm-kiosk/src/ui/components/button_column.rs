//! Side button labels

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use atm_core::ButtonSlot;

use crate::app::slot_key;
use crate::ui::Theme;

/// Render one column of four labels
///
/// `slots` and `labels` are top to bottom. Unbound slots show only their key.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    slots: &[ButtonSlot; 4],
    labels: &[Option<String>],
    theme: &Theme,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for ((slot, label), row) in slots.iter().zip(labels).zip(rows.iter()) {
        let key = Span::styled(format!("[{}]", slot_key(*slot)), theme.button_key());
        let text = label
            .as_deref()
            .map(|label| Span::styled(label.to_string(), theme.text()))
            .unwrap_or_else(|| Span::styled("", theme.text_muted()));

        let (line, alignment, borders) = if slot.is_left() {
            (
                Line::from(vec![key, Span::raw(" "), text]),
                Alignment::Left,
                Borders::RIGHT,
            )
        } else {
            (
                Line::from(vec![text, Span::raw(" "), key]),
                Alignment::Right,
                Borders::LEFT,
            )
        };

        let block = Block::default().borders(borders).border_style(theme.border());
        let inner = block.inner(*row);
        frame.render_widget(block, *row);

        // Vertically center the label in its row
        let middle = Rect::new(
            inner.x,
            inner.y + inner.height.saturating_sub(1) / 2,
            inner.width,
            1.min(inner.height),
        );
        frame.render_widget(Paragraph::new(line).alignment(alignment), middle);
    }
}
