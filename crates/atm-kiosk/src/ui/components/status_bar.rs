//! Header and footer bars

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use atm_core::KioskView;

use crate::ui::Theme;

/// Title, card and session countdown
pub fn render_header(frame: &mut Frame, area: Rect, view: &KioskView<'_>, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(theme.border())
        .style(theme.header());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(20),
            Constraint::Min(20),
            Constraint::Length(18),
        ])
        .split(inner);

    let logo = Paragraph::new(format!(" {} ATM", '\u{25C6}')).style(theme.title());
    frame.render_widget(logo, chunks[0]);

    let mut center = vec![Span::styled(view.title, theme.text())];
    if let Some(card) = view.card_type {
        center.push(Span::styled(format!("  {}", card), theme.text_secondary()));
    }
    frame.render_widget(
        Paragraph::new(Line::from(center)).alignment(Alignment::Center),
        chunks[1],
    );

    if let Some(timer) = &view.timer {
        let style = if timer.warning {
            theme.warning()
        } else {
            theme.text_secondary()
        };
        let session = Paragraph::new(format!("Session {} ", timer.formatted))
            .style(style)
            .alignment(Alignment::Right);
        frame.render_widget(session, chunks[2]);
    }
}

/// Notice, busy indicator or key hints
pub fn render_footer(frame: &mut Frame, area: Rect, view: &KioskView<'_>, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(theme.border());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let line = if view.busy {
        Line::styled("Please wait...", theme.warning())
    } else if let Some(notice) = view.notice {
        Line::styled(notice.to_string(), theme.warning())
    } else if view.lockout.is_some() {
        render_hints(&[("u", "unlock"), ("Esc", "quit")], theme)
    } else {
        render_hints(
            &[
                ("F1-F8", "buttons"),
                ("0-9", "keypad"),
                ("Bksp", "clear"),
                ("Enter", "ok"),
                ("t", "end session"),
                ("Esc", "quit"),
            ],
            theme,
        )
    };

    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), inner);
}

fn render_hints<'a>(hints: &[(&str, &str)], theme: &Theme) -> Line<'a> {
    let spans: Vec<Span> = hints
        .iter()
        .flat_map(|(key, action)| {
            vec![
                Span::styled(format!("[{}]", key), theme.button_key()),
                Span::styled(format!(" {}  ", action), theme.text_muted()),
            ]
        })
        .collect();
    Line::from(spans)
}
