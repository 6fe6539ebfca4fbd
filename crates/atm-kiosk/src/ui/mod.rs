//! UI rendering

pub mod components;
pub mod layout;
pub mod screens;
mod theme;

pub use theme::Theme;

use ratatui::prelude::*;

use atm_core::{ButtonSlot, KioskView};

use components::{button_column, status_bar};
use layout::KioskLayout;

/// Draw one frame of the kiosk
pub fn render(frame: &mut Frame, view: &KioskView<'_>, theme: &Theme) {
    let layout = KioskLayout::new(frame.area(), view.full_screen);

    if let Some(header) = layout.header {
        status_bar::render_header(frame, header, view, theme);
    }

    button_column::render(frame, layout.left, &ButtonSlot::LEFT, &view.labels[..4], theme);
    button_column::render(frame, layout.right, &ButtonSlot::RIGHT, &view.labels[4..], theme);

    match &view.lockout {
        Some(lockout) => screens::lockout::draw(frame, layout.screen, lockout, theme),
        None => screens::draw(frame, layout.screen, view, theme),
    }

    status_bar::render_footer(frame, layout.footer, view, theme);
}
