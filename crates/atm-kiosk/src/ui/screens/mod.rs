//! Screen modules for different views

pub mod balance;
pub mod lockout;
pub mod menu;
pub mod pin_entry;
pub mod transaction;
pub mod welcome;

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders};

use atm_core::{KioskView, ScreenContent};

use crate::ui::Theme;

/// Draw the current screen's content
pub fn draw(frame: &mut Frame, area: Rect, view: &KioskView<'_>, theme: &Theme) {
    match view.content {
        ScreenContent::Welcome => welcome::draw(frame, area, view.notice, theme),
        ScreenContent::PinEntry(pad) => pin_entry::draw(frame, area, pad, theme),
        ScreenContent::MainMenu { greeting } => menu::draw(frame, area, greeting, theme),
        ScreenContent::Balance(balance) => balance::draw(frame, area, balance, theme),
        ScreenContent::Transaction(flow) => transaction::draw(frame, area, flow, theme),
    }
}

/// Bordered panel every screen draws into
pub(crate) fn screen_block<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(format!(" {} ", title))
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_style(theme.border_focused())
}
