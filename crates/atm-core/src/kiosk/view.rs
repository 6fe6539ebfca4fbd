//! Read-only snapshot for renderers

use chrono::{DateTime, Utc};

use super::Kiosk;
use crate::buttons::SLOT_COUNT;
use crate::gateway::CardType;
use crate::screen::{Screen, ScreenContent};

/// Inactivity countdown as displayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerView {
    pub remaining_secs: u64,
    pub formatted: String,
    pub warning: bool,
}

/// PIN lockout overlay
///
/// `until` is `None` once the lockout has run out but the overlay has not
/// been lifted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutView {
    pub until: Option<DateTime<Utc>>,
    pub remaining_secs: u64,
}

/// Everything a renderer needs for one frame
#[derive(Debug)]
pub struct KioskView<'a> {
    pub screen: Screen,
    pub title: &'static str,
    pub content: &'a ScreenContent,
    pub labels: [Option<String>; SLOT_COUNT],
    pub full_screen: bool,
    pub timer: Option<TimerView>,
    pub lockout: Option<LockoutView>,
    pub card_type: Option<CardType>,
    pub user_name: Option<&'a str>,
    pub notice: Option<&'a str>,
    /// Gateway work is waiting to run
    pub busy: bool,
}

impl Kiosk {
    pub fn view(&self) -> KioskView<'_> {
        let screen = self.controller.current();
        let lockout = self.lockout_overlay.then(|| LockoutView {
            until: self.guard.lockout_until(),
            remaining_secs: self.guard.lockout_remaining_seconds().unwrap_or(0),
        });

        KioskView {
            screen,
            title: screen.title(),
            content: self.controller.content(),
            labels: self.controller.buttons().labels(),
            full_screen: self.controller.is_full_screen(),
            timer: self.timer().map(|timer| TimerView {
                remaining_secs: timer.remaining_secs(),
                formatted: timer.formatted(),
                warning: timer.is_warning(),
            }),
            lockout,
            card_type: self.guard.card_type(),
            user_name: self.profile.as_ref().map(|p| p.name.as_str()),
            notice: self.notice.as_deref(),
            busy: self.has_pending(),
        }
    }
}
