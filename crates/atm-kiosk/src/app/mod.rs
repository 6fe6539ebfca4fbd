//! Application event loop

mod keymap;

pub use keymap::{map_key, slot_key, Command};

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use ratatui::prelude::*;
use tokio::sync::mpsc;
use tracing::info;

use atm_core::{Kiosk, KioskEvent};

use crate::ui::{self, Theme};

/// Redraw interval so countdowns stay current
const REDRAW_INTERVAL: Duration = Duration::from_millis(250);

/// Main application struct
pub struct App {
    kiosk: Kiosk,
    events: mpsc::UnboundedReceiver<KioskEvent>,
    theme: Theme,
    should_quit: bool,
}

impl App {
    pub fn new(kiosk: Kiosk, events: mpsc::UnboundedReceiver<KioskEvent>) -> Self {
        Self {
            kiosk,
            events,
            theme: Theme::default(),
            should_quit: false,
        }
    }

    pub fn kiosk(&self) -> &Kiosk {
        &self.kiosk
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Run until the operator quits
    ///
    /// Queued gateway work runs between frames, so the loading state is on
    /// screen while the call is outstanding.
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let mut reader = EventStream::new();
        let mut redraw = tokio::time::interval(REDRAW_INTERVAL);

        while !self.should_quit {
            terminal.draw(|frame| ui::render(frame, &self.kiosk.view(), &self.theme))?;

            if self.kiosk.has_pending() {
                self.kiosk.run_pending().await;
                continue;
            }

            tokio::select! {
                maybe_event = reader.next() => match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => self.should_quit = true,
                },
                Some(event) = self.events.recv() => self.kiosk.handle_event(event),
                _ = redraw.tick() => {}
            }
        }

        info!("Kiosk shutting down");
        Ok(())
    }

    /// Apply one key press
    pub fn handle_key(&mut self, key: KeyEvent) {
        match map_key(key) {
            Some(Command::Press(slot)) => self.kiosk.press(slot),
            Some(Command::Keypad(key)) => self.kiosk.keypad(key),
            Some(Command::Unlock) => {
                if self.kiosk.is_locked_out() {
                    self.kiosk.unlock();
                }
            }
            Some(Command::ForceExpire) => self.kiosk.force_expire_session(),
            Some(Command::Quit) => self.should_quit = true,
            None => {}
        }
    }
}
