//! Navigation between screens

use tracing::{debug, info};

use super::{AccessLevel, Action, EntryContext, Screen, ScreenContent};
use crate::auth::SessionGuard;
use crate::buttons::{ButtonBindingRegistry, ButtonSlot};

/// Outcome of a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Entered,
    /// The request needed a session; nothing changed
    Refused,
}

/// Owns the current screen, its content and the eight bindings
///
/// Every entry bumps the visit counter. Work started for an earlier visit
/// (a queued gateway call, a timer) compares its visit number against
/// [`ScreenController::visit`] and is dropped when they differ.
#[derive(Debug)]
pub struct ScreenController {
    current: Screen,
    content: ScreenContent,
    buttons: ButtonBindingRegistry<Action>,
    full_screen: bool,
    visit: u64,
}

impl ScreenController {
    /// Start on the welcome screen
    pub fn new() -> Self {
        let mut controller = Self {
            current: Screen::Welcome,
            content: ScreenContent::Welcome,
            buttons: ButtonBindingRegistry::new(),
            full_screen: false,
            visit: 0,
        };
        controller.rebind();
        controller
    }

    /// Enter `target`
    ///
    /// Authenticated targets are refused silently without a session.
    /// Otherwise all bindings are cleared, the previous content (and any
    /// timer it owns) is dropped and the target's entry state is built.
    /// Entering the current screen again starts it afresh.
    pub fn navigate_to(
        &mut self,
        target: Screen,
        access: AccessLevel,
        session: &SessionGuard,
        ctx: &EntryContext<'_>,
    ) -> Navigation {
        if access == AccessLevel::Authenticated && !session.is_authenticated() {
            debug!(screen = ?target, "Navigation refused without a session");
            return Navigation::Refused;
        }

        self.buttons.clear();
        self.content = ScreenContent::enter(target, ctx);
        if self.current != target {
            info!(from = ?self.current, to = ?target, "Screen change");
        }
        self.current = target;
        self.full_screen = target.is_full_screen();
        self.visit += 1;
        self.rebind();
        Navigation::Entered
    }

    /// Re-apply the content's bindings after its state changed
    pub fn rebind(&mut self) {
        self.buttons.clear();
        for (slot, binding) in self.content.bindings() {
            self.buttons.bind(slot, binding);
        }
    }

    /// Drop every binding (overlays that own the display)
    pub fn clear_bindings(&mut self) {
        self.buttons.clear();
    }

    /// Action bound to `slot`, if any
    pub fn action_for(&self, slot: ButtonSlot) -> Option<Action> {
        self.buttons.invoke(slot).cloned()
    }

    pub fn current(&self) -> Screen {
        self.current
    }

    pub fn content(&self) -> &ScreenContent {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut ScreenContent {
        &mut self.content
    }

    pub fn buttons(&self) -> &ButtonBindingRegistry<Action> {
        &self.buttons
    }

    pub fn is_full_screen(&self) -> bool {
        self.full_screen
    }

    pub fn visit(&self) -> u64 {
        self.visit
    }
}

impl Default for ScreenController {
    fn default() -> Self {
        Self::new()
    }
}
