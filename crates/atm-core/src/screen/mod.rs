//! Screens, their content and the navigation controller

mod content;
mod controller;
mod pin_pad;

pub use content::{BalanceView, EntryContext, ScreenContent};
pub use controller::{Navigation, ScreenController};
pub use pin_pad::PinPad;

/// Who may enter a screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessLevel {
    Public,
    Authenticated,
}

/// Kiosk screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Welcome,
    PinEntry,
    MainMenu,
    Balance,
    Withdraw,
    Deposit,
}

impl Screen {
    /// Access level normally used to reach the screen
    pub fn access_level(self) -> AccessLevel {
        match self {
            Screen::Welcome | Screen::PinEntry => AccessLevel::Public,
            Screen::MainMenu | Screen::Balance | Screen::Withdraw | Screen::Deposit => {
                AccessLevel::Authenticated
            }
        }
    }

    /// Whether the screen takes over the whole display area
    pub fn is_full_screen(self) -> bool {
        matches!(self, Screen::PinEntry | Screen::Withdraw | Screen::Deposit)
    }

    pub fn title(self) -> &'static str {
        match self {
            Screen::Welcome => "Welcome",
            Screen::PinEntry => "Enter PIN",
            Screen::MainMenu => "Main Menu",
            Screen::Balance => "Balance",
            Screen::Withdraw => "Withdraw",
            Screen::Deposit => "Deposit",
        }
    }
}

/// Message produced by a side button
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Navigate(Screen, AccessLevel),
    /// End the session and return to the welcome screen
    Exit,
    /// End the session and go straight to PIN entry
    ReenterPin,
    SelectPreset(u64),
    OtherAmount,
    ContinueDeposit,
    ConfirmTransaction,
    CancelConfirmation,
    RetryTransaction,
}

impl Action {
    pub fn navigate(screen: Screen) -> Self {
        Action::Navigate(screen, screen.access_level())
    }
}
