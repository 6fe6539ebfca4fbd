//! ATM Kiosk TUI - terminal front end for the kiosk state machines
//!
//! The eight side buttons are the function keys (F1-F4 down the left
//! column, F5-F8 down the right), the keypad is the digit row plus
//! Backspace and Enter.

pub mod app;
pub mod ui;

pub use app::App;
