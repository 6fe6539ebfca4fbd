//! ATM Core - Session, navigation and transaction state machines
//!
//! This crate holds everything an ATM kiosk front end needs short of
//! drawing pixels: the eight side buttons and their bindings, PIN
//! authentication with lockout, screen navigation with access control,
//! withdraw/deposit validation, the inactivity timer, and the gateway
//! contract with an in-memory mock bank.

pub mod auth;
pub mod buttons;
pub mod clock;
pub mod config;
pub mod error;
pub mod gateway;
pub mod kiosk;
pub mod ledger;
pub mod schedule;
pub mod screen;
pub mod timer;
pub mod transaction;

pub use auth::{FileLockoutStore, LockoutPolicy, LockoutStore, MemoryLockoutStore, SessionGuard};
pub use buttons::{ButtonBinding, ButtonBindingRegistry, ButtonSlot, SLOT_COUNT};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{KioskConfig, CONFIG_ENV_VAR, MAX_ENTRY_DIGITS};
pub use error::{GatewayError, KioskError, Result, ValidationError};
pub use gateway::{
    CardType, CommitReceipt, FinancialGateway, InMemoryGateway, PinValidation, UserProfile,
    WithdrawInfo,
};
pub use kiosk::{KeypadKey, Kiosk, KioskView, SESSION_EXPIRED_NOTICE};
pub use ledger::{Movement, MovementKind, MovementLedger};
pub use schedule::{KioskEvent, ScheduledTask, Scheduler, TaskId};
pub use screen::{AccessLevel, Action, Navigation, Screen, ScreenContent};
pub use timer::{InactivityTimer, TimerPhase, TimerSignal};
pub use transaction::{FlowState, PendingTransaction, TransactionFlow, TransactionKind};
