//! Error types for the kiosk core

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type alias for kiosk operations
pub type Result<T> = std::result::Result<T, KioskError>;

/// Errors surfaced by the kiosk state machines
///
/// Nothing here is fatal to the process: every variant resolves to a screen
/// state with a defined exit (retry, cancel or forced navigation).
#[derive(Debug, Error)]
pub enum KioskError {
    /// Button slot outside the eight physical positions
    #[error("Invalid button slot: {0}")]
    InvalidSlot(u8),

    /// Bad amount or account, recovered locally
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Wrong PIN
    #[error("Incorrect PIN ({remaining} attempts remaining)")]
    Auth { remaining: u32 },

    /// PIN entry suspended after repeated failures
    #[error("PIN entry locked until {until}")]
    LockedOut { until: DateTime<Utc> },

    /// Unknown user or account reported by the gateway
    #[error("Not found: {0}")]
    NotFound(String),

    /// Gateway refused a deposit into the source account
    #[error("Cannot deposit into your own account")]
    SelfDepositNotAllowed,

    /// Gateway reported the source account cannot cover the amount
    #[error("Insufficient funds")]
    InsufficientFunds,

    /// Gateway unreachable, the attempt may be retried
    #[error("Gateway unreachable: {0}")]
    Transport(String),

    /// A request arrived while the flow was in the wrong state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Lockout persistence failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Amount and account validation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Amount must be greater than zero")]
    NotPositive,

    #[error("Amount {amount} exceeds the remaining daily limit of {remaining}")]
    ExceedsDailyLimit { amount: u64, remaining: u64 },

    #[error("Amount {amount} exceeds the cash available in this machine ({available})")]
    ExceedsMachineCash { amount: u64, available: u64 },

    #[error("Amount {amount} exceeds the maximum of {max}")]
    ExceedsMaximum { amount: u64, max: u64 },

    #[error("Amount {amount} exceeds the account balance of {balance}")]
    InsufficientFunds { amount: u64, balance: u64 },

    #[error("Cannot deposit into your own account")]
    SelfDepositNotAllowed,

    #[error("Account number must be exactly {expected} digits")]
    MalformedAccount { expected: usize },

    #[error("PIN must be exactly {expected} digits")]
    MalformedPin { expected: usize },
}

/// Failure contract of the financial gateway
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Target account not found: {0}")]
    TargetNotFound(String),

    #[error("Cannot deposit to yourself")]
    SelfDepositNotAllowed,

    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("Transport failure: {0}")]
    Transport(String),
}

impl From<GatewayError> for KioskError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::UserNotFound(id) => KioskError::NotFound(format!("user {}", id)),
            GatewayError::TargetNotFound(account) => {
                KioskError::NotFound(format!("account {}", account))
            }
            GatewayError::SelfDepositNotAllowed => KioskError::SelfDepositNotAllowed,
            GatewayError::InsufficientFunds => KioskError::InsufficientFunds,
            GatewayError::Transport(msg) => KioskError::Transport(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_mapping() {
        assert!(matches!(
            KioskError::from(GatewayError::UserNotFound("userA".into())),
            KioskError::NotFound(_)
        ));
        assert!(matches!(
            KioskError::from(GatewayError::TargetNotFound("999999".into())),
            KioskError::NotFound(_)
        ));
        assert!(matches!(
            KioskError::from(GatewayError::Transport("timeout".into())),
            KioskError::Transport(_)
        ));
    }
}
