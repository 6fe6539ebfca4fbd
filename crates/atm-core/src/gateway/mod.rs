//! Financial gateway contract
//!
//! The kiosk never touches account bookkeeping directly. Every banking
//! operation goes through [`FinancialGateway`], a single-shot asynchronous
//! request with no built-in retry. A production deployment would implement
//! it over the network; [`InMemoryGateway`] is the swappable mock.

mod memory;

pub use memory::{CallCounts, InMemoryGateway, InMemoryGatewayBuilder, MockAccount};

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Result type for gateway calls
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Card network of an authenticated user, display only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    Visa,
    MasterCard,
    Maestro,
    Plus,
    Star,
    Pulse,
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CardType::Visa => "Visa",
            CardType::MasterCard => "MasterCard",
            CardType::Maestro => "Maestro",
            CardType::Plus => "Plus",
            CardType::Star => "Star",
            CardType::Pulse => "Pulse",
        };
        f.write_str(name)
    }
}

/// Outcome of a PIN check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinValidation {
    pub success: bool,
    pub user_id: Option<String>,
}

impl PinValidation {
    pub fn accepted(user_id: impl Into<String>) -> Self {
        Self {
            success: true,
            user_id: Some(user_id.into()),
        }
    }

    pub fn rejected() -> Self {
        Self {
            success: false,
            user_id: None,
        }
    }
}

/// Account holder as reported by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub card_number: String,
    pub card_type: CardType,
    pub balance: u64,
    pub daily_limit: u64,
    pub daily_used: u64,
}

/// Limits needed before offering a withdrawal or deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawInfo {
    pub balance: u64,
    pub atm_available: u64,
    pub daily_limit: u64,
    pub daily_used: u64,
}

impl WithdrawInfo {
    /// Daily allowance left, never negative
    pub fn remaining_daily_limit(&self) -> u64 {
        self.daily_limit.saturating_sub(self.daily_used)
    }
}

/// Balances after a committed withdrawal or deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReceipt {
    pub new_balance: u64,
    pub new_atm_available: u64,
    pub new_daily_used: u64,
}

/// Banking backend consumed by the kiosk
#[async_trait]
pub trait FinancialGateway: Send + Sync {
    /// Check a PIN; fails only on transport problems
    async fn validate_pin(&self, pin: &str) -> GatewayResult<PinValidation>;

    /// Fetch the account holder
    async fn get_user(&self, user_id: &str) -> GatewayResult<UserProfile>;

    /// Fetch balance, machine cash and daily usage
    async fn get_withdraw_info(&self, user_id: &str) -> GatewayResult<WithdrawInfo>;

    /// Dispense cash. The caller validates the amount beforehand.
    async fn perform_withdraw(&self, user_id: &str, amount: u64) -> GatewayResult<CommitReceipt>;

    /// Move `amount` from the user's account to `target_account`
    async fn perform_deposit(
        &self,
        user_id: &str,
        target_account: &str,
        amount: u64,
    ) -> GatewayResult<CommitReceipt>;
}
