//! In-memory mock bank

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{
    CardType, CommitReceipt, FinancialGateway, GatewayResult, PinValidation, UserProfile,
    WithdrawInfo,
};
use crate::error::GatewayError;

/// Cash loaded into the machine at start
const DEFAULT_MACHINE_CASH: u64 = 2000;

/// Account row of the mock bank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockAccount {
    pub id: String,
    pub pin: String,
    pub card_number: String,
    pub name: String,
    pub card_type: CardType,
    pub balance: u64,
    pub daily_limit: u64,
    pub daily_used: u64,
}

impl MockAccount {
    pub fn new(
        id: impl Into<String>,
        pin: impl Into<String>,
        card_number: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            pin: pin.into(),
            card_number: card_number.into(),
            name: name.into(),
            card_type: CardType::Visa,
            balance: 0,
            daily_limit: 0,
            daily_used: 0,
        }
    }

    pub fn card_type(mut self, card_type: CardType) -> Self {
        self.card_type = card_type;
        self
    }

    pub fn balance(mut self, balance: u64) -> Self {
        self.balance = balance;
        self
    }

    pub fn daily(mut self, limit: u64, used: u64) -> Self {
        self.daily_limit = limit;
        self.daily_used = used;
        self
    }

    fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            card_number: self.card_number.clone(),
            card_type: self.card_type,
            balance: self.balance,
            daily_limit: self.daily_limit,
            daily_used: self.daily_used,
        }
    }
}

/// Demo accounts
fn seed_accounts() -> Vec<MockAccount> {
    vec![
        MockAccount::new("userA", "123456", "100001", "Ethan Blake")
            .card_type(CardType::Visa)
            .balance(5000)
            .daily(2000, 0),
        MockAccount::new("userB", "111111", "111111", "Canelo Alvarez")
            .card_type(CardType::MasterCard)
            .balance(1000)
            .daily(300, 100),
        MockAccount::new("userC", "222222", "222222", "Peter Parker")
            .card_type(CardType::Maestro)
            .balance(3000)
            .daily(700, 200),
    ]
}

#[derive(Debug)]
struct BankState {
    accounts: Vec<MockAccount>,
    machine_cash: u64,
}

impl BankState {
    fn account(&self, user_id: &str) -> GatewayResult<&MockAccount> {
        self.accounts
            .iter()
            .find(|a| a.id == user_id)
            .ok_or_else(|| GatewayError::UserNotFound(user_id.to_string()))
    }

    fn position(&self, user_id: &str) -> GatewayResult<usize> {
        self.accounts
            .iter()
            .position(|a| a.id == user_id)
            .ok_or_else(|| GatewayError::UserNotFound(user_id.to_string()))
    }
}

/// Per-operation call counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub validate_pin: u32,
    pub get_user: u32,
    pub get_withdraw_info: u32,
    pub perform_withdraw: u32,
    pub perform_deposit: u32,
}

impl CallCounts {
    pub fn total(&self) -> u32 {
        self.validate_pin
            + self.get_user
            + self.get_withdraw_info
            + self.perform_withdraw
            + self.perform_deposit
    }
}

#[derive(Debug, Default)]
struct CallCounters {
    validate_pin: AtomicU32,
    get_user: AtomicU32,
    get_withdraw_info: AtomicU32,
    perform_withdraw: AtomicU32,
    perform_deposit: AtomicU32,
}

/// Mock gateway holding accounts in memory
///
/// Simulates latency, can be switched offline to produce transport failures,
/// and counts every call it receives.
#[derive(Debug)]
pub struct InMemoryGateway {
    state: Mutex<BankState>,
    seed: Vec<MockAccount>,
    seed_cash: u64,
    latency: Duration,
    offline: AtomicBool,
    calls: CallCounters,
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::seeded()
    }
}

impl InMemoryGateway {
    /// Demo bank with no latency
    pub fn seeded() -> Self {
        Self::builder().accounts(seed_accounts()).build()
    }

    pub fn builder() -> InMemoryGatewayBuilder {
        InMemoryGatewayBuilder::default()
    }

    /// Take the gateway offline (every call fails with a transport error)
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> CallCounts {
        CallCounts {
            validate_pin: self.calls.validate_pin.load(Ordering::SeqCst),
            get_user: self.calls.get_user.load(Ordering::SeqCst),
            get_withdraw_info: self.calls.get_withdraw_info.load(Ordering::SeqCst),
            perform_withdraw: self.calls.perform_withdraw.load(Ordering::SeqCst),
            perform_deposit: self.calls.perform_deposit.load(Ordering::SeqCst),
        }
    }

    /// Snapshot of an account, for assertions and demos
    pub fn account(&self, user_id: &str) -> Option<MockAccount> {
        self.lock().account(user_id).ok().cloned()
    }

    pub fn machine_cash(&self) -> u64 {
        self.lock().machine_cash
    }

    /// Restore seeded balances and machine cash
    pub fn reset(&self) {
        let mut state = self.lock();
        state.accounts = self.seed.clone();
        state.machine_cash = self.seed_cash;
    }

    fn lock(&self) -> MutexGuard<'_, BankState> {
        // A poisoned lock only means a panicking test thread; the data is plain values.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn round_trip(&self, counter: &AtomicU32, op: &'static str) -> GatewayResult<()> {
        counter.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            debug!(op, "Mock gateway offline");
            return Err(GatewayError::Transport(format!("{} unreachable", op)));
        }
        Ok(())
    }
}

/// Builder for [`InMemoryGateway`]
#[derive(Debug)]
pub struct InMemoryGatewayBuilder {
    accounts: Vec<MockAccount>,
    machine_cash: u64,
    latency: Duration,
}

impl Default for InMemoryGatewayBuilder {
    fn default() -> Self {
        Self {
            accounts: Vec::new(),
            machine_cash: DEFAULT_MACHINE_CASH,
            latency: Duration::ZERO,
        }
    }
}

impl InMemoryGatewayBuilder {
    pub fn account(mut self, account: MockAccount) -> Self {
        self.accounts.push(account);
        self
    }

    pub fn accounts(mut self, accounts: impl IntoIterator<Item = MockAccount>) -> Self {
        self.accounts.extend(accounts);
        self
    }

    /// Add the demo accounts
    pub fn with_demo_accounts(self) -> Self {
        self.accounts(seed_accounts())
    }

    pub fn machine_cash(mut self, cash: u64) -> Self {
        self.machine_cash = cash;
        self
    }

    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn build(self) -> InMemoryGateway {
        InMemoryGateway {
            state: Mutex::new(BankState {
                accounts: self.accounts.clone(),
                machine_cash: self.machine_cash,
            }),
            seed: self.accounts,
            seed_cash: self.machine_cash,
            latency: self.latency,
            offline: AtomicBool::new(false),
            calls: CallCounters::default(),
        }
    }
}

#[async_trait]
impl FinancialGateway for InMemoryGateway {
    async fn validate_pin(&self, pin: &str) -> GatewayResult<PinValidation> {
        self.round_trip(&self.calls.validate_pin, "validate_pin").await?;
        let state = self.lock();
        Ok(match state.accounts.iter().find(|a| a.pin == pin) {
            Some(account) => PinValidation::accepted(account.id.clone()),
            None => PinValidation::rejected(),
        })
    }

    async fn get_user(&self, user_id: &str) -> GatewayResult<UserProfile> {
        self.round_trip(&self.calls.get_user, "get_user").await?;
        Ok(self.lock().account(user_id)?.profile())
    }

    async fn get_withdraw_info(&self, user_id: &str) -> GatewayResult<WithdrawInfo> {
        self.round_trip(&self.calls.get_withdraw_info, "get_withdraw_info")
            .await?;
        let state = self.lock();
        let account = state.account(user_id)?;
        Ok(WithdrawInfo {
            balance: account.balance,
            atm_available: state.machine_cash,
            daily_limit: account.daily_limit,
            daily_used: account.daily_used,
        })
    }

    async fn perform_withdraw(&self, user_id: &str, amount: u64) -> GatewayResult<CommitReceipt> {
        self.round_trip(&self.calls.perform_withdraw, "perform_withdraw")
            .await?;
        let mut state = self.lock();
        let idx = state.position(user_id)?;

        let new_balance = state.accounts[idx]
            .balance
            .checked_sub(amount)
            .ok_or(GatewayError::InsufficientFunds)?;
        let new_cash = state
            .machine_cash
            .checked_sub(amount)
            .ok_or(GatewayError::InsufficientFunds)?;

        let account = &mut state.accounts[idx];
        account.balance = new_balance;
        account.daily_used += amount;
        let new_daily_used = account.daily_used;
        state.machine_cash = new_cash;

        Ok(CommitReceipt {
            new_balance,
            new_atm_available: new_cash,
            new_daily_used,
        })
    }

    async fn perform_deposit(
        &self,
        user_id: &str,
        target_account: &str,
        amount: u64,
    ) -> GatewayResult<CommitReceipt> {
        self.round_trip(&self.calls.perform_deposit, "perform_deposit")
            .await?;
        let mut state = self.lock();
        let source = state.position(user_id)?;
        if state.accounts[source].card_number == target_account {
            return Err(GatewayError::SelfDepositNotAllowed);
        }
        let target = state
            .accounts
            .iter()
            .position(|a| a.card_number == target_account)
            .ok_or_else(|| GatewayError::TargetNotFound(target_account.to_string()))?;

        let new_balance = state.accounts[source]
            .balance
            .checked_sub(amount)
            .ok_or(GatewayError::InsufficientFunds)?;

        state.accounts[source].balance = new_balance;
        state.accounts[source].daily_used += amount;
        state.accounts[target].balance += amount;
        state.machine_cash += amount;

        Ok(CommitReceipt {
            new_balance,
            new_atm_available: state.machine_cash,
            new_daily_used: state.accounts[source].daily_used,
        })
    }
}
