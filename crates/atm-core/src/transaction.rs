//! Withdraw/deposit sub-machine
//!
//! ```text
//! Loading ─▶ [EnteringAccount] ─▶ Ready ─▶ EnteringAmount ─▶ Confirming ─▶ Committing ─▶ Success
//!    │                                                            ▲   │          │
//!    └──────────▶ Error ◀─────────────────────────────────────────┘   └─ cancel ─┘
//! ```
//!
//! `EnteringAccount` only exists for deposits. Gateway calls happen only
//! from `Loading` and `Committing`, so no second call can start while one
//! is outstanding.

use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::KioskConfig;
use crate::error::{GatewayError, KioskError, Result, ValidationError};
use crate::gateway::{FinancialGateway, WithdrawInfo};
use crate::ledger::{MovementKind, MovementLedger};
use crate::schedule::{KioskEvent, ScheduledTask};

/// Which operation the flow performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Withdraw,
    Deposit,
}

impl From<TransactionKind> for MovementKind {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Withdraw => MovementKind::Withdraw,
            TransactionKind::Deposit => MovementKind::Deposit,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Withdraw => f.write_str("withdraw"),
            TransactionKind::Deposit => f.write_str("deposit"),
        }
    }
}

/// Amount awaiting confirmation or commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    pub amount: u64,
    pub kind: TransactionKind,
    pub target_account: Option<String>,
}

/// How the amount is being chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountEntry {
    /// A quick-pick amount was selected
    Preset(u64),
    /// Digits typed on the keypad
    Custom(String),
}

/// Flow state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    Loading,
    EnteringAccount,
    Ready,
    EnteringAmount(AmountEntry),
    Confirming(PendingTransaction),
    Committing(PendingTransaction),
    Success { amount: u64 },
    Error { message: String, retry: bool },
}

/// Rules an amount is checked against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountRules {
    /// Largest amount for any single operation
    pub max_amount: u64,
    /// Digits accepted for a custom amount and for an account number
    pub entry_digits: usize,
    /// Quick-pick amounts
    pub presets: Vec<u64>,
}

impl AmountRules {
    pub fn from_config(config: &KioskConfig) -> Self {
        Self {
            max_amount: config.max_withdraw,
            entry_digits: config.pin_digits,
            presets: config.preset_amounts.clone(),
        }
    }
}

/// Check a candidate amount
///
/// The amount is never clamped or rounded: anything out of bounds is an error.
pub fn validate_amount(
    amount: u64,
    kind: TransactionKind,
    info: &WithdrawInfo,
    max_amount: u64,
) -> std::result::Result<(), ValidationError> {
    if amount == 0 {
        return Err(ValidationError::NotPositive);
    }
    let remaining = info.remaining_daily_limit();
    if amount > remaining {
        return Err(ValidationError::ExceedsDailyLimit { amount, remaining });
    }
    if kind == TransactionKind::Withdraw && amount > info.atm_available {
        return Err(ValidationError::ExceedsMachineCash {
            amount,
            available: info.atm_available,
        });
    }
    if amount > max_amount {
        return Err(ValidationError::ExceedsMaximum {
            amount,
            max: max_amount,
        });
    }
    if amount > info.balance {
        return Err(ValidationError::InsufficientFunds {
            amount,
            balance: info.balance,
        });
    }
    Ok(())
}

/// Per-screen withdraw/deposit state machine
#[derive(Debug)]
pub struct TransactionFlow {
    kind: TransactionKind,
    state: FlowState,
    rules: AmountRules,
    info: Option<WithdrawInfo>,
    /// Card number of the authenticated user
    source_account: String,
    account_input: String,
    target_account: Option<String>,
    rejection: Option<ValidationError>,
    return_timer: Option<ScheduledTask>,
}

impl TransactionFlow {
    pub fn new(kind: TransactionKind, rules: AmountRules, source_account: impl Into<String>) -> Self {
        Self {
            kind,
            state: FlowState::Loading,
            rules,
            info: None,
            source_account: source_account.into(),
            account_input: String::new(),
            target_account: None,
            rejection: None,
            return_timer: None,
        }
    }

    pub fn withdraw(rules: AmountRules) -> Self {
        Self::new(TransactionKind::Withdraw, rules, String::new())
    }

    pub fn deposit(rules: AmountRules, source_account: impl Into<String>) -> Self {
        Self::new(TransactionKind::Deposit, rules, source_account)
    }

    /// Fetch limits; only valid while `Loading`
    pub async fn load(&mut self, gateway: &dyn FinancialGateway, user_id: &str) -> Result<()> {
        if self.state != FlowState::Loading {
            return Err(KioskError::InvalidState(format!(
                "load requested in {:?}",
                self.state
            )));
        }

        match gateway.get_withdraw_info(user_id).await {
            Ok(info) => {
                self.info = Some(info);
                self.state = match self.kind {
                    TransactionKind::Withdraw => FlowState::Ready,
                    TransactionKind::Deposit => FlowState::EnteringAccount,
                };
                Ok(())
            }
            Err(e) => {
                let err = KioskError::from(e);
                warn!(kind = %self.kind, "Unable to load limits: {}", err);
                self.state = FlowState::Error {
                    message: format!("Unable to load {} info: {}", self.kind, err),
                    retry: false,
                };
                Err(err)
            }
        }
    }

    /// Check an amount against the loaded limits and the target account
    pub fn validate(&self, amount: u64) -> Result<()> {
        let info = self
            .info
            .as_ref()
            .ok_or_else(|| KioskError::InvalidState("limits not loaded".into()))?;
        validate_amount(amount, self.kind, info, self.rules.max_amount)?;
        if self.kind == TransactionKind::Deposit {
            match self.target_account.as_deref() {
                None => {
                    return Err(ValidationError::MalformedAccount {
                        expected: self.rules.entry_digits,
                    }
                    .into())
                }
                Some(target) if target == self.source_account => {
                    return Err(ValidationError::SelfDepositNotAllowed.into())
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Pick a quick amount
    pub fn select_preset(&mut self, amount: u64) -> Result<()> {
        match self.state {
            FlowState::Ready | FlowState::EnteringAmount(_) => {}
            _ => return Err(self.wrong_state("select_preset")),
        }
        self.state = FlowState::EnteringAmount(AmountEntry::Preset(amount));
        self.request_confirmation(amount)
    }

    /// Switch to keypad entry of the amount
    pub fn choose_custom(&mut self) -> Result<()> {
        match self.state {
            FlowState::Ready | FlowState::EnteringAmount(AmountEntry::Preset(_)) => {
                self.state = FlowState::EnteringAmount(AmountEntry::Custom(String::new()));
                self.rejection = None;
                Ok(())
            }
            FlowState::EnteringAmount(AmountEntry::Custom(_)) => Ok(()),
            _ => Err(self.wrong_state("choose_custom")),
        }
    }

    /// Keypad digit for the account number or the custom amount
    pub fn push_digit(&mut self, digit: u8) {
        if digit > 9 {
            return;
        }
        let limit = self.rules.entry_digits;
        let ch = char::from(b'0' + digit);
        match &mut self.state {
            FlowState::EnteringAccount if self.account_input.len() < limit => {
                self.account_input.push(ch);
                self.rejection = None;
            }
            FlowState::EnteringAmount(AmountEntry::Custom(digits)) if digits.len() < limit => {
                digits.push(ch);
                self.rejection = None;
            }
            _ => {}
        }
    }

    /// Keypad clear
    pub fn clear_input(&mut self) {
        match &mut self.state {
            FlowState::EnteringAccount => self.account_input.clear(),
            FlowState::EnteringAmount(AmountEntry::Custom(digits)) => digits.clear(),
            _ => return,
        }
        self.rejection = None;
    }

    /// Keypad enter
    pub fn submit(&mut self) -> Result<()> {
        match &self.state {
            FlowState::EnteringAccount => self.submit_account(),
            FlowState::EnteringAmount(AmountEntry::Custom(digits)) if digits.is_empty() => {
                self.request_confirmation(0)
            }
            FlowState::EnteringAmount(AmountEntry::Custom(digits)) => {
                match digits.parse::<u64>() {
                    Ok(amount) => self.request_confirmation(amount),
                    // Only digits are accepted, so this is an overflow
                    Err(_) => {
                        let rejection = ValidationError::ExceedsMaximum {
                            amount: u64::MAX,
                            max: self.rules.max_amount,
                        };
                        self.rejection = Some(rejection.clone());
                        Err(rejection.into())
                    }
                }
            }
            _ => Err(self.wrong_state("submit")),
        }
    }

    /// Accept the typed target account
    pub fn submit_account(&mut self) -> Result<()> {
        if self.state != FlowState::EnteringAccount {
            return Err(self.wrong_state("submit_account"));
        }
        let rejection = if self.account_input.len() != self.rules.entry_digits {
            Some(ValidationError::MalformedAccount {
                expected: self.rules.entry_digits,
            })
        } else if self.account_input == self.source_account {
            Some(ValidationError::SelfDepositNotAllowed)
        } else {
            None
        };

        if let Some(rejection) = rejection {
            self.rejection = Some(rejection.clone());
            return Err(rejection.into());
        }

        self.target_account = Some(self.account_input.clone());
        self.rejection = None;
        self.state = FlowState::Ready;
        Ok(())
    }

    /// Validate and move to `Confirming`, or stay put with the input marked invalid
    fn request_confirmation(&mut self, amount: u64) -> Result<()> {
        if let Err(e) = self.validate(amount) {
            if let KioskError::Validation(rejection) = &e {
                self.rejection = Some(rejection.clone());
            }
            return Err(e);
        }
        self.rejection = None;
        self.state = FlowState::Confirming(PendingTransaction {
            amount,
            kind: self.kind,
            target_account: self.target_account.clone(),
        });
        Ok(())
    }

    /// Dismiss the confirmation prompt, discarding the pending amount
    pub fn cancel_confirmation(&mut self) -> Result<()> {
        match self.state {
            FlowState::Confirming(_) => {
                self.state = FlowState::Ready;
                Ok(())
            }
            _ => Err(self.wrong_state("cancel_confirmation")),
        }
    }

    /// Accept the confirmation; the flow is `Committing` afterwards
    pub fn confirm(&mut self) -> Result<PendingTransaction> {
        match std::mem::replace(&mut self.state, FlowState::Loading) {
            FlowState::Confirming(pending) => {
                self.state = FlowState::Committing(pending.clone());
                Ok(pending)
            }
            other => {
                self.state = other;
                Err(self.wrong_state("confirm"))
            }
        }
    }

    /// Send the pending transaction to the gateway
    ///
    /// On success the movement is appended to `ledger`. On failure the
    /// pending amount is dropped; nothing is retried automatically.
    pub async fn commit(
        &mut self,
        gateway: &dyn FinancialGateway,
        user_id: &str,
        ledger: &mut MovementLedger,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        let pending = match &self.state {
            FlowState::Committing(pending) => pending.clone(),
            _ => return Err(self.wrong_state("commit")),
        };

        let outcome = match (pending.kind, pending.target_account.as_deref()) {
            (TransactionKind::Withdraw, _) => gateway.perform_withdraw(user_id, pending.amount).await,
            (TransactionKind::Deposit, Some(target)) => {
                gateway
                    .perform_deposit(user_id, target, pending.amount)
                    .await
            }
            (TransactionKind::Deposit, None) => {
                self.state = FlowState::Ready;
                return Err(ValidationError::MalformedAccount {
                    expected: self.rules.entry_digits,
                }
                .into());
            }
        };

        match outcome {
            Ok(receipt) => {
                if let Some(info) = self.info.as_mut() {
                    info.balance = receipt.new_balance;
                    info.atm_available = receipt.new_atm_available;
                    info.daily_used = receipt.new_daily_used;
                }
                ledger.record(now, pending.amount, pending.kind.into());
                info!(kind = %pending.kind, amount = pending.amount, "Transaction committed");
                self.state = FlowState::Success {
                    amount: pending.amount,
                };
                Ok(pending.amount)
            }
            Err(e) => {
                // An unknown source account cannot be fixed by trying again
                let retry = !matches!(e, GatewayError::UserNotFound(_));
                let err = KioskError::from(e);
                warn!(kind = %pending.kind, amount = pending.amount, "Commit failed: {}", err);
                self.state = FlowState::Error {
                    message: format!("Failed to {}: {}", pending.kind, err),
                    retry,
                };
                Err(err)
            }
        }
    }

    /// Leave a retryable error, starting the entry over with nothing pre-filled
    pub fn retry(&mut self) -> Result<()> {
        match self.state {
            FlowState::Error { retry: true, .. } => {
                self.rejection = None;
                self.state = match self.kind {
                    TransactionKind::Withdraw => FlowState::Ready,
                    TransactionKind::Deposit => {
                        self.account_input.clear();
                        self.target_account = None;
                        FlowState::EnteringAccount
                    }
                };
                Ok(())
            }
            _ => Err(self.wrong_state("retry")),
        }
    }

    /// Hand the success auto-return timer to the flow; dropped with it
    pub fn set_return_timer(&mut self, task: ScheduledTask) {
        self.return_timer = Some(task);
    }

    /// Whether `event` is this flow's pending auto-return
    pub fn owns_return(&self, event: &KioskEvent) -> bool {
        matches!(event, KioskEvent::ReturnToMenu(_))
            && matches!(self.state, FlowState::Success { .. })
            && self
                .return_timer
                .as_ref()
                .is_some_and(|task| task.owns(event))
    }

    fn wrong_state(&self, op: &str) -> KioskError {
        KioskError::InvalidState(format!("{} not allowed in {:?}", op, self.state))
    }

    /// Presets that currently pass validation
    pub fn available_presets(&self) -> Vec<u64> {
        self.rules
            .presets
            .iter()
            .copied()
            .filter(|amount| self.validate(*amount).is_ok())
            .collect()
    }

    /// Whether a gateway call is outstanding
    pub fn is_busy(&self) -> bool {
        matches!(self.state, FlowState::Loading | FlowState::Committing(_))
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn rules(&self) -> &AmountRules {
        &self.rules
    }

    pub fn info(&self) -> Option<&WithdrawInfo> {
        self.info.as_ref()
    }

    pub fn remaining_daily_limit(&self) -> Option<u64> {
        self.info.as_ref().map(WithdrawInfo::remaining_daily_limit)
    }

    /// Last validation failure, cleared by the next edit
    pub fn rejection(&self) -> Option<&ValidationError> {
        self.rejection.as_ref()
    }

    pub fn account_input(&self) -> &str {
        &self.account_input
    }

    pub fn target_account(&self) -> Option<&str> {
        self.target_account.as_deref()
    }

    pub fn custom_input(&self) -> Option<&str> {
        match &self.state {
            FlowState::EnteringAmount(AmountEntry::Custom(digits)) => Some(digits),
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<&PendingTransaction> {
        match &self.state {
            FlowState::Confirming(pending) | FlowState::Committing(pending) => Some(pending),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{InMemoryGateway, MockAccount};
    use proptest::prelude::*;
    use rstest::rstest;

    fn rules() -> AmountRules {
        AmountRules::from_config(&KioskConfig::testing())
    }

    /// dailyLimit=300, dailyUsed=50, plenty of balance and cash
    fn limited_gateway() -> InMemoryGateway {
        InMemoryGateway::builder()
            .account(
                MockAccount::new("u1", "123456", "100001", "Test User")
                    .balance(10_000)
                    .daily(300, 50),
            )
            .account(MockAccount::new("u2", "654321", "200002", "Other User").balance(10))
            .machine_cash(5_000)
            .build()
    }

    async fn loaded_withdraw(gateway: &InMemoryGateway) -> TransactionFlow {
        let mut flow = TransactionFlow::withdraw(rules());
        flow.load(gateway, "u1").await.unwrap();
        flow
    }

    fn info(balance: u64, atm: u64, limit: u64, used: u64) -> WithdrawInfo {
        WithdrawInfo {
            balance,
            atm_available: atm,
            daily_limit: limit,
            daily_used: used,
        }
    }

    #[rstest]
    #[case(0, Err(ValidationError::NotPositive))]
    #[case(251, Err(ValidationError::ExceedsDailyLimit { amount: 251, remaining: 250 }))]
    #[case(250, Ok(()))]
    #[case(1, Ok(()))]
    fn test_validate_daily_limit(
        #[case] amount: u64,
        #[case] expected: std::result::Result<(), ValidationError>,
    ) {
        let limits = info(10_000, 5_000, 300, 50);
        assert_eq!(
            validate_amount(amount, TransactionKind::Withdraw, &limits, 1_000_000),
            expected
        );
    }

    #[rstest]
    #[case(TransactionKind::Withdraw, Err(ValidationError::ExceedsMachineCash { amount: 150, available: 100 }))]
    #[case(TransactionKind::Deposit, Ok(()))]
    fn test_machine_cash_only_limits_withdraw(
        #[case] kind: TransactionKind,
        #[case] expected: std::result::Result<(), ValidationError>,
    ) {
        let limits = info(10_000, 100, 1_000, 0);
        assert_eq!(validate_amount(150, kind, &limits, 1_000_000), expected);
    }

    #[test]
    fn test_validate_global_maximum_and_balance() {
        let limits = info(10_000_000, 10_000_000, 10_000_000, 0);
        assert_eq!(
            validate_amount(1_000_001, TransactionKind::Withdraw, &limits, 1_000_000),
            Err(ValidationError::ExceedsMaximum {
                amount: 1_000_001,
                max: 1_000_000
            })
        );
        let poor = info(30, 5_000, 1_000, 0);
        assert_eq!(
            validate_amount(40, TransactionKind::Withdraw, &poor, 1_000_000),
            Err(ValidationError::InsufficientFunds {
                amount: 40,
                balance: 30
            })
        );
    }

    #[tokio::test]
    async fn test_overflowing_custom_amount_exceeds_maximum() {
        let gateway = limited_gateway();
        let mut flow = TransactionFlow::withdraw(AmountRules {
            entry_digits: 20,
            ..rules()
        });
        flow.load(&gateway, "u1").await.unwrap();
        flow.choose_custom().unwrap();
        for _ in 0..20 {
            flow.push_digit(9);
        }

        assert!(flow.submit().is_err());
        assert!(matches!(
            flow.rejection(),
            Some(ValidationError::ExceedsMaximum { max: 1_000_000, .. })
        ));
        assert!(matches!(
            flow.state(),
            FlowState::EnteringAmount(AmountEntry::Custom(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_custom_amount_is_not_positive() {
        let gateway = limited_gateway();
        let mut flow = loaded_withdraw(&gateway).await;
        flow.choose_custom().unwrap();
        assert!(flow.submit().is_err());
        assert_eq!(flow.rejection(), Some(&ValidationError::NotPositive));
    }

    #[tokio::test]
    async fn test_withdraw_reaches_ready_after_load() {
        let gateway = limited_gateway();
        let flow = loaded_withdraw(&gateway).await;
        assert_eq!(flow.state(), &FlowState::Ready);
        assert_eq!(flow.remaining_daily_limit(), Some(250));
        assert_eq!(gateway.calls().get_withdraw_info, 1);
    }

    #[tokio::test]
    async fn test_load_failure_is_terminal_error() {
        let gateway = limited_gateway();
        let mut flow = TransactionFlow::withdraw(rules());
        let err = flow.load(&gateway, "ghost").await.unwrap_err();
        assert!(matches!(err, KioskError::NotFound(_)));
        assert!(matches!(flow.state(), FlowState::Error { retry: false, .. }));
        assert!(flow.retry().is_err());
    }

    #[tokio::test]
    async fn test_load_only_from_loading() {
        let gateway = limited_gateway();
        let mut flow = loaded_withdraw(&gateway).await;
        assert!(matches!(
            flow.load(&gateway, "u1").await,
            Err(KioskError::InvalidState(_))
        ));
        assert_eq!(gateway.calls().get_withdraw_info, 1);
    }

    #[tokio::test]
    async fn test_custom_amount_over_limit_stays_in_entry() {
        let gateway = limited_gateway();
        let mut flow = loaded_withdraw(&gateway).await;
        flow.choose_custom().unwrap();
        for d in [2, 6, 0] {
            flow.push_digit(d);
        }
        let err = flow.submit().unwrap_err();
        assert!(matches!(
            err,
            KioskError::Validation(ValidationError::ExceedsDailyLimit { amount: 260, remaining: 250 })
        ));
        assert_eq!(
            flow.state(),
            &FlowState::EnteringAmount(AmountEntry::Custom("260".into()))
        );
        assert!(flow.rejection().is_some());

        // Editing clears the invalid mark
        flow.clear_input();
        assert!(flow.rejection().is_none());
        for d in [2, 4, 0] {
            flow.push_digit(d);
        }
        flow.submit().unwrap();
        assert_eq!(flow.pending().map(|p| p.amount), Some(240));
    }

    #[tokio::test]
    async fn test_custom_entry_length_is_capped() {
        let gateway = limited_gateway();
        let mut flow = loaded_withdraw(&gateway).await;
        flow.choose_custom().unwrap();
        for _ in 0..10 {
            flow.push_digit(1);
        }
        assert_eq!(flow.custom_input(), Some("111111"));
    }

    #[tokio::test]
    async fn test_confirm_commits_once_and_records() {
        let gateway = limited_gateway();
        let mut flow = loaded_withdraw(&gateway).await;
        let mut ledger = MovementLedger::new();

        flow.select_preset(200).unwrap();
        let pending = flow.confirm().unwrap();
        assert_eq!(pending.amount, 200);
        assert!(flow.is_busy());

        let amount = flow
            .commit(&gateway, "u1", &mut ledger, Utc::now())
            .await
            .unwrap();
        assert_eq!(amount, 200);
        assert_eq!(flow.state(), &FlowState::Success { amount: 200 });
        assert_eq!(gateway.calls().perform_withdraw, 1);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.entries()[0].kind, MovementKind::Withdraw);
        assert_eq!(flow.info().map(|i| i.daily_used), Some(250));

        // A second commit from Success is refused without touching the gateway
        assert!(flow
            .commit(&gateway, "u1", &mut ledger, Utc::now())
            .await
            .is_err());
        assert_eq!(gateway.calls().perform_withdraw, 1);
    }

    #[tokio::test]
    async fn test_cancel_confirmation_discards_pending() {
        let gateway = limited_gateway();
        let mut flow = loaded_withdraw(&gateway).await;
        flow.select_preset(40).unwrap();
        flow.cancel_confirmation().unwrap();
        assert_eq!(flow.state(), &FlowState::Ready);
        assert!(flow.pending().is_none());
        assert!(flow.confirm().is_err());
        assert_eq!(flow.state(), &FlowState::Ready);
    }

    #[tokio::test]
    async fn test_commit_transport_failure_is_retryable() {
        let gateway = limited_gateway();
        let mut flow = loaded_withdraw(&gateway).await;
        let mut ledger = MovementLedger::new();
        flow.select_preset(20).unwrap();
        flow.confirm().unwrap();

        gateway.set_offline(true);
        let err = flow
            .commit(&gateway, "u1", &mut ledger, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, KioskError::Transport(_)));
        assert!(matches!(flow.state(), FlowState::Error { retry: true, .. }));
        assert!(ledger.is_empty());
        assert_eq!(gateway.calls().perform_withdraw, 1);

        flow.retry().unwrap();
        assert_eq!(flow.state(), &FlowState::Ready);
        assert!(flow.pending().is_none());
    }

    #[tokio::test]
    async fn test_deposit_rejects_own_account_before_gateway() {
        let gateway = limited_gateway();
        let mut flow = TransactionFlow::deposit(rules(), "100001");
        flow.load(&gateway, "u1").await.unwrap();
        assert_eq!(flow.state(), &FlowState::EnteringAccount);

        for d in [1, 0, 0, 0, 0, 1] {
            flow.push_digit(d);
        }
        let err = flow.submit_account().unwrap_err();
        assert!(matches!(
            err,
            KioskError::Validation(ValidationError::SelfDepositNotAllowed)
        ));
        assert_eq!(flow.state(), &FlowState::EnteringAccount);
        assert_eq!(gateway.calls().perform_deposit, 0);
    }

    #[tokio::test]
    async fn test_deposit_short_account_rejected() {
        let gateway = limited_gateway();
        let mut flow = TransactionFlow::deposit(rules(), "100001");
        flow.load(&gateway, "u1").await.unwrap();
        flow.push_digit(2);
        assert!(matches!(
            flow.submit(),
            Err(KioskError::Validation(ValidationError::MalformedAccount { expected: 6 }))
        ));
    }

    #[tokio::test]
    async fn test_deposit_to_other_account() {
        let gateway = limited_gateway();
        let mut flow = TransactionFlow::deposit(rules(), "100001");
        let mut ledger = MovementLedger::new();
        flow.load(&gateway, "u1").await.unwrap();
        for d in [2, 0, 0, 0, 0, 2] {
            flow.push_digit(d);
        }
        flow.submit().unwrap();
        assert_eq!(flow.target_account(), Some("200002"));

        flow.select_preset(100).unwrap();
        assert_eq!(
            flow.pending().and_then(|p| p.target_account.as_deref()),
            Some("200002")
        );
        flow.confirm().unwrap();
        flow.commit(&gateway, "u1", &mut ledger, Utc::now())
            .await
            .unwrap();
        assert_eq!(gateway.account("u2").unwrap().balance, 110);
        assert_eq!(ledger.total(MovementKind::Deposit), 100);
    }

    #[tokio::test]
    async fn test_deposit_unknown_target_can_retry_from_account() {
        let gateway = limited_gateway();
        let mut flow = TransactionFlow::deposit(rules(), "100001");
        let mut ledger = MovementLedger::new();
        flow.load(&gateway, "u1").await.unwrap();
        for d in [9, 9, 9, 9, 9, 9] {
            flow.push_digit(d);
        }
        flow.submit().unwrap();
        flow.select_preset(20).unwrap();
        flow.confirm().unwrap();

        let err = flow
            .commit(&gateway, "u1", &mut ledger, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, KioskError::NotFound(_)));
        flow.retry().unwrap();
        assert_eq!(flow.state(), &FlowState::EnteringAccount);
        assert_eq!(flow.account_input(), "");
    }

    #[tokio::test]
    async fn test_available_presets_filter_invalid() {
        let gateway = limited_gateway();
        let flow = loaded_withdraw(&gateway).await;
        // remaining daily limit is 250
        assert_eq!(flow.available_presets(), vec![20, 40, 60, 100, 200]);

        let tight = InMemoryGateway::builder()
            .account(MockAccount::new("u1", "1", "1", "T").balance(1000).daily(100, 30))
            .build();
        let flow = loaded_withdraw(&tight).await;
        assert_eq!(flow.available_presets(), vec![20, 40, 60]);
    }

    proptest! {
        #[test]
        fn prop_over_limit_never_confirms(
            limit in 0u64..5_000,
            used in 0u64..5_000,
            excess in 1u64..10_000,
        ) {
            let remaining = limit.saturating_sub(used);
            let amount = remaining + excess;
            let mut flow = TransactionFlow::withdraw(rules());
            flow.info = Some(info(u64::MAX / 2, u64::MAX / 2, limit, used));
            flow.state = FlowState::Ready;

            prop_assert!(flow.select_preset(amount).is_err());
            prop_assert!(!matches!(flow.state(), FlowState::Confirming(_)));

            flow.choose_custom().unwrap();
            for ch in amount.to_string().chars().take(flow.rules().entry_digits) {
                flow.push_digit(ch.to_digit(10).unwrap() as u8);
            }
            let typed: u64 = flow.custom_input().unwrap().parse().unwrap();
            if typed > remaining {
                prop_assert!(flow.submit().is_err());
                prop_assert!(!matches!(flow.state(), FlowState::Confirming(_)));
            }
        }
    }
}
