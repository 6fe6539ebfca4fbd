//! Session authentication state and PIN attempt accounting

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::{LockoutPolicy, LockoutStore};
use crate::clock::Clock;
use crate::error::{GatewayError, KioskError, Result};
use crate::gateway::{CardType, FinancialGateway};

/// Sole owner of the kiosk's authentication state
///
/// Invariants: a lockout implies the session is unauthenticated, and the
/// failed-attempt counter is zero whenever the session is authenticated.
pub struct SessionGuard {
    authenticated: bool,
    user_id: Option<String>,
    card_type: Option<CardType>,
    failed_attempts: u32,
    lockout_until: Option<DateTime<Utc>>,
    policy: LockoutPolicy,
    store: Box<dyn LockoutStore>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("authenticated", &self.authenticated)
            .field("user_id", &self.user_id)
            .field("failed_attempts", &self.failed_attempts)
            .field("lockout_until", &self.lockout_until)
            .finish()
    }
}

impl SessionGuard {
    /// Create an unauthenticated session, restoring any persisted lockout
    pub fn new(
        policy: LockoutPolicy,
        store: Box<dyn LockoutStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let lockout_until = match store.load() {
            Ok(until) => until,
            Err(e) => {
                warn!("Failed to read persisted lockout: {}", e);
                None
            }
        };

        let mut guard = Self {
            authenticated: false,
            user_id: None,
            card_type: None,
            failed_attempts: 0,
            lockout_until,
            policy,
            store,
            clock,
        };

        if guard.refresh() {
            info!("Persisted lockout had already expired");
        } else if let Some(until) = guard.lockout_until {
            warn!(%until, "Restored active PIN lockout");
        }

        guard
    }

    /// Check a PIN against the gateway
    ///
    /// While locked out the gateway is not contacted at all. A transport
    /// failure leaves the attempt counter untouched.
    pub async fn validate_pin(
        &mut self,
        gateway: &dyn FinancialGateway,
        pin: &str,
    ) -> Result<String> {
        self.refresh();
        if let Some(until) = self.active_lockout() {
            return Err(KioskError::LockedOut { until });
        }

        let validation = match gateway.validate_pin(pin).await {
            Ok(validation) => validation,
            Err(GatewayError::Transport(msg)) => {
                warn!("PIN validation unreachable: {}", msg);
                return Err(KioskError::Transport(msg));
            }
            Err(other) => return Err(other.into()),
        };

        match validation.user_id {
            Some(user_id) if validation.success => {
                self.authenticated = true;
                self.user_id = Some(user_id.clone());
                self.failed_attempts = 0;
                info!(user_id = %user_id, "PIN accepted");
                Ok(user_id)
            }
            _ => Err(self.record_failure()),
        }
    }

    fn record_failure(&mut self) -> KioskError {
        self.failed_attempts += 1;
        warn!(attempts = self.failed_attempts, "Incorrect PIN");

        if !self.policy.should_lock(self.failed_attempts) {
            return KioskError::Auth {
                remaining: self.policy.attempts_remaining(self.failed_attempts),
            };
        }

        let until = self.clock.now()
            + chrono::Duration::from_std(self.policy.duration())
                .unwrap_or_else(|_| chrono::Duration::minutes(5));
        self.lockout_until = Some(until);
        self.failed_attempts = 0;
        self.clear_identity();
        self.persist();
        warn!(%until, "PIN entry locked for {}", self.policy.description());
        KioskError::LockedOut { until }
    }

    /// Lockout expiry if it lies in the future
    fn active_lockout(&self) -> Option<DateTime<Utc>> {
        self.lockout_until.filter(|until| *until > self.clock.now())
    }

    pub fn is_locked_out(&self) -> bool {
        self.active_lockout().is_some()
    }

    pub fn lockout_until(&self) -> Option<DateTime<Utc>> {
        self.active_lockout()
    }

    /// Whole seconds left on the lockout
    pub fn lockout_remaining_seconds(&self) -> Option<u64> {
        self.active_lockout().map(|until| {
            let remaining = until - self.clock.now();
            remaining.num_seconds().max(0) as u64
        })
    }

    /// Drop a lockout whose time has passed, erasing the persisted record
    ///
    /// Returns true if a lockout was cleared.
    pub fn refresh(&mut self) -> bool {
        match self.lockout_until {
            Some(until) if until <= self.clock.now() => {
                self.lockout_until = None;
                self.persist();
                info!("PIN lockout expired");
                true
            }
            _ => false,
        }
    }

    /// Explicitly lift the lockout (operator bypass)
    pub fn unlock(&mut self) {
        if self.lockout_until.take().is_some() {
            warn!("PIN lockout lifted by operator");
        }
        self.failed_attempts = 0;
        self.persist();
    }

    /// End the authenticated session
    pub fn logout(&mut self) {
        if self.authenticated {
            info!(user_id = ?self.user_id, "Session ended");
        }
        self.clear_identity();
    }

    fn clear_identity(&mut self) {
        self.authenticated = false;
        self.user_id = None;
        self.card_type = None;
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(self.lockout_until) {
            warn!("Failed to persist lockout state: {}", e);
        }
    }

    pub fn set_card_type(&mut self, card_type: CardType) {
        if self.authenticated {
            self.card_type = Some(card_type);
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn card_type(&self) -> Option<CardType> {
        self.card_type
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    pub fn attempts_remaining(&self) -> u32 {
        self.policy.attempts_remaining(self.failed_attempts)
    }

    pub fn policy(&self) -> &LockoutPolicy {
        &self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryLockoutStore;
    use crate::clock::ManualClock;
    use crate::gateway::InMemoryGateway;

    fn guard_with(clock: &ManualClock, store: Arc<MemoryLockoutStore>) -> SessionGuard {
        SessionGuard::new(
            LockoutPolicy::default(),
            Box::new(store),
            Arc::new(clock.clone()),
        )
    }

    fn guard() -> (SessionGuard, ManualClock) {
        let clock = ManualClock::default();
        let guard = guard_with(&clock, Arc::new(MemoryLockoutStore::new()));
        (guard, clock)
    }

    #[tokio::test]
    async fn test_valid_pin_authenticates() {
        let (mut guard, _) = guard();
        let gateway = InMemoryGateway::seeded();

        let user = guard.validate_pin(&gateway, "123456").await.unwrap();
        assert_eq!(user, "userA");
        assert!(guard.is_authenticated());
        assert_eq!(guard.user_id(), Some("userA"));
        assert_eq!(guard.failed_attempts(), 0);
    }

    #[tokio::test]
    async fn test_success_resets_counter_from_any_count() {
        for prior in 0..3 {
            let (mut guard, _) = guard();
            let gateway = InMemoryGateway::seeded();
            for _ in 0..prior {
                let _ = guard.validate_pin(&gateway, "000000").await;
            }
            assert_eq!(guard.failed_attempts(), prior.min(2));
            guard.validate_pin(&gateway, "123456").await.unwrap();
            assert_eq!(guard.failed_attempts(), 0);
        }
    }

    #[tokio::test]
    async fn test_wrong_pin_reports_remaining() {
        let (mut guard, _) = guard();
        let gateway = InMemoryGateway::seeded();

        let err = guard.validate_pin(&gateway, "000000").await.unwrap_err();
        assert!(matches!(err, KioskError::Auth { remaining: 2 }));
        assert!(!guard.is_authenticated());
        assert_eq!(guard.failed_attempts(), 1);
    }

    #[tokio::test]
    async fn test_third_failure_locks_and_blocks_gateway() {
        let (mut guard, _) = guard();
        let gateway = InMemoryGateway::seeded();

        for _ in 0..2 {
            let _ = guard.validate_pin(&gateway, "000000").await;
        }
        let err = guard.validate_pin(&gateway, "000000").await.unwrap_err();
        assert!(matches!(err, KioskError::LockedOut { .. }));
        assert!(guard.is_locked_out());
        assert_eq!(guard.failed_attempts(), 0);
        assert_eq!(gateway.calls().validate_pin, 3);

        // Even the right PIN is refused before reaching the gateway
        let err = guard.validate_pin(&gateway, "123456").await.unwrap_err();
        assert!(matches!(err, KioskError::LockedOut { .. }));
        assert_eq!(gateway.calls().validate_pin, 3);
        assert!(!guard.is_authenticated());
    }

    #[tokio::test]
    async fn test_lockout_expires_after_duration() {
        let (mut guard, clock) = guard();
        let gateway = InMemoryGateway::seeded();
        for _ in 0..3 {
            let _ = guard.validate_pin(&gateway, "000000").await;
        }

        clock.advance(chrono::Duration::seconds(299));
        assert!(guard.is_locked_out());
        assert_eq!(guard.lockout_remaining_seconds(), Some(1));

        clock.advance(chrono::Duration::seconds(1));
        assert!(!guard.is_locked_out());
        guard.validate_pin(&gateway, "123456").await.unwrap();
        assert!(guard.is_authenticated());
    }

    #[tokio::test]
    async fn test_unlock_is_explicit() {
        let (mut guard, _) = guard();
        let gateway = InMemoryGateway::seeded();
        for _ in 0..3 {
            let _ = guard.validate_pin(&gateway, "000000").await;
        }
        assert!(guard.is_locked_out());

        guard.unlock();
        assert!(!guard.is_locked_out());
        assert_eq!(guard.attempts_remaining(), 3);
    }

    #[tokio::test]
    async fn test_transport_failure_does_not_count() {
        let (mut guard, _) = guard();
        let gateway = InMemoryGateway::seeded();
        gateway.set_offline(true);

        for _ in 0..5 {
            let err = guard.validate_pin(&gateway, "000000").await.unwrap_err();
            assert!(matches!(err, KioskError::Transport(_)));
        }
        assert_eq!(guard.failed_attempts(), 0);
        assert!(!guard.is_locked_out());
    }

    #[tokio::test]
    async fn test_lockout_survives_restart() {
        let clock = ManualClock::default();
        let store = Arc::new(MemoryLockoutStore::new());
        let gateway = InMemoryGateway::seeded();

        let mut first = guard_with(&clock, Arc::clone(&store));
        for _ in 0..3 {
            let _ = first.validate_pin(&gateway, "000000").await;
        }
        drop(first);

        let restarted = guard_with(&clock, Arc::clone(&store));
        assert!(restarted.is_locked_out());

        clock.advance(chrono::Duration::minutes(6));
        let expired = guard_with(&clock, Arc::clone(&store));
        assert!(!expired.is_locked_out());
        assert_eq!(store.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_unlock_erases_persisted_lockout() {
        let clock = ManualClock::default();
        let store = Arc::new(MemoryLockoutStore::new());
        let gateway = InMemoryGateway::seeded();

        let mut guard = guard_with(&clock, Arc::clone(&store));
        for _ in 0..3 {
            let _ = guard.validate_pin(&gateway, "000000").await;
        }
        assert!(store.load().unwrap().is_some());
        guard.unlock();
        assert_eq!(store.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_logout_clears_identity() {
        let (mut guard, _) = guard();
        let gateway = InMemoryGateway::seeded();
        guard.validate_pin(&gateway, "123456").await.unwrap();
        guard.set_card_type(CardType::Visa);

        guard.logout();
        assert!(!guard.is_authenticated());
        assert_eq!(guard.user_id(), None);
        assert_eq!(guard.card_type(), None);
    }
}
