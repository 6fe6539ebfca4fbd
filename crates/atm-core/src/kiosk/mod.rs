//! Kiosk orchestrator
//!
//! Owns every state machine and is the only thing that mutates them. Input
//! arrives through [`Kiosk::press`] and [`Kiosk::keypad`], timer events
//! through [`Kiosk::handle_event`]. Both are synchronous; gateway work they
//! trigger is queued and executed by [`Kiosk::run_pending`], one request at
//! a time, so the host can draw the loading state in between.

mod view;

pub use view::{KioskView, LockoutView, TimerView};

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::auth::{LockoutPolicy, LockoutStore, SessionGuard};
use crate::buttons::ButtonSlot;
use crate::clock::Clock;
use crate::config::KioskConfig;
use crate::error::{KioskError, Result};
use crate::gateway::{FinancialGateway, UserProfile};
use crate::ledger::MovementLedger;
use crate::schedule::{KioskEvent, ScheduledTask, Scheduler};
use crate::screen::{
    AccessLevel, Action, BalanceView, EntryContext, Navigation, Screen, ScreenContent,
    ScreenController,
};
use crate::timer::{InactivityTimer, TimerSignal};
use crate::transaction::{AmountRules, TransactionFlow};

/// Notice shown on the welcome screen after an inactivity logout
pub const SESSION_EXPIRED_NOTICE: &str = "Session expired";

/// Numeric keypad input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeypadKey {
    Digit(u8),
    Clear,
    Enter,
}

/// Gateway work waiting for [`Kiosk::run_pending`]
enum Request {
    ValidatePin(String),
    LoadBalance,
    LoadTransaction,
    Commit,
}

impl Request {
    fn name(&self) -> &'static str {
        match self {
            Request::ValidatePin(_) => "validate_pin",
            Request::LoadBalance => "load_balance",
            Request::LoadTransaction => "load_transaction",
            Request::Commit => "commit",
        }
    }
}

struct Queued {
    visit: u64,
    request: Request,
}

/// Inactivity countdown of an authenticated session and its tick task
struct SessionTimer {
    timer: InactivityTimer,
    task: ScheduledTask,
}

/// The ATM kiosk
pub struct Kiosk {
    config: KioskConfig,
    rules: AmountRules,
    gateway: Arc<dyn FinancialGateway>,
    clock: Arc<dyn Clock>,
    guard: SessionGuard,
    controller: ScreenController,
    ledger: MovementLedger,
    scheduler: Scheduler,
    session: Option<SessionTimer>,
    lockout_task: Option<ScheduledTask>,
    lockout_overlay: bool,
    profile: Option<UserProfile>,
    outbox: VecDeque<Queued>,
    notice: Option<String>,
}

impl Kiosk {
    /// Build a kiosk on the welcome screen
    ///
    /// Returns the receiver of timer events, which the host must feed back
    /// through [`Kiosk::handle_event`]. Must be called within a tokio runtime.
    pub fn new(
        config: KioskConfig,
        gateway: Arc<dyn FinancialGateway>,
        store: Box<dyn LockoutStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<KioskEvent>)> {
        config.validate()?;

        let guard = SessionGuard::new(
            LockoutPolicy::from_config(&config),
            store,
            Arc::clone(&clock),
        );
        let (scheduler, events) = Scheduler::new();

        let mut kiosk = Self {
            rules: AmountRules::from_config(&config),
            config,
            gateway,
            clock,
            guard,
            controller: ScreenController::new(),
            ledger: MovementLedger::new(),
            scheduler,
            session: None,
            lockout_task: None,
            lockout_overlay: false,
            profile: None,
            outbox: VecDeque::new(),
            notice: None,
        };
        kiosk.apply_lockout();

        info!("Kiosk ready");
        Ok((kiosk, events))
    }

    /// Enter a screen directly
    pub fn navigate_to(&mut self, target: Screen, access: AccessLevel) -> Navigation {
        let ctx = EntryContext {
            pin_digits: self.config.pin_digits,
            rules: &self.rules,
            profile: self.profile.as_ref(),
        };
        let outcome = self.controller.navigate_to(target, access, &self.guard, &ctx);
        if outcome == Navigation::Refused {
            return outcome;
        }

        // Work queued for the previous screen no longer applies
        self.outbox.clear();
        if self.controller.content().needs_load() {
            let request = match target {
                Screen::Balance => Request::LoadBalance,
                _ => Request::LoadTransaction,
            };
            self.enqueue(request);
        }
        self.apply_lockout();
        outcome
    }

    /// A side button was pressed; unbound slots are ignored
    pub fn press(&mut self, slot: ButtonSlot) {
        self.touch();
        match self.controller.action_for(slot) {
            Some(action) => {
                debug!(%slot, ?action, "Button pressed");
                self.dispatch(action);
            }
            None => debug!(%slot, "Unbound button ignored"),
        }
    }

    /// Press by raw slot index
    pub fn press_index(&mut self, index: u8) -> Result<()> {
        let slot = ButtonSlot::from_index(index)?;
        self.press(slot);
        Ok(())
    }

    /// A keypad key was pressed
    pub fn keypad(&mut self, key: KeypadKey) {
        if self.lockout_overlay {
            return;
        }
        self.touch();

        let mut request = None;
        match self.controller.content_mut() {
            ScreenContent::PinEntry(pad) => match key {
                KeypadKey::Digit(digit) => pad.push_digit(digit),
                KeypadKey::Clear => pad.clear(),
                KeypadKey::Enter => request = pad.take_for_verification().map(Request::ValidatePin),
            },
            ScreenContent::Transaction(flow) => match key {
                KeypadKey::Digit(digit) => flow.push_digit(digit),
                KeypadKey::Clear => flow.clear_input(),
                KeypadKey::Enter => {
                    if let Err(e) = flow.submit() {
                        debug!("Entry not accepted: {}", e);
                    }
                }
            },
            _ => return,
        }

        self.controller.rebind();
        if let Some(request) = request {
            self.enqueue(request);
        }
    }

    fn dispatch(&mut self, action: Action) {
        match action {
            Action::Navigate(screen, access) => {
                self.navigate_to(screen, access);
            }
            Action::Exit => self.logout(),
            Action::ReenterPin => {
                self.logout();
                self.navigate_to(Screen::PinEntry, AccessLevel::Public);
            }
            Action::SelectPreset(amount) => {
                self.with_flow(|flow| flow.select_preset(amount));
            }
            Action::OtherAmount => {
                self.with_flow(TransactionFlow::choose_custom);
            }
            Action::ContinueDeposit => {
                self.with_flow(TransactionFlow::submit_account);
            }
            Action::CancelConfirmation => {
                self.with_flow(TransactionFlow::cancel_confirmation);
            }
            Action::ConfirmTransaction => {
                if self.with_flow(TransactionFlow::confirm).is_some() {
                    self.enqueue(Request::Commit);
                }
            }
            Action::RetryTransaction => {
                self.with_flow(TransactionFlow::retry);
            }
        }
    }

    /// Run `op` on the current transaction flow and refresh the bindings
    fn with_flow<T>(
        &mut self,
        op: impl FnOnce(&mut TransactionFlow) -> Result<T>,
    ) -> Option<T> {
        let ScreenContent::Transaction(flow) = self.controller.content_mut() else {
            return None;
        };
        let outcome = op(flow);
        self.controller.rebind();
        match outcome {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Transaction input rejected: {}", e);
                None
            }
        }
    }

    fn enqueue(&mut self, request: Request) {
        debug!(request = request.name(), "Request queued");
        self.outbox.push_back(Queued {
            visit: self.controller.visit(),
            request,
        });
    }

    /// Whether gateway work is waiting
    pub fn has_pending(&self) -> bool {
        !self.outbox.is_empty()
    }

    /// Execute queued gateway requests in order
    ///
    /// Requests queued for a screen that has since been left are dropped.
    /// Returns how many requests were executed.
    pub async fn run_pending(&mut self) -> usize {
        let mut executed = 0;
        while let Some(Queued { visit, request }) = self.outbox.pop_front() {
            if visit != self.controller.visit() {
                debug!(request = request.name(), "Dropping stale request");
                continue;
            }
            executed += 1;
            match request {
                Request::ValidatePin(pin) => self.verify_pin(pin).await,
                Request::LoadBalance => self.load_balance().await,
                Request::LoadTransaction => self.load_transaction().await,
                Request::Commit => self.commit_transaction().await,
            }
        }
        executed
    }

    async fn verify_pin(&mut self, pin: String) {
        let gateway = Arc::clone(&self.gateway);
        let outcome = self.guard.validate_pin(gateway.as_ref(), &pin).await;
        drop(pin);

        match outcome {
            Ok(user_id) => self.start_session(gateway.as_ref(), &user_id).await,
            Err(KioskError::LockedOut { until }) => {
                warn!(%until, "PIN entry locked");
                if let ScreenContent::PinEntry(pad) = self.controller.content_mut() {
                    pad.lock();
                }
                self.apply_lockout();
                if !self.lockout_overlay {
                    // Lockout already over; the locked pad would be left with no way out
                    self.guard.refresh();
                    self.navigate_to(Screen::Welcome, AccessLevel::Public);
                }
            }
            Err(KioskError::Auth { remaining }) => {
                self.reject_pin(format!("Incorrect PIN. {} attempts remaining", remaining));
            }
            Err(KioskError::Transport(_)) => {
                self.reject_pin("Server error. Please try again later".to_string());
            }
            Err(e) => self.reject_pin(e.to_string()),
        }
    }

    fn reject_pin(&mut self, message: String) {
        if let ScreenContent::PinEntry(pad) = self.controller.content_mut() {
            pad.reject(message);
        }
        self.controller.rebind();
    }

    async fn start_session(&mut self, gateway: &dyn FinancialGateway, user_id: &str) {
        match gateway.get_user(user_id).await {
            Ok(profile) => {
                self.guard.set_card_type(profile.card_type);
                self.profile = Some(profile);
                self.session = Some(SessionTimer {
                    timer: InactivityTimer::new(
                        self.config.session_timeout_secs,
                        self.config.timer_warning_secs,
                    ),
                    task: self
                        .scheduler
                        .every(Duration::from_secs(1), KioskEvent::SessionTick),
                });
                self.notice = None;
                info!(user_id, "Session started");
                self.navigate_to(Screen::MainMenu, AccessLevel::Authenticated);
            }
            Err(e) => {
                warn!(user_id, "Unable to load user: {}", KioskError::from(e));
                self.guard.logout();
                self.reject_pin("Unable to load your account. Please try again".to_string());
            }
        }
    }

    async fn load_balance(&mut self) {
        let Some(user_id) = self.guard.user_id().map(str::to_owned) else {
            return;
        };
        let view = match self.gateway.get_user(&user_id).await {
            Ok(profile) => {
                let balance = profile.balance;
                self.profile = Some(profile);
                BalanceView::Ready(balance)
            }
            Err(e) => {
                let err = KioskError::from(e);
                warn!("Unable to load balance: {}", err);
                BalanceView::Error(format!("Unable to load balance: {}", err))
            }
        };
        if let ScreenContent::Balance(current) = self.controller.content_mut() {
            *current = view;
        }
    }

    async fn load_transaction(&mut self) {
        let Some(user_id) = self.guard.user_id().map(str::to_owned) else {
            return;
        };
        let gateway = Arc::clone(&self.gateway);
        if let ScreenContent::Transaction(flow) = self.controller.content_mut() {
            // The flow records the failure in its own state
            let _ = flow.load(gateway.as_ref(), &user_id).await;
        }
        self.controller.rebind();
    }

    async fn commit_transaction(&mut self) {
        let Some(user_id) = self.guard.user_id().map(str::to_owned) else {
            return;
        };
        let gateway = Arc::clone(&self.gateway);
        let now = self.clock.now();
        let ScreenContent::Transaction(flow) = self.controller.content_mut() else {
            return;
        };

        if flow
            .commit(gateway.as_ref(), &user_id, &mut self.ledger, now)
            .await
            .is_ok()
        {
            let task = self
                .scheduler
                .after(self.config.confirmation_delay(), KioskEvent::ReturnToMenu);
            flow.set_return_timer(task);
            if let (Some(profile), Some(info)) = (self.profile.as_mut(), flow.info()) {
                profile.balance = info.balance;
                profile.daily_used = info.daily_used;
            }
        }
        self.controller.rebind();
    }

    /// Apply a timer event; events from superseded tasks are ignored
    pub fn handle_event(&mut self, event: KioskEvent) {
        match event {
            KioskEvent::SessionTick(_) => {
                let Some(session) = self.session.as_mut() else {
                    return;
                };
                if !session.task.owns(&event) {
                    return;
                }
                match session.timer.tick() {
                    Some(TimerSignal::Warning { remaining_secs }) => {
                        info!(remaining_secs, "Session about to expire");
                    }
                    Some(TimerSignal::Expired) => self.expire_session(),
                    None => {}
                }
            }
            KioskEvent::ReturnToMenu(_) => {
                let owned = matches!(
                    self.controller.content(),
                    ScreenContent::Transaction(flow) if flow.owns_return(&event)
                );
                if owned {
                    self.navigate_to(Screen::MainMenu, AccessLevel::Authenticated);
                } else {
                    debug!(?event, "Stale event ignored");
                }
            }
            KioskEvent::LockoutExpired(_) => {
                if self
                    .lockout_task
                    .as_ref()
                    .is_some_and(|task| task.owns(&event))
                {
                    self.lockout_task = None;
                    self.refresh_lockout();
                }
            }
        }
    }

    /// Any input counts as activity for an authenticated session
    fn touch(&mut self) {
        self.notice = None;
        if let Some(session) = self.session.as_mut() {
            session.timer.reset(self.config.session_timeout_secs);
        }
    }

    fn apply_lockout(&mut self) {
        if !self.guard.is_locked_out() {
            return;
        }
        self.lockout_overlay = true;
        self.controller.clear_bindings();
        if self.lockout_task.is_none() {
            let delay = self
                .guard
                .lockout_until()
                .and_then(|until| (until - self.clock.now()).to_std().ok())
                .unwrap_or_default();
            self.lockout_task = Some(self.scheduler.after(delay, KioskEvent::LockoutExpired));
        }
    }

    /// Lift the lockout overlay if its time has passed
    pub fn refresh_lockout(&mut self) {
        self.guard.refresh();
        if !self.lockout_overlay {
            return;
        }
        if self.guard.is_locked_out() {
            self.apply_lockout();
        } else {
            self.lockout_overlay = false;
            self.lockout_task = None;
            info!("PIN entry available again");
            self.navigate_to(Screen::Welcome, AccessLevel::Public);
        }
    }

    /// Operator bypass of the PIN lockout
    pub fn unlock(&mut self) {
        self.guard.unlock();
        self.lockout_task = None;
        if std::mem::take(&mut self.lockout_overlay) {
            self.navigate_to(Screen::Welcome, AccessLevel::Public);
        }
    }

    /// End the session and return to the welcome screen
    pub fn logout(&mut self) {
        self.guard.logout();
        self.session = None;
        self.profile = None;
        self.ledger.end_session();
        self.outbox.clear();
        self.navigate_to(Screen::Welcome, AccessLevel::Public);
    }

    /// Expire the inactivity timer now; inert without a running session
    pub fn force_expire_session(&mut self) {
        let signal = self
            .session
            .as_mut()
            .and_then(|session| session.timer.force_expire());
        if signal == Some(TimerSignal::Expired) {
            self.expire_session();
        }
    }

    fn expire_session(&mut self) {
        info!("Session expired after inactivity");
        self.logout();
        self.notice = Some(SESSION_EXPIRED_NOTICE.to_string());
    }

    pub fn screen(&self) -> Screen {
        self.controller.current()
    }

    pub fn controller(&self) -> &ScreenController {
        &self.controller
    }

    pub fn session(&self) -> &SessionGuard {
        &self.guard
    }

    pub fn ledger(&self) -> &MovementLedger {
        &self.ledger
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn timer(&self) -> Option<&InactivityTimer> {
        self.session.as_ref().map(|session| &session.timer)
    }

    pub fn is_locked_out(&self) -> bool {
        self.lockout_overlay
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn config(&self) -> &KioskConfig {
        &self.config
    }
}
