//! Shared harness for kiosk scenarios

#![allow(dead_code)]

use std::sync::Arc;

use tokio::sync::mpsc;

use atm_core::{
    ButtonSlot, FlowState, InMemoryGateway, KeypadKey, Kiosk, KioskConfig, KioskEvent,
    LockoutStore, ManualClock, MemoryLockoutStore, Screen, ScreenContent,
};
use atm_core::gateway::MockAccount;

/// A kiosk wired to an in-memory bank and a manual clock
pub struct Harness {
    pub kiosk: Kiosk,
    pub events: mpsc::UnboundedReceiver<KioskEvent>,
    pub gateway: Arc<InMemoryGateway>,
    pub clock: ManualClock,
}

impl Harness {
    /// Demo bank, lockout kept in memory
    pub fn seeded() -> Self {
        Self::with_gateway(InMemoryGateway::seeded())
    }

    pub fn with_gateway(gateway: InMemoryGateway) -> Self {
        Self::build(gateway, Box::new(MemoryLockoutStore::new()), ManualClock::default())
    }

    pub fn build(
        gateway: InMemoryGateway,
        store: Box<dyn LockoutStore>,
        clock: ManualClock,
    ) -> Self {
        let gateway = Arc::new(gateway);
        let (kiosk, events) = Kiosk::new(
            KioskConfig::testing(),
            gateway.clone(),
            store,
            Arc::new(clock.clone()),
        )
        .unwrap();
        Self {
            kiosk,
            events,
            gateway,
            clock,
        }
    }

    pub fn screen(&self) -> Screen {
        self.kiosk.screen()
    }

    pub fn label(&self, slot: ButtonSlot) -> Option<&str> {
        self.kiosk.controller().buttons().label(slot)
    }

    pub fn type_digits(&mut self, digits: &str) {
        for ch in digits.chars() {
            let digit = ch.to_digit(10).unwrap() as u8;
            self.kiosk.keypad(KeypadKey::Digit(digit));
        }
    }

    /// Type a PIN, press Enter and let the gateway answer
    pub async fn enter_pin(&mut self, pin: &str) {
        self.type_digits(pin);
        self.kiosk.keypad(KeypadKey::Enter);
        self.kiosk.run_pending().await;
    }

    /// Welcome -> PIN entry -> main menu
    pub async fn login(&mut self, pin: &str) {
        self.kiosk.press(ButtonSlot::LowerRight);
        assert_eq!(self.screen(), Screen::PinEntry);
        self.enter_pin(pin).await;
    }

    /// Apply every timer event posted so far
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.kiosk.handle_event(event);
        }
    }

    pub fn flow_state(&self) -> FlowState {
        match self.kiosk.controller().content() {
            ScreenContent::Transaction(flow) => flow.state().clone(),
            other => panic!("not on a transaction screen: {:?}", other),
        }
    }
}

/// userA can withdraw at most 250 more today; userB owns account 200002
pub fn limited_bank() -> InMemoryGateway {
    InMemoryGateway::builder()
        .account(
            MockAccount::new("userA", "123456", "100001", "Ethan Blake")
                .balance(10_000)
                .daily(300, 50),
        )
        .account(MockAccount::new("userB", "111111", "200002", "Canelo Alvarez").balance(1_000))
        .machine_cash(2_000)
        .build()
}
