//! Per-screen state and button bindings

use super::{Action, PinPad, Screen};
use crate::buttons::{ButtonBinding, ButtonSlot};
use crate::gateway::UserProfile;
use crate::transaction::{AmountEntry, AmountRules, FlowState, TransactionFlow};

/// What a screen needs when it is entered
#[derive(Debug, Clone, Copy)]
pub struct EntryContext<'a> {
    pub pin_digits: usize,
    pub rules: &'a AmountRules,
    pub profile: Option<&'a UserProfile>,
}

/// Balance screen state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceView {
    Loading,
    Ready(u64),
    Error(String),
}

/// State owned by the current screen; replaced wholesale on navigation
#[derive(Debug)]
pub enum ScreenContent {
    Welcome,
    PinEntry(PinPad),
    MainMenu { greeting: String },
    Balance(BalanceView),
    Transaction(TransactionFlow),
}

impl ScreenContent {
    /// Fresh content for `screen`
    pub fn enter(screen: Screen, ctx: &EntryContext<'_>) -> Self {
        match screen {
            Screen::Welcome => ScreenContent::Welcome,
            Screen::PinEntry => ScreenContent::PinEntry(PinPad::new(ctx.pin_digits)),
            Screen::MainMenu => ScreenContent::MainMenu {
                greeting: match ctx.profile {
                    Some(profile) => format!("Hi {}!", profile.name),
                    None => "Hi!".to_string(),
                },
            },
            Screen::Balance => ScreenContent::Balance(BalanceView::Loading),
            Screen::Withdraw => {
                ScreenContent::Transaction(TransactionFlow::withdraw(ctx.rules.clone()))
            }
            Screen::Deposit => ScreenContent::Transaction(TransactionFlow::deposit(
                ctx.rules.clone(),
                ctx.profile
                    .map(|p| p.card_number.clone())
                    .unwrap_or_default(),
            )),
        }
    }

    /// Whether the content is waiting for its initial gateway fetch
    pub fn needs_load(&self) -> bool {
        match self {
            ScreenContent::Balance(view) => *view == BalanceView::Loading,
            ScreenContent::Transaction(flow) => *flow.state() == FlowState::Loading,
            _ => false,
        }
    }

    /// Side-button bindings for the content's current state
    pub fn bindings(&self) -> Vec<(ButtonSlot, ButtonBinding<Action>)> {
        match self {
            ScreenContent::Welcome => vec![(
                ButtonSlot::LowerRight,
                ButtonBinding::new("Enter PIN", Action::navigate(Screen::PinEntry)),
            )],
            ScreenContent::PinEntry(pad) => {
                if pad.is_verifying() || pad.is_locked() {
                    Vec::new()
                } else {
                    vec![(
                        ButtonSlot::LowerLeft,
                        ButtonBinding::new("Cancel", Action::navigate(Screen::Welcome)),
                    )]
                }
            }
            ScreenContent::MainMenu { .. } => vec![
                (
                    ButtonSlot::MiddleBottomLeft,
                    ButtonBinding::new("Withdraw", Action::navigate(Screen::Withdraw)),
                ),
                (
                    ButtonSlot::LowerLeft,
                    ButtonBinding::new("Deposit", Action::navigate(Screen::Deposit)),
                ),
                (
                    ButtonSlot::MiddleTopRight,
                    ButtonBinding::new("Exit", Action::Exit),
                ),
                (
                    ButtonSlot::MiddleBottomRight,
                    ButtonBinding::new("Balance", Action::navigate(Screen::Balance)),
                ),
                (
                    ButtonSlot::LowerRight,
                    ButtonBinding::new("Re-Enter PIN", Action::ReenterPin),
                ),
            ],
            ScreenContent::Balance(_) => vec![(
                ButtonSlot::LowerLeft,
                ButtonBinding::new("Back", Action::navigate(Screen::MainMenu)),
            )],
            ScreenContent::Transaction(flow) => flow_bindings(flow),
        }
    }
}

fn cancel_to_menu(label: &str) -> (ButtonSlot, ButtonBinding<Action>) {
    (
        ButtonSlot::LowerLeft,
        ButtonBinding::new(label, Action::navigate(Screen::MainMenu)),
    )
}

fn flow_bindings(flow: &TransactionFlow) -> Vec<(ButtonSlot, ButtonBinding<Action>)> {
    match flow.state() {
        FlowState::Loading => vec![cancel_to_menu("Cancel")],
        FlowState::EnteringAccount => {
            let mut bindings = vec![cancel_to_menu("Cancel")];
            if flow.account_input().len() == flow.rules().entry_digits {
                bindings.push((
                    ButtonSlot::LowerRight,
                    ButtonBinding::new("Continue", Action::ContinueDeposit),
                ));
            }
            bindings
        }
        FlowState::Ready | FlowState::EnteringAmount(AmountEntry::Preset(_)) => {
            let available = flow.available_presets();
            let mut bindings: Vec<_> = flow
                .rules()
                .presets
                .iter()
                .zip(ButtonSlot::PRESET_SLOTS)
                .filter(|(amount, _)| available.contains(amount))
                .map(|(amount, slot)| {
                    (
                        slot,
                        ButtonBinding::new(format!("${}", amount), Action::SelectPreset(*amount)),
                    )
                })
                .collect();
            bindings.push((
                ButtonSlot::MiddleBottomRight,
                ButtonBinding::new("Other", Action::OtherAmount),
            ));
            bindings.push(cancel_to_menu("Cancel"));
            bindings
        }
        FlowState::EnteringAmount(AmountEntry::Custom(_)) => vec![cancel_to_menu("Cancel")],
        FlowState::Confirming(_) => vec![
            (
                ButtonSlot::LowerLeft,
                ButtonBinding::new("Cancel", Action::CancelConfirmation),
            ),
            (
                ButtonSlot::LowerRight,
                ButtonBinding::new("Confirm", Action::ConfirmTransaction),
            ),
        ],
        FlowState::Committing(_) | FlowState::Success { .. } => Vec::new(),
        FlowState::Error { retry, .. } => {
            let mut bindings = vec![cancel_to_menu("Back to menu")];
            if *retry {
                bindings.push((
                    ButtonSlot::LowerRight,
                    ButtonBinding::new("Try again", Action::RetryTransaction),
                ));
            }
            bindings
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KioskConfig;
    use crate::gateway::CardType;

    fn profile() -> UserProfile {
        UserProfile {
            id: "u1".into(),
            name: "Ethan Blake".into(),
            card_number: "100001".into(),
            card_type: CardType::Visa,
            balance: 5000,
            daily_limit: 2000,
            daily_used: 0,
        }
    }

    fn slots(content: &ScreenContent) -> Vec<ButtonSlot> {
        content.bindings().into_iter().map(|(slot, _)| slot).collect()
    }

    #[test]
    fn test_menu_layout() {
        let rules = AmountRules::from_config(&KioskConfig::testing());
        let profile = profile();
        let ctx = EntryContext {
            pin_digits: 6,
            rules: &rules,
            profile: Some(&profile),
        };
        let menu = ScreenContent::enter(Screen::MainMenu, &ctx);
        assert!(matches!(&menu, ScreenContent::MainMenu { greeting } if greeting == "Hi Ethan Blake!"));
        assert_eq!(
            slots(&menu),
            vec![
                ButtonSlot::MiddleBottomLeft,
                ButtonSlot::LowerLeft,
                ButtonSlot::MiddleTopRight,
                ButtonSlot::MiddleBottomRight,
                ButtonSlot::LowerRight,
            ]
        );
    }

    #[test]
    fn test_loading_screens_need_fetch() {
        let rules = AmountRules::from_config(&KioskConfig::testing());
        let profile = profile();
        let ctx = EntryContext {
            pin_digits: 6,
            rules: &rules,
            profile: Some(&profile),
        };
        for screen in [Screen::Balance, Screen::Withdraw, Screen::Deposit] {
            assert!(ScreenContent::enter(screen, &ctx).needs_load());
        }
        for screen in [Screen::Welcome, Screen::PinEntry, Screen::MainMenu] {
            assert!(!ScreenContent::enter(screen, &ctx).needs_load());
        }
    }

    #[test]
    fn test_verifying_pin_pad_has_no_buttons() {
        let mut pad = PinPad::new(1);
        pad.push_digit(1);
        assert_eq!(slots(&ScreenContent::PinEntry(pad.clone())), vec![ButtonSlot::LowerLeft]);
        pad.take_for_verification();
        assert!(ScreenContent::PinEntry(pad).bindings().is_empty());
    }
}
