//! Keyboard to kiosk input mapping

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use atm_core::{ButtonSlot, KeypadKey};

/// What a key press means to the kiosk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Press(ButtonSlot),
    Keypad(KeypadKey),
    /// Operator bypass of the PIN lockout
    Unlock,
    /// End the session as if the inactivity timer ran out
    ForceExpire,
    Quit,
}

/// Map a key press; unmapped keys yield `None`
pub fn map_key(key: KeyEvent) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }

    match key.code {
        KeyCode::F(n @ 1..=8) => ButtonSlot::from_index(n - 1).ok().map(Command::Press),
        KeyCode::Char(c) if c.is_ascii_digit() => {
            Some(Command::Keypad(KeypadKey::Digit(c as u8 - b'0')))
        }
        KeyCode::Backspace | KeyCode::Delete => Some(Command::Keypad(KeypadKey::Clear)),
        KeyCode::Enter => Some(Command::Keypad(KeypadKey::Enter)),
        KeyCode::Char('u') => Some(Command::Unlock),
        KeyCode::Char('t') => Some(Command::ForceExpire),
        KeyCode::Esc => Some(Command::Quit),
        _ => None,
    }
}

/// Function key for a slot, for on-screen hints
pub fn slot_key(slot: ButtonSlot) -> String {
    format!("F{}", slot.index() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[rstest]
    #[case(1, ButtonSlot::UpperLeft)]
    #[case(4, ButtonSlot::LowerLeft)]
    #[case(5, ButtonSlot::UpperRight)]
    #[case(8, ButtonSlot::LowerRight)]
    fn test_function_keys_press_slots(#[case] n: u8, #[case] slot: ButtonSlot) {
        assert_eq!(map_key(key(KeyCode::F(n))), Some(Command::Press(slot)));
        assert_eq!(slot_key(slot), format!("F{}", n));
    }

    #[rstest]
    #[case(KeyCode::Char('0'), Some(Command::Keypad(KeypadKey::Digit(0))))]
    #[case(KeyCode::Char('7'), Some(Command::Keypad(KeypadKey::Digit(7))))]
    #[case(KeyCode::Backspace, Some(Command::Keypad(KeypadKey::Clear)))]
    #[case(KeyCode::Enter, Some(Command::Keypad(KeypadKey::Enter)))]
    #[case(KeyCode::Char('u'), Some(Command::Unlock))]
    #[case(KeyCode::Char('t'), Some(Command::ForceExpire))]
    #[case(KeyCode::Esc, Some(Command::Quit))]
    #[case(KeyCode::F(9), None)]
    #[case(KeyCode::Char('x'), None)]
    fn test_keys(#[case] code: KeyCode, #[case] expected: Option<Command>) {
        assert_eq!(map_key(key(code)), expected);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(event), Some(Command::Quit));
    }
}
