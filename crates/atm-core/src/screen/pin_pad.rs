//! PIN entry buffer

/// Digits typed on the PIN screen
///
/// The buffer is never logged or displayed; only its length is exposed.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PinPad {
    digits: String,
    max_len: usize,
    message: Option<String>,
    verifying: bool,
    locked: bool,
}

impl std::fmt::Debug for PinPad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinPad")
            .field("entered", &self.digits.len())
            .field("message", &self.message)
            .field("verifying", &self.verifying)
            .field("locked", &self.locked)
            .finish()
    }
}

impl PinPad {
    pub fn new(max_len: usize) -> Self {
        Self {
            max_len,
            ..Self::default()
        }
    }

    fn accepts_input(&self) -> bool {
        !self.verifying && !self.locked
    }

    pub fn push_digit(&mut self, digit: u8) {
        if digit <= 9 && self.accepts_input() && self.digits.len() < self.max_len {
            self.digits.push(char::from(b'0' + digit));
            self.message = None;
        }
    }

    pub fn clear(&mut self) {
        if self.accepts_input() {
            self.digits.clear();
        }
    }

    pub fn is_complete(&self) -> bool {
        self.digits.len() == self.max_len
    }

    /// Take the full PIN for verification, leaving the pad busy
    pub fn take_for_verification(&mut self) -> Option<String> {
        if !self.accepts_input() || !self.is_complete() {
            return None;
        }
        self.verifying = true;
        Some(std::mem::take(&mut self.digits))
    }

    /// Verification failed; show `message` and accept input again
    pub fn reject(&mut self, message: impl Into<String>) {
        self.digits.clear();
        self.verifying = false;
        self.message = Some(message.into());
    }

    /// Stop accepting input until the pad is rebuilt
    pub fn lock(&mut self) {
        self.digits.clear();
        self.verifying = false;
        self.locked = true;
    }

    pub fn entered(&self) -> usize {
        self.digits.len()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_verifying(&self) -> bool {
        self.verifying
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }
}
