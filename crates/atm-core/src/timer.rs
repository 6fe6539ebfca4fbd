//! Inactivity countdown
//!
//! A pure state machine: the owner feeds it one `tick()` per second (see
//! [`crate::schedule`]) and reacts to the signals it returns.

/// Countdown phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Running,
    Expired,
}

/// Signal raised by a tick or a forced expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSignal {
    /// Remaining time crossed the warning threshold (once per arming)
    Warning { remaining_secs: u64 },
    /// Countdown reached zero (exactly once per arming)
    Expired,
}

/// Session inactivity timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InactivityTimer {
    remaining_secs: u64,
    warning_threshold: u64,
    warned: bool,
    phase: TimerPhase,
}

impl InactivityTimer {
    pub fn new(remaining_secs: u64, warning_threshold: u64) -> Self {
        Self {
            remaining_secs,
            warning_threshold,
            warned: false,
            phase: TimerPhase::Running,
        }
    }

    /// Advance by one second
    pub fn tick(&mut self) -> Option<TimerSignal> {
        if self.phase == TimerPhase::Expired {
            return None;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);

        if self.remaining_secs == 0 {
            self.phase = TimerPhase::Expired;
            return Some(TimerSignal::Expired);
        }

        if !self.warned && self.remaining_secs <= self.warning_threshold {
            self.warned = true;
            return Some(TimerSignal::Warning {
                remaining_secs: self.remaining_secs,
            });
        }

        None
    }

    /// Restart the countdown from a new value, re-arming warning and expiry
    pub fn reset(&mut self, remaining_secs: u64) {
        self.remaining_secs = remaining_secs;
        self.warned = false;
        self.phase = TimerPhase::Running;
    }

    /// Jump straight to expiry
    ///
    /// Returns the expiry signal only the first time; repeated calls are inert
    /// until the next reset.
    pub fn force_expire(&mut self) -> Option<TimerSignal> {
        if self.phase == TimerPhase::Expired {
            return None;
        }
        self.remaining_secs = 0;
        self.phase = TimerPhase::Expired;
        Some(TimerSignal::Expired)
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn warning_threshold(&self) -> u64 {
        self.warning_threshold
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn is_expired(&self) -> bool {
        self.phase == TimerPhase::Expired
    }

    /// Whether the warning is showing
    pub fn is_warning(&self) -> bool {
        self.warned && self.phase == TimerPhase::Running
    }

    /// Remaining time as M:SS
    pub fn formatted(&self) -> String {
        format!("{}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }
}
