//! Session-scoped record of committed movements

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of committed movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementKind {
    Withdraw,
    Deposit,
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovementKind::Withdraw => f.write_str("withdraw"),
            MovementKind::Deposit => f.write_str("deposit"),
        }
    }
}

/// One committed movement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub timestamp: DateTime<Utc>,
    pub amount: u64,
    pub kind: MovementKind,
}

/// Append-only list of this session's movements
///
/// Entries cannot be edited or removed individually; the whole ledger is
/// discarded when the session ends.
#[derive(Debug, Clone, Default)]
pub struct MovementLedger {
    entries: Vec<Movement>,
}

impl MovementLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, timestamp: DateTime<Utc>, amount: u64, kind: MovementKind) {
        tracing::info!(%kind, amount, "Movement recorded");
        self.entries.push(Movement {
            timestamp,
            amount,
            kind,
        });
    }

    pub fn entries(&self) -> &[Movement] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all movements of one kind
    pub fn total(&self, kind: MovementKind) -> u64 {
        self.entries
            .iter()
            .filter(|m| m.kind == kind)
            .map(|m| m.amount)
            .sum()
    }

    /// Forget the session's movements
    pub(crate) fn end_session(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let mut ledger = MovementLedger::new();
        let now = Utc::now();
        ledger.record(now, 40, MovementKind::Withdraw);
        ledger.record(now, 100, MovementKind::Deposit);
        ledger.record(now, 20, MovementKind::Withdraw);

        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.entries()[1].kind, MovementKind::Deposit);
        assert_eq!(ledger.total(MovementKind::Withdraw), 60);
    }

    #[test]
    fn test_serialized_kind_is_uppercase() {
        let json = serde_json::to_string(&MovementKind::Withdraw).unwrap();
        assert_eq!(json, "\"WITHDRAW\"");
    }
}
