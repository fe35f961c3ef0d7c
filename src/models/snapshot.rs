use uuid::Uuid;

use crate::models::Transaction;

// Immutable view of an account's ledger taken in a single read. `version` is
// the highest record id seen, so any append produces a new version.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSnapshot {
    pub account_id: Uuid,
    pub version: i64,
    /// Valid transactions ordered by (timestamp, id).
    pub transactions: Vec<Transaction>,
    /// Malformed records dropped while building the snapshot.
    pub skipped: usize,
}

impl LedgerSnapshot {
    pub fn empty(account_id: Uuid) -> Self {
        Self {
            account_id,
            version: 0,
            transactions: Vec::new(),
            skipped: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
