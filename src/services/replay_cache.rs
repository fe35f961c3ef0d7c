use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::errors::LedgerError;
use crate::models::{Holding, InvestmentPoint, LedgerSnapshot};
use crate::services::{ledger_service, timeseries_service};

/// Everything derived from one ledger snapshot that does not depend on prices.
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    pub version: i64,
    pub holdings: Result<BTreeMap<String, Holding>, LedgerError>,
    pub investments: Vec<InvestmentPoint>,
    pub skipped: usize,
}

impl ReplayOutcome {
    pub fn from_snapshot(snapshot: &LedgerSnapshot) -> Self {
        Self {
            version: snapshot.version,
            holdings: ledger_service::replay(&snapshot.transactions),
            investments: timeseries_service::investment_series(&snapshot.transactions),
            skipped: snapshot.skipped,
        }
    }
}

/// Replay results per account, valid only for the snapshot version they were
/// computed from.
#[derive(Clone, Default)]
pub struct ReplayCache {
    entries: Arc<DashMap<Uuid, Arc<ReplayOutcome>>>,
}

impl ReplayCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, account_id: Uuid, version: i64) -> Option<Arc<ReplayOutcome>> {
        self.entries
            .get(&account_id)
            .filter(|entry| entry.version == version)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Returns the cached outcome for this snapshot's version, replaying and
    /// replacing any stale entry on a miss.
    pub fn get_or_replay(&self, snapshot: &LedgerSnapshot) -> Arc<ReplayOutcome> {
        if let Some(hit) = self.get(snapshot.account_id, snapshot.version) {
            return hit;
        }
        let outcome = Arc::new(ReplayOutcome::from_snapshot(snapshot));
        self.entries.insert(snapshot.account_id, Arc::clone(&outcome));
        outcome
    }

    pub fn invalidate(&self, account_id: Uuid) {
        self.entries.remove(&account_id);
    }
}
