use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::external::price_feed::PriceFeed;
use crate::services::failure_cache::FailureCache;
use crate::services::price_service::PriceLookupOptions;
use crate::services::replay_cache::ReplayCache;
use crate::store::TransactionStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TransactionStore>,
    pub price_feed: Arc<dyn PriceFeed>,
    pub failure_cache: FailureCache,
    pub replay_cache: ReplayCache,
    pub price_options: PriceLookupOptions,
    write_locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn TransactionStore>,
        price_feed: Arc<dyn PriceFeed>,
        price_options: PriceLookupOptions,
    ) -> Self {
        Self {
            store,
            price_feed,
            failure_cache: FailureCache::new(),
            replay_cache: ReplayCache::new(),
            price_options,
            write_locks: Arc::new(DashMap::new()),
        }
    }

    /// Serialises appends per account so two sells cannot both pass the
    /// holdings check against the same snapshot.
    pub fn write_lock(&self, account_id: Uuid) -> Arc<Mutex<()>> {
        Arc::clone(self.write_locks.entry(account_id).or_default().value())
    }

    /// Drops the account's lock once no writer holds or waits on it. Call
    /// after releasing the `Arc` returned by `write_lock`.
    pub fn release_write_lock(&self, account_id: Uuid) {
        self.write_locks
            .remove_if(&account_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    pub fn write_lock_count(&self) -> usize {
        self.write_locks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::price_feed::{PriceFeedError, Quote};
    use crate::store::InMemoryTransactionStore;
    use async_trait::async_trait;

    struct NoFeed;

    #[async_trait]
    impl PriceFeed for NoFeed {
        async fn fetch_quote(&self, ticker: &str) -> Result<Quote, PriceFeedError> {
            Err(PriceFeedError::NotFound(ticker.to_string()))
        }
    }

    fn state() -> AppState {
        AppState::new(
            Arc::new(InMemoryTransactionStore::new()),
            Arc::new(NoFeed),
            PriceLookupOptions::default(),
        )
    }

    #[test]
    fn test_lock_kept_while_shared() {
        let state = state();
        let account = Uuid::new_v4();

        let first = state.write_lock(account);
        let waiting = state.write_lock(account);
        assert!(Arc::ptr_eq(&first, &waiting));

        drop(first);
        state.release_write_lock(account);
        assert_eq!(state.write_lock_count(), 1);

        drop(waiting);
        state.release_write_lock(account);
        assert_eq!(state.write_lock_count(), 0);
    }
}
