use std::sync::Arc;
use chrono::{DateTime, Utc, Duration};
use dashmap::DashMap;

use crate::external::price_feed::PriceFeedError;

#[derive(Debug, Clone)]
pub struct FailureInfo {
    pub failed_at: DateTime<Utc>,
    pub error_type: FailureType,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FailureType {
    NotFound,       // Feed does not know the ticker
    RateLimited,    // Temporary rate limit
    FeedError,      // Timeouts, network and parse errors
}

impl FailureType {
    pub fn ttl(&self) -> Duration {
        match self {
            FailureType::NotFound => Duration::hours(24),
            FailureType::RateLimited => Duration::hours(1),
            FailureType::FeedError => Duration::hours(6),
        }
    }
}

impl From<&PriceFeedError> for FailureType {
    fn from(err: &PriceFeedError) -> Self {
        match err {
            PriceFeedError::NotFound(_) => FailureType::NotFound,
            PriceFeedError::RateLimited => FailureType::RateLimited,
            _ => FailureType::FeedError,
        }
    }
}

/// Tickers the price feed recently failed on. While an entry is live the
/// ticker is reported unavailable without another feed call.
#[derive(Clone, Default)]
pub struct FailureCache {
    cache: Arc<DashMap<String, FailureInfo>>,
}

impl FailureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the failure if it is still within its TTL, evicting it otherwise.
    pub fn is_failed(&self, ticker: &str) -> Option<FailureInfo> {
        self.is_failed_at(ticker, Utc::now())
    }

    fn is_failed_at(&self, ticker: &str, now: DateTime<Utc>) -> Option<FailureInfo> {
        let info = self.cache.get(ticker).map(|entry| entry.value().clone())?;
        if now < info.failed_at + info.error_type.ttl() {
            return Some(info);
        }
        self.cache.remove(ticker);
        None
    }

    pub fn record_failure(&self, ticker: &str, error_type: FailureType) {
        self.record_failure_at(ticker, error_type, Utc::now());
    }

    fn record_failure_at(&self, ticker: &str, error_type: FailureType, failed_at: DateTime<Utc>) {
        self.cache.insert(ticker.to_string(), FailureInfo { failed_at, error_type });
    }

    pub fn clear(&self, ticker: &str) {
        self.cache.remove(ticker);
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
