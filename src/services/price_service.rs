use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::external::price_feed::{PriceFeed, PriceFeedError, Quote};
use crate::models::PriceBook;
use crate::services::failure_cache::{FailureCache, FailureType};

#[derive(Debug, Clone, Copy)]
pub struct PriceLookupOptions {
    pub timeout: Duration,
    pub concurrency: usize,
}

impl Default for PriceLookupOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(3000),
            concurrency: 8,
        }
    }
}

async fn fetch_with_timeout(feed: &dyn PriceFeed, ticker: &str, timeout: Duration) -> Result<Quote, PriceFeedError> {
    match tokio::time::timeout(timeout, feed.fetch_quote(ticker)).await {
        Ok(result) => result,
        Err(_) => Err(PriceFeedError::Timeout(timeout.as_millis() as u64)),
    }
}

/// Looks up current and previous-close prices for `tickers`.
///
/// Lookups run concurrently, each bounded by `options.timeout`. A ticker
/// that errors or times out is left out of the book (unavailable) and
/// parked in the failure cache; tickers already parked are not requested.
pub async fn fetch_price_book(
    feed: &dyn PriceFeed,
    tickers: &[String],
    failure_cache: &FailureCache,
    options: PriceLookupOptions,
) -> PriceBook {
    let pending: Vec<String> = tickers
        .iter()
        .filter(|ticker| match failure_cache.is_failed(ticker) {
            Some(info) => {
                debug!("Skipping {} - feed failed recently ({:?})", ticker, info.error_type);
                false
            }
            None => true,
        })
        .cloned()
        .collect();

    let results: Vec<(String, Result<Quote, PriceFeedError>)> = stream::iter(pending)
        .map(|ticker| async move {
            let result = fetch_with_timeout(feed, &ticker, options.timeout).await;
            (ticker, result)
        })
        .buffer_unordered(options.concurrency.max(1))
        .collect()
        .await;

    let mut book = PriceBook::default();
    for (ticker, result) in results {
        match result {
            Ok(quote) => {
                failure_cache.clear(&ticker);
                if let Some(name) = quote.name {
                    book.names.insert(ticker.clone(), name);
                }
                if let Some(close) = quote.previous_close {
                    book.previous_close.insert(ticker.clone(), close);
                }
                book.current.insert(ticker, quote.current_price);
            }
            Err(e) => {
                warn!("Price unavailable for {}: {}", ticker, e);
                failure_cache.record_failure(&ticker, FailureType::from(&e));
            }
        }
    }
    book
}
