use std::collections::BTreeMap;
use std::sync::Arc;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{
    CreateTransaction, Holding, InvestmentPoint, LedgerSnapshot, PortfolioValuation, Transaction,
};
use crate::services::replay_cache::ReplayOutcome;
use crate::services::{ledger_service, price_service, valuation_service};
use crate::state::AppState;

/// Reads the account's log once and turns it into a snapshot.
pub async fn load_snapshot(state: &AppState, account_id: Uuid) -> Result<LedgerSnapshot, AppError> {
    let records = state.store.fetch_records(account_id).await.map_err(|e| {
        error!("Failed to read transactions for account {}: {}", account_id, e);
        e
    })?;
    let snapshot = ledger_service::build_snapshot(account_id, &records);
    if snapshot.is_empty() {
        debug!("Account {} has no valid transactions", account_id);
    }
    Ok(snapshot)
}

pub async fn load_replay(state: &AppState, account_id: Uuid) -> Result<Arc<ReplayOutcome>, AppError> {
    let snapshot = load_snapshot(state, account_id).await?;
    Ok(state.replay_cache.get_or_replay(&snapshot))
}

// A ledger that cannot be replayed is an account-level error, never an
// empty or partial portfolio.
fn replayed_holdings(outcome: &ReplayOutcome, account_id: Uuid) -> Result<&BTreeMap<String, Holding>, AppError> {
    match &outcome.holdings {
        Ok(map) => Ok(map),
        Err(e) => {
            error!("Ledger for account {} cannot be replayed: {}", account_id, e);
            Err(AppError::Ledger(e.clone()))
        }
    }
}

pub async fn holdings(state: &AppState, account_id: Uuid) -> Result<Vec<Holding>, AppError> {
    let outcome = load_replay(state, account_id).await?;
    Ok(replayed_holdings(&outcome, account_id)?.values().cloned().collect())
}

pub async fn investments(state: &AppState, account_id: Uuid) -> Result<Vec<InvestmentPoint>, AppError> {
    let outcome = load_replay(state, account_id).await?;
    Ok(outcome.investments.clone())
}

pub async fn transactions(state: &AppState, account_id: Uuid) -> Result<Vec<Transaction>, AppError> {
    Ok(load_snapshot(state, account_id).await?.transactions)
}

/// Holdings valued at live prices. Every screen that shows holdings or the
/// summary goes through here, so they all agree on the numbers.
pub async fn valuation(state: &AppState, account_id: Uuid) -> Result<PortfolioValuation, AppError> {
    let outcome = load_replay(state, account_id).await?;
    let holdings = replayed_holdings(&outcome, account_id)?;

    let tickers: Vec<String> = holdings.keys().cloned().collect();
    let prices = price_service::fetch_price_book(
        state.price_feed.as_ref(),
        &tickers,
        &state.failure_cache,
        state.price_options,
    )
    .await;

    let valuation = valuation_service::value_portfolio(holdings, &prices, outcome.skipped);
    info!(
        "Valued {} holdings for account {} ({} unavailable)",
        valuation.holdings.len(),
        account_id,
        valuation.unavailable.len()
    );
    Ok(valuation)
}

// Limits of the `transactions` columns: VARCHAR(16) and NUMERIC(28, 10).
const MAX_TICKER_LEN: usize = 16;
const DECIMAL_SCALE: i64 = 10;
const MAX_INTEGER_DIGITS: u32 = 18;

// True when the value is stored without rounding or overflow.
fn fits_column(value: &BigDecimal) -> bool {
    let limit = BigDecimal::from(10i64.pow(MAX_INTEGER_DIGITS));
    value.with_scale(DECIMAL_SCALE) == *value && value.abs() < limit
}

fn validate(input: &CreateTransaction) -> Result<(), AppError> {
    let ticker = input.ticker.trim();
    if ticker.is_empty() {
        return Err(AppError::Validation("Ticker cannot be empty".into()));
    }
    if ticker.chars().count() > MAX_TICKER_LEN {
        return Err(AppError::Validation(format!(
            "Ticker cannot be longer than {} characters",
            MAX_TICKER_LEN
        )));
    }
    if input.quantity <= BigDecimal::zero() {
        return Err(AppError::Validation("Quantity must be > 0".into()));
    }
    if input.price < BigDecimal::zero() {
        return Err(AppError::Validation("Price cannot be negative".into()));
    }
    if !fits_column(&input.quantity) || !fits_column(&input.price) {
        return Err(AppError::Validation(format!(
            "Quantity and price allow at most {} integer digits and {} decimal places",
            MAX_INTEGER_DIGITS, DECIMAL_SCALE
        )));
    }
    Ok(())
}

/// Appends a buy or sell after checking the ledger still replays with it.
/// A sell larger than the position at its timestamp is rejected and nothing
/// is written.
pub async fn record_transaction(
    state: &AppState,
    account_id: Uuid,
    mut input: CreateTransaction,
) -> Result<Transaction, AppError> {
    validate(&input)?;
    input.ticker = input.ticker.trim().to_uppercase();
    let timestamp = input.timestamp.unwrap_or_else(Utc::now);

    let lock = state.write_lock(account_id);
    let result = {
        let _guard = lock.lock().await;
        append_checked(state, account_id, &input, timestamp).await
    };
    drop(lock);
    state.release_write_lock(account_id);
    result
}

// Runs under the account's write lock.
async fn append_checked(
    state: &AppState,
    account_id: Uuid,
    input: &CreateTransaction,
    timestamp: DateTime<Utc>,
) -> Result<Transaction, AppError> {
    let snapshot = load_snapshot(state, account_id).await?;
    let candidate = Transaction {
        id: snapshot.version + 1,
        account_id,
        ticker: input.ticker.clone(),
        transaction_type: input.transaction_type,
        quantity: input.quantity.clone(),
        price: input.price.clone(),
        timestamp,
    };
    ledger_service::check_append(&snapshot, &candidate)?;

    let record = state.store.append(account_id, input, timestamp).await?;
    state.replay_cache.invalidate(account_id);
    info!(
        "Recorded {} of {} {} for account {}",
        input.transaction_type, input.quantity, input.ticker, account_id
    );

    ledger_service::parse_record(&record).map_err(|e| AppError::Validation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LedgerError;
    use crate::external::price_feed::{PriceFeed, PriceFeedError, Quote};
    use crate::models::{TransactionRecord, TransactionType};
    use crate::services::price_service::PriceLookupOptions;
    use crate::store::{InMemoryTransactionStore, TransactionStore};
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone};
    use std::str::FromStr;

    struct FixedFeed;

    #[async_trait]
    impl PriceFeed for FixedFeed {
        async fn fetch_quote(&self, ticker: &str) -> Result<Quote, PriceFeedError> {
            match ticker {
                "AAPL" => Ok(Quote {
                    ticker: ticker.to_string(),
                    name: Some("Apple Inc.".to_string()),
                    current_price: BigDecimal::from(300),
                    previous_close: Some(BigDecimal::from(290)),
                }),
                _ => Err(PriceFeedError::NotFound(ticker.to_string())),
            }
        }
    }

    fn state_with(store: Arc<InMemoryTransactionStore>) -> AppState {
        AppState::new(store, Arc::new(FixedFeed), PriceLookupOptions::default())
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, d, 10, 0, 0).unwrap()
    }

    fn create(side: TransactionType, qty: i64, price: i64, d: u32) -> CreateTransaction {
        CreateTransaction {
            ticker: "aapl".to_string(),
            transaction_type: side,
            quantity: BigDecimal::from(qty),
            price: BigDecimal::from(price),
            timestamp: Some(day(d)),
        }
    }

    #[tokio::test]
    async fn test_record_then_value() {
        let state = state_with(Arc::new(InMemoryTransactionStore::new()));
        let account = Uuid::new_v4();

        record_transaction(&state, account, create(TransactionType::Buy, 10, 100, 1)).await.unwrap();
        record_transaction(&state, account, create(TransactionType::Buy, 10, 200, 2)).await.unwrap();
        let sell = record_transaction(&state, account, create(TransactionType::Sell, 5, 250, 3)).await.unwrap();
        assert_eq!(sell.ticker, "AAPL");

        let valuation = valuation(&state, account).await.unwrap();
        let aapl = &valuation.holdings[0];
        assert_eq!(aapl.quantity, BigDecimal::from(15));
        assert_eq!(aapl.avg_cost, BigDecimal::from(150));
        assert_eq!(aapl.current_value, Some(BigDecimal::from(4500)));
        assert_eq!(aapl.profit_loss, Some(BigDecimal::from(2250)));
        assert_eq!(aapl.name, "Apple Inc.");
        assert_eq!(valuation.summary.todays_revenue, BigDecimal::from(150));
    }

    #[tokio::test]
    async fn test_oversell_is_rejected_and_not_written() {
        let store = Arc::new(InMemoryTransactionStore::new());
        let state = state_with(store.clone());
        let account = Uuid::new_v4();

        record_transaction(&state, account, create(TransactionType::Buy, 3, 100, 1)).await.unwrap();
        let before = holdings(&state, account).await.unwrap();

        let err = record_transaction(&state, account, create(TransactionType::Sell, 4, 100, 2))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Ledger(LedgerError::InsufficientHoldings { .. })));

        assert_eq!(store.fetch_records(account).await.unwrap().len(), 1);
        assert_eq!(holdings(&state, account).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_corrupt_ledger_surfaces_as_error() {
        let store = Arc::new(InMemoryTransactionStore::new());
        let state = state_with(store.clone());
        let account = Uuid::new_v4();
        store
            .insert_record(TransactionRecord {
                id: 0,
                account_id: account,
                ticker: Some("MSFT".to_string()),
                transaction_type: Some("sell".to_string()),
                quantity: Some(BigDecimal::from(1)),
                price: Some(BigDecimal::from(1)),
                timestamp: Some(day(1)),
            })
            .await;

        assert!(matches!(holdings(&state, account).await, Err(AppError::Ledger(_))));
        assert!(matches!(valuation(&state, account).await, Err(AppError::Ledger(_))));
        // The investment series does not depend on holdings and still renders.
        assert_eq!(investments(&state, account).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_ledger_is_all_zero() {
        let state = state_with(Arc::new(InMemoryTransactionStore::new()));
        let account = Uuid::new_v4();

        let valuation = valuation(&state, account).await.unwrap();
        assert!(valuation.holdings.is_empty());
        assert!(valuation.summary.total_assets.is_zero());
        assert!(valuation.summary.total_revenue.is_zero());
        assert!(valuation.summary.todays_revenue.is_zero());
        assert!(investments(&state, account).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validation_rejects_bad_input() {
        let state = state_with(Arc::new(InMemoryTransactionStore::new()));
        let account = Uuid::new_v4();

        let mut blank = create(TransactionType::Buy, 1, 1, 1);
        blank.ticker = "  ".to_string();
        assert!(matches!(record_transaction(&state, account, blank).await, Err(AppError::Validation(_))));

        let zero = create(TransactionType::Buy, 0, 1, 1);
        assert!(matches!(record_transaction(&state, account, zero).await, Err(AppError::Validation(_))));

        let mut negative = create(TransactionType::Buy, 1, 1, 1);
        negative.price = BigDecimal::from_str("-0.01").unwrap();
        assert!(matches!(record_transaction(&state, account, negative).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_rejects_values_the_table_would_change() {
        let store = Arc::new(InMemoryTransactionStore::new());
        let state = state_with(store.clone());
        let account = Uuid::new_v4();

        let mut tiny = create(TransactionType::Buy, 1, 1, 1);
        tiny.quantity = BigDecimal::from_str("0.00000000001").unwrap();
        assert!(matches!(record_transaction(&state, account, tiny).await, Err(AppError::Validation(_))));

        let mut long_ticker = create(TransactionType::Buy, 1, 1, 1);
        long_ticker.ticker = "ABCDEFGHIJKLMNOPQ".to_string();
        assert!(matches!(record_transaction(&state, account, long_ticker).await, Err(AppError::Validation(_))));

        let mut precise_price = create(TransactionType::Buy, 1, 1, 1);
        precise_price.price = BigDecimal::from_str("10.00000000001").unwrap();
        assert!(matches!(record_transaction(&state, account, precise_price).await, Err(AppError::Validation(_))));

        let mut huge = create(TransactionType::Buy, 1, 1, 1);
        huge.quantity = BigDecimal::from_str("1000000000000000000").unwrap();
        assert!(matches!(record_transaction(&state, account, huge).await, Err(AppError::Validation(_))));

        assert!(store.fetch_records(account).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_lock_is_released_after_append() {
        let state = state_with(Arc::new(InMemoryTransactionStore::new()));
        let account = Uuid::new_v4();

        record_transaction(&state, account, create(TransactionType::Buy, 1, 1, 1)).await.unwrap();
        let _ = record_transaction(&state, account, create(TransactionType::Sell, 5, 1, 2)).await;

        assert_eq!(state.write_lock_count(), 0);
    }

    #[tokio::test]
    async fn test_accepts_values_at_the_column_limits() {
        let state = state_with(Arc::new(InMemoryTransactionStore::new()));
        let account = Uuid::new_v4();

        let mut edge = create(TransactionType::Buy, 1, 1, 1);
        edge.ticker = "ABCDEFGHIJKLMNOP".to_string();
        edge.quantity = BigDecimal::from_str("999999999999999999.0000000001").unwrap();
        edge.price = BigDecimal::from_str("1.50000000000000").unwrap();

        let recorded = record_transaction(&state, account, edge).await.unwrap();
        assert_eq!(recorded.ticker, "ABCDEFGHIJKLMNOP");
        assert_eq!(recorded.price, BigDecimal::from_str("1.5").unwrap());
    }
}
