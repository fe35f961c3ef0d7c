use std::collections::BTreeMap;

use bigdecimal::{BigDecimal, Zero};
use tracing::warn;
use uuid::Uuid;

use crate::errors::{LedgerError, MalformedTransaction};
use crate::models::{Holding, LedgerSnapshot, Transaction, TransactionRecord, TransactionType};

/// Decimal places kept on the weighted average cost after each buy.
pub const AVG_COST_SCALE: i64 = 10;

/// Validates a stored record. Tickers are upper-cased so `aapl` and `AAPL`
/// land in the same position.
pub fn parse_record(record: &TransactionRecord) -> Result<Transaction, MalformedTransaction> {
    let id = record.id;
    let missing = |field| MalformedTransaction::MissingField { id, field };

    let ticker = record
        .ticker
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| missing("ticker"))?
        .to_uppercase();

    let raw_type = record.transaction_type.as_deref().ok_or_else(|| missing("transaction_type"))?;
    let transaction_type = raw_type
        .parse::<TransactionType>()
        .map_err(|_| MalformedTransaction::UnknownType { id, value: raw_type.to_string() })?;

    let quantity = record.quantity.clone().ok_or_else(|| missing("quantity"))?;
    if quantity <= BigDecimal::zero() {
        return Err(MalformedTransaction::NonPositiveQuantity { id });
    }

    let price = record.price.clone().ok_or_else(|| missing("price"))?;
    if price < BigDecimal::zero() {
        return Err(MalformedTransaction::NegativePrice { id });
    }

    let timestamp = record.timestamp.ok_or_else(|| missing("timestamp"))?;

    Ok(Transaction {
        id,
        account_id: record.account_id,
        ticker,
        transaction_type,
        quantity,
        price,
        timestamp,
    })
}

/// Turns one read of the log into a snapshot: malformed records are dropped
/// and counted, the rest ordered by (timestamp, id).
pub fn build_snapshot(account_id: Uuid, records: &[TransactionRecord]) -> LedgerSnapshot {
    if records.is_empty() {
        return LedgerSnapshot::empty(account_id);
    }
    let version = records.iter().map(|r| r.id).max().unwrap_or(0);

    let mut transactions = Vec::with_capacity(records.len());
    let mut skipped = 0;
    for record in records {
        match parse_record(record) {
            Ok(tx) => transactions.push(tx),
            Err(e) => {
                warn!("Skipping malformed transaction for account {}: {}", account_id, e);
                skipped += 1;
            }
        }
    }
    sort_ledger(&mut transactions);

    LedgerSnapshot {
        account_id,
        version,
        transactions,
        skipped,
    }
}

/// Orders transactions by timestamp, breaking ties by id (insertion order).
pub fn sort_ledger(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
}

/// Folds an ordered ledger into open positions keyed by ticker.
///
/// Buys update the weighted average cost; sells only reduce quantity. A
/// position that reaches zero is dropped, so a later buy starts a fresh
/// average. Selling more than is held fails the whole replay.
pub fn replay(transactions: &[Transaction]) -> Result<BTreeMap<String, Holding>, LedgerError> {
    let mut positions = BTreeMap::new();
    for tx in transactions {
        apply(&mut positions, tx)?;
    }
    Ok(positions
        .into_iter()
        .map(|(ticker, position)| {
            let holding = position.into_holding(&ticker);
            (ticker, holding)
        })
        .collect())
}

// Running position with an exact cost basis. Only the emitted average is
// rounded, so the result does not depend on the order of the buys.
struct Position {
    quantity: BigDecimal,
    cost_basis: BigDecimal,
}

impl Position {
    fn into_holding(self, ticker: &str) -> Holding {
        let avg_cost = (&self.cost_basis / &self.quantity).round(AVG_COST_SCALE);
        Holding {
            ticker: ticker.to_string(),
            quantity: self.quantity,
            avg_cost,
        }
    }
}

fn apply(positions: &mut BTreeMap<String, Position>, tx: &Transaction) -> Result<(), LedgerError> {
    match tx.transaction_type {
        TransactionType::Buy => {
            let position = positions.entry(tx.ticker.clone()).or_insert_with(|| Position {
                quantity: BigDecimal::zero(),
                cost_basis: BigDecimal::zero(),
            });
            position.quantity += &tx.quantity;
            position.cost_basis += tx.amount();
        }
        TransactionType::Sell => {
            let held = positions
                .get(&tx.ticker)
                .map(|p| p.quantity.clone())
                .unwrap_or_else(BigDecimal::zero);
            if tx.quantity > held {
                return Err(LedgerError::InsufficientHoldings {
                    ticker: tx.ticker.clone(),
                    requested: tx.quantity.clone(),
                    held,
                });
            }

            let remaining = &held - &tx.quantity;
            if remaining.is_zero() {
                positions.remove(&tx.ticker);
            } else if let Some(position) = positions.get_mut(&tx.ticker) {
                // The basis shrinks in proportion, leaving the average as it was.
                position.cost_basis = &(&position.cost_basis * &remaining) / &held;
                position.quantity = remaining;
            }
        }
    }
    Ok(())
}

/// Σ buys − Σ sells per ticker, including tickers whose position is closed.
pub fn net_quantities(transactions: &[Transaction]) -> BTreeMap<String, BigDecimal> {
    let mut net: BTreeMap<String, BigDecimal> = BTreeMap::new();
    for tx in transactions {
        let entry = net.entry(tx.ticker.clone()).or_insert_with(BigDecimal::zero);
        match tx.transaction_type {
            TransactionType::Buy => *entry += &tx.quantity,
            TransactionType::Sell => *entry -= &tx.quantity,
        }
    }
    net
}

/// Checks that appending `candidate` keeps the ledger replayable. The
/// candidate is placed by its timestamp, so a backdated sell is checked
/// against the holdings at that point in time and against everything after it.
pub fn check_append(snapshot: &LedgerSnapshot, candidate: &Transaction) -> Result<(), LedgerError> {
    let mut transactions = snapshot.transactions.clone();
    transactions.push(candidate.clone());
    sort_ledger(&mut transactions);
    replay(&transactions).map(|_| ())
}
