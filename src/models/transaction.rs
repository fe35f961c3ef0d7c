use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Buy,
    Sell,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Buy => "buy",
            TransactionType::Sell => "sell",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(TransactionType::Buy),
            "sell" => Ok(TransactionType::Sell),
            other => Err(format!("unknown transaction type '{}'", other)),
        }
    }
}

// A buy or sell event as recorded in the ledger. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub account_id: Uuid,
    pub ticker: String,
    pub transaction_type: TransactionType,
    pub quantity: BigDecimal,
    pub price: BigDecimal,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Cash moved by this transaction (price × quantity), always non-negative.
    pub fn amount(&self) -> BigDecimal {
        &self.price * &self.quantity
    }
}

// Raw row from the transactions table. Legacy rows may have gaps, so every
// business column is nullable here and validated before replay.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TransactionRecord {
    pub id: i64,
    pub account_id: Uuid,
    pub ticker: Option<String>,
    pub transaction_type: Option<String>,
    pub quantity: Option<BigDecimal>,
    pub price: Option<BigDecimal>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTransaction {
    pub ticker: String,
    pub transaction_type: TransactionType,
    pub quantity: BigDecimal,
    pub price: BigDecimal,
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<&Transaction> for TransactionRecord {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id,
            account_id: tx.account_id,
            ticker: Some(tx.ticker.clone()),
            transaction_type: Some(tx.transaction_type.as_str().to_string()),
            quantity: Some(tx.quantity.clone()),
            price: Some(tx.price.clone()),
            timestamp: Some(tx.timestamp),
        }
    }
}
