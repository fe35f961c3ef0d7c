use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use crate::models::{CreateTransaction, TransactionRecord};

pub async fn create(
    pool: &PgPool,
    account_id: Uuid,
    data: &CreateTransaction,
    timestamp: DateTime<Utc>,
) -> Result<TransactionRecord, sqlx::Error> {
    sqlx::query_as::<_, TransactionRecord>(
        "INSERT INTO transactions (account_id, ticker, transaction_type, quantity, price, timestamp)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id, account_id, ticker, transaction_type, quantity, price, timestamp"
    )
    .bind(account_id)
    .bind(&data.ticker)
    .bind(data.transaction_type.as_str())
    .bind(&data.quantity)
    .bind(&data.price)
    .bind(timestamp)
    .fetch_one(pool)
    .await
}

// One SELECT, so the rows come from a single consistent database snapshot.
pub async fn fetch_by_account(
    pool: &PgPool,
    account_id: Uuid,
) -> Result<Vec<TransactionRecord>, sqlx::Error> {
    sqlx::query_as::<_, TransactionRecord>(
        "SELECT id, account_id, ticker, transaction_type, quantity, price, timestamp
         FROM transactions
         WHERE account_id = $1
         ORDER BY id ASC"
    )
    .bind(account_id)
    .fetch_all(pool)
    .await
}
