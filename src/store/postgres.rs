use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::transaction_queries;
use crate::errors::StoreError;
use crate::models::{CreateTransaction, TransactionRecord};
use crate::store::TransactionStore;

#[derive(Clone)]
pub struct PgTransactionStore {
    pool: PgPool,
}

impl PgTransactionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionStore for PgTransactionStore {
    async fn fetch_records(&self, account_id: Uuid) -> Result<Vec<TransactionRecord>, StoreError> {
        Ok(transaction_queries::fetch_by_account(&self.pool, account_id).await?)
    }

    async fn append(
        &self,
        account_id: Uuid,
        data: &CreateTransaction,
        timestamp: DateTime<Utc>,
    ) -> Result<TransactionRecord, StoreError> {
        Ok(transaction_queries::create(&self.pool, account_id, data, timestamp).await?)
    }
}
