mod memory;
mod postgres;

pub use memory::InMemoryTransactionStore;
pub use postgres::PgTransactionStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::StoreError;
use crate::models::{CreateTransaction, TransactionRecord};

/// Append-only transaction log, one stream per account.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Every record of the account in insertion order, read in one step.
    async fn fetch_records(&self, account_id: Uuid) -> Result<Vec<TransactionRecord>, StoreError>;

    async fn append(
        &self,
        account_id: Uuid,
        data: &CreateTransaction,
        timestamp: DateTime<Utc>,
    ) -> Result<TransactionRecord, StoreError>;
}
