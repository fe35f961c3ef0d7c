use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::models::{CreateTransaction, TransactionRecord};
use crate::store::TransactionStore;

/// Process-local log used by tests and `STORE_BACKEND=memory`.
#[derive(Default)]
pub struct InMemoryTransactionStore {
    next_id: AtomicI64,
    records: RwLock<HashMap<Uuid, Vec<TransactionRecord>>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a raw record as-is (gaps included), assigning the next id.
    pub async fn insert_record(&self, mut record: TransactionRecord) -> TransactionRecord {
        let mut records = self.records.write().await;
        record.id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        records.entry(record.account_id).or_default().push(record.clone());
        record
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn fetch_records(&self, account_id: Uuid) -> Result<Vec<TransactionRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.get(&account_id).cloned().unwrap_or_default())
    }

    async fn append(
        &self,
        account_id: Uuid,
        data: &CreateTransaction,
        timestamp: DateTime<Utc>,
    ) -> Result<TransactionRecord, StoreError> {
        let record = TransactionRecord {
            id: 0,
            account_id,
            ticker: Some(data.ticker.clone()),
            transaction_type: Some(data.transaction_type.as_str().to_string()),
            quantity: Some(data.quantity.clone()),
            price: Some(data.price.clone()),
            timestamp: Some(timestamp),
        };
        Ok(self.insert_record(record).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionType;
    use bigdecimal::BigDecimal;

    fn buy(ticker: &str) -> CreateTransaction {
        CreateTransaction {
            ticker: ticker.to_string(),
            transaction_type: TransactionType::Buy,
            quantity: BigDecimal::from(1),
            price: BigDecimal::from(10),
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn test_ids_increase_across_accounts() {
        let store = InMemoryTransactionStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let first = store.append(a, &buy("AAPL"), Utc::now()).await.unwrap();
        let second = store.append(b, &buy("MSFT"), Utc::now()).await.unwrap();
        let third = store.append(a, &buy("V"), Utc::now()).await.unwrap();

        assert!(first.id < second.id && second.id < third.id);
        let ids: Vec<i64> = store.fetch_records(a).await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first.id, third.id]);
        assert!(store.fetch_records(Uuid::new_v4()).await.unwrap().is_empty());
    }
}
