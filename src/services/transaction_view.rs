use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{Page, Transaction, PAGE_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Ticker,
    TransactionType,
    Timestamp,
    Quantity,
    Price,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ticker" => Ok(SortKey::Ticker),
            "transaction_type" => Ok(SortKey::TransactionType),
            "timestamp" => Ok(SortKey::Timestamp),
            "quantity" => Ok(SortKey::Quantity),
            "price" => Ok(SortKey::Price),
            other => Err(format!("Unknown sort key '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortState {
    /// Column-header click: the same key flips direction, a new key starts
    /// ascending.
    pub fn toggle(current: Option<SortState>, key: SortKey) -> SortState {
        let direction = match current {
            Some(state) if state.key == key && state.direction == SortDirection::Asc => SortDirection::Desc,
            _ => SortDirection::Asc,
        };
        SortState { key, direction }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransactionQuery {
    pub filter: String,
    pub sort: Option<SortState>,
    pub page: usize,
}

/// Case-insensitive substring match on ticker or transaction type.
pub fn matches(tx: &Transaction, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    tx.ticker.to_lowercase().contains(&needle) || tx.transaction_type.as_str().contains(&needle)
}

fn compare(a: &Transaction, b: &Transaction, key: SortKey) -> Ordering {
    match key {
        SortKey::Ticker => a.ticker.cmp(&b.ticker),
        SortKey::TransactionType => a.transaction_type.as_str().cmp(b.transaction_type.as_str()),
        SortKey::Timestamp => a.timestamp.cmp(&b.timestamp),
        SortKey::Quantity => a.quantity.cmp(&b.quantity),
        SortKey::Price => a.price.cmp(&b.price),
    }
}

/// Stable sort: rows with equal keys keep their relative order in both
/// directions.
pub fn sort(rows: &mut [Transaction], state: SortState) {
    rows.sort_by(|a, b| {
        let ordering = compare(a, b, state.key);
        match state.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

pub fn query(transactions: &[Transaction], query: &TransactionQuery) -> Page<Transaction> {
    let mut rows: Vec<Transaction> = transactions
        .iter()
        .filter(|tx| matches(tx, &query.filter))
        .cloned()
        .collect();
    if let Some(state) = query.sort {
        sort(&mut rows, state);
    }
    Page::slice(&rows, query.page, PAGE_SIZE)
}

// Interactive state of the transactions table. Editing the filter text
// returns to the first page; re-sorting keeps the current page.
#[derive(Debug, Clone)]
pub struct TransactionViewState {
    query: TransactionQuery,
}

impl Default for TransactionViewState {
    fn default() -> Self {
        Self {
            query: TransactionQuery {
                filter: String::new(),
                sort: None,
                page: 1,
            },
        }
    }
}

impl TransactionViewState {
    pub fn set_filter(&mut self, text: &str) {
        if self.query.filter != text {
            self.query.filter = text.to_string();
            self.query.page = 1;
        }
    }

    pub fn toggle_sort(&mut self, key: SortKey) {
        self.query.sort = Some(SortState::toggle(self.query.sort, key));
    }

    pub fn set_page(&mut self, page: usize) {
        self.query.page = page.max(1);
    }

    pub fn page(&self) -> usize {
        self.query.page
    }

    pub fn sort_state(&self) -> Option<SortState> {
        self.query.sort
    }

    pub fn apply(&self, transactions: &[Transaction]) -> Page<Transaction> {
        query(transactions, &self.query)
    }
}
