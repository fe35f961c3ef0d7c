use async_trait::async_trait;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub ticker: String,
    pub name: Option<String>,
    pub current_price: BigDecimal,
    pub previous_close: Option<BigDecimal>,
}

#[derive(Debug, Error)]
pub enum PriceFeedError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("rate limited")]
    RateLimited,

    #[error("ticker not found: {0}")]
    NotFound(String),

    #[error("timed out after {0} ms")]
    Timeout(u64),
}

/// Live market prices. The only call in the valuation pipeline that may block.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn fetch_quote(&self, ticker: &str) -> Result<Quote, PriceFeedError>;
}
