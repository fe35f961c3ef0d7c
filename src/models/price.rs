use std::collections::HashMap;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

// Prices known at valuation time. A ticker absent from `current` is
// unavailable, never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceBook {
    pub current: HashMap<String, BigDecimal>,
    pub previous_close: HashMap<String, BigDecimal>,
    pub names: HashMap<String, String>,
}

impl PriceBook {
    pub fn with_price(mut self, ticker: &str, current: BigDecimal, previous_close: Option<BigDecimal>) -> Self {
        self.current.insert(ticker.to_string(), current);
        if let Some(close) = previous_close {
            self.previous_close.insert(ticker.to_string(), close);
        }
        self
    }
}
