use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

// Current position in one ticker, derived by replaying the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub ticker: String,
    pub quantity: BigDecimal,
    pub avg_cost: BigDecimal,
}

/// Sign of a holding's unrealized profit/loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Gainer,
    Decliner,
    Flat,
}

impl Category {
    pub fn from_profit_loss(profit_loss: Option<&BigDecimal>) -> Self {
        match profit_loss {
            Some(pl) if *pl > BigDecimal::zero() => Category::Gainer,
            Some(pl) if *pl < BigDecimal::zero() => Category::Decliner,
            _ => Category::Flat,
        }
    }
}

// A holding combined with live prices. Price-derived fields are None when
// the feed had no price for the ticker; clients render those as N/A.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuedHolding {
    pub ticker: String,
    pub name: String,
    pub quantity: BigDecimal,
    pub avg_cost: BigDecimal,
    pub current_price: Option<BigDecimal>,
    pub previous_close: Option<BigDecimal>,
    pub current_value: Option<BigDecimal>,
    pub profit_loss: Option<BigDecimal>,
    pub todays_profit: Option<BigDecimal>,
    pub share_of_total: Option<BigDecimal>,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_assets: BigDecimal,
    pub total_revenue: BigDecimal,
    pub todays_revenue: BigDecimal,
}

impl Default for PortfolioSummary {
    fn default() -> Self {
        Self {
            total_assets: BigDecimal::zero(),
            total_revenue: BigDecimal::zero(),
            todays_revenue: BigDecimal::zero(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioValuation {
    pub holdings: Vec<ValuedHolding>,
    pub summary: PortfolioSummary,
    /// Tickers the price feed could not price.
    pub unavailable: Vec<String>,
    pub skipped_records: usize,
}
