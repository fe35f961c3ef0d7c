use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// Cumulative net cash invested as of the end of a calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentPoint {
    pub date: NaiveDate,
    pub cumulative_invested: BigDecimal,
}
