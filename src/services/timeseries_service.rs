use bigdecimal::{BigDecimal, Zero};

use crate::models::{InvestmentPoint, Transaction, TransactionType};

/// Running net cash invested, one point per calendar day (UTC) that has
/// activity. Buys add price × quantity, sells subtract it; each point holds
/// the total after the day's last transaction. Days without activity are
/// not filled in.
///
/// Expects the ordering produced by `ledger_service::sort_ledger`.
pub fn investment_series(transactions: &[Transaction]) -> Vec<InvestmentPoint> {
    let mut series: Vec<InvestmentPoint> = Vec::new();
    let mut invested = BigDecimal::zero();

    for tx in transactions {
        match tx.transaction_type {
            TransactionType::Buy => invested += tx.amount(),
            TransactionType::Sell => invested -= tx.amount(),
        }

        let date = tx.timestamp.date_naive();
        match series.last_mut() {
            Some(point) if point.date == date => point.cumulative_invested = invested.clone(),
            _ => series.push(InvestmentPoint {
                date,
                cumulative_invested: invested.clone(),
            }),
        }
    }

    series
}
