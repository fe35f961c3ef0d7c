use std::collections::BTreeMap;

use bigdecimal::{BigDecimal, Zero};

use crate::models::{Category, Holding, PortfolioSummary, PortfolioValuation, PriceBook, ValuedHolding};

/// Decimal places kept on `share_of_total` percentages.
pub const SHARE_SCALE: i64 = 4;

/// Combines replayed holdings with live prices.
///
/// Holdings without a current price keep their quantity and cost but every
/// price-derived figure is `None`, and they contribute nothing to the totals.
/// `todays_revenue` only counts holdings that also have a previous close.
pub fn value_portfolio(holdings: &BTreeMap<String, Holding>, prices: &PriceBook, skipped_records: usize) -> PortfolioValuation {
    let mut summary = PortfolioSummary::default();
    let mut unavailable = Vec::new();
    let mut valued = Vec::with_capacity(holdings.len());

    for holding in holdings.values() {
        let current_price = prices.current.get(&holding.ticker).cloned();
        let previous_close = prices.previous_close.get(&holding.ticker).cloned();

        let current_value = current_price.as_ref().map(|p| p * &holding.quantity);
        let profit_loss = current_price
            .as_ref()
            .map(|p| &(p - &holding.avg_cost) * &holding.quantity);
        let todays_profit = match (&current_price, &previous_close) {
            (Some(current), Some(close)) => Some(&(current - close) * &holding.quantity),
            _ => None,
        };

        match (&current_value, &profit_loss) {
            (Some(value), Some(pl)) => {
                summary.total_assets += value;
                summary.total_revenue += pl;
            }
            _ => unavailable.push(holding.ticker.clone()),
        }
        if let Some(today) = &todays_profit {
            summary.todays_revenue += today;
        }

        valued.push(ValuedHolding {
            ticker: holding.ticker.clone(),
            name: prices
                .names
                .get(&holding.ticker)
                .cloned()
                .unwrap_or_else(|| holding.ticker.clone()),
            quantity: holding.quantity.clone(),
            avg_cost: holding.avg_cost.clone(),
            category: Category::from_profit_loss(profit_loss.as_ref()),
            current_price,
            previous_close,
            current_value,
            profit_loss,
            todays_profit,
            share_of_total: None,
        });
    }

    for holding in &mut valued {
        holding.share_of_total = holding
            .current_value
            .as_ref()
            .map(|value| share_of_total(value, &summary.total_assets));
    }

    PortfolioValuation {
        holdings: valued,
        summary,
        unavailable,
        skipped_records,
    }
}

/// Percentage of `total` held in `value`; zero when the total is zero.
pub fn share_of_total(value: &BigDecimal, total: &BigDecimal) -> BigDecimal {
    if total.is_zero() {
        return BigDecimal::zero();
    }
    let scaled = value * &BigDecimal::from(100);
    (&scaled / total).round(SHARE_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn holding(ticker: &str, qty: &str, avg: &str) -> (String, Holding) {
        (
            ticker.to_string(),
            Holding {
                ticker: ticker.to_string(),
                quantity: dec(qty),
                avg_cost: dec(avg),
            },
        )
    }

    #[test]
    fn test_value_single_holding() {
        let holdings: BTreeMap<_, _> = [holding("AAPL", "15", "150")].into_iter().collect();
        let prices = PriceBook::default().with_price("AAPL", dec("300"), Some(dec("290")));

        let valuation = value_portfolio(&holdings, &prices, 0);
        let aapl = &valuation.holdings[0];

        assert_eq!(aapl.current_value, Some(dec("4500")));
        assert_eq!(aapl.profit_loss, Some(dec("2250")));
        assert_eq!(aapl.todays_profit, Some(dec("150")));
        assert_eq!(aapl.share_of_total, Some(dec("100")));
        assert_eq!(aapl.category, Category::Gainer);
        assert_eq!(aapl.name, "AAPL");
        assert_eq!(valuation.summary.total_assets, dec("4500"));
        assert_eq!(valuation.summary.total_revenue, dec("2250"));
        assert_eq!(valuation.summary.todays_revenue, dec("150"));
    }

    #[test]
    fn test_missing_price_is_unavailable_not_zero() {
        let holdings: BTreeMap<_, _> = [holding("AAPL", "10", "100"), holding("XYZ", "5", "20")]
            .into_iter()
            .collect();
        let prices = PriceBook::default().with_price("AAPL", dec("110"), None);

        let valuation = value_portfolio(&holdings, &prices, 0);
        let xyz = valuation.holdings.iter().find(|h| h.ticker == "XYZ").unwrap();

        assert_eq!(xyz.current_value, None);
        assert_eq!(xyz.profit_loss, None);
        assert_eq!(xyz.share_of_total, None);
        assert_eq!(xyz.category, Category::Flat);
        assert_eq!(valuation.unavailable, vec!["XYZ".to_string()]);
        assert_eq!(valuation.summary.total_assets, dec("1100"));
        assert_eq!(valuation.summary.total_revenue, dec("100"));
        // No previous close for AAPL, so nothing counts toward today.
        assert_eq!(valuation.summary.todays_revenue, BigDecimal::zero());
    }

    #[test]
    fn test_classification_by_profit_sign() {
        let holdings: BTreeMap<_, _> = [
            holding("UP", "1", "10"),
            holding("DOWN", "1", "10"),
            holding("SAME", "1", "10"),
        ]
        .into_iter()
        .collect();
        let prices = PriceBook::default()
            .with_price("UP", dec("11"), None)
            .with_price("DOWN", dec("9"), None)
            .with_price("SAME", dec("10"), None);

        let valuation = value_portfolio(&holdings, &prices, 0);
        let category = |t: &str| valuation.holdings.iter().find(|h| h.ticker == t).unwrap().category;

        assert_eq!(category("UP"), Category::Gainer);
        assert_eq!(category("DOWN"), Category::Decliner);
        assert_eq!(category("SAME"), Category::Flat);
    }

    #[test]
    fn test_share_of_total_with_zero_assets() {
        let holdings: BTreeMap<_, _> = [holding("PENNY", "100", "0.5")].into_iter().collect();
        let prices = PriceBook::default().with_price("PENNY", BigDecimal::zero(), None);

        let valuation = value_portfolio(&holdings, &prices, 0);
        assert_eq!(valuation.holdings[0].share_of_total, Some(BigDecimal::zero()));
        assert_eq!(valuation.summary.total_assets, BigDecimal::zero());
    }

    #[test]
    fn test_shares_split_total() {
        let holdings: BTreeMap<_, _> = [holding("A", "1", "1"), holding("B", "3", "1")].into_iter().collect();
        let prices = PriceBook::default()
            .with_price("A", dec("10"), None)
            .with_price("B", dec("10"), None);

        let valuation = value_portfolio(&holdings, &prices, 0);
        assert_eq!(valuation.holdings[0].share_of_total, Some(dec("25")));
        assert_eq!(valuation.holdings[1].share_of_total, Some(dec("75")));
    }

    #[test]
    fn test_empty_portfolio_has_zero_summary() {
        let valuation = value_portfolio(&BTreeMap::new(), &PriceBook::default(), 2);

        assert!(valuation.holdings.is_empty());
        assert_eq!(valuation.summary, PortfolioSummary::default());
        assert_eq!(valuation.skipped_records, 2);
    }
}
