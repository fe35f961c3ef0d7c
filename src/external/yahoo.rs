use crate::external::price_feed::{PriceFeed, PriceFeedError, Quote};
use async_trait::async_trait;
use bigdecimal::{BigDecimal, FromPrimitive};
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

pub struct YahooPriceFeed {
    client: reqwest::Client,
    base_url: String,
}

impl YahooPriceFeed {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for YahooPriceFeed {
    fn default() -> Self {
        Self::new()
    }
}

// Minimal response structs (only what we need)
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    meta: YahooMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooMeta {
    regular_market_price: Option<f64>,
    chart_previous_close: Option<f64>,
    previous_close: Option<f64>,
    long_name: Option<String>,
    short_name: Option<String>,
}

fn to_decimal(value: f64) -> Result<BigDecimal, PriceFeedError> {
    BigDecimal::from_f64(value).ok_or_else(|| PriceFeedError::Parse(format!("invalid price {}", value)))
}

fn quote_from_meta(ticker: &str, meta: YahooMeta) -> Result<Quote, PriceFeedError> {
    let current = meta
        .regular_market_price
        .ok_or_else(|| PriceFeedError::BadResponse("missing regularMarketPrice".into()))?;
    let previous_close = meta
        .chart_previous_close
        .or(meta.previous_close)
        .map(to_decimal)
        .transpose()?;

    Ok(Quote {
        ticker: ticker.to_string(),
        name: meta.long_name.or(meta.short_name),
        current_price: to_decimal(current)?,
        previous_close,
    })
}

#[async_trait]
impl PriceFeed for YahooPriceFeed {
    async fn fetch_quote(&self, ticker: &str) -> Result<Quote, PriceFeedError> {
        let url = format!("{}/v8/finance/chart/{}?range=5d&interval=1d", self.base_url, ticker);

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PriceFeedError::Network(e.to_string()))?;

        match resp.status() {
            reqwest::StatusCode::TOO_MANY_REQUESTS => return Err(PriceFeedError::RateLimited),
            reqwest::StatusCode::NOT_FOUND => return Err(PriceFeedError::NotFound(ticker.to_string())),
            status if !status.is_success() => {
                return Err(PriceFeedError::BadResponse(format!("HTTP {}", status)));
            }
            _ => {}
        }

        let body = resp
            .json::<YahooChartResponse>()
            .await
            .map_err(|e| PriceFeedError::Parse(e.to_string()))?;

        let result = body
            .chart
            .result
            .and_then(|mut r| r.pop())
            .ok_or_else(|| PriceFeedError::NotFound(ticker.to_string()))?;

        quote_from_meta(ticker, result.meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_chart_meta() {
        let json = r#"{
            "chart": {
                "result": [{
                    "meta": {
                        "symbol": "AAPL",
                        "regularMarketPrice": 187.5,
                        "chartPreviousClose": 185.25,
                        "longName": "Apple Inc."
                    },
                    "timestamp": [1700000000]
                }],
                "error": null
            }
        }"#;

        let body: YahooChartResponse = serde_json::from_str(json).unwrap();
        let meta = body.chart.result.unwrap().pop().unwrap().meta;
        let quote = quote_from_meta("AAPL", meta).unwrap();

        assert_eq!(quote.current_price, BigDecimal::from_f64(187.5).unwrap());
        assert_eq!(quote.previous_close, BigDecimal::from_f64(185.25));
        assert_eq!(quote.name.as_deref(), Some("Apple Inc."));
    }

    #[test]
    fn test_missing_price_is_bad_response() {
        let meta = YahooMeta {
            regular_market_price: None,
            chart_previous_close: Some(1.0),
            previous_close: None,
            long_name: None,
            short_name: Some("X".into()),
        };
        assert!(matches!(quote_from_meta("X", meta), Err(PriceFeedError::BadResponse(_))));
    }
}
