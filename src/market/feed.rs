//! Quote feed: where market and stock data come from.
//!
//! The session loop only sees the [`Feed`] trait. [`HttpFeed`] talks to a
//! Yahoo-style `v7/finance/quote` endpoint via reqwest; tests plug in fakes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{market_symbols, IndexQuote, MarketSnapshot, Quote};

/// Upper bound on a single fetch. The loop is blocked while a fetch runs.
const FETCH_TIMEOUT: Duration = Duration::from_secs(4);

const USER_AGENT: &str = "Mozilla/5.0 (compatible; marketdeck)";

/// Errors from quote fetching.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Source of market and quote data.
#[async_trait]
pub trait Feed: Send + Sync {
    /// Fetch the market header (indices, currencies, commodities).
    async fn market(&self) -> Result<MarketSnapshot, FeedError>;

    /// Fetch quotes for `tickers`. Unknown tickers are simply absent.
    async fn quotes(&self, tickers: &[String]) -> Result<Vec<Quote>, FeedError>;
}

/// HTTP feed against a Yahoo-compatible quote API.
#[derive(Debug, Clone)]
pub struct HttpFeed {
    http: Client,
    base_url: String,
}

impl HttpFeed {
    pub fn new(base_url: impl Into<String>) -> Result<Self, FeedError> {
        let http = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    async fn fetch(&self, symbols: &[&str]) -> Result<Vec<RawQuote>, FeedError> {
        let url = format!("{}/v7/finance/quote", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("symbols", symbols.join(","))])
            .send()
            .await?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.text().await.unwrap_or_else(|_| "(no body)".into());
            return Err(FeedError::Status {
                status,
                message: body,
            });
        }

        let body = response.text().await?;
        let quotes = parse_quote_response(&body)?;
        debug!(requested = symbols.len(), received = quotes.len(), "fetched quotes");
        Ok(quotes)
    }
}

#[async_trait]
impl Feed for HttpFeed {
    async fn market(&self) -> Result<MarketSnapshot, FeedError> {
        let symbols: Vec<&str> = market_symbols().map(|(_, s)| s).collect();
        let raw = self.fetch(&symbols).await?;
        Ok(market_from_raw(&raw))
    }

    async fn quotes(&self, tickers: &[String]) -> Result<Vec<Quote>, FeedError> {
        if tickers.is_empty() {
            return Ok(Vec::new());
        }
        let symbols: Vec<&str> = tickers.iter().map(String::as_str).collect();
        let raw = self.fetch(&symbols).await?;
        Ok(raw.into_iter().map(Quote::from).collect())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteEnvelope {
    quote_response: QuoteResponse,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    result: Vec<RawQuote>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// One entry of the upstream `result` array. Every numeric field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuote {
    symbol: String,
    #[serde(default)]
    market_state: Option<String>,
    regular_market_price: Option<f64>,
    regular_market_change: Option<f64>,
    regular_market_change_percent: Option<f64>,
    regular_market_open: Option<f64>,
    regular_market_day_low: Option<f64>,
    regular_market_day_high: Option<f64>,
    fifty_two_week_low: Option<f64>,
    fifty_two_week_high: Option<f64>,
    regular_market_volume: Option<f64>,
    average_daily_volume3_month: Option<f64>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<f64>,
    market_cap: Option<f64>,
}

impl From<RawQuote> for Quote {
    fn from(r: RawQuote) -> Self {
        Self {
            ticker: r.symbol,
            last: r.regular_market_price.unwrap_or_default(),
            change: r.regular_market_change.unwrap_or_default(),
            change_percent: r.regular_market_change_percent.unwrap_or_default(),
            open: r.regular_market_open.unwrap_or_default(),
            low: r.regular_market_day_low.unwrap_or_default(),
            high: r.regular_market_day_high.unwrap_or_default(),
            low_52: r.fifty_two_week_low.unwrap_or_default(),
            high_52: r.fifty_two_week_high.unwrap_or_default(),
            volume: r.regular_market_volume.unwrap_or_default(),
            avg_volume: r.average_daily_volume3_month.unwrap_or_default(),
            pe_ratio: r.trailing_pe.unwrap_or_default(),
            market_cap: r.market_cap.unwrap_or_default(),
        }
    }
}

fn parse_quote_response(body: &str) -> Result<Vec<RawQuote>, FeedError> {
    let envelope: QuoteEnvelope = serde_json::from_str(body)
        .map_err(|e| FeedError::InvalidResponse(format!("failed to parse quotes: {e}")))?;
    let response = envelope.quote_response;
    match response.error {
        Some(err) if !err.is_null() => Err(FeedError::InvalidResponse(err.to_string())),
        _ => Ok(response.result),
    }
}

/// Build the market header in display order. Missing symbols are skipped.
fn market_from_raw(raw: &[RawQuote]) -> MarketSnapshot {
    let indices = market_symbols()
        .filter_map(|(label, symbol)| {
            let r = raw.iter().find(|r| r.symbol == symbol)?;
            Some(IndexQuote {
                label,
                symbol,
                last: r.regular_market_price.unwrap_or_default(),
                change: r.regular_market_change.unwrap_or_default(),
                change_percent: r.regular_market_change_percent.unwrap_or_default(),
            })
        })
        .collect();

    let open = raw
        .iter()
        .find(|r| r.symbol == "^DJI")
        .and_then(|r| r.market_state.as_deref())
        == Some("REGULAR");

    MarketSnapshot { open, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "quoteResponse": {
            "result": [
                {
                    "symbol": "AAPL",
                    "marketState": "REGULAR",
                    "regularMarketPrice": 190.5,
                    "regularMarketChange": 1.25,
                    "regularMarketChangePercent": 0.66,
                    "regularMarketOpen": 189.0,
                    "regularMarketDayLow": 188.1,
                    "regularMarketDayHigh": 191.0,
                    "fiftyTwoWeekLow": 150.0,
                    "fiftyTwoWeekHigh": 200.0,
                    "regularMarketVolume": 51000000,
                    "averageDailyVolume3Month": 60000000,
                    "trailingPE": 29.4,
                    "marketCap": 2950000000000
                },
                { "symbol": "^DJI", "marketState": "CLOSED", "regularMarketPrice": 38000.0,
                  "regularMarketChange": -120.0, "regularMarketChangePercent": -0.31 },
                { "symbol": "GC=F", "regularMarketPrice": 2300.0 }
            ],
            "error": null
        }
    }"#;

    #[test]
    fn parses_quote_fields() {
        let raw = parse_quote_response(BODY).unwrap();
        assert_eq!(raw.len(), 3);
        let q = Quote::from(raw[0].clone());
        assert_eq!(q.ticker, "AAPL");
        assert_eq!(q.last, 190.5);
        assert_eq!(q.change, 1.25);
        assert_eq!(q.volume, 51_000_000.0);
        assert_eq!(q.pe_ratio, 29.4);
        assert_eq!(q.market_cap, 2_950_000_000_000.0);
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let raw = parse_quote_response(BODY).unwrap();
        let q = Quote::from(raw[2].clone());
        assert_eq!(q.last, 2300.0);
        assert_eq!(q.change, 0.0);
        assert_eq!(q.market_cap, 0.0);
    }

    #[test]
    fn market_snapshot_in_display_order() {
        let raw = parse_quote_response(BODY).unwrap();
        let market = market_from_raw(&raw);
        assert!(!market.open);
        let symbols: Vec<_> = market.indices.iter().map(|i| i.symbol).collect();
        assert_eq!(symbols, ["^DJI", "GC=F"]);
        assert_eq!(market.get("^DJI").unwrap().label, "Dow");
        assert_eq!(market.get("^DJI").unwrap().change, -120.0);
    }

    #[test]
    fn upstream_error_surfaces() {
        let body = r#"{"quoteResponse":{"result":[],"error":{"code":"Unauthorized"}}}"#;
        let err = parse_quote_response(body).unwrap_err();
        assert!(matches!(err, FeedError::InvalidResponse(ref m) if m.contains("Unauthorized")));
    }

    #[test]
    fn garbage_body_is_invalid_response() {
        assert!(matches!(
            parse_quote_response("<html>").unwrap_err(),
            FeedError::InvalidResponse(_)
        ));
    }

    #[tokio::test]
    async fn empty_ticker_list_skips_request() {
        // Unroutable base URL: any request would fail.
        let feed = HttpFeed::new("http://127.0.0.1:9").unwrap();
        assert!(feed.quotes(&[]).await.unwrap().is_empty());
    }
}
