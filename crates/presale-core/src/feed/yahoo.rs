use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use super::{FeedError, PriceFeed};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::{PriceQuote, Symbol, UtcDateTime};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Yahoo Finance chart endpoint (`/v8/finance/chart/{symbol}`).
///
/// Only `meta` and the latest daily candle are read: current price falls back
/// to the previous close when the market price is missing, and the previous
/// close prefers the chart's own reference close.
#[derive(Clone)]
pub struct YahooChartFeed {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    proxy_prefix: Option<String>,
    timeout_ms: u64,
}

impl Default for YahooChartFeed {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestHttpClient::new()))
    }
}

impl YahooChartFeed {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: String::from(DEFAULT_BASE_URL),
            proxy_prefix: None,
            timeout_ms: 10_000,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Route requests through a pass-through proxy that takes the encoded
    /// target URL as a suffix, e.g. `https://corsproxy.io/?`.
    pub fn with_proxy_prefix(mut self, prefix: Option<String>) -> Self {
        self.proxy_prefix = prefix.filter(|value| !value.trim().is_empty());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn endpoint(&self, symbol: &Symbol) -> String {
        let url = format!(
            "{}/v8/finance/chart/{}?interval=1d&range=5d",
            self.base_url,
            urlencoding::encode(symbol.as_str())
        );

        match &self.proxy_prefix {
            Some(prefix) => format!("{prefix}{}", urlencoding::encode(&url)),
            None => url,
        }
    }

    async fn fetch(&self, symbol: &Symbol) -> Result<PriceQuote, FeedError> {
        let endpoint = self.endpoint(symbol);
        tracing::debug!(%symbol, %endpoint, "fetching yahoo chart");

        let request = HttpRequest::get(endpoint)
            .with_header("referer", "https://finance.yahoo.com/")
            .with_timeout_ms(self.timeout_ms);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| FeedError::unavailable(format!("yahoo transport error: {}", e.message())))?;

        if response.status == 429 {
            return Err(FeedError::rate_limited("yahoo returned status 429"));
        }
        if !response.is_success() {
            return Err(FeedError::unavailable(format!(
                "yahoo returned status {}",
                response.status
            )));
        }

        parse_chart_response(symbol, &response.body)
    }
}

impl PriceFeed for YahooChartFeed {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    fn fetch_quote<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<PriceQuote, FeedError>> + Send + 'a>> {
        Box::pin(self.fetch(symbol))
    }
}

fn parse_chart_response(symbol: &Symbol, body: &str) -> Result<PriceQuote, FeedError> {
    let chart_response: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| FeedError::malformed(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = &chart_response.chart.error {
        return Err(FeedError::unavailable(format!(
            "yahoo chart API error: {}",
            error.describe()
        )));
    }

    let result = chart_response
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| FeedError::malformed("no chart data in response"))?;

    let meta = &result.meta;
    let current_price = positive(meta.regular_market_price)
        .or(positive(meta.previous_close))
        .ok_or_else(|| FeedError::malformed(format!("no current price for {symbol}")))?;
    let previous_close = positive(meta.chart_previous_close)
        .or(positive(meta.previous_close))
        .ok_or_else(|| FeedError::malformed(format!("no previous close for {symbol}")))?;

    let as_of = meta
        .regular_market_time
        .and_then(|ts| UtcDateTime::from_unix_timestamp(ts).ok())
        .unwrap_or_else(UtcDateTime::now);

    let (high, low, close) = result
        .indicators
        .and_then(|indicators| indicators.quote.into_iter().next())
        .map(|candles| candles.latest())
        .unwrap_or((None, None, None));

    PriceQuote::new(symbol.clone(), current_price, previous_close, as_of)
        .and_then(|quote| quote.with_session(high, low, close))
        .map_err(|e| FeedError::malformed(e.to_string()))
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

// Yahoo Finance chart response structures
#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl YahooChartError {
    fn describe(&self) -> String {
        match (&self.code, &self.description) {
            (Some(code), Some(description)) => format!("{code}: {description}"),
            (Some(code), None) => code.clone(),
            (None, Some(description)) => description.clone(),
            (None, None) => String::from("unknown error"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    meta: YahooChartMeta,
    #[serde(default)]
    indicators: Option<YahooChartIndicators>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartMeta {
    #[serde(rename = "regularMarketPrice", default)]
    regular_market_price: Option<f64>,
    #[serde(rename = "previousClose", default)]
    previous_close: Option<f64>,
    #[serde(rename = "chartPreviousClose", default)]
    chart_previous_close: Option<f64>,
    #[serde(rename = "regularMarketTime", default)]
    regular_market_time: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartCandles>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartCandles {
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

impl YahooChartCandles {
    /// High, low and close of the last candle in the series.
    fn latest(&self) -> (Option<f64>, Option<f64>, Option<f64>) {
        let Some(last) = self.close.len().checked_sub(1) else {
            return (None, None, None);
        };
        let at = |series: &Vec<Option<f64>>| series.get(last).copied().flatten();
        (at(&self.high), at(&self.low), at(&self.close))
    }
}
