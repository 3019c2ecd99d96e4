//! Chart API client
//!
//! HTTP client for the public v8 chart endpoint (daily and intraday OHLCV).

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::MarketDataProvider;
use crate::config::InstrumentProfile;
use crate::types::Bar;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

/// Chart API client
pub struct ChartApiClient {
    client: Client,
    base_url: String,
}

impl ChartApiClient {
    /// Create a client, reading `CHART_API_BASE_URL` if set
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("CHART_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    pub fn new(base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("level-stats/0.1")
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client, base_url })
    }

    async fn fetch(&self, ticker: &str, range: &str, interval: &str) -> Result<Vec<Bar>> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);
        debug!("GET {} range={} interval={}", url, range, interval);

        let response = self
            .client
            .get(&url)
            .query(&[("range", range), ("interval", interval)])
            .send()
            .await
            .with_context(|| format!("Failed to request chart for {}", ticker))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Chart request for {} failed with status {}: {}",
                ticker,
                status,
                body
            ));
        }

        let envelope: ChartEnvelope = response
            .json()
            .await
            .with_context(|| format!("Failed to parse chart response for {}", ticker))?;

        parse_chart(envelope, ticker)
    }
}

fn parse_chart(envelope: ChartEnvelope, ticker: &str) -> Result<Vec<Bar>> {
    if let Some(err) = envelope.chart.error {
        return Err(anyhow!("Chart error for {}: {} ({})", ticker, err.description, err.code));
    }

    let result = envelope
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
        .ok_or_else(|| anyhow!("Empty chart result for {}", ticker))?;

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let bars = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            let timestamp = DateTime::<Utc>::from_timestamp(*ts, 0)?;
            Some(Bar {
                timestamp,
                open: (*quote.open.get(i)?)?,
                high: (*quote.high.get(i)?)?,
                low: (*quote.low.get(i)?)?,
                close: (*quote.close.get(i)?)?,
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
            })
        })
        .collect();

    Ok(bars)
}

#[async_trait]
impl MarketDataProvider for ChartApiClient {
    async fn daily_bars(
        &self,
        instrument: &InstrumentProfile,
        lookback_days: u32,
    ) -> Result<Vec<Bar>> {
        self.fetch(&instrument.data_ticker, &format!("{}d", lookback_days), "1d").await
    }

    async fn intraday_bars(
        &self,
        instrument: &InstrumentProfile,
        lookback_days: u32,
        interval_minutes: u32,
    ) -> Result<Vec<Bar>> {
        self.fetch(
            &instrument.data_ticker,
            &format!("{}d", lookback_days),
            &format!("{}m", interval_minutes),
        )
        .await
    }
}
