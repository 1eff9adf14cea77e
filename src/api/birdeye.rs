use crate::api::{check_status, http_client, lenient, CandleProvider};
use crate::error::{Error, Result};
use crate::models::{CandleBar, CandleSeries};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use log::{debug, error, info};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const PROVIDER: &str = "Birdeye";

#[derive(Debug, Deserialize)]
struct OhlcvResponse {
    #[serde(default)]
    data: Option<OhlcvData>,
}

/// Rows usually sit under `data.items`; some responses put them at `data`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OhlcvData {
    Items { items: Vec<OhlcvRow> },
    Rows(Vec<OhlcvRow>),
}

#[derive(Debug, Deserialize)]
struct OhlcvRow {
    /// Seconds since the epoch.
    #[serde(rename = "unixTime", alias = "startTime", alias = "t", default, deserialize_with = "lenient::i64_opt")]
    unix_time: Option<i64>,
    #[serde(alias = "open", default, deserialize_with = "lenient::f64_opt")]
    o: Option<f64>,
    #[serde(alias = "high", default, deserialize_with = "lenient::f64_opt")]
    h: Option<f64>,
    #[serde(alias = "low", default, deserialize_with = "lenient::f64_opt")]
    l: Option<f64>,
    #[serde(alias = "close", default, deserialize_with = "lenient::f64_opt")]
    c: Option<f64>,
    #[serde(alias = "volume", default, deserialize_with = "lenient::f64_opt")]
    v: Option<f64>,
}

impl OhlcvRow {
    fn into_bar(self) -> Option<CandleBar> {
        let timestamp = Utc.timestamp_opt(self.unix_time.filter(|t| *t > 0)?, 0).single()?;
        Some(CandleBar {
            timestamp,
            open: self.o?,
            high: self.h?,
            low: self.l?,
            close: self.c?,
            volume: self.v.unwrap_or(0.0),
        })
    }
}

fn series_from_body(body: &str) -> Result<Option<CandleSeries>> {
    let response: OhlcvResponse = serde_json::from_str(body).map_err(|e| {
        error!("Failed to parse {} response: {}", PROVIDER, e);
        Error::ApiInvalidFormat(format!("Failed to parse {} response: {}", PROVIDER, e))
    })?;
    let rows = match response.data {
        Some(OhlcvData::Items { items }) => items,
        Some(OhlcvData::Rows(rows)) => rows,
        None => return Ok(None),
    };
    let bars: Vec<CandleBar> = rows.into_iter().filter_map(OhlcvRow::into_bar).collect();
    if bars.is_empty() {
        return Ok(None);
    }
    Ok(Some(CandleSeries::from_unordered(bars)))
}

#[derive(Debug, Clone)]
pub struct BirdeyeClient {
    client: Client,
    base_url: String,
    api_key: String,
    interval: String,
    lookback_days: u32,
}

impl BirdeyeClient {
    pub fn new(base_url: &str, api_key: &str, interval: &str, lookback_days: u32, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            interval: interval.to_string(),
            lookback_days,
        })
    }
}

#[async_trait]
impl CandleProvider for BirdeyeClient {
    async fn fetch_candles(&self, token: &str, chain: &str) -> Result<Option<CandleSeries>> {
        let time_to = Utc::now();
        let time_from = time_to - ChronoDuration::days(i64::from(self.lookback_days));
        let chain = if chain.is_empty() { "solana".to_string() } else { chain.to_lowercase() };
        info!("Fetching {} candles for {} on {}", self.interval, token, chain);

        let response = self
            .client
            .get(format!("{}/defi/ohlcv", self.base_url))
            .query(&[
                ("address", token.to_string()),
                ("type", self.interval.clone()),
                ("time_from", time_from.timestamp().to_string()),
                ("time_to", time_to.timestamp().to_string()),
            ])
            .header("X-API-KEY", &self.api_key)
            .header("x-chain", chain)
            .send()
            .await?;
        check_status(PROVIDER, response.status())?;

        let series = series_from_body(&response.text().await?)?;
        debug!("{} returned {} bars", PROVIDER, series.as_ref().map_or(0, CandleSeries::len));
        Ok(series)
    }
}
