#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use std::time::Duration;
use token_scout::api::{CandleProvider, HolderProvider, MarketDataProvider};
use token_scout::models::{CandleBar, CandleSeries, HolderStats, MarketSnapshot};
use token_scout::{Error, Result};

pub const MINT: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub fn snapshot() -> MarketSnapshot {
    MarketSnapshot {
        symbol: "BONK".to_string(),
        token_address: MINT.to_string(),
        pair_address: "pair".to_string(),
        chain_id: "solana".to_string(),
        dex_id: "raydium".to_string(),
        price_usd: Some(0.0012),
        volume_24h: 300_000.0,
        liquidity_usd: 100_000.0,
        buys_24h: 300,
        sells_24h: 200,
        price_change_1h: 2.0,
        price_change_6h: 5.0,
        price_change_24h: 10.0,
        valuation_usd: 1_200_000.0,
        pair_created_at: Some(now() - ChronoDuration::hours(48)),
    }
}

pub fn rising_candles(len: usize) -> CandleSeries {
    let start = Utc.with_ymd_and_hms(2024, 2, 20, 0, 0, 0).unwrap();
    let bars = (0..len)
        .map(|i| {
            let close = 1.0 + i as f64 * 0.02;
            CandleBar {
                timestamp: start + ChronoDuration::minutes(15 * i as i64),
                open: close,
                high: close * 1.001,
                low: close * 0.999,
                close,
                volume: 500.0,
            }
        })
        .collect();
    CandleSeries::from_unordered(bars)
}

/// Market provider answering from a fixed snapshot after an optional delay.
pub struct StubMarket {
    pub snapshot: Option<MarketSnapshot>,
    pub delay: Duration,
}

impl StubMarket {
    pub fn found(snapshot: MarketSnapshot) -> Self {
        Self { snapshot: Some(snapshot), delay: Duration::ZERO }
    }

    pub fn missing() -> Self {
        Self { snapshot: None, delay: Duration::ZERO }
    }
}

#[async_trait]
impl MarketDataProvider for StubMarket {
    async fn fetch_snapshot(&self, _token: &str) -> Result<Option<MarketSnapshot>> {
        tokio::time::sleep(self.delay).await;
        Ok(self.snapshot.clone())
    }
}

pub struct StubCandles {
    pub series: Option<CandleSeries>,
    pub delay: Duration,
    pub fail: bool,
}

#[async_trait]
impl CandleProvider for StubCandles {
    async fn fetch_candles(&self, _token: &str, _chain: &str) -> Result<Option<CandleSeries>> {
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(Error::ApiError("Birdeye request failed with status: 500".into()));
        }
        Ok(self.series.clone())
    }
}

pub struct StubHolders {
    pub top10_pct: Option<f64>,
    pub delay: Duration,
}

#[async_trait]
impl HolderProvider for StubHolders {
    fn supports_chain(&self, chain: &str) -> bool {
        chain == "solana"
    }

    async fn fetch_holder_stats(&self, _token: &str) -> Result<Option<HolderStats>> {
        tokio::time::sleep(self.delay).await;
        Ok(Some(HolderStats { top10_pct: self.top10_pct }))
    }
}
