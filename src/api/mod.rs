//! Market data, candle and holder providers.
//!
//! The traits are the seams the evaluator depends on; the HTTP clients in the
//! submodules are the production implementations.

use crate::error::{Error, Result};
use crate::models::{CandleSeries, HolderStats, MarketSnapshot};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod birdeye;
pub mod dexscreener;
pub mod solana_holders;

pub use birdeye::BirdeyeClient;
pub use dexscreener::DexScreenerClient;
pub use solana_holders::SolanaHolderClient;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// `Ok(None)` when no market trades the token.
    async fn fetch_snapshot(&self, token: &str) -> Result<Option<MarketSnapshot>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CandleProvider: Send + Sync {
    async fn fetch_candles(&self, token: &str, chain: &str) -> Result<Option<CandleSeries>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HolderProvider: Send + Sync {
    fn supports_chain(&self, chain: &str) -> bool;

    async fn fetch_holder_stats(&self, token: &str) -> Result<Option<HolderStats>>;
}

/// Outcome of an optional data fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Enrichment<T> {
    Present(T),
    Absent,
    Failed(String),
}

impl<T> Enrichment<T> {
    pub fn from_result(result: Result<Option<T>>) -> Self {
        match result {
            Ok(Some(value)) => Enrichment::Present(value),
            Ok(None) => Enrichment::Absent,
            Err(e) => Enrichment::Failed(e.to_string()),
        }
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Enrichment::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn status(&self) -> EnrichmentStatus {
        match self {
            Enrichment::Present(_) => EnrichmentStatus::Present,
            Enrichment::Absent => EnrichmentStatus::Absent,
            Enrichment::Failed(reason) => EnrichmentStatus::Failed { reason: reason.clone() },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum EnrichmentStatus {
    Present,
    Absent,
    Failed { reason: String },
}

pub(crate) fn http_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Maps a non-success HTTP status onto the crate error for `provider`.
pub(crate) fn check_status(provider: &str, status: StatusCode) -> Result<()> {
    match status {
        status if status.is_success() => Ok(()),
        StatusCode::TOO_MANY_REQUESTS => Err(Error::RateLimitExceeded(format!("{} rate limit exceeded", provider))),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(Error::ApiAuthFailed(format!("{} rejected the API key ({})", provider, status)))
        }
        status => Err(Error::ApiError(format!("{} request failed with status: {}", provider, status))),
    }
}

/// Field readers for loosely typed provider payloads. A value of the wrong
/// type reads as absent instead of failing the whole response.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn number(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|n| n.is_finite())
    }

    /// Numbers and numeric strings; anything else is `None`.
    pub fn f64_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(number(&Value::deserialize(deserializer)?))
    }

    /// Non-negative counts, truncating floats.
    pub fn u64_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(number(&Value::deserialize(deserializer)?)
            .filter(|n| *n >= 0.0)
            .map(|n| n as u64))
    }

    pub fn i64_opt<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(number(&Value::deserialize(deserializer)?).map(|n| n as i64))
    }

    /// Strings as-is; null or any other type reads as empty.
    pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => s,
            _ => String::new(),
        })
    }
}
