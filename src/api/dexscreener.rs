use crate::api::{check_status, http_client, lenient, MarketDataProvider};
use crate::error::{Error, Result};
use crate::models::MarketSnapshot;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use log::{debug, error, info};
use reqwest::Client;
use serde::Deserialize;
use std::cmp::Ordering;
use std::time::Duration;

const PROVIDER: &str = "DexScreener";

#[derive(Debug, Deserialize)]
struct TokenPairsResponse {
    #[serde(default)]
    pairs: Option<Vec<DexPair>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct DexPair {
    #[serde(deserialize_with = "lenient::string")]
    chain_id: String,
    #[serde(deserialize_with = "lenient::string")]
    dex_id: String,
    #[serde(deserialize_with = "lenient::string")]
    pair_address: String,
    base_token: Option<BaseToken>,
    #[serde(deserialize_with = "lenient::f64_opt")]
    price_usd: Option<f64>,
    txns: Option<Transactions>,
    volume: Option<Windowed>,
    price_change: Option<Windowed>,
    liquidity: Option<Liquidity>,
    #[serde(deserialize_with = "lenient::f64_opt")]
    fdv: Option<f64>,
    #[serde(deserialize_with = "lenient::f64_opt")]
    market_cap: Option<f64>,
    /// Milliseconds since the epoch.
    #[serde(deserialize_with = "lenient::i64_opt")]
    pair_created_at: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct BaseToken {
    #[serde(deserialize_with = "lenient::string")]
    address: String,
    #[serde(deserialize_with = "lenient::string")]
    symbol: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct Transactions {
    h24: Option<TransactionCount>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct TransactionCount {
    #[serde(deserialize_with = "lenient::u64_opt")]
    buys: Option<u64>,
    #[serde(deserialize_with = "lenient::u64_opt")]
    sells: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct Windowed {
    #[serde(deserialize_with = "lenient::f64_opt")]
    h1: Option<f64>,
    #[serde(deserialize_with = "lenient::f64_opt")]
    h6: Option<f64>,
    #[serde(deserialize_with = "lenient::f64_opt")]
    h24: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct Liquidity {
    #[serde(deserialize_with = "lenient::f64_opt")]
    usd: Option<f64>,
}

impl DexPair {
    fn liquidity_usd(&self) -> f64 {
        self.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0)
    }

    fn volume_24h(&self) -> f64 {
        self.volume.as_ref().and_then(|v| v.h24).unwrap_or(0.0)
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.pair_created_at.and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }

    fn into_snapshot(self, requested: &str) -> MarketSnapshot {
        let change = self.price_change.clone().unwrap_or_default();
        let trades = self.txns.as_ref().and_then(|t| t.h24.clone()).unwrap_or_default();
        let base = self.base_token.clone().unwrap_or_default();
        let token_address = if base.address.is_empty() {
            requested.to_string()
        } else {
            base.address
        };

        MarketSnapshot {
            symbol: base.symbol.to_uppercase(),
            token_address,
            pair_address: self.pair_address.clone(),
            chain_id: self.chain_id.clone(),
            dex_id: self.dex_id.clone(),
            price_usd: self.price_usd,
            volume_24h: self.volume_24h(),
            liquidity_usd: self.liquidity_usd(),
            buys_24h: trades.buys.unwrap_or(0),
            sells_24h: trades.sells.unwrap_or(0),
            price_change_1h: change.h1.unwrap_or(0.0),
            price_change_6h: change.h6.unwrap_or(0.0),
            price_change_24h: change.h24.unwrap_or(0.0),
            valuation_usd: self.fdv.or(self.market_cap).unwrap_or(0.0),
            pair_created_at: self.created_at(),
        }
    }
}

/// Deepest pool first; 24h volume breaks ties, then provider order.
fn pick_best_pair(pairs: Vec<DexPair>) -> Option<DexPair> {
    pairs.into_iter().min_by(|a, b| {
        b.liquidity_usd()
            .partial_cmp(&a.liquidity_usd())
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.volume_24h().partial_cmp(&a.volume_24h()).unwrap_or(Ordering::Equal))
    })
}

fn snapshot_from_body(body: &str, token: &str) -> Result<Option<MarketSnapshot>> {
    let response: TokenPairsResponse = serde_json::from_str(body).map_err(|e| {
        error!("Failed to parse {} response: {}", PROVIDER, e);
        Error::ApiInvalidFormat(format!("Failed to parse {} response: {}", PROVIDER, e))
    })?;
    let pairs = response.pairs.unwrap_or_default();
    debug!("{} returned {} pairs for {}", PROVIDER, pairs.len(), token);
    Ok(pick_best_pair(pairs).map(|pair| pair.into_snapshot(token)))
}

#[derive(Debug, Clone)]
pub struct DexScreenerClient {
    client: Client,
    base_url: String,
}

impl DexScreenerClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MarketDataProvider for DexScreenerClient {
    async fn fetch_snapshot(&self, token: &str) -> Result<Option<MarketSnapshot>> {
        let url = format!("{}/latest/dex/tokens/{}", self.base_url, token);
        info!("Fetching market data for {}", token);

        let response = self.client.get(&url).send().await?;
        check_status(PROVIDER, response.status())?;
        let body = response.text().await?;
        snapshot_from_body(&body, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "schemaVersion": "1.0.0",
        "pairs": [
            {
                "chainId": "solana",
                "dexId": "orca",
                "pairAddress": "shallow",
                "baseToken": {"address": "Mint111", "name": "Bonk", "symbol": "bonk"},
                "priceUsd": "0.0011",
                "liquidity": {"usd": 5000},
                "volume": {"h24": 900000}
            },
            {
                "chainId": "solana",
                "dexId": "raydium",
                "pairAddress": "deep",
                "baseToken": {"address": "Mint111", "name": "Bonk", "symbol": "bonk"},
                "priceUsd": "0.0012",
                "txns": {"h24": {"buys": 300, "sells": 200}},
                "volume": {"h24": 300000, "h6": 80000},
                "priceChange": {"h1": 2, "h6": 5.5, "h24": -10},
                "liquidity": {"usd": 100000, "base": 1, "quote": 2},
                "marketCap": 1100000,
                "pairCreatedAt": 1709121600000
            }
        ]
    }"#;

    #[test]
    fn test_picks_deepest_pair() {
        let snapshot = snapshot_from_body(BODY, "Mint111").unwrap().unwrap();
        assert_eq!(snapshot.pair_address, "deep");
        assert_eq!(snapshot.symbol, "BONK");
        assert_eq!(snapshot.price_usd, Some(0.0012));
        assert_eq!(snapshot.trades_24h(), 500);
        assert_eq!(snapshot.price_change_6h, 5.5);
        assert_eq!(snapshot.price_change_24h, -10.0);
        // No fdv: market cap stands in.
        assert_eq!(snapshot.valuation_usd, 1_100_000.0);
        assert_eq!(snapshot.pair_created_at, Utc.timestamp_millis_opt(1_709_121_600_000).single());
    }

    #[test]
    fn test_liquidity_tie_broken_by_volume() {
        let pair = |name: &str, volume: f64| DexPair {
            pair_address: name.to_string(),
            liquidity: Some(Liquidity { usd: Some(10.0) }),
            volume: Some(Windowed { h24: Some(volume), ..Default::default() }),
            ..Default::default()
        };
        let best = pick_best_pair(vec![pair("a", 1.0), pair("b", 5.0), pair("c", 2.0)]).unwrap();
        assert_eq!(best.pair_address, "b");
    }

    #[test]
    fn test_no_pairs_is_none() {
        assert_eq!(snapshot_from_body(r#"{"schemaVersion":"1.0.0","pairs":null}"#, "x").unwrap(), None);
        assert_eq!(snapshot_from_body(r#"{"pairs":[]}"#, "x").unwrap(), None);
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let snapshot = snapshot_from_body(r#"{"pairs":[{"chainId":"base"}]}"#, "0xabc").unwrap().unwrap();
        assert_eq!(snapshot.token_address, "0xabc");
        assert_eq!(snapshot.price_usd, None);
        assert_eq!(snapshot.valuation_usd, 0.0);
        assert_eq!(snapshot.pair_created_at, None);
    }

    #[test]
    fn test_wrong_typed_fields_read_as_absent() {
        let body = r#"{"pairs": [
            {
                "chainId": "solana",
                "dexId": "orca",
                "pairAddress": "shallow",
                "baseToken": {"address": "Mint111", "symbol": null},
                "liquidity": {"usd": 5000}
            },
            {
                "chainId": "solana",
                "dexId": null,
                "pairAddress": "deep",
                "baseToken": {"address": "Mint111", "symbol": "bonk"},
                "txns": {"h24": {"buys": null, "sells": "200"}},
                "liquidity": {"usd": "100000"},
                "fdv": true,
                "pairCreatedAt": 1.7e12
            },
            {"baseToken": null, "liquidity": null}
        ]}"#;
        let snapshot = snapshot_from_body(body, "Mint111").unwrap().unwrap();
        assert_eq!(snapshot.pair_address, "deep");
        assert_eq!(snapshot.dex_id, "");
        assert_eq!(snapshot.buys_24h, 0);
        assert_eq!(snapshot.sells_24h, 200);
        assert_eq!(snapshot.liquidity_usd, 100_000.0);
        assert_eq!(snapshot.valuation_usd, 0.0);
        assert_eq!(snapshot.pair_created_at, Utc.timestamp_millis_opt(1_700_000_000_000).single());
    }

    #[test]
    fn test_malformed_body() {
        assert!(matches!(snapshot_from_body("<html>", "x"), Err(Error::ApiInvalidFormat(_))));
    }
}
