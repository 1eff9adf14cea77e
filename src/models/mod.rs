pub mod market;

pub use market::{CandleBar, CandleSeries, HolderStats, MarketSnapshot};

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    /// Snapshot with no extreme values; tests override the fields they care about.
    pub fn sample_snapshot() -> MarketSnapshot {
        MarketSnapshot {
            symbol: "BONK".to_string(),
            token_address: "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263".to_string(),
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
            pair_created_at: Some(Utc.with_ymd_and_hms(2024, 2, 28, 12, 0, 0).unwrap()),
        }
    }
}
