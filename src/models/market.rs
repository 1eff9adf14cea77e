use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hours assumed for a pair whose creation time the provider did not report.
pub const DEFAULT_AGE_HOURS: f64 = 24.0;

/// One point-in-time observation of a token's best trading pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub token_address: String,
    pub pair_address: String,
    pub chain_id: String,
    pub dex_id: String,
    pub price_usd: Option<f64>,
    pub volume_24h: f64,
    pub liquidity_usd: f64,
    pub buys_24h: u64,
    pub sells_24h: u64,
    pub price_change_1h: f64,
    pub price_change_6h: f64,
    pub price_change_24h: f64,
    /// Fully-diluted valuation, or market cap when FDV is missing. 0 if unknown.
    pub valuation_usd: f64,
    pub pair_created_at: Option<DateTime<Utc>>,
}

impl MarketSnapshot {
    pub fn trades_24h(&self) -> u64 {
        self.buys_24h.saturating_add(self.sells_24h)
    }

    pub fn age_hours(&self, now: DateTime<Utc>) -> f64 {
        match self.pair_created_at {
            Some(created) => (now - created).num_milliseconds() as f64 / 3_600_000.0,
            None => DEFAULT_AGE_HOURS,
        }
    }

    /// Valuation, or `None` when the provider reported nothing usable.
    pub fn known_valuation(&self) -> Option<f64> {
        (self.valuation_usd.is_finite() && self.valuation_usd > 0.0).then_some(self.valuation_usd)
    }

    /// Price, or `None` when missing or zero.
    pub fn known_price(&self) -> Option<f64> {
        self.price_usd.filter(|p| p.is_finite() && *p > 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandleBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl CandleBar {
    fn has_finite_prices(&self) -> bool {
        self.open.is_finite() && self.high.is_finite() && self.low.is_finite() && self.close.is_finite()
    }
}

/// OHLCV bars ordered by strictly increasing timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CandleSeries {
    bars: Vec<CandleBar>,
}

impl CandleSeries {
    /// Builds a series from unordered provider rows. Rows with non-finite
    /// prices are dropped; on duplicate timestamps the first row wins.
    pub fn from_unordered(mut bars: Vec<CandleBar>) -> Self {
        bars.retain(CandleBar::has_finite_prices);
        // Stable sort keeps provider order among equal timestamps.
        bars.sort_by_key(|bar| bar.timestamp);
        bars.dedup_by_key(|bar| bar.timestamp);
        Self { bars }
    }

    pub fn bars(&self) -> &[CandleBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HolderStats {
    pub top10_pct: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn bar(minute: i64, close: f64) -> CandleBar {
        CandleBar {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minute),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1.0,
        }
    }

    #[test]
    fn test_series_sorts_and_dedups() {
        let series = CandleSeries::from_unordered(vec![
            bar(30, 3.0),
            bar(0, 1.0),
            bar(15, 2.0),
            bar(15, 9.0),
            bar(45, f64::NAN),
        ]);
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
        assert!(series.bars().windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn test_age_defaults_when_creation_unknown() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut snapshot = crate::models::tests::sample_snapshot();
        snapshot.pair_created_at = None;
        assert_eq!(snapshot.age_hours(now), DEFAULT_AGE_HOURS);

        snapshot.pair_created_at = Some(now - Duration::hours(48));
        assert!((snapshot.age_hours(now) - 48.0).abs() < 1e-9);
    }

    #[test]
    fn test_known_price_and_valuation() {
        let mut snapshot = crate::models::tests::sample_snapshot();
        snapshot.price_usd = Some(0.0);
        snapshot.valuation_usd = 0.0;
        assert_eq!(snapshot.known_price(), None);
        assert_eq!(snapshot.known_valuation(), None);
    }
}
