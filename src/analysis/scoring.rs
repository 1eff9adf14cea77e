use crate::analysis::chart::ChartSignals;
use crate::analysis::normalize::{clamp, log10_floored, normalize, normalize_in, normalize_inverted_in};
use crate::config::thresholds::ScoringThresholds;
use crate::models::{HolderStats, MarketSnapshot};
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeatureKey {
    Vol24h,
    LiquidityUsd,
    Trades24h,
    Vql,
    Momentum1h,
    Momentum6h,
    Momentum24h,
    McapToLiq,
    Holders,
    Structure,
    Patterns,
    DiscoveryAge,
}

impl FeatureKey {
    pub const ALL: [FeatureKey; 12] = [
        FeatureKey::Vol24h,
        FeatureKey::LiquidityUsd,
        FeatureKey::Trades24h,
        FeatureKey::Vql,
        FeatureKey::Momentum1h,
        FeatureKey::Momentum6h,
        FeatureKey::Momentum24h,
        FeatureKey::McapToLiq,
        FeatureKey::Holders,
        FeatureKey::Structure,
        FeatureKey::Patterns,
        FeatureKey::DiscoveryAge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKey::Vol24h => "vol24h",
            FeatureKey::LiquidityUsd => "liquidityUsd",
            FeatureKey::Trades24h => "trades24h",
            FeatureKey::Vql => "vql",
            FeatureKey::Momentum1h => "momentum1h",
            FeatureKey::Momentum6h => "momentum6h",
            FeatureKey::Momentum24h => "momentum24h",
            FeatureKey::McapToLiq => "mcapToLiq",
            FeatureKey::Holders => "holders",
            FeatureKey::Structure => "structure",
            FeatureKey::Patterns => "patterns",
            FeatureKey::DiscoveryAge => "discoveryAge",
        }
    }
}

/// Likelihood tier, ordered worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    Red,
    Yellow,
    Green,
}

impl Tier {
    pub fn from_score(score: f64, config: &ScoringThresholds) -> Self {
        if score >= config.top_tier_score {
            Tier::Green
        } else if score >= config.mid_tier_score {
            Tier::Yellow
        } else {
            Tier::Red
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Red => "Red",
            Tier::Yellow => "Yellow",
            Tier::Green => "Green",
        };
        f.write_str(name)
    }
}

/// Un-normalized quantities the features and the planners are derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawFeatures {
    pub volume_24h: f64,
    pub liquidity_usd: f64,
    pub trades_24h: f64,
    pub price_change_1h: f64,
    pub price_change_6h: f64,
    pub price_change_24h: f64,
    pub valuation_usd: f64,
    /// Volume over liquidity; 0 without liquidity.
    pub vql: f64,
    /// Valuation over liquidity; `None` stands for unbounded (no liquidity).
    pub mcap_to_liq: Option<f64>,
    pub age_hours: f64,
    pub top10_pct: Option<f64>,
}

impl RawFeatures {
    pub fn from_snapshot(snapshot: &MarketSnapshot, holders: Option<&HolderStats>, now: DateTime<Utc>) -> Self {
        let liquidity = snapshot.liquidity_usd;
        let has_liquidity = liquidity > 0.0;
        Self {
            volume_24h: snapshot.volume_24h,
            liquidity_usd: liquidity,
            trades_24h: snapshot.trades_24h() as f64,
            price_change_1h: snapshot.price_change_1h,
            price_change_6h: snapshot.price_change_6h,
            price_change_24h: snapshot.price_change_24h,
            valuation_usd: snapshot.valuation_usd,
            vql: if has_liquidity { snapshot.volume_24h / liquidity } else { 0.0 },
            mcap_to_liq: has_liquidity.then(|| snapshot.valuation_usd / liquidity),
            age_hours: snapshot.age_hours(now),
            top10_pct: holders.and_then(|h| h.top10_pct),
        }
    }

    pub fn mcap_to_liq_or_inf(&self) -> f64 {
        self.mcap_to_liq.unwrap_or(f64::INFINITY)
    }
}

/// The twelve normalized feature scores, each in [0, 1].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(BTreeMap<FeatureKey, f64>);

impl FeatureVector {
    pub fn get(&self, key: FeatureKey) -> f64 {
        self.0.get(&key).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureKey, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert(&mut self, key: FeatureKey, value: f64) {
        self.0.insert(key, value);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub raw: RawFeatures,
    pub features: FeatureVector,
    /// Weighted feature sum before compression.
    pub weighted_sum: f64,
    pub score: f64,
    pub tier: Tier,
}

pub fn feature_vector(
    raw: &RawFeatures,
    chart: Option<&ChartSignals>,
    config: &ScoringThresholds,
) -> FeatureVector {
    let bounds = &config.bounds;
    let mut features = FeatureVector::default();

    features.insert(FeatureKey::Vol24h, normalize_in(log10_floored(raw.volume_24h, 1.0), &bounds.log_vol_24h));
    features.insert(
        FeatureKey::LiquidityUsd,
        normalize_in(log10_floored(raw.liquidity_usd, 1.0), &bounds.log_liquidity_usd),
    );
    features.insert(FeatureKey::Trades24h, normalize_in(log10_floored(raw.trades_24h, 1.0), &bounds.log_trades_24h));
    features.insert(FeatureKey::Vql, normalize_in(log10_floored(raw.vql, 1e-6), &bounds.log_vql));
    features.insert(FeatureKey::Momentum1h, normalize_in(raw.price_change_1h, &bounds.momentum_1h));
    features.insert(FeatureKey::Momentum6h, normalize_in(raw.price_change_6h, &bounds.momentum_6h));
    features.insert(FeatureKey::Momentum24h, normalize_in(raw.price_change_24h, &bounds.momentum_24h));
    features.insert(
        FeatureKey::McapToLiq,
        normalize_inverted_in(log10_floored(raw.mcap_to_liq_or_inf(), 1.0), &bounds.log_mcap_to_liq),
    );
    features.insert(FeatureKey::Holders, holder_score(raw.top10_pct, config));
    features.insert(FeatureKey::Structure, chart.map_or(0.0, |c| structure_score(c, config)));
    features.insert(FeatureKey::Patterns, chart.map_or(0.0, |c| pattern_score(c, config)));
    features.insert(FeatureKey::DiscoveryAge, normalize_in(raw.age_hours, &bounds.discovery_age_hours));

    features
}

/// Lower top-10 concentration scores higher; unknown concentration is neutral.
pub fn holder_score(top10_pct: Option<f64>, config: &ScoringThresholds) -> f64 {
    let cap = config.holder_saturation_pct;
    match top10_pct {
        Some(pct) => normalize(Some(cap - pct.min(cap)), 0.0, cap, false),
        None => config.neutral_holder_score,
    }
}

pub fn structure_score(chart: &ChartSignals, config: &ScoringThresholds) -> f64 {
    let uptrend = if chart.uptrend { config.uptrend_weight } else { 0.0 };
    let aligned = if chart.ema_up { config.ema_alignment_weight } else { 0.0 };
    uptrend + aligned
}

pub fn pattern_score(chart: &ChartSignals, config: &ScoringThresholds) -> f64 {
    let sfp = clamp(chart.sfp_count as f64 / config.sfp_saturation, 0.0, 1.0) * config.sfp_weight;
    let fvg = clamp(chart.fvg_count as f64 / config.fvg_saturation, 0.0, 1.0) * config.fvg_weight;
    let bottom = if chart.round_bottom { config.round_bottom_weight } else { 0.0 };
    sfp + fvg + bottom
}

/// Compresses the weighted sum onto 0–100 with a floor so weak tokens still
/// read above zero.
pub fn composite_score(weighted_sum: f64, config: &ScoringThresholds) -> f64 {
    let curved = weighted_sum.max(0.0).powf(config.score_exponent);
    clamp(100.0 * (config.score_floor + (1.0 - config.score_floor) * curved), 0.0, 100.0)
}

pub fn score_token(
    snapshot: &MarketSnapshot,
    holders: Option<&HolderStats>,
    chart: Option<&ChartSignals>,
    now: DateTime<Utc>,
    config: &ScoringThresholds,
) -> ScoreResult {
    let raw = RawFeatures::from_snapshot(snapshot, holders, now);
    let features = feature_vector(&raw, chart, config);
    let weighted_sum: f64 = features.iter().map(|(key, value)| config.weights.get(key) * value).sum();
    let score = composite_score(weighted_sum, config);
    let tier = Tier::from_score(score, config);

    debug!(
        "Scored {}: weighted sum {:.4}, score {:.2} ({})",
        snapshot.symbol, weighted_sum, score, tier
    );

    ScoreResult { raw, features, weighted_sum, score, tier }
}
