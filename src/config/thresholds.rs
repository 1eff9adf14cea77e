//! Tuned constants for scoring and planning.
//!
//! The values are empirical, not fitted by a model. Defaults reproduce the
//! reference heuristics; every field can be overridden from the `[thresholds]`
//! table of the config file.

use crate::analysis::scoring::FeatureKey;
use crate::error::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub low: f64,
    pub high: f64,
}

impl Bounds {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    fn check(&self, name: &str) -> Result<()> {
        if !(self.low.is_finite() && self.high.is_finite()) || self.low >= self.high {
            return Err(Error::ConfigError(format!(
                "{}: low ({}) must be below high ({})",
                name, self.low, self.high
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub scoring: ScoringThresholds,
    pub chart: ChartThresholds,
    pub entry: EntryThresholds,
    pub traffic_light: TrafficLightThresholds,
    pub exit: ExitThresholds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureWeights {
    pub vol_24h: f64,
    pub liquidity_usd: f64,
    pub trades_24h: f64,
    pub vql: f64,
    pub momentum_1h: f64,
    pub momentum_6h: f64,
    pub momentum_24h: f64,
    pub mcap_to_liq: f64,
    pub holders: f64,
    pub structure: f64,
    pub patterns: f64,
    pub discovery_age: f64,
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self {
            // Flow & liquidity
            vol_24h: 0.16,
            liquidity_usd: 0.12,
            trades_24h: 0.05,
            vql: 0.06,
            // Momentum
            momentum_1h: 0.12,
            momentum_6h: 0.10,
            momentum_24h: 0.04,
            // Distribution
            mcap_to_liq: 0.05,
            holders: 0.08,
            // Candle-derived
            structure: 0.13,
            patterns: 0.09,
            discovery_age: 0.10,
        }
    }
}

impl FeatureWeights {
    pub fn get(&self, key: FeatureKey) -> f64 {
        match key {
            FeatureKey::Vol24h => self.vol_24h,
            FeatureKey::LiquidityUsd => self.liquidity_usd,
            FeatureKey::Trades24h => self.trades_24h,
            FeatureKey::Vql => self.vql,
            FeatureKey::Momentum1h => self.momentum_1h,
            FeatureKey::Momentum6h => self.momentum_6h,
            FeatureKey::Momentum24h => self.momentum_24h,
            FeatureKey::McapToLiq => self.mcap_to_liq,
            FeatureKey::Holders => self.holders,
            FeatureKey::Structure => self.structure,
            FeatureKey::Patterns => self.patterns,
            FeatureKey::DiscoveryAge => self.discovery_age,
        }
    }

    pub fn total(&self) -> f64 {
        FeatureKey::ALL.iter().map(|key| self.get(*key)).sum()
    }
}

/// Normalization ranges. Flow and valuation ranges are in log10 space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureBounds {
    pub log_vol_24h: Bounds,
    pub log_liquidity_usd: Bounds,
    pub log_trades_24h: Bounds,
    pub log_vql: Bounds,
    pub momentum_1h: Bounds,
    pub momentum_6h: Bounds,
    pub momentum_24h: Bounds,
    pub log_mcap_to_liq: Bounds,
    pub discovery_age_hours: Bounds,
}

impl Default for FeatureBounds {
    fn default() -> Self {
        Self {
            log_vol_24h: Bounds::new(3.7, 6.2),
            log_liquidity_usd: Bounds::new(3.5, 6.0),
            log_trades_24h: Bounds::new(1.3, 3.2),
            log_vql: Bounds::new(-3.0, 1.2),
            momentum_1h: Bounds::new(-6.0, 10.0),
            momentum_6h: Bounds::new(-12.0, 22.0),
            momentum_24h: Bounds::new(-25.0, 40.0),
            log_mcap_to_liq: Bounds::new(1.0, 3.3),
            discovery_age_hours: Bounds::new(6.0, 168.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringThresholds {
    pub weights: FeatureWeights,
    pub bounds: FeatureBounds,
    /// Top-10 concentration at or above which the holders feature is 0.
    pub holder_saturation_pct: f64,
    pub neutral_holder_score: f64,
    pub uptrend_weight: f64,
    pub ema_alignment_weight: f64,
    pub sfp_saturation: f64,
    pub sfp_weight: f64,
    pub fvg_saturation: f64,
    pub fvg_weight: f64,
    pub round_bottom_weight: f64,
    pub score_floor: f64,
    pub score_exponent: f64,
    pub top_tier_score: f64,
    pub mid_tier_score: f64,
}

impl Default for ScoringThresholds {
    fn default() -> Self {
        Self {
            weights: FeatureWeights::default(),
            bounds: FeatureBounds::default(),
            holder_saturation_pct: 30.0,
            neutral_holder_score: 0.5,
            uptrend_weight: 0.6,
            ema_alignment_weight: 0.4,
            sfp_saturation: 6.0,
            sfp_weight: 0.5,
            fvg_saturation: 8.0,
            fvg_weight: 0.2,
            round_bottom_weight: 0.3,
            score_floor: 0.1,
            score_exponent: 0.9,
            top_tier_score: 70.0,
            mid_tier_score: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartThresholds {
    pub min_bars: usize,
    pub fast_ema_period: usize,
    pub slow_ema_period: usize,
    /// Bars inspected for higher highs / higher lows.
    pub trend_window: usize,
    pub min_trend_steps: usize,
    pub swing_lookback: usize,
    pub slope_window: usize,
    pub round_bottom_start: usize,
}

impl Default for ChartThresholds {
    fn default() -> Self {
        Self {
            min_bars: 50,
            fast_ema_period: 50,
            slow_ema_period: 200,
            trend_window: 10,
            min_trend_steps: 12,
            swing_lookback: 5,
            slope_window: 5,
            round_bottom_start: 55,
        }
    }
}

/// Valuation clamp applied to tokens whose liquidity is below `max_liquidity`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidityBand {
    pub max_liquidity: f64,
    pub min_valuation: f64,
    pub max_valuation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryThresholds {
    pub thin_liquidity: f64,
    pub deep_liquidity: f64,
    pub thin_multiplier: f64,
    pub base_multiplier: f64,
    pub deep_multiplier: f64,
    /// Checked in order; the first band whose `max_liquidity` exceeds the
    /// liquidity applies.
    pub liquidity_bands: Vec<LiquidityBand>,
    pub fallback_band: Bounds,
    pub strong_momentum_6h: f64,
    pub strong_momentum_factor: f64,
    pub dip_momentum_1h: f64,
    pub dip_min_vql: f64,
    pub dip_factor: f64,
    pub hot_flow_vql: f64,
    pub hot_flow_factor: f64,
    pub fresh_age_hours: f64,
    pub fresh_factor: f64,
    /// Exclusive age range (hours) rewarded as past the launch churn.
    pub seasoned_age_hours: Bounds,
    pub seasoned_factor: f64,
    pub price_band_pct: f64,
}

impl Default for EntryThresholds {
    fn default() -> Self {
        Self {
            thin_liquidity: 50_000.0,
            deep_liquidity: 400_000.0,
            thin_multiplier: 8.0,
            base_multiplier: 10.0,
            deep_multiplier: 12.0,
            liquidity_bands: vec![
                LiquidityBand { max_liquidity: 50_000.0, min_valuation: 120_000.0, max_valuation: 250_000.0 },
                LiquidityBand { max_liquidity: 150_000.0, min_valuation: 150_000.0, max_valuation: 350_000.0 },
                LiquidityBand { max_liquidity: 400_000.0, min_valuation: 250_000.0, max_valuation: 600_000.0 },
            ],
            fallback_band: Bounds::new(120_000.0, 1_200_000.0),
            strong_momentum_6h: 15.0,
            strong_momentum_factor: 1.25,
            dip_momentum_1h: -3.0,
            dip_min_vql: 1.0,
            dip_factor: 0.9,
            hot_flow_vql: 5.0,
            hot_flow_factor: 1.15,
            fresh_age_hours: 3.0,
            fresh_factor: 0.85,
            seasoned_age_hours: Bounds::new(24.0, 120.0),
            seasoned_factor: 1.10,
            price_band_pct: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficLightThresholds {
    pub green_max_ratio: f64,
    pub green_min_vql: f64,
    /// Exclusive 6h momentum range for a green light.
    pub green_momentum_6h: Bounds,
    pub yellow_max_ratio: f64,
    pub yellow_min_vql: f64,
    pub yellow_max_momentum_6h: f64,
    pub high_risk_momentum_6h: f64,
    pub high_risk_vql: f64,
    pub high_risk_liquidity: f64,
    pub medium_risk_momentum_6h: f64,
    pub medium_risk_vql: f64,
    pub medium_risk_liquidity: f64,
}

impl Default for TrafficLightThresholds {
    fn default() -> Self {
        Self {
            green_max_ratio: 1.05,
            green_min_vql: 2.0,
            green_momentum_6h: Bounds::new(-8.0, 12.0),
            yellow_max_ratio: 1.35,
            yellow_min_vql: 1.0,
            yellow_max_momentum_6h: 12.0,
            high_risk_momentum_6h: 30.0,
            high_risk_vql: 1.0,
            high_risk_liquidity: 30_000.0,
            medium_risk_momentum_6h: 18.0,
            medium_risk_vql: 1.5,
            medium_risk_liquidity: 60_000.0,
        }
    }
}

/// Target gain for scores strictly below `below_score`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitBand {
    pub below_score: f64,
    pub target_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitThresholds {
    pub score_bands: Vec<ExitBand>,
    pub top_target_pct: f64,
    pub flow_multiplier: f64,
    pub min_flow_vql: f64,
    pub min_pct: f64,
    pub max_pct: f64,
    pub large_valuation: f64,
    pub large_valuation_factor: f64,
    pub overheated_momentum_6h: f64,
    pub overheated_factor: f64,
    pub no_trend_factor: f64,
    pub few_patterns_count: u32,
    pub few_patterns_factor: f64,
}

impl Default for ExitThresholds {
    fn default() -> Self {
        Self {
            score_bands: vec![
                ExitBand { below_score: 50.0, target_pct: 15.0 },
                ExitBand { below_score: 70.0, target_pct: 40.0 },
                ExitBand { below_score: 85.0, target_pct: 120.0 },
                ExitBand { below_score: 95.0, target_pct: 280.0 },
            ],
            top_target_pct: 400.0,
            flow_multiplier: 50.0,
            min_flow_vql: 0.2,
            min_pct: 10.0,
            max_pct: 500.0,
            large_valuation: 5_000_000.0,
            large_valuation_factor: 0.7,
            overheated_momentum_6h: 30.0,
            overheated_factor: 0.6,
            no_trend_factor: 0.7,
            few_patterns_count: 2,
            few_patterns_factor: 0.85,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<()> {
        let scoring = &self.scoring;
        for key in FeatureKey::ALL {
            let weight = scoring.weights.get(key);
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::ConfigError(format!(
                    "weight for {} must be a non-negative number, got {}",
                    key.as_str(),
                    weight
                )));
            }
        }
        debug!("Feature weights sum to {:.3}", scoring.weights.total());

        let bounds = &scoring.bounds;
        bounds.log_vol_24h.check("log_vol_24h")?;
        bounds.log_liquidity_usd.check("log_liquidity_usd")?;
        bounds.log_trades_24h.check("log_trades_24h")?;
        bounds.log_vql.check("log_vql")?;
        bounds.momentum_1h.check("momentum_1h")?;
        bounds.momentum_6h.check("momentum_6h")?;
        bounds.momentum_24h.check("momentum_24h")?;
        bounds.log_mcap_to_liq.check("log_mcap_to_liq")?;
        bounds.discovery_age_hours.check("discovery_age_hours")?;

        if scoring.holder_saturation_pct <= 0.0 {
            return Err(Error::ConfigError("holder_saturation_pct must be positive".into()));
        }
        if scoring.sfp_saturation <= 0.0 || scoring.fvg_saturation <= 0.0 {
            return Err(Error::ConfigError("pattern saturation counts must be positive".into()));
        }
        if scoring.mid_tier_score > scoring.top_tier_score {
            return Err(Error::ConfigError(format!(
                "mid tier cutoff ({}) cannot exceed top tier cutoff ({})",
                scoring.mid_tier_score, scoring.top_tier_score
            )));
        }

        let chart = &self.chart;
        if chart.fast_ema_period == 0 || chart.slow_ema_period == 0 {
            return Err(Error::ConfigError("EMA periods must be at least 1".into()));
        }
        if chart.trend_window < 2 || chart.swing_lookback == 0 || chart.slope_window == 0 {
            return Err(Error::ConfigError("chart lookback windows are too short".into()));
        }
        let needed = chart.trend_window.max(chart.swing_lookback + 1).max(3);
        if chart.min_bars < needed {
            return Err(Error::ConfigError(format!(
                "min_bars ({}) must cover the longest lookback ({})",
                chart.min_bars, needed
            )));
        }
        if chart.round_bottom_start <= chart.slope_window {
            return Err(Error::ConfigError(
                "round_bottom_start must leave room for two slope windows".into(),
            ));
        }

        let entry = &self.entry;
        entry.fallback_band.check("fallback_band")?;
        entry.seasoned_age_hours.check("seasoned_age_hours")?;
        for pair in entry.liquidity_bands.windows(2) {
            if pair[0].max_liquidity >= pair[1].max_liquidity {
                return Err(Error::ConfigError("liquidity_bands must be sorted by max_liquidity".into()));
            }
        }
        for band in &entry.liquidity_bands {
            if band.min_valuation > band.max_valuation {
                return Err(Error::ConfigError(format!(
                    "liquidity band below {} has min_valuation above max_valuation",
                    band.max_liquidity
                )));
            }
        }

        self.traffic_light.green_momentum_6h.check("green_momentum_6h")?;
        if self.traffic_light.green_max_ratio > self.traffic_light.yellow_max_ratio {
            return Err(Error::ConfigError("green_max_ratio cannot exceed yellow_max_ratio".into()));
        }

        let exit = &self.exit;
        if exit.min_pct > exit.max_pct {
            return Err(Error::ConfigError("exit min_pct cannot exceed max_pct".into()));
        }
        for pair in exit.score_bands.windows(2) {
            if pair[0].below_score >= pair[1].below_score {
                return Err(Error::ConfigError("exit score_bands must be sorted by below_score".into()));
            }
        }

        Ok(())
    }
}
