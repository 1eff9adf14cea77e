use crate::analysis::scoring::RawFeatures;
use crate::config::thresholds::TrafficLightThresholds;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Light {
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReversionRisk {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrafficLight {
    pub light: Light,
    pub risk: ReversionRisk,
    pub ratio: f64,
    /// How far the current valuation sits above (positive) or below the target.
    pub gap_pct: f64,
}

impl fmt::Display for Light {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Light::Green => "GREEN",
            Light::Yellow => "YELLOW",
            Light::Red => "RED",
        })
    }
}

impl fmt::Display for ReversionRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReversionRisk::Low => "low",
            ReversionRisk::Medium => "medium",
            ReversionRisk::High => "high",
        })
    }
}

pub fn reversion_risk(raw: &RawFeatures, config: &TrafficLightThresholds) -> ReversionRisk {
    if raw.price_change_6h > config.high_risk_momentum_6h
        || raw.vql < config.high_risk_vql
        || raw.liquidity_usd < config.high_risk_liquidity
    {
        ReversionRisk::High
    } else if raw.price_change_6h > config.medium_risk_momentum_6h
        || raw.vql < config.medium_risk_vql
        || raw.liquidity_usd < config.medium_risk_liquidity
    {
        ReversionRisk::Medium
    } else {
        ReversionRisk::Low
    }
}

/// Classifies entering now. An unknown current valuation counts as 0.
pub fn evaluate_traffic_light(
    current_valuation: Option<f64>,
    target_valuation: f64,
    raw: &RawFeatures,
    config: &TrafficLightThresholds,
) -> TrafficLight {
    let ratio = current_valuation.unwrap_or(0.0) / target_valuation.max(1.0);
    let h6 = raw.price_change_6h;
    let calm = h6 > config.green_momentum_6h.low && h6 < config.green_momentum_6h.high;

    let light = if ratio <= config.green_max_ratio && raw.vql >= config.green_min_vql && calm {
        Light::Green
    } else if ratio <= config.yellow_max_ratio
        && (raw.vql >= config.yellow_min_vql || h6 <= config.yellow_max_momentum_6h)
    {
        Light::Yellow
    } else {
        Light::Red
    };

    TrafficLight {
        light,
        risk: reversion_risk(raw, config),
        ratio,
        gap_pct: (ratio - 1.0) * 100.0,
    }
}
