use crate::analysis::scoring::RawFeatures;
use crate::config::thresholds::{Bounds, EntryThresholds};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBand {
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntryPlan {
    pub target_valuation: f64,
    /// Present only when both price and current valuation are known.
    pub price_band: Option<PriceBand>,
}

/// Scales `price` by the valuation ratio. `None` unless price and current
/// valuation are both known and non-zero.
pub fn price_from_valuation(price: Option<f64>, valuation: f64, current_valuation: Option<f64>) -> Option<f64> {
    match (price, current_valuation) {
        (Some(price), Some(current)) if price > 0.0 && current > 0.0 => Some(price * valuation / current),
        _ => None,
    }
}

fn liquidity_multiplier(liquidity: f64, config: &EntryThresholds) -> f64 {
    if liquidity < config.thin_liquidity {
        config.thin_multiplier
    } else if liquidity > config.deep_liquidity {
        config.deep_multiplier
    } else {
        config.base_multiplier
    }
}

fn valuation_band(liquidity: f64, config: &EntryThresholds) -> Bounds {
    config
        .liquidity_bands
        .iter()
        .find(|band| liquidity < band.max_liquidity)
        .map(|band| Bounds::new(band.min_valuation, band.max_valuation))
        .unwrap_or(config.fallback_band)
}

/// Liquidity-scaled valuation clamped into its tier band. The adjustments
/// applied afterwards are allowed to move it back out of the band.
pub fn target_entry_valuation(raw: &RawFeatures, config: &EntryThresholds) -> f64 {
    let liquidity = raw.liquidity_usd.max(1.0);
    let band = valuation_band(liquidity, config);
    let mut target = (liquidity * liquidity_multiplier(liquidity, config)).clamp(band.low, band.high);

    if raw.price_change_6h > config.strong_momentum_6h {
        target *= config.strong_momentum_factor;
    }
    if raw.price_change_1h < config.dip_momentum_1h && raw.vql > config.dip_min_vql {
        target *= config.dip_factor;
    }
    if raw.vql > config.hot_flow_vql {
        target *= config.hot_flow_factor;
    }
    if raw.age_hours < config.fresh_age_hours {
        target *= config.fresh_factor;
    }
    let seasoned = &config.seasoned_age_hours;
    if raw.age_hours > seasoned.low && raw.age_hours < seasoned.high {
        target *= config.seasoned_factor;
    }
    target
}

pub fn plan_entry(
    raw: &RawFeatures,
    price: Option<f64>,
    current_valuation: Option<f64>,
    config: &EntryThresholds,
) -> EntryPlan {
    let target_valuation = target_entry_valuation(raw, config);
    let spread = config.price_band_pct / 100.0;
    let price_band = price_from_valuation(price, target_valuation, current_valuation).map(|target| PriceBand {
        low: target * (1.0 - spread),
        high: target * (1.0 + spread),
    });
    debug!("Entry target valuation {:.0}, price band {:?}", target_valuation, price_band);
    EntryPlan { target_valuation, price_band }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::tests::raw_features;

    #[test]
    fn test_thin_liquidity_clamps_then_momentum_boost() {
        let mut raw = raw_features();
        raw.liquidity_usd = 10_000.0;
        raw.price_change_6h = 20.0;
        let target = target_entry_valuation(&raw, &EntryThresholds::default());
        assert!((target - 150_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_multiplier_tiers() {
        let config = EntryThresholds::default();
        let mut raw = raw_features();

        raw.liquidity_usd = 20_000.0;
        assert!((target_entry_valuation(&raw, &config) - 160_000.0).abs() < 1e-6);

        raw.liquidity_usd = 30_000.0;
        assert!((target_entry_valuation(&raw, &config) - 240_000.0).abs() < 1e-6);

        raw.liquidity_usd = 100_000.0;
        assert!((target_entry_valuation(&raw, &config) - 350_000.0).abs() < 1e-6);

        raw.liquidity_usd = 500_000.0;
        assert!((target_entry_valuation(&raw, &config) - 1_200_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_liquidity_floored() {
        let mut raw = raw_features();
        raw.liquidity_usd = 0.0;
        assert!((target_entry_valuation(&raw, &EntryThresholds::default()) - 120_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_adjustments_may_leave_band() {
        let config = EntryThresholds::default();
        let mut raw = raw_features();
        raw.liquidity_usd = 30_000.0;
        raw.price_change_6h = 20.0;
        raw.vql = 6.0;
        raw.age_hours = 48.0;
        // 240k * 1.25 * 1.15 * 1.10, well past the 250k ceiling.
        let target = target_entry_valuation(&raw, &config);
        assert!((target - 379_500.0).abs() < 1e-6);
        assert!(target > 250_000.0);

        raw.price_change_6h = 0.0;
        raw.price_change_1h = -5.0;
        raw.vql = 2.0;
        raw.age_hours = 1.0;
        raw.liquidity_usd = 1_000.0;
        // 120k * 0.9 * 0.85 drops under the 120k floor.
        let target = target_entry_valuation(&raw, &config);
        assert!((target - 91_800.0).abs() < 1e-6);
    }

    #[test]
    fn test_seasoned_window_is_exclusive() {
        let config = EntryThresholds::default();
        let mut raw = raw_features();
        raw.liquidity_usd = 30_000.0;
        raw.age_hours = 24.0;
        assert!((target_entry_valuation(&raw, &config) - 240_000.0).abs() < 1e-6);
        raw.age_hours = 120.0;
        assert!((target_entry_valuation(&raw, &config) - 240_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_price_band() {
        let mut raw = raw_features();
        raw.liquidity_usd = 30_000.0;
        let plan = plan_entry(&raw, Some(0.002), Some(480_000.0), &EntryThresholds::default());
        let band = plan.price_band.unwrap();
        assert!((band.low - 0.00097).abs() < 1e-12);
        assert!((band.high - 0.00103).abs() < 1e-12);

        assert_eq!(plan_entry(&raw, None, Some(480_000.0), &EntryThresholds::default()).price_band, None);
        assert_eq!(plan_entry(&raw, Some(0.002), None, &EntryThresholds::default()).price_band, None);
    }
}
