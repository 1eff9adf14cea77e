use crate::analysis::chart::ChartSignals;
use crate::analysis::normalize::clamp;
use crate::analysis::scoring::RawFeatures;
use crate::config::thresholds::ExitThresholds;

fn base_target_pct(score: f64, config: &ExitThresholds) -> f64 {
    config
        .score_bands
        .iter()
        .find(|band| score < band.below_score)
        .map_or(config.top_target_pct, |band| band.target_pct)
}

/// Target gain in percent, bounded by `min_pct..=max_pct`.
///
/// The score picks a base target, thin flow caps it, and large, overheated or
/// patternless charts dampen it.
pub fn exit_target_pct(score: f64, raw: &RawFeatures, chart: Option<&ChartSignals>, config: &ExitThresholds) -> f64 {
    let flow_cap = clamp(
        config.flow_multiplier * raw.vql.max(config.min_flow_vql),
        config.min_pct,
        config.max_pct,
    );
    let mut pct = base_target_pct(score, config).min(flow_cap);

    if raw.valuation_usd > config.large_valuation {
        pct *= config.large_valuation_factor;
    }
    if raw.price_change_6h > config.overheated_momentum_6h {
        pct *= config.overheated_factor;
    }
    if let Some(chart) = chart {
        if !chart.uptrend && !chart.round_bottom {
            pct = config.min_pct.max(pct * config.no_trend_factor);
        }
        if chart.sfp_count < config.few_patterns_count && chart.fvg_count < config.few_patterns_count {
            pct = config.min_pct.max(pct * config.few_patterns_factor);
        }
    }

    clamp(pct, config.min_pct, config.max_pct)
}

/// Valuation after the target gain; `None` when the current one is unknown.
pub fn exit_valuation(current_valuation: Option<f64>, pct: f64) -> Option<f64> {
    current_valuation.map(|current| current * (1.0 + pct / 100.0))
}
