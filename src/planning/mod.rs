//! Entry, traffic-light and exit heuristics derived from a score.

pub mod entry;
pub mod exit;
pub mod traffic_light;

pub use entry::{plan_entry, price_from_valuation, EntryPlan, PriceBand};
pub use exit::{exit_target_pct, exit_valuation};
pub use traffic_light::{evaluate_traffic_light, Light, ReversionRisk, TrafficLight};

use crate::analysis::chart::ChartSignals;
use crate::analysis::scoring::ScoreResult;
use crate::config::Thresholds;
use crate::models::MarketSnapshot;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryExitPlan {
    pub entry_valuation: f64,
    pub entry_price_band: Option<PriceBand>,
    pub traffic_light: TrafficLight,
    pub exit_pct: f64,
    pub exit_valuation: Option<f64>,
    pub exit_price: Option<f64>,
}

pub fn build_plan(
    snapshot: &MarketSnapshot,
    score: &ScoreResult,
    chart: Option<&ChartSignals>,
    thresholds: &Thresholds,
) -> EntryExitPlan {
    let price = snapshot.known_price();
    let current = snapshot.known_valuation();

    let entry = plan_entry(&score.raw, price, current, &thresholds.entry);
    let exit_pct = exit_target_pct(score.score, &score.raw, chart, &thresholds.exit);
    let exit_valuation = exit_valuation(current, exit_pct);
    let exit_price = exit_valuation.and_then(|valuation| price_from_valuation(price, valuation, current));
    let traffic_light =
        evaluate_traffic_light(current, entry.target_valuation, &score.raw, &thresholds.traffic_light);

    debug!(
        "Plan for {}: entry {:.0}, {} light, exit +{:.1}%",
        snapshot.symbol, entry.target_valuation, traffic_light.light, exit_pct
    );

    EntryExitPlan {
        entry_valuation: entry.target_valuation,
        entry_price_band: entry.price_band,
        traffic_light,
        exit_pct,
        exit_valuation,
        exit_price,
    }
}
