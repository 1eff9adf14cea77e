//! The assembled result of one evaluation and its terminal rendering.

use crate::analysis::chart::ChartSignals;
use crate::analysis::scoring::ScoreResult;
use crate::api::EnrichmentStatus;
use crate::models::MarketSnapshot;
use crate::planning::EntryExitPlan;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentReport {
    pub candles: EnrichmentStatus,
    pub holders: EnrichmentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub market: MarketSnapshot,
    pub score: ScoreResult,
    pub chart: Option<ChartSignals>,
    pub plan: EntryExitPlan,
    pub enrichment: EnrichmentReport,
    pub checked_at: DateTime<Utc>,
}

impl EvaluationReport {
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Formats with thousands separators and at most `decimals` fraction digits.
pub fn fmt_grouped(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return if value.is_nan() { "-".to_string() } else { "∞".to_string() };
    }
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, f.trim_end_matches('0')),
        None => (fixed.as_str(), ""),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let negative = value < 0.0 && (int_part != "0" || !frac_part.is_empty());
    let sign = if negative { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}

/// Token prices span many orders of magnitude, so keep six significant digits.
pub fn fmt_price(price: f64) -> String {
    if price <= 0.0 || !price.is_finite() {
        return fmt_grouped(price, 2);
    }
    let magnitude = price.log10().floor() as i32;
    let decimals = (5 - magnitude).clamp(2, 12) as usize;
    fmt_grouped(price, decimals)
}

fn fmt_opt_price(price: Option<f64>) -> String {
    price.map_or_else(|| "-".to_string(), |p| format!("${}", fmt_price(p)))
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let market = &self.market;
        let raw = &self.score.raw;
        let plan = &self.plan;
        let light = &plan.traffic_light;

        writeln!(f, "{} on {} ({})", market.symbol, market.dex_id, market.chain_id)?;
        writeln!(f, "Price: {}", fmt_opt_price(market.known_price()))?;
        writeln!(f, "{} (Score {}/100)", self.score.tier, fmt_grouped(self.score.score.round(), 0))?;
        if light.gap_pct > 0.0 {
            writeln!(f, "Signal: {} (over by {}%)", light.light, fmt_grouped(light.gap_pct, 2))?;
        } else {
            writeln!(f, "Signal: {}", light.light)?;
        }
        writeln!(f)?;

        writeln!(f, "Best entry (FDV): ${}", fmt_grouped(plan.entry_valuation, 0))?;
        match plan.entry_price_band {
            Some(band) => writeln!(f, "  Entry price band: ${} - ${}", fmt_price(band.low), fmt_price(band.high))?,
            None => writeln!(f, "  Entry price band: -")?,
        }
        writeln!(f, "  Reversion likelihood: {}", light.risk)?;
        writeln!(f, "Target exit: +{}%", fmt_grouped(plan.exit_pct, 0))?;
        writeln!(f, "  Exit FDV: ${}", fmt_grouped(plan.exit_valuation.unwrap_or(0.0), 0))?;
        writeln!(f, "  Exit price: {}", fmt_opt_price(plan.exit_price))?;
        writeln!(f)?;

        writeln!(f, "Why this plan")?;
        writeln!(
            f,
            "  - Flow/Liquidity: ${} vol / ${} liq (v/liq {})",
            fmt_grouped(raw.volume_24h, 0),
            fmt_grouped(raw.liquidity_usd, 0),
            fmt_grouped(raw.vql, 2)
        )?;
        writeln!(
            f,
            "  - Momentum: 1h {}%, 6h {}%, 24h {}%",
            fmt_grouped(raw.price_change_1h, 2),
            fmt_grouped(raw.price_change_6h, 2),
            fmt_grouped(raw.price_change_24h, 2)
        )?;
        writeln!(
            f,
            "  - Size & risk: FDV ${}, mcap/liq {}",
            fmt_grouped(raw.valuation_usd, 0),
            fmt_grouped(raw.mcap_to_liq_or_inf(), 2)
        )?;
        writeln!(f, "  - Age: {}h", fmt_grouped(raw.age_hours, 2))?;
        if let Some(pct) = raw.top10_pct {
            writeln!(f, "  - Top-10 holders: {}%", fmt_grouped(pct, 2))?;
        }
        if let Some(chart) = &self.chart {
            writeln!(
                f,
                "  - Chart: {}, SFPs {}, FVGs {}, {}",
                if chart.uptrend { "uptrend" } else { "no clear trend" },
                chart.sfp_count,
                chart.fvg_count,
                if chart.round_bottom { "round-bottom" } else { "no round-bottom" }
            )?;
        }
        writeln!(f)?;
        write!(f, "Checked at: {}", self.checked_at.format("%Y-%m-%d %H:%M:%S UTC"))
    }
}
