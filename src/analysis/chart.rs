//! Trend and pattern signals over a candle series.
//!
//! EMA: seeded with the first close, `ema[t] = close[t]*k + ema[t-1]*(1-k)`,
//! `k = 2/(period+1)`. Every count is a pure function of the bars scanned, so
//! appending bars never changes the contribution of earlier ones.

use crate::config::thresholds::ChartThresholds;
use crate::models::{CandleBar, CandleSeries};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSignals {
    pub uptrend: bool,
    /// Fast EMA above slow EMA on the last bar.
    pub ema_up: bool,
    pub sfp_count: u32,
    pub fvg_count: u32,
    pub round_bottom: bool,
}

/// Returns `None` for series shorter than `min_bars`; never a partial result.
pub fn extract_chart_signals(series: &CandleSeries, config: &ChartThresholds) -> Option<ChartSignals> {
    let bars = series.bars();
    if bars.len() < config.min_bars {
        debug!(
            "Candle series too short for signals: {} bars, need {}",
            bars.len(),
            config.min_bars
        );
        return None;
    }

    let closes = series.closes();
    let fast = ema_series(&closes, config.fast_ema_period);
    let slow = ema_series(&closes, config.slow_ema_period);
    let ema_up = match (fast.last(), slow.last()) {
        (Some(f), Some(s)) => f > s,
        _ => false,
    };

    let (higher_highs, higher_lows) = trend_steps(bars, config.trend_window);
    let uptrend = ema_up && higher_highs + higher_lows >= config.min_trend_steps;

    let signals = ChartSignals {
        uptrend,
        ema_up,
        sfp_count: count_swing_failures(bars, config.swing_lookback),
        fvg_count: count_fair_value_gaps(bars),
        round_bottom: detect_round_bottom(&fast, config.slope_window, config.round_bottom_start),
    };
    debug!("Chart signals: {:?}", signals);
    Some(signals)
}

pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    let Some(&first) = values.first() else {
        return Vec::new();
    };
    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut ema = first;
    out.push(ema);
    for &value in &values[1..] {
        ema = value * k + ema * (1.0 - k);
        out.push(ema);
    }
    out
}

/// Counts strictly higher highs and strictly higher lows between consecutive
/// bars in the trailing `window` bars.
pub fn trend_steps(bars: &[CandleBar], window: usize) -> (usize, usize) {
    let start = bars.len().saturating_sub(window);
    bars[start..].windows(2).fold((0, 0), |(hh, hl), pair| {
        (
            hh + usize::from(pair[1].high > pair[0].high),
            hl + usize::from(pair[1].low > pair[0].low),
        )
    })
}

/// Swing failures: a bar that pierces the prior `lookback`-bar high (or low)
/// but closes back inside it. A bar can fail in both directions.
pub fn count_swing_failures(bars: &[CandleBar], lookback: usize) -> u32 {
    if lookback == 0 {
        return 0;
    }
    let mut count = 0;
    for i in lookback..bars.len() {
        let prior = &bars[i - lookback..i];
        let prev_high = prior.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let prev_low = prior.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let bar = &bars[i];
        if bar.high > prev_high && bar.close < prev_high {
            count += 1;
        }
        if bar.low < prev_low && bar.close > prev_low {
            count += 1;
        }
    }
    count
}

/// Three-bar imbalances, bullish and bearish.
pub fn count_fair_value_gaps(bars: &[CandleBar]) -> u32 {
    bars.windows(3)
        .map(|w| {
            let (c0, c1, c2) = (&w[0], &w[1], &w[2]);
            let bullish = c1.low > c0.high && c2.low > c1.high;
            let bearish = c1.high < c0.low && c2.high < c1.low;
            u32::from(bullish) + u32::from(bearish)
        })
        .sum()
}

/// True at the first index from `start` where the EMA slope turns from
/// negative to non-negative.
pub fn detect_round_bottom(ema: &[f64], slope_window: usize, start: usize) -> bool {
    if slope_window == 0 || start <= slope_window {
        return false;
    }
    let slope = |i: usize| (ema[i] - ema[i - slope_window]) / slope_window as f64;
    (start..ema.len()).any(|i| slope(i - 1) < 0.0 && slope(i) >= 0.0)
}
