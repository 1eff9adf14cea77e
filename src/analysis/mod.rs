//! Pure analytical pipeline: normalization, candle signals and scoring.

pub mod chart;
pub mod normalize;
pub mod scoring;

pub use chart::{extract_chart_signals, ChartSignals};
pub use scoring::{score_token, FeatureKey, FeatureVector, RawFeatures, ScoreResult, Tier};
