use crate::analysis::{extract_chart_signals, score_token};
use crate::api::{
    BirdeyeClient, CandleProvider, DexScreenerClient, Enrichment, HolderProvider, MarketDataProvider,
    SolanaHolderClient,
};
use crate::config::{Config, Thresholds};
use crate::error::{Error, Result};
use crate::models::{CandleSeries, HolderStats, MarketSnapshot};
use crate::planning::build_plan;
use crate::report::{EnrichmentReport, EvaluationReport};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

const DEFAULT_ENRICHMENT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_EVALUATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs one evaluation: snapshot, then candles and holders concurrently,
/// then the pure scoring and planning pipeline.
pub struct TokenEvaluator {
    market: Arc<dyn MarketDataProvider>,
    candles: Option<Arc<dyn CandleProvider>>,
    holders: Option<Arc<dyn HolderProvider>>,
    thresholds: Thresholds,
    enrichment_timeout: Duration,
    evaluation_timeout: Duration,
}

impl TokenEvaluator {
    pub fn new(market: Arc<dyn MarketDataProvider>, thresholds: Thresholds) -> Self {
        Self {
            market,
            candles: None,
            holders: None,
            thresholds,
            enrichment_timeout: DEFAULT_ENRICHMENT_TIMEOUT,
            evaluation_timeout: DEFAULT_EVALUATION_TIMEOUT,
        }
    }

    pub fn with_candles(mut self, provider: Arc<dyn CandleProvider>) -> Self {
        self.candles = Some(provider);
        self
    }

    pub fn with_holders(mut self, provider: Arc<dyn HolderProvider>) -> Self {
        self.holders = Some(provider);
        self
    }

    pub fn with_timeouts(mut self, enrichment: Duration, evaluation: Duration) -> Self {
        self.enrichment_timeout = enrichment;
        self.evaluation_timeout = evaluation;
        self
    }

    /// Wires the HTTP providers. Candles need a Birdeye key and holders need
    /// an RPC endpoint; without them those enrichments stay absent.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api = &config.api;
        let market = DexScreenerClient::new(&api.dexscreener_base_url, api.request_timeout())?;
        let mut evaluator = Self::new(Arc::new(market), config.thresholds.clone())
            .with_timeouts(api.enrichment_timeout(), api.evaluation_timeout());

        match &api.birdeye_api_key {
            Some(key) => {
                let client = BirdeyeClient::new(
                    &api.birdeye_base_url,
                    key,
                    &api.candle_interval,
                    api.candle_lookback_days,
                    api.request_timeout(),
                )?;
                evaluator = evaluator.with_candles(Arc::new(client));
            }
            None => info!("No Birdeye key configured, chart signals disabled"),
        }
        match api.holder_rpc_url() {
            Some(url) => {
                let client = SolanaHolderClient::new(&url, api.request_timeout())?;
                evaluator = evaluator.with_holders(Arc::new(client));
            }
            None => info!("No Solana RPC endpoint configured, holder concentration disabled"),
        }
        Ok(evaluator)
    }

    pub async fn evaluate(&self, token: &str) -> Result<EvaluationReport> {
        match timeout(self.evaluation_timeout, self.run(token)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(format!(
                "evaluation of {} exceeded {}s",
                token,
                self.evaluation_timeout.as_secs_f64()
            ))),
        }
    }

    async fn run(&self, token: &str) -> Result<EvaluationReport> {
        let snapshot = self
            .market
            .fetch_snapshot(token)
            .await?
            .ok_or_else(|| Error::NoMarketFound(token.to_string()))?;
        info!(
            "Found {} on {} ({}), liquidity ${:.0}",
            snapshot.symbol, snapshot.dex_id, snapshot.chain_id, snapshot.liquidity_usd
        );

        let (candles, holders) = tokio::join!(self.fetch_candles(&snapshot), self.fetch_holders(&snapshot));
        Ok(build_report(snapshot, candles, holders, Utc::now(), &self.thresholds))
    }

    async fn fetch_candles(&self, snapshot: &MarketSnapshot) -> Enrichment<CandleSeries> {
        let Some(provider) = &self.candles else {
            return Enrichment::Absent;
        };
        let outcome = bounded(
            self.enrichment_timeout,
            provider.fetch_candles(&snapshot.token_address, &snapshot.chain_id),
        )
        .await;
        log_outcome("candles", &outcome);
        outcome
    }

    async fn fetch_holders(&self, snapshot: &MarketSnapshot) -> Enrichment<HolderStats> {
        let provider = match &self.holders {
            Some(provider) if provider.supports_chain(&snapshot.chain_id) => provider,
            Some(_) => {
                debug!("Holder lookup not available on {}", snapshot.chain_id);
                return Enrichment::Absent;
            }
            None => return Enrichment::Absent,
        };
        let outcome = bounded(self.enrichment_timeout, provider.fetch_holder_stats(&snapshot.token_address)).await;
        log_outcome("holders", &outcome);
        outcome
    }
}

async fn bounded<T, F>(limit: Duration, fetch: F) -> Enrichment<T>
where
    F: Future<Output = Result<Option<T>>>,
{
    let result = match timeout(limit, fetch).await {
        Ok(result) => result,
        Err(elapsed) => Err(Error::from(elapsed)),
    };
    Enrichment::from_result(result)
}

fn log_outcome<T>(name: &str, outcome: &Enrichment<T>) {
    match outcome {
        Enrichment::Present(_) => debug!("Enrichment {} present", name),
        Enrichment::Absent => debug!("Enrichment {} absent", name),
        Enrichment::Failed(reason) => warn!("Enrichment {} failed, continuing without it: {}", name, reason),
    }
}

/// Scores and plans from already-fetched inputs.
pub fn build_report(
    snapshot: MarketSnapshot,
    candles: Enrichment<CandleSeries>,
    holders: Enrichment<HolderStats>,
    now: DateTime<Utc>,
    thresholds: &Thresholds,
) -> EvaluationReport {
    let chart = candles.as_option().and_then(|series| extract_chart_signals(series, &thresholds.chart));
    let score = score_token(&snapshot, holders.as_option(), chart.as_ref(), now, &thresholds.scoring);
    let plan = build_plan(&snapshot, &score, chart.as_ref(), thresholds);

    EvaluationReport {
        market: snapshot,
        score,
        chart,
        plan,
        enrichment: EnrichmentReport {
            candles: candles.status(),
            holders: holders.status(),
        },
        checked_at: now,
    }
}
