use crate::error::Error;
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub mod thresholds;

pub use thresholds::Thresholds;

pub const BIRDEYE_KEY_ENV: &str = "BIRDEYE_API_KEY";
pub const HELIUS_KEY_ENV: &str = "HELIUS_API_KEY";
pub const SOLANA_RPC_ENV: &str = "SOLANA_RPC_URL";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub thresholds: Thresholds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub dexscreener_base_url: String,
    pub birdeye_base_url: String,
    pub birdeye_api_key: Option<String>,
    pub helius_api_key: Option<String>,
    pub solana_rpc_url: Option<String>,
    /// Candle granularity requested from Birdeye.
    pub candle_interval: String,
    pub candle_lookback_days: u32,
    pub request_timeout_secs: u64,
    pub enrichment_timeout_secs: u64,
    pub evaluation_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            dexscreener_base_url: "https://api.dexscreener.com".to_string(),
            birdeye_base_url: "https://public-api.birdeye.so".to_string(),
            birdeye_api_key: None,
            helius_api_key: None,
            solana_rpc_url: None,
            candle_interval: "15m".to_string(),
            candle_lookback_days: 7,
            request_timeout_secs: 15,
            enrichment_timeout_secs: 10,
            evaluation_timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn enrichment_timeout(&self) -> Duration {
        Duration::from_secs(self.enrichment_timeout_secs)
    }

    pub fn evaluation_timeout(&self) -> Duration {
        Duration::from_secs(self.evaluation_timeout_secs)
    }

    /// RPC endpoint for holder lookups: an explicit URL wins over a Helius key.
    pub fn holder_rpc_url(&self) -> Option<String> {
        match (&self.solana_rpc_url, &self.helius_api_key) {
            (Some(url), _) => Some(url.clone()),
            (None, Some(key)) => Some(format!("https://mainnet.helius-rpc.com/?api-key={}", key)),
            (None, None) => None,
        }
    }

    /// Timeouts and the candle lookback must be non-zero.
    pub fn validate(&self) -> crate::error::Result<()> {
        let timeouts = [
            ("request_timeout_secs", self.request_timeout_secs),
            ("enrichment_timeout_secs", self.enrichment_timeout_secs),
            ("evaluation_timeout_secs", self.evaluation_timeout_secs),
        ];
        for (name, secs) in timeouts {
            if secs == 0 {
                return Err(Error::ConfigError(format!("api.{} must be greater than zero", name)));
            }
        }
        if self.candle_lookback_days == 0 {
            return Err(Error::ConfigError("api.candle_lookback_days must be greater than zero".into()));
        }
        Ok(())
    }

    /// Drops blank keys so that `Some("")` never enables a provider.
    pub(crate) fn normalize(&mut self) {
        for value in [&mut self.birdeye_api_key, &mut self.helius_api_key, &mut self.solana_rpc_url] {
            if value.as_deref().map(str::trim).map_or(false, str::is_empty) {
                *value = None;
            }
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Loads `path` when given, otherwise falls back to built-in defaults.
    /// Environment overrides are applied and the result is validated.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => {
                debug!("No config file given, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.api.normalize();
        config.api.validate()?;
        config.thresholds.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(BIRDEYE_KEY_ENV) {
            self.api.birdeye_api_key = Some(key);
        }
        if let Some(key) = lookup(HELIUS_KEY_ENV) {
            self.api.helius_api_key = Some(key);
        }
        if let Some(url) = lookup(SOLANA_RPC_ENV) {
            self.api.solana_rpc_url = Some(url);
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        fs::write(path, config_str)?;
        Ok(())
    }
}
