use crate::api::{check_status, http_client, HolderProvider};
use crate::error::{Error, Result};
use crate::models::HolderStats;
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const PROVIDER: &str = "Solana RPC";
const TOP_HOLDERS: usize = 10;

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<LargestAccounts>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct LargestAccounts {
    #[serde(default)]
    value: Vec<TokenAccount>,
}

#[derive(Debug, Deserialize)]
struct TokenAccount {
    /// Raw token amount as a decimal string.
    #[serde(default)]
    amount: String,
}

impl TokenAccount {
    fn amount(&self) -> f64 {
        self.amount.parse::<f64>().ok().filter(|a| a.is_finite()).unwrap_or(0.0)
    }
}

/// Share of the returned supply held by the first ten accounts, in percent.
fn top10_pct(accounts: &[TokenAccount]) -> Option<f64> {
    let total: f64 = accounts.iter().map(TokenAccount::amount).sum();
    let top: f64 = accounts.iter().take(TOP_HOLDERS).map(TokenAccount::amount).sum();
    (total > 0.0).then(|| top / total * 100.0)
}

fn stats_from_body(body: &str) -> Result<Option<HolderStats>> {
    let response: RpcResponse = serde_json::from_str(body)?;
    if let Some(err) = response.error {
        return Err(Error::ApiError(format!("{} error {}: {}", PROVIDER, err.code, err.message)));
    }
    let accounts = response
        .result
        .ok_or_else(|| Error::ApiInvalidData(format!("{} response has neither result nor error", PROVIDER)))?
        .value;
    debug!("{} returned {} largest accounts", PROVIDER, accounts.len());
    Ok(Some(HolderStats { top10_pct: top10_pct(&accounts) }))
}

#[derive(Debug, Clone)]
pub struct SolanaHolderClient {
    client: Client,
    rpc_url: String,
}

impl SolanaHolderClient {
    pub fn new(rpc_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            rpc_url: rpc_url.to_string(),
        })
    }
}

#[async_trait]
impl HolderProvider for SolanaHolderClient {
    fn supports_chain(&self, chain: &str) -> bool {
        chain.eq_ignore_ascii_case("solana")
    }

    async fn fetch_holder_stats(&self, token: &str) -> Result<Option<HolderStats>> {
        info!("Fetching largest holders for {}", token);
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getTokenLargestAccounts",
            "params": [token, {"commitment": "finalized"}],
        });

        let response = self.client.post(&self.rpc_url).json(&request).send().await?;
        check_status(PROVIDER, response.status())?;
        stats_from_body(&response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accounts(amounts: &[u64]) -> String {
        let value: Vec<_> = amounts
            .iter()
            .map(|a| json!({"address": "acct", "amount": a.to_string(), "decimals": 6}))
            .collect();
        json!({"jsonrpc": "2.0", "id": 1, "result": {"context": {"slot": 1}, "value": value}}).to_string()
    }

    #[test]
    fn test_top10_share_of_returned_accounts() {
        let mut amounts = vec![100; 10];
        amounts.extend([50; 10]);
        let stats = stats_from_body(&accounts(&amounts)).unwrap().unwrap();
        let pct = stats.top10_pct.unwrap();
        assert!((pct - 1000.0 / 1500.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_fewer_than_ten_accounts_is_full_share() {
        let stats = stats_from_body(&accounts(&[7, 3])).unwrap().unwrap();
        assert_eq!(stats.top10_pct, Some(100.0));
    }

    #[test]
    fn test_zero_total_is_unknown() {
        let stats = stats_from_body(&accounts(&[])).unwrap().unwrap();
        assert_eq!(stats.top10_pct, None);
    }

    #[test]
    fn test_rpc_error_is_reported() {
        let body = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"Invalid param: not a Token mint"}}"#;
        assert!(matches!(stats_from_body(body), Err(Error::ApiError(msg)) if msg.contains("-32602")));
    }

    #[test]
    fn test_reply_without_result_is_invalid_data() {
        for body in [r#"{"jsonrpc":"2.0","id":1}"#, r#"{"jsonrpc":"2.0","id":1,"result":null}"#] {
            assert!(matches!(stats_from_body(body), Err(Error::ApiInvalidData(_))));
        }
    }

    #[test]
    fn test_chain_support() {
        let client = SolanaHolderClient::new("http://localhost:8899", Duration::from_secs(1)).unwrap();
        assert!(client.supports_chain("solana"));
        assert!(!client.supports_chain("ethereum"));
    }
}
