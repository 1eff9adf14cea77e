use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Score a token and suggest entry and exit levels", long_about = None)]
pub struct Cli {
    /// Token address: a Solana mint or a 0x-prefixed EVM address
    pub token: String,

    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Birdeye API key, enables chart signals
    #[arg(long)]
    pub birdeye_key: Option<String>,

    /// Helius API key, enables holder concentration on Solana
    #[arg(long)]
    pub helius_key: Option<String>,

    /// Solana RPC endpoint; takes precedence over the Helius key
    #[arg(long)]
    pub rpc_url: Option<String>,
}

impl Cli {
    /// Flags win over file and environment values. Blank flags disable the provider.
    pub fn apply_overrides(&self, config: &mut crate::config::Config) {
        if let Some(key) = &self.birdeye_key {
            config.api.birdeye_api_key = Some(key.clone());
        }
        if let Some(key) = &self.helius_key {
            config.api.helius_api_key = Some(key.clone());
        }
        if let Some(url) = &self.rpc_url {
            config.api.solana_rpc_url = Some(url.clone());
        }
        config.api.normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_parses_flags() {
        let cli = Cli::try_parse_from([
            "token-scout",
            "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263",
            "--json",
            "--birdeye-key",
            "abc",
            "--rpc-url",
            "http://localhost:8899",
        ])
        .unwrap();
        assert!(cli.json);
        assert!(!cli.debug);

        let mut config = Config::default();
        config.api.birdeye_api_key = Some("from-env".into());
        cli.apply_overrides(&mut config);
        assert_eq!(config.api.birdeye_api_key.as_deref(), Some("abc"));
        assert_eq!(config.api.holder_rpc_url().as_deref(), Some("http://localhost:8899"));
    }

    #[test]
    fn test_blank_flags_do_not_enable_providers() {
        let cli = Cli::try_parse_from([
            "token-scout",
            "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263",
            "--birdeye-key",
            "",
            "--rpc-url",
            " ",
        ])
        .unwrap();

        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.api.birdeye_api_key, None);
        assert_eq!(config.api.holder_rpc_url(), None);
    }

    #[test]
    fn test_token_is_required() {
        assert!(Cli::try_parse_from(["token-scout", "--json"]).is_err());
    }
}
