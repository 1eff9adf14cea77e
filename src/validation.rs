use crate::error::{Error, Result};

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

fn is_solana_mint(address: &str) -> bool {
    (32..=44).contains(&address.len()) && address.chars().all(|c| BASE58_ALPHABET.contains(c))
}

fn is_evm_address(address: &str) -> bool {
    address
        .strip_prefix("0x")
        .map_or(false, |hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Accepts a base58 Solana mint or a `0x`-prefixed EVM address and returns it
/// trimmed.
pub fn validate_token_address(address: &str) -> Result<&str> {
    let address = address.trim();
    if address.is_empty() {
        return Err(Error::ValidationError("Token address cannot be empty".to_string()));
    }
    if !is_solana_mint(address) && !is_evm_address(address) {
        return Err(Error::ValidationError(format!(
            "'{}' is neither a Solana mint nor a 0x-prefixed EVM address",
            address
        )));
    }
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_solana_and_evm() {
        assert!(validate_token_address("DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263").is_ok());
        assert!(validate_token_address("So11111111111111111111111111111111111111112").is_ok());
        assert_eq!(
            validate_token_address("  0x6982508145454Ce325dDbE47a25d4ec3d2311933 ").unwrap(),
            "0x6982508145454Ce325dDbE47a25d4ec3d2311933"
        );
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(matches!(validate_token_address(""), Err(Error::ValidationError(_))));
        assert!(validate_token_address("0x1234").is_err());
        // 0, O, I and l are not base58.
        assert!(validate_token_address("0OIl0OIl0OIl0OIl0OIl0OIl0OIl0OIl0OIl").is_err());
        assert!(validate_token_address("bonk").is_err());
    }
}
