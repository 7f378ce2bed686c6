//! Session Configuration
//!
//! Built once by the host and handed to the session. Nothing in the core
//! reads the environment itself.

use std::time::Duration;

use alloy_primitives::{address, Address};
use tracing::warn;

/// Task contract used when no valid address is configured
pub const DEFAULT_CONTRACT_ADDRESS: Address = address!("5f4e91138f7557227fD80c7417c3ecED2A4f9E4b");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Task contract address, fixed for the session
    pub contract_address: Address,
    /// Public JSON-RPC endpoint for read-only mode when no wallet is injected
    pub public_rpc_url: Option<String>,
    /// Delay between `eth_getTransactionReceipt` polls
    pub receipt_poll_interval: Duration,
    /// Delay between `eth_getLogs` polls when the provider cannot push logs
    pub log_poll_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            contract_address: DEFAULT_CONTRACT_ADDRESS,
            public_rpc_url: None,
            receipt_poll_interval: Duration::from_millis(1_500),
            log_poll_interval: Duration::from_secs(4),
        }
    }
}

impl AppConfig {
    /// Use `raw` as the contract address if it is a well-formed hex address,
    /// otherwise keep the default.
    pub fn with_contract_address(mut self, raw: Option<&str>) -> Self {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => match parse_contract_address(raw) {
                Some(address) => self.contract_address = address,
                None => {
                    warn!(value = raw, "ignoring malformed contract address, using default");
                    self.contract_address = DEFAULT_CONTRACT_ADDRESS;
                }
            },
            None => self.contract_address = DEFAULT_CONTRACT_ADDRESS,
        }
        self
    }

    pub fn with_public_rpc_url(mut self, url: Option<&str>) -> Self {
        self.public_rpc_url = url
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        self
    }
}

/// Parse `0x` followed by exactly 40 hex digits. Checksum casing is not
/// enforced.
pub fn parse_contract_address(raw: &str) -> Option<Address> {
    let digits = raw.strip_prefix("0x")?;
    if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    raw.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_address_is_used() {
        let config = AppConfig::default()
            .with_contract_address(Some("0x00000000000000000000000000000000000000aa"));
        assert_eq!(
            config.contract_address,
            address!("00000000000000000000000000000000000000aa")
        );
    }

    #[test]
    fn test_missing_or_malformed_falls_back() {
        for raw in [None, Some(""), Some("5f4e91138f7557227fD80c7417c3ecED2A4f9E4b"), Some("0x1234"), Some("0xZZ4e91138f7557227fD80c7417c3ecED2A4f9E4b")] {
            let config = AppConfig::default().with_contract_address(raw);
            assert_eq!(config.contract_address, DEFAULT_CONTRACT_ADDRESS, "input {:?}", raw);
        }
    }

    #[test]
    fn test_public_rpc_url_trimmed() {
        let config = AppConfig::default().with_public_rpc_url(Some("  https://rpc.sepolia.org "));
        assert_eq!(config.public_rpc_url.as_deref(), Some("https://rpc.sepolia.org"));
        assert_eq!(AppConfig::default().with_public_rpc_url(Some(" ")).public_rpc_url, None);
    }
}
