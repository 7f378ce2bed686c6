//! Chain Metadata
//!
//! Display names and block explorers for well-known networks.

use alloy_primitives::B256;

struct KnownChain {
    id: u64,
    label: &'static str,
    explorer: Option<&'static str>,
}

const KNOWN_CHAINS: &[KnownChain] = &[
    KnownChain { id: 1, label: "Ethereum", explorer: Some("https://etherscan.io") },
    KnownChain { id: 10, label: "Optimism", explorer: Some("https://optimistic.etherscan.io") },
    KnownChain { id: 137, label: "Polygon", explorer: Some("https://polygonscan.com") },
    KnownChain { id: 8453, label: "Base", explorer: Some("https://basescan.org") },
    KnownChain { id: 17000, label: "Holesky", explorer: Some("https://holesky.etherscan.io") },
    KnownChain { id: 31337, label: "Localhost", explorer: None },
    KnownChain { id: 42161, label: "Arbitrum One", explorer: Some("https://arbiscan.io") },
    KnownChain { id: 11155111, label: "Sepolia", explorer: Some("https://sepolia.etherscan.io") },
];

fn lookup(chain_id: u64) -> Option<&'static KnownChain> {
    KNOWN_CHAINS.iter().find(|chain| chain.id == chain_id)
}

/// Empty when no chain is known yet
pub fn chain_label(chain_id: Option<u64>) -> String {
    match chain_id {
        Some(id) => lookup(id)
            .map(|chain| chain.label.to_string())
            .unwrap_or_else(|| format!("Chain {}", id)),
        None => String::new(),
    }
}

pub fn explorer_base(chain_id: Option<u64>) -> Option<&'static str> {
    chain_id.and_then(lookup).and_then(|chain| chain.explorer)
}

pub fn transaction_url(chain_id: Option<u64>, hash: &B256) -> Option<String> {
    explorer_base(chain_id).map(|base| format!("{}/tx/{}", base, hash))
}
