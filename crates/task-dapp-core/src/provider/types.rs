//! JSON-RPC Payloads
//!
//! Wire shapes for the handful of `eth_*` methods the dApp uses.

use alloy_primitives::{Address, Bytes, B256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Block reference in a log filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    Number(u64),
    Latest,
}

impl Serialize for BlockTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BlockTag::Number(n) => serializer.serialize_str(&format!("{:#x}", n)),
            BlockTag::Latest => serializer.serialize_str("latest"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    pub address: Address,
    pub from_block: BlockTag,
    pub to_block: BlockTag,
    /// One entry per topic position; each entry is an OR-list
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<Vec<B256>>,
}

impl LogFilter {
    /// Everything `address` ever logged, genesis to chain head
    pub fn from_genesis(address: Address) -> Self {
        Self {
            address,
            from_block: BlockTag::Number(0),
            to_block: BlockTag::Latest,
            topics: Vec::new(),
        }
    }

    /// Blocks `from..=to` of `address`
    pub fn range(address: Address, from: u64, to: u64) -> Self {
        Self {
            address,
            from_block: BlockTag::Number(from),
            to_block: BlockTag::Number(to),
            topics: Vec::new(),
        }
    }

    /// Keep only logs whose first topic is one of `signatures`
    pub fn with_event_signatures(mut self, signatures: Vec<B256>) -> Self {
        self.topics = vec![signatures];
        self
    }
}

/// Filter body for `eth_subscribe("logs", ..)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionFilter {
    pub address: Address,
    pub topics: Vec<Vec<B256>>,
}

/// A log record as returned by `eth_getLogs` or pushed by a subscription
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    #[serde(default)]
    pub transaction_hash: Option<B256>,
    #[serde(default, deserialize_with = "quantity::deserialize_opt")]
    pub block_number: Option<u64>,
    #[serde(default, deserialize_with = "quantity::deserialize_opt")]
    pub log_index: Option<u64>,
    /// Set when a reorg dropped the log
    #[serde(default)]
    pub removed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRequest {
    pub to: Address,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    #[serde(default, deserialize_with = "quantity::deserialize_opt")]
    pub block_number: Option<u64>,
    /// 1 on success, 0 on revert; absent on pre-Byzantium chains
    #[serde(default, deserialize_with = "quantity::deserialize_opt")]
    pub status: Option<u64>,
    #[serde(default)]
    pub logs: Vec<RawLog>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status != Some(0)
    }
}

/// `eth_subscription` push delivered through the provider `message` event
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: SubscriptionPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionPayload {
    pub subscription: String,
    pub result: serde_json::Value,
}

/// Hex quantities (`"0x1a"`)
pub mod quantity {
    use super::*;

    pub fn parse(raw: &str) -> Result<u64, String> {
        let digits = raw
            .strip_prefix("0x")
            .ok_or_else(|| format!("quantity {:?} is missing the 0x prefix", raw))?;
        u64::from_str_radix(digits, 16).map_err(|e| format!("quantity {:?}: {}", raw, e))
    }

    pub fn deserialize_opt<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| parse(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}
