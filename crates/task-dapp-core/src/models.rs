//! Domain Models
//!
//! Local copies of contract state plus the feed entries shown to the user.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::abi;

/// Task as stored by the contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: U256,
    pub description: String,
    pub completed: bool,
}

impl From<abi::Task> for Task {
    fn from(task: abi::Task) -> Self {
        Self {
            id: task.id,
            description: task.description,
            completed: task.completed,
        }
    }
}

/// Write capability for one authorized wallet account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signer {
    address: Address,
}

impl Signer {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

/// Who is connected, and where.
///
/// Build it with `connected` or `disconnected` so signer, account and chain
/// are set and cleared together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletIdentity {
    pub signer: Option<Signer>,
    pub account: Option<Address>,
    pub chain_id: Option<u64>,
}

impl WalletIdentity {
    pub fn connected(signer: Signer, chain_id: u64) -> Self {
        Self {
            signer: Some(signer),
            account: Some(signer.address()),
            chain_id: Some(chain_id),
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.signer.is_some() && self.account.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeEntry {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityLogEntry {
    pub text: String,
    pub hash: Option<B256>,
}

/// Contract event, decoded once at the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
    TaskCreated { id: U256, description: String },
    TaskUpdated { id: U256, description: String },
    TaskCompleted { id: U256 },
}

impl DomainEvent {
    /// Text for events arriving on the live subscription
    pub fn live_text(&self) -> String {
        match self {
            DomainEvent::TaskCreated { id, description } => {
                format!("TaskCreated #{}: {}", id, description)
            }
            DomainEvent::TaskUpdated { id, description } => {
                format!("TaskUpdated #{} -> {}", id, description)
            }
            DomainEvent::TaskCompleted { id } => format!("TaskCompleted #{}", id),
        }
    }

    /// Text for events recovered by the historical backfill
    pub fn history_text(&self) -> String {
        match self {
            DomainEvent::TaskCreated { description, .. } if description.is_empty() => {
                "Event TaskCreated".to_string()
            }
            DomainEvent::TaskCreated { description, .. } => {
                format!("Event TaskCreated: {}", description)
            }
            DomainEvent::TaskUpdated { id, description } if description.is_empty() => {
                format!("Event TaskUpdated: #{}", id)
            }
            DomainEvent::TaskUpdated { id, description } => {
                format!("Event TaskUpdated: #{} -> {}", id, description)
            }
            DomainEvent::TaskCompleted { id } => format!("Event TaskCompleted: #{}", id),
        }
    }
}

/// A decoded event together with where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLog {
    pub event: DomainEvent,
    pub transaction_hash: Option<B256>,
}

/// `0x1234…abcd` form of a checksummed address
pub fn short_address(address: &Address) -> String {
    let full = address.to_string();
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}
