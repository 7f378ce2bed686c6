//! Wallet Lifecycle
//!
//! Connecting, silent reconnection at startup, disconnecting, and following
//! account/network switches made inside the wallet.

use std::rc::Rc;

use alloy_primitives::Address;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{Signer, WalletIdentity};
use crate::provider::{quantity, ChainProvider, Eip1193, ListenerId};
use crate::store::{Action, StateStore};

pub const ACCOUNTS_CHANGED: &str = "accountsChanged";
pub const CHAIN_CHANGED: &str = "chainChanged";

/// Ask the wallet for access and read the selected chain
pub async fn connect(provider: &ChainProvider) -> Result<WalletIdentity> {
    let account = provider
        .request_accounts()
        .await?
        .into_iter()
        .next()
        .ok_or(Error::NotConnected)?;
    let chain_id = provider.get_network().await?;
    info!(%account, chain_id, "wallet connected");
    Ok(WalletIdentity::connected(Signer::new(account), chain_id))
}

/// Identity for an account authorized in an earlier visit, without
/// prompting. `None` when nothing is authorized or there is no wallet.
pub async fn reconnect(provider: &ChainProvider) -> Result<Option<WalletIdentity>> {
    if !provider.has_wallet() {
        return Ok(None);
    }
    let signer = match provider.get_signer().await {
        Ok(signer) => signer,
        Err(Error::NotConnected) => return Ok(None),
        Err(err) => return Err(err),
    };
    let chain_id = provider.get_network().await?;
    info!(account = %signer.address(), chain_id, "wallet reconnected");
    Ok(Some(WalletIdentity::connected(signer, chain_id)))
}

/// Revoke the dApp's account permission in the wallet
pub async fn disconnect(provider: &ChainProvider) -> Result<()> {
    provider.revoke_permissions().await?;
    info!("wallet permissions revoked");
    Ok(())
}

/// Keeps `accountsChanged` / `chainChanged` listeners attached while alive
pub struct WalletWatch {
    transport: Rc<dyn Eip1193>,
    accounts: ListenerId,
    chain: ListenerId,
}

impl WalletWatch {
    /// `None` for a read-only provider, which has no wallet events
    pub fn attach<S: StateStore + 'static>(provider: &ChainProvider, store: Rc<S>) -> Option<Self> {
        if !provider.has_wallet() {
            return None;
        }
        let transport = provider.transport().clone();

        let accounts_store = store.clone();
        let accounts = transport.on(
            ACCOUNTS_CHANGED,
            Rc::new(move |value: Value| accounts_store.dispatch(accounts_action(&value))),
        );
        let chain = transport.on(
            CHAIN_CHANGED,
            Rc::new(move |value: Value| store.dispatch(Action::SetChainId(parse_chain_id(&value)))),
        );
        Some(Self { transport, accounts, chain })
    }
}

impl Drop for WalletWatch {
    fn drop(&mut self) {
        self.transport.remove_listener(ACCOUNTS_CHANGED, self.accounts);
        self.transport.remove_listener(CHAIN_CHANGED, self.chain);
    }
}

/// An empty account list means the wallet revoked access
fn accounts_action(value: &Value) -> Action {
    let first = serde_json::from_value::<Vec<Address>>(value.clone())
        .ok()
        .and_then(|accounts| accounts.into_iter().next());
    match first {
        Some(account) => {
            debug!(%account, "wallet switched account");
            Action::SetAccount(Some(account))
        }
        None => {
            info!("wallet revoked account access");
            Action::SetIdentity(WalletIdentity::disconnected())
        }
    }
}

fn parse_chain_id(value: &Value) -> Option<u64> {
    let chain_id = match value {
        Value::String(raw) => quantity::parse(raw).ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    };
    chain_id.filter(|id| *id != 0)
}
