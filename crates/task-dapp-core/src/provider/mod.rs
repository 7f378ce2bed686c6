//! Chain Provider Adapter
//!
//! Typed `eth_*` calls over a single EIP-1193 connection. Nothing is
//! cached; every call goes back to the provider.

mod types;
mod units;

use std::rc::Rc;
use std::time::Duration;

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{Error, Result, RpcError};
use crate::models::Signer;

pub use types::{
    quantity, BlockTag, CallRequest, LogFilter, ProviderMessage, RawLog, SubscriptionFilter,
    SubscriptionPayload, TransactionReceipt, TransactionRequest,
};
pub use units::{format_ether, format_units, ETHER_DECIMALS};

pub type ListenerId = u64;

/// Callback for provider events (`accountsChanged`, `chainChanged`, `message`)
pub type EventHandler = Rc<dyn Fn(Value)>;

/// Async delay, supplied by the host runtime
pub type Sleep = Rc<dyn Fn(Duration) -> LocalBoxFuture<'static, ()>>;

/// EIP-1193 provider object: JSON-RPC requests plus event listeners.
///
/// Single-threaded; implementations may hold JS handles.
#[async_trait(?Send)]
pub trait Eip1193 {
    async fn request(&self, method: &str, params: Value) -> std::result::Result<Value, RpcError>;

    fn on(&self, event: &str, handler: EventHandler) -> ListenerId;

    fn remove_listener(&self, event: &str, id: ListenerId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Injected wallet extension; can sign
    Wallet,
    /// Public endpoint; reads only
    ReadOnly,
}

#[derive(Clone)]
pub struct ChainProvider {
    transport: Rc<dyn Eip1193>,
    kind: ProviderKind,
}

impl ChainProvider {
    pub fn new(transport: Rc<dyn Eip1193>, kind: ProviderKind) -> Self {
        Self { transport, kind }
    }

    pub fn wallet(transport: Rc<dyn Eip1193>) -> Self {
        Self::new(transport, ProviderKind::Wallet)
    }

    pub fn read_only(transport: Rc<dyn Eip1193>) -> Self {
        Self::new(transport, ProviderKind::ReadOnly)
    }

    pub fn has_wallet(&self) -> bool {
        self.kind == ProviderKind::Wallet
    }

    pub fn transport(&self) -> &Rc<dyn Eip1193> {
        &self.transport
    }

    async fn rpc<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        debug!(method, "rpc request");
        let value = self.transport.request(method, params).await?;
        Ok(serde_json::from_value(value)?)
    }

    fn require_wallet(&self) -> Result<()> {
        if self.has_wallet() {
            Ok(())
        } else {
            Err(Error::NoWallet)
        }
    }

    /// Signer for the currently authorized account
    pub async fn get_signer(&self) -> Result<Signer> {
        self.require_wallet()?;
        self.accounts()
            .await?
            .into_iter()
            .next()
            .map(Signer::new)
            .ok_or(Error::NotConnected)
    }

    /// Ask the wallet for account access; this may open a prompt
    pub async fn request_accounts(&self) -> Result<Vec<Address>> {
        self.require_wallet()?;
        self.rpc("eth_requestAccounts", json!([])).await
    }

    /// Accounts already authorized, without prompting
    pub async fn accounts(&self) -> Result<Vec<Address>> {
        self.rpc("eth_accounts", json!([])).await
    }

    pub async fn revoke_permissions(&self) -> Result<()> {
        self.require_wallet()?;
        let _: Value = self
            .rpc("wallet_revokePermissions", json!([{ "eth_accounts": {} }]))
            .await?;
        Ok(())
    }

    /// Chain id currently selected in the wallet
    pub async fn get_network(&self) -> Result<u64> {
        let raw: String = self.rpc("eth_chainId", json!([])).await?;
        quantity::parse(&raw).map_err(Error::Decode)
    }

    pub async fn block_number(&self) -> Result<u64> {
        let raw: String = self.rpc("eth_blockNumber", json!([])).await?;
        quantity::parse(&raw).map_err(Error::Decode)
    }

    /// Native balance in wei; see `format_ether` for display
    pub async fn get_balance(&self, address: Address) -> Result<U256> {
        let raw: String = self.rpc("eth_getBalance", json!([address, "latest"])).await?;
        raw.parse::<U256>()
            .map_err(|e| Error::Decode(format!("balance {:?}: {}", raw, e)))
    }

    pub async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<RawLog>> {
        self.rpc("eth_getLogs", json!([filter])).await
    }

    pub async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let call = CallRequest { to, data };
        self.rpc("eth_call", json!([call, "latest"])).await
    }

    pub async fn send_transaction(&self, signer: &Signer, to: Address, data: Bytes) -> Result<B256> {
        self.require_wallet()?;
        let tx = TransactionRequest { from: signer.address(), to, data };
        self.rpc("eth_sendTransaction", json!([tx])).await
    }

    pub async fn transaction_receipt(&self, hash: B256) -> Result<Option<TransactionReceipt>> {
        self.rpc("eth_getTransactionReceipt", json!([hash])).await
    }

    /// Poll until the transaction is mined. Only a provider error ends the
    /// wait early; there is no local deadline.
    pub async fn wait_for_receipt(&self, hash: B256, sleep: &Sleep, interval: Duration) -> Result<TransactionReceipt> {
        let mut polls: u64 = 0;
        loop {
            if let Some(receipt) = self.transaction_receipt(hash).await? {
                return Ok(receipt);
            }
            polls += 1;
            debug!(%hash, polls, "receipt not available yet");
            sleep(interval).await;
        }
    }

    pub async fn subscribe_logs(&self, filter: &SubscriptionFilter) -> Result<String> {
        self.rpc("eth_subscribe", json!(["logs", filter])).await
    }

    pub async fn unsubscribe(&self, id: &str) -> Result<bool> {
        self.rpc("eth_unsubscribe", json!([id])).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeTransport;
    use alloy_primitives::address;

    #[tokio::test]
    async fn test_read_only_has_no_signer() {
        let fake = Rc::new(FakeTransport::new());
        let provider = ChainProvider::read_only(fake.clone());
        assert!(matches!(provider.get_signer().await, Err(Error::NoWallet)));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_signer_requires_authorized_account() {
        let fake = Rc::new(FakeTransport::new());
        fake.respond("eth_accounts", json!([]));
        let provider = ChainProvider::wallet(fake.clone());
        assert!(matches!(provider.get_signer().await, Err(Error::NotConnected)));

        fake.respond("eth_accounts", json!(["0x00000000000000000000000000000000000000aa"]));
        let signer = provider.get_signer().await.unwrap();
        assert_eq!(signer.address(), address!("00000000000000000000000000000000000000aa"));
    }

    #[tokio::test]
    async fn test_network_and_balance() {
        let fake = Rc::new(FakeTransport::new());
        fake.respond("eth_chainId", json!("0xaa36a7"));
        fake.respond("eth_getBalance", json!("0x14d1120d7b160000"));
        let provider = ChainProvider::wallet(fake.clone());

        assert_eq!(provider.get_network().await.unwrap(), 11155111);
        let balance = provider.get_balance(address!("00000000000000000000000000000000000000aa")).await.unwrap();
        assert_eq!(format_ether(balance), "1.5");
    }

    #[tokio::test]
    async fn test_no_caching() {
        let fake = Rc::new(FakeTransport::new());
        fake.respond("eth_chainId", json!("0x1"));
        let provider = ChainProvider::wallet(fake.clone());
        provider.get_network().await.unwrap();
        provider.get_network().await.unwrap();
        assert_eq!(fake.count("eth_chainId"), 2);
    }

    #[tokio::test]
    async fn test_wait_for_receipt_polls() {
        let fake = Rc::new(FakeTransport::new());
        fake.respond_once("eth_getTransactionReceipt", json!(null));
        fake.respond("eth_getTransactionReceipt", json!({
            "transactionHash": "0x00000000000000000000000000000000000000000000000000000000000000ff",
            "status": "0x1"
        }));
        let provider = ChainProvider::wallet(fake.clone());
        let sleep = crate::testing::instant_sleep();

        let receipt = provider
            .wait_for_receipt(B256::with_last_byte(0xff), &sleep, Duration::from_millis(1))
            .await
            .unwrap();
        assert!(receipt.succeeded());
        assert_eq!(fake.count("eth_getTransactionReceipt"), 2);
    }

    #[tokio::test]
    async fn test_wait_for_receipt_outlasts_slow_blocks() {
        let fake = Rc::new(FakeTransport::new());
        for _ in 0..200 {
            fake.respond_once("eth_getTransactionReceipt", json!(null));
        }
        fake.respond("eth_getTransactionReceipt", json!({
            "transactionHash": "0x00000000000000000000000000000000000000000000000000000000000000ff",
            "status": "0x1"
        }));
        let provider = ChainProvider::wallet(fake.clone());
        let sleep = crate::testing::instant_sleep();

        let receipt = provider
            .wait_for_receipt(B256::with_last_byte(0xff), &sleep, Duration::from_millis(1500))
            .await
            .unwrap();
        assert!(receipt.succeeded());
        assert_eq!(fake.count("eth_getTransactionReceipt"), 201);
    }

    #[tokio::test]
    async fn test_wait_for_receipt_stops_on_provider_error() {
        let fake = Rc::new(FakeTransport::new());
        fake.respond_once("eth_getTransactionReceipt", json!(null));
        fake.fail("eth_getTransactionReceipt", RpcError::transport("connection closed"));
        let provider = ChainProvider::wallet(fake.clone());
        let sleep = crate::testing::instant_sleep();

        let result = provider
            .wait_for_receipt(B256::with_last_byte(0xff), &sleep, Duration::from_millis(1))
            .await;
        assert!(matches!(result, Err(Error::Rpc(_))));
        assert_eq!(fake.count("eth_getTransactionReceipt"), 2);
    }
}
