//! Task Session
//!
//! The intents the view forwards (connect, load, create, update, complete)
//! run here. Every failure ends up in the store's error field or in the
//! tracing output; nothing is returned to the caller but a success flag.

use std::future::Future;
use std::rc::Rc;

use alloy_primitives::{Address, U256};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::gateway::ContractGateway;
use crate::models::{short_address, Signer, WalletIdentity};
use crate::provider::{format_ether, ChainProvider, Sleep, TransactionReceipt};
use crate::reconcile::EventReconciler;
use crate::store::{Action, StateStore, TxPending};
use crate::wallet::{self, WalletWatch};

pub struct TaskSession<S: StateStore + 'static> {
    provider: ChainProvider,
    gateway: ContractGateway,
    store: Rc<S>,
    reconciler: EventReconciler<S>,
}

impl<S: StateStore + 'static> TaskSession<S> {
    pub fn new(config: AppConfig, provider: ChainProvider, sleep: Sleep, store: Rc<S>) -> Self {
        let gateway = ContractGateway::new(provider.clone(), sleep, &config);
        let reconciler = EventReconciler::new(gateway.clone(), store.clone(), &config);
        Self { provider, gateway, store, reconciler }
    }

    pub fn provider(&self) -> &ChainProvider {
        &self.provider
    }

    fn contract_address(&self) -> Address {
        self.store.with_state(|state| state.contract_address)
    }

    // ==================== Wallet ====================

    pub async fn connect_wallet(&self) -> bool {
        match wallet::connect(&self.provider).await {
            Ok(identity) => {
                let account = identity.account;
                self.store.dispatch(Action::SetIdentity(identity));
                if let Some(account) = account {
                    self.store
                        .dispatch(Action::Notice(format!("Wallet connected: {}", short_address(&account))));
                }
                true
            }
            Err(err) => {
                warn!(error = %err, "wallet connection failed");
                self.store.dispatch(Action::SetError(err.to_string()));
                false
            }
        }
    }

    /// Restore an earlier authorization without prompting
    pub async fn reconnect(&self) {
        match wallet::reconnect(&self.provider).await {
            Ok(Some(identity)) => self.store.dispatch(Action::SetIdentity(identity)),
            Ok(None) => debug!("no previously authorized account"),
            Err(err) => warn!(error = %err, "silent reconnect failed"),
        }
    }

    /// The identity is only cleared once the wallet has revoked access
    pub async fn disconnect_wallet(&self) {
        if !self.provider.has_wallet() {
            return;
        }
        match wallet::disconnect(&self.provider).await {
            Ok(()) => self.store.dispatch(Action::SetIdentity(WalletIdentity::disconnected())),
            Err(err) => {
                warn!(error = %err, "revoking wallet permissions failed");
                self.store.dispatch(Action::SetError(err.to_string()));
            }
        }
    }

    pub fn watch_wallet(&self) -> Option<WalletWatch> {
        WalletWatch::attach(&self.provider, self.store.clone())
    }

    pub async fn balance_label(&self, account: Address) -> Option<String> {
        match self.provider.get_balance(account).await {
            Ok(wei) => Some(format!("{} ETH", format_ether(wei))),
            Err(err) => {
                debug!(%account, error = %err, "balance unavailable");
                None
            }
        }
    }

    // ==================== Reads ====================

    pub async fn load_tasks(&self) {
        let address = self.contract_address();
        self.store.dispatch(Action::SetLoading(true));
        self.store.dispatch(Action::SetError(String::new()));
        match self.gateway.read_tasks(address).await {
            Ok(tasks) => self.store.dispatch(Action::SetTasks(tasks)),
            Err(err) => {
                warn!(%address, error = %err, "task reload failed");
                self.store.dispatch(Action::SetError(err.to_string()));
            }
        }
        self.store.dispatch(Action::SetLoading(false));
    }

    /// Rebuild the activity log from the contract's history. A failed fetch
    /// leaves the current entries alone.
    pub async fn load_logs(&self) {
        let address = self.contract_address();
        match self.reconciler.history(address).await {
            Ok(entries) => self.store.dispatch(Action::SetLogs(entries)),
            Err(err) => warn!(%address, error = %err, "failed to fetch historical logs"),
        }
    }

    // ==================== Events ====================

    /// Follow `address` live and backfill its history; `None` stops
    pub async fn watch_contract(&self, address: Option<Address>) -> usize {
        self.reconciler.retarget(address).await
    }

    /// Detach the live listener synchronously, for teardown
    pub fn stop_watching(&self) -> Option<String> {
        self.reconciler.stop()
    }

    // ==================== Writes ====================

    pub async fn create_task(&self, description: &str) -> bool {
        if is_blank(description) {
            return false;
        }
        self.write("createTask", |signer, address| async move {
            self.gateway.create_task(&signer, address, description).await
        })
        .await
    }

    pub async fn update_task(&self, id: U256, description: &str) -> bool {
        if is_blank(description) {
            return false;
        }
        self.write("updateTask", |signer, address| async move {
            self.gateway.update_task(&signer, address, id, description).await
        })
        .await
    }

    pub async fn complete_task(&self, id: U256) -> bool {
        self.write("completeTask", |signer, address| async move {
            self.gateway.complete_task(&signer, address, id).await
        })
        .await
    }

    /// Submit under the pending flag, then reload on success
    async fn write<F, Fut>(&self, operation: &str, submit: F) -> bool
    where
        F: FnOnce(Signer, Address) -> Fut,
        Fut: Future<Output = Result<TransactionReceipt>>,
    {
        let Some(signer) = self.store.with_state(|state| state.identity.signer) else {
            self.store.dispatch(Action::SetError(Error::NotConnected.to_string()));
            return false;
        };
        let address = self.contract_address();

        let result = {
            let _pending = TxPending::acquire(&*self.store);
            submit(signer, address).await
        };

        match result {
            Ok(receipt) => {
                info!(operation, tx = %receipt.transaction_hash, "write confirmed");
                self.load_tasks().await;
                true
            }
            Err(err) => {
                warn!(operation, error = %err, "write failed");
                self.store.dispatch(Action::SetError(err.to_string()));
                false
            }
        }
    }
}

fn is_blank(description: &str) -> bool {
    let blank = description.trim().is_empty();
    if blank {
        debug!("ignoring empty task description");
    }
    blank
}
