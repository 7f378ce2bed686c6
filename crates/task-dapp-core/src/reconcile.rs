//! Event Reconciliation
//!
//! For the active contract address the reconciler keeps one live channel
//! and runs a one-shot backfill from genesis. Live events produce a notice
//! and a log entry; backfilled ones only a log entry.
//!
//! The live channel is an `eth_subscribe` push when the provider offers one.
//! Replacing or dropping its `Subscription` guard removes the listener
//! synchronously, so nothing is dispatched for an address that is no longer
//! active. Providers without pub/sub (plain HTTP endpoints, some wallets)
//! are polled with `eth_getLogs` from the last block seen instead; that loop
//! ends as soon as the generation it started under is retired.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use alloy_primitives::Address;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::abi;
use crate::config::AppConfig;
use crate::error::Result;
use crate::gateway::ContractGateway;
use crate::models::{ActivityLogEntry, DecodedLog};
use crate::provider::{
    BlockTag, Eip1193, EventHandler, ListenerId, LogFilter, ProviderMessage, RawLog,
    SubscriptionFilter,
};
use crate::store::{Action, StateStore};

/// Provider event carrying `eth_subscription` pushes
pub const MESSAGE_EVENT: &str = "message";

/// Live log subscription; dropping it detaches the listener
pub struct Subscription {
    transport: Rc<dyn Eip1193>,
    listener: ListenerId,
    remote_id: Rc<RefCell<Option<String>>>,
}

impl Subscription {
    /// Id assigned by the node once `eth_subscribe` has answered
    pub fn remote_id(&self) -> Option<String> {
        self.remote_id.borrow().clone()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.transport.remove_listener(MESSAGE_EVENT, self.listener);
        debug!(listener = self.listener, "live listener removed");
    }
}

enum LiveChannel {
    Pushed(Subscription),
    /// `eth_getLogs` loop running under the current generation
    Polled,
}

pub struct EventReconciler<S: StateStore + 'static> {
    gateway: ContractGateway,
    store: Rc<S>,
    live: RefCell<Option<LiveChannel>>,
    /// Bumped on every retarget/stop; work started under an older value is
    /// discarded
    generation: Cell<u64>,
    poll_interval: Duration,
}

impl<S: StateStore + 'static> EventReconciler<S> {
    pub fn new(gateway: ContractGateway, store: Rc<S>, config: &AppConfig) -> Self {
        Self {
            gateway,
            store,
            live: RefCell::new(None),
            generation: Cell::new(0),
            poll_interval: config.log_poll_interval,
        }
    }

    pub fn is_live(&self) -> bool {
        self.live.borrow().is_some()
    }

    /// Detach the live channel now. Returns the node-side subscription id so
    /// the caller can release it; a polling loop exits on its next tick.
    pub fn stop(&self) -> Option<String> {
        self.generation.set(self.generation.get() + 1);
        let previous = self.live.borrow_mut().take();
        match previous {
            Some(LiveChannel::Pushed(subscription)) => subscription.remote_id(),
            Some(LiveChannel::Polled) | None => None,
        }
    }

    /// Switch to `address`: tear down, attach a live channel, backfill.
    /// Returns the number of historical entries applied.
    ///
    /// When the live channel is a polling loop this only returns after the
    /// reconciler is stopped or retargeted again.
    pub async fn retarget(&self, address: Option<Address>) -> usize {
        let stale = self.stop();
        let generation = self.generation.get();
        if let Some(id) = stale {
            self.release(&id).await;
        }
        let Some(address) = address else {
            return 0;
        };

        // Polling resumes right after the block the backfill stops at
        let poll_from = match self.subscribe(address).await {
            Ok(subscription) if self.generation.get() == generation => {
                self.live.replace(Some(LiveChannel::Pushed(subscription)));
                None
            }
            Ok(subscription) => {
                debug!(%address, "subscription superseded before it was installed");
                let id = subscription.remote_id();
                drop(subscription);
                if let Some(id) = id {
                    self.release(&id).await;
                }
                return 0;
            }
            Err(err) => {
                warn!(%address, error = %err, "log subscription refused, falling back to polling");
                match self.gateway.provider().block_number().await {
                    Ok(_) if self.generation.get() != generation => return 0,
                    Ok(head) => {
                        self.live.replace(Some(LiveChannel::Polled));
                        Some(head)
                    }
                    Err(err) => {
                        warn!(%address, error = %err, "live events unavailable");
                        None
                    }
                }
            }
        };

        let to_block = poll_from.map_or(BlockTag::Latest, BlockTag::Number);
        let applied = match self.backfill_within(address, to_block, generation).await {
            Ok(applied) => applied,
            Err(err) => {
                warn!(%address, error = %err, "failed to fetch historical logs");
                0
            }
        };
        if let Some(head) = poll_from {
            self.poll_logs(address, head, generation).await;
        }
        applied
    }

    /// History of `address` as activity log entries, newest first
    pub async fn history(&self, address: Address) -> Result<Vec<ActivityLogEntry>> {
        let decoded = self.fetch_history(address, BlockTag::Latest).await?;
        Ok(decoded
            .into_iter()
            .rev()
            .map(|log| ActivityLogEntry { text: log.event.history_text(), hash: log.transaction_hash })
            .collect())
    }

    async fn fetch_history(&self, address: Address, to_block: BlockTag) -> Result<Vec<DecodedLog>> {
        let filter = LogFilter { to_block, ..LogFilter::from_genesis(address) };
        let logs = self.gateway.provider().get_logs(&filter).await?;
        let decoded: Vec<_> = logs.iter().filter_map(|log| self.gateway.decode_log(log)).collect();
        debug!(%address, total = logs.len(), decoded = decoded.len(), "history fetched");
        Ok(decoded)
    }

    async fn backfill_within(&self, address: Address, to_block: BlockTag, generation: u64) -> Result<usize> {
        let decoded = self.fetch_history(address, to_block).await?;
        if self.generation.get() != generation {
            debug!(%address, "discarding backfill for inactive address");
            return Ok(0);
        }

        for log in &decoded {
            self.store.dispatch(Action::Log {
                text: log.event.history_text(),
                hash: log.transaction_hash,
            });
        }
        info!(%address, applied = decoded.len(), "backfill finished");
        Ok(decoded.len())
    }

    /// Follow `address` with `eth_getLogs` after block `last_seen` until the
    /// generation moves on
    async fn poll_logs(&self, address: Address, mut last_seen: u64, generation: u64) {
        let provider = self.gateway.provider();
        info!(%address, after = last_seen, "polling for live events");
        loop {
            (self.gateway.sleep())(self.poll_interval).await;
            if self.generation.get() != generation {
                break;
            }
            let head = match provider.block_number().await {
                Ok(head) if head > last_seen => head,
                Ok(_) => continue,
                Err(err) => {
                    debug!(error = %err, "block number unavailable");
                    continue;
                }
            };
            let filter = LogFilter::range(address, last_seen + 1, head)
                .with_event_signatures(abi::event_signatures());
            let logs = match provider.get_logs(&filter).await {
                Ok(logs) => logs,
                Err(err) => {
                    debug!(error = %err, "log poll failed, retrying next tick");
                    continue;
                }
            };
            if self.generation.get() != generation {
                break;
            }
            for log in &logs {
                apply_live(&self.gateway, &*self.store, log);
            }
            last_seen = head;
        }
        debug!(%address, "log polling stopped");
    }

    async fn subscribe(&self, address: Address) -> Result<Subscription> {
        let provider = self.gateway.provider();
        let remote_id = Rc::new(RefCell::new(None));
        let handler = live_handler(self.gateway.clone(), self.store.clone(), remote_id.clone());

        // Pushes that arrive before eth_subscribe answers carry an id we
        // cannot match yet and are dropped; the backfill that follows still
        // records them. If eth_subscribe fails the guard removes the listener.
        let subscription = Subscription {
            transport: provider.transport().clone(),
            listener: provider.transport().on(MESSAGE_EVENT, handler),
            remote_id: remote_id.clone(),
        };
        let filter = SubscriptionFilter {
            address,
            topics: vec![abi::event_signatures()],
        };
        let id = provider.subscribe_logs(&filter).await?;
        info!(%address, subscription = %id, "live events attached");
        *remote_id.borrow_mut() = Some(id);
        Ok(subscription)
    }

    async fn release(&self, id: &str) {
        if let Err(err) = self.gateway.provider().unsubscribe(id).await {
            debug!(subscription = id, error = %err, "eth_unsubscribe failed");
        }
    }
}

/// Notice plus log entry for a log seen live, pushed or polled
fn apply_live<S: StateStore>(gateway: &ContractGateway, store: &S, log: &RawLog) {
    if log.removed {
        debug!(tx = ?log.transaction_hash, "ignoring log removed by reorg");
        return;
    }
    if let Some(decoded) = gateway.decode_log(log) {
        let text = decoded.event.live_text();
        store.dispatch(Action::Notice(text.clone()));
        store.dispatch(Action::Log { text, hash: decoded.transaction_hash });
    }
}

fn live_handler<S: StateStore + 'static>(
    gateway: ContractGateway,
    store: Rc<S>,
    remote_id: Rc<RefCell<Option<String>>>,
) -> EventHandler {
    Rc::new(move |value: Value| {
        let Ok(message) = serde_json::from_value::<ProviderMessage>(value) else {
            return;
        };
        if message.kind != "eth_subscription"
            || remote_id.borrow().as_deref() != Some(message.data.subscription.as_str())
        {
            return;
        }
        match serde_json::from_value::<RawLog>(message.data.result) {
            Ok(log) => apply_live(&gateway, &*store, &log),
            Err(err) => warn!(error = %err, "malformed log in subscription push"),
        }
    })
}
