//! Scripted EIP-1193 transport for tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use serde_json::{json, Value};

use crate::error::RpcError;
use crate::provider::{Eip1193, EventHandler, ListenerId, RawLog, Sleep};
use crate::store::{Action, AppState, LocalStore, StateStore};

type Reply = Result<Value, RpcError>;

#[derive(Default)]
pub struct FakeTransport {
    /// Replies used once, ahead of the standing ones
    queued: RefCell<HashMap<String, VecDeque<Reply>>>,
    standing: RefCell<HashMap<String, Reply>>,
    calls: RefCell<Vec<(String, Value)>>,
    listeners: RefCell<Vec<(ListenerId, String, EventHandler)>>,
    next_listener: Cell<ListenerId>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: &str, value: Value) {
        self.standing.borrow_mut().insert(method.to_string(), Ok(value));
    }

    pub fn respond_once(&self, method: &str, value: Value) {
        self.queued
            .borrow_mut()
            .entry(method.to_string())
            .or_default()
            .push_back(Ok(value));
    }

    pub fn fail(&self, method: &str, error: RpcError) {
        self.standing.borrow_mut().insert(method.to_string(), Err(error));
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls.borrow().iter().filter(|(m, _)| m == method).count()
    }

    pub fn params_of(&self, method: &str) -> Option<Value> {
        self.calls
            .borrow()
            .iter()
            .rev()
            .find(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.borrow().iter().filter(|(_, e, _)| e == event).count()
    }

    /// Deliver `value` to every handler registered for `event`
    pub fn emit(&self, event: &str, value: Value) {
        let handlers: Vec<EventHandler> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, e, _)| e == event)
            .map(|(_, _, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler(value.clone());
        }
    }
}

#[async_trait(?Send)]
impl Eip1193 for FakeTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        self.calls.borrow_mut().push((method.to_string(), params));
        let queued = self
            .queued
            .borrow_mut()
            .get_mut(method)
            .and_then(|replies| replies.pop_front());
        if let Some(reply) = queued {
            return reply;
        }
        self.standing
            .borrow()
            .get(method)
            .cloned()
            .unwrap_or_else(|| Err(RpcError::new(-32601, format!("method {} not scripted", method))))
    }

    fn on(&self, event: &str, handler: EventHandler) -> ListenerId {
        let id = self.next_listener.get() + 1;
        self.next_listener.set(id);
        self.listeners.borrow_mut().push((id, event.to_string(), handler));
        id
    }

    fn remove_listener(&self, event: &str, id: ListenerId) {
        self.listeners
            .borrow_mut()
            .retain(|(listener, e, _)| !(*listener == id && e == event));
    }
}

pub fn instant_sleep() -> Sleep {
    Rc::new(|_: Duration| -> LocalBoxFuture<'static, ()> { Box::pin(async {}) })
}

/// `LocalStore` that also records every dispatched action
#[derive(Default)]
pub struct RecordingStore {
    inner: LocalStore,
    actions: RefCell<Vec<Action>>,
}

impl RecordingStore {
    pub fn new(state: AppState) -> Self {
        Self { inner: LocalStore::new(state), actions: RefCell::default() }
    }

    pub fn actions(&self) -> Vec<Action> {
        self.actions.borrow().clone()
    }

    pub fn snapshot(&self) -> AppState {
        self.inner.snapshot()
    }
}

impl StateStore for RecordingStore {
    fn dispatch(&self, action: Action) {
        self.actions.borrow_mut().push(action.clone());
        self.inner.dispatch(action);
    }

    fn with_state<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        self.inner.with_state(f)
    }
}

/// `eth_getLogs`-shaped JSON for `log`
pub fn log_json(log: &RawLog) -> Value {
    json!({
        "address": log.address,
        "topics": log.topics,
        "data": log.data,
        "transactionHash": log.transaction_hash,
        "blockNumber": "0x1",
        "logIndex": "0x0",
        "removed": log.removed,
    })
}

/// Provider `message` payload pushing `log` on subscription `id`
pub fn subscription_push(id: &str, log: &RawLog) -> Value {
    json!({
        "type": "eth_subscription",
        "data": { "subscription": id, "result": log_json(log) }
    })
}
