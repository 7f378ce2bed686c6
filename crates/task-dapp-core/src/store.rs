//! Application State Store
//!
//! One state value, changed only by dispatching an `Action`. The transition
//! itself (`AppState::reduce`) is a pure function of the old state and the
//! action.

use std::cell::RefCell;
use std::rc::Rc;

use alloy_primitives::{Address, B256};

use crate::config::AppConfig;
use crate::feed::BoundedFeed;
use crate::models::{ActivityLogEntry, NoticeEntry, Task, WalletIdentity};

pub const NOTICE_CAPACITY: usize = 5;
pub const LOG_CAPACITY: usize = 25;

pub type Notices = BoundedFeed<NoticeEntry, NOTICE_CAPACITY>;
pub type ActivityLog = BoundedFeed<ActivityLogEntry, LOG_CAPACITY>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub identity: WalletIdentity,
    /// Configuration, not touched by any action
    pub contract_address: Address,
    pub tasks: Vec<Task>,
    pub is_loading: bool,
    pub tx_pending: bool,
    pub notices: Notices,
    pub logs: ActivityLog,
    /// Last error text, empty when cleared
    pub error: String,
}

/// Every way the state can change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetIdentity(WalletIdentity),
    SetAccount(Option<Address>),
    SetChainId(Option<u64>),
    SetTasks(Vec<Task>),
    SetLoading(bool),
    SetTxPending(bool),
    /// Replace the activity log, newest first
    SetLogs(Vec<ActivityLogEntry>),
    Notice(String),
    Log { text: String, hash: Option<B256> },
    SetError(String),
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            contract_address: config.contract_address,
            ..Default::default()
        }
    }

    pub fn can_read(&self) -> bool {
        self.contract_address != Address::ZERO
    }

    pub fn can_write(&self) -> bool {
        self.can_read() && self.identity.is_connected()
    }

    pub fn reduce(mut self, action: Action) -> Self {
        match action {
            Action::SetIdentity(identity) => self.identity = identity,
            Action::SetAccount(account) => self.identity.account = account,
            Action::SetChainId(chain_id) => self.identity.chain_id = chain_id,
            Action::SetTasks(tasks) => self.tasks = tasks,
            Action::SetLoading(is_loading) => self.is_loading = is_loading,
            Action::SetTxPending(tx_pending) => self.tx_pending = tx_pending,
            Action::SetLogs(entries) => self.logs.replace(entries),
            Action::Notice(text) => self.notices.push_front(NoticeEntry { text }),
            Action::Log { text, hash } => self.logs.push_front(ActivityLogEntry { text, hash }),
            Action::SetError(error) => self.error = error,
        }
        self
    }
}

/// Holder of the single `AppState`.
///
/// `dispatch` is the only write path; `with_state` gives read access to the
/// current value.
pub trait StateStore {
    fn dispatch(&self, action: Action);

    fn with_state<R>(&self, f: impl FnOnce(&AppState) -> R) -> R;
}

impl<S: StateStore + ?Sized> StateStore for Rc<S> {
    fn dispatch(&self, action: Action) {
        (**self).dispatch(action)
    }

    fn with_state<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        (**self).with_state(f)
    }
}

/// Plain in-memory store for hosts without a reactive runtime
#[derive(Debug, Clone, Default)]
pub struct LocalStore {
    state: Rc<RefCell<AppState>>,
}

impl LocalStore {
    pub fn new(state: AppState) -> Self {
        Self { state: Rc::new(RefCell::new(state)) }
    }

    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }
}

impl StateStore for LocalStore {
    fn dispatch(&self, action: Action) {
        let current = self.state.take();
        *self.state.borrow_mut() = current.reduce(action);
    }

    fn with_state<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.state.borrow())
    }
}

/// Holds `tx_pending` up for as long as it lives
pub struct TxPending<'a, S: StateStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: StateStore + ?Sized> TxPending<'a, S> {
    pub fn acquire(store: &'a S) -> Self {
        store.dispatch(Action::SetTxPending(true));
        Self { store }
    }
}

impl<S: StateStore + ?Sized> Drop for TxPending<'_, S> {
    fn drop(&mut self) {
        self.store.dispatch(Action::SetTxPending(false));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Signer;
    use alloy_primitives::{address, U256};

    fn task(id: u64, description: &str) -> Task {
        Task { id: U256::from(id), description: description.to_string(), completed: false }
    }

    fn reduce_all(actions: impl IntoIterator<Item = Action>) -> AppState {
        actions.into_iter().fold(AppState::default(), AppState::reduce)
    }

    #[test]
    fn test_notices_bounded_newest_first() {
        for count in 0..12 {
            let state = reduce_all((0..count).map(|n| Action::Notice(format!("n{}", n))));
            assert_eq!(state.notices.len(), count.min(NOTICE_CAPACITY));
            let texts: Vec<_> = state.notices.iter().map(|n| n.text.clone()).collect();
            let expected: Vec<_> = (0..count).rev().take(NOTICE_CAPACITY).map(|n| format!("n{}", n)).collect();
            assert_eq!(texts, expected);
        }
    }

    #[test]
    fn test_logs_bounded_newest_first() {
        let state = reduce_all((0..40).map(|n| Action::Log { text: format!("log {}", n), hash: None }));
        assert_eq!(state.logs.len(), LOG_CAPACITY);
        assert_eq!(state.logs.newest().map(|e| e.text.as_str()), Some("log 39"));
        assert_eq!(state.logs.iter().last().map(|e| e.text.as_str()), Some("log 15"));
    }

    #[test]
    fn test_disconnect_keeps_tasks() {
        let signer = Signer::new(address!("00000000000000000000000000000000000000aa"));
        let state = reduce_all([
            Action::SetIdentity(WalletIdentity::connected(signer, 1)),
            Action::SetTasks(vec![task(1, "buy milk")]),
            Action::SetIdentity(WalletIdentity::disconnected()),
        ]);
        assert!(!state.identity.is_connected());
        assert_eq!(state.tasks, vec![task(1, "buy milk")]);
    }

    #[test]
    fn test_fields_independent() {
        let state = reduce_all([
            Action::SetError("boom".into()),
            Action::SetTxPending(true),
            Action::SetTxPending(false),
            Action::SetLoading(false),
        ]);
        assert_eq!(state.error, "boom");
        assert!(!state.tx_pending);

        let cleared = state.reduce(Action::SetError(String::new()));
        assert!(cleared.error.is_empty());
    }

    #[test]
    fn test_account_and_chain_switch() {
        let signer = Signer::new(address!("00000000000000000000000000000000000000aa"));
        let other = address!("00000000000000000000000000000000000000bb");
        let state = reduce_all([
            Action::SetIdentity(WalletIdentity::connected(signer, 1)),
            Action::SetAccount(Some(other)),
            Action::SetChainId(Some(11155111)),
        ]);
        assert_eq!(state.identity.account, Some(other));
        assert_eq!(state.identity.chain_id, Some(11155111));
        assert_eq!(state.identity.signer, Some(signer));
    }

    #[test]
    fn test_tx_pending_guard_releases() {
        let store = LocalStore::default();
        {
            let _pending = TxPending::acquire(&store);
            assert!(store.snapshot().tx_pending);
        }
        assert!(!store.snapshot().tx_pending);
    }

    #[test]
    fn test_set_logs_replaces() {
        let state = reduce_all([
            Action::Log { text: "old".into(), hash: None },
            Action::SetLogs(vec![ActivityLogEntry { text: "fresh".into(), hash: None }]),
        ]);
        assert_eq!(state.logs.len(), 1);
        assert_eq!(state.logs.newest().map(|e| e.text.as_str()), Some("fresh"));
    }
}
