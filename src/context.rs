//! Application Context
//!
//! The session and store, provided to every component via Leptos Context.

use std::future::Future;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use task_dapp_core::{Action, StateStore, TaskSession};

use crate::store::{AppStore, ReactiveStore};

pub type Session = TaskSession<ReactiveStore>;

#[derive(Clone, Copy)]
pub struct AppContext {
    pub store: AppStore,
    /// `None` when there is neither a wallet nor a public endpoint
    session: StoredValue<Option<Rc<Session>>, LocalStorage>,
}

impl AppContext {
    pub fn new(store: AppStore, session: Option<Rc<Session>>) -> Self {
        Self {
            store,
            session: StoredValue::new_local(session),
        }
    }

    pub fn session(&self) -> Option<Rc<Session>> {
        self.session.try_get_value().flatten()
    }

    pub fn has_wallet(&self) -> bool {
        self.session().is_some_and(|session| session.provider().has_wallet())
    }

    /// Run an intent against the session on the local executor
    pub fn spawn<F, Fut>(&self, intent: F)
    where
        F: FnOnce(Rc<Session>) -> Fut,
        Fut: Future<Output = ()> + 'static,
    {
        if let Some(session) = self.session() {
            spawn_local(intent(session));
        }
    }

    pub fn dispatch(&self, action: Action) {
        ReactiveStore(self.store).dispatch(action);
    }
}

pub fn use_app_context() -> AppContext {
    use_context::<AppContext>().expect("AppContext should be provided")
}
