//! Global Application State Store
//!
//! The core `AppState` held in a Leptos `reactive_stores::Store`, so views
//! re-render on dispatch.

use leptos::prelude::*;
use reactive_stores::Store;
use task_dapp_core::{Action, AppState, StateStore};
use tracing::debug;

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// `StateStore` over the reactive store; the session dispatches through it
#[derive(Clone, Copy)]
pub struct ReactiveStore(pub AppStore);

impl StateStore for ReactiveStore {
    fn dispatch(&self, action: Action) {
        debug!(?action, "dispatch");
        self.0.update(|state| {
            let current = std::mem::take(state);
            *state = current.reduce(action);
        });
    }

    fn with_state<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        self.0.with_untracked(f)
    }
}

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}
