//! Task dApp Frontend App
//!
//! Builds the session from the detected provider and lays out the page.

use std::rc::Rc;

use leptos::prelude::*;
use reactive_stores::Store;
use task_dapp_core::{Action, AppState, Error, StateStore, TaskSession};

use crate::commands;
use crate::components::{ActivityLog, ErrorBanner, Notices, TaskForm, TaskList, WalletBar};
use crate::config;
use crate::context::AppContext;
use crate::store::{AppStore, ReactiveStore};

#[component]
pub fn App() -> impl IntoView {
    let config = config::from_env();
    let store: AppStore = Store::new(AppState::new(&config));

    let session = commands::detect_provider(&config).map(|provider| {
        Rc::new(TaskSession::new(
            config.clone(),
            provider,
            commands::browser_sleep(),
            Rc::new(ReactiveStore(store)),
        ))
    });
    if session.is_none() {
        ReactiveStore(store).dispatch(Action::SetError(Error::NoWallet.to_string()));
    }

    let ctx = AppContext::new(store, session);
    provide_context(store);
    provide_context(ctx);

    // Follow account/network switches made in the wallet
    let wallet_watch = StoredValue::new_local(ctx.session().and_then(|session| session.watch_wallet()));
    on_cleanup(move || {
        wallet_watch.try_update_value(|watch| watch.take());
    });

    // Restore an earlier authorization without prompting
    ctx.spawn(|session| async move { session.reconnect().await });

    // Load tasks and attach events whenever the active contract changes
    let active_contract = Memo::new(move |_| {
        store.with(|s| s.can_read().then_some(s.contract_address))
    });
    Effect::new(move |_| {
        let address = active_contract.get();
        if address.is_none() {
            ReactiveStore(store).dispatch(Action::SetTasks(Vec::new()));
        }
        ctx.spawn(move |session| async move {
            if address.is_some() {
                session.load_tasks().await;
            }
            session.watch_contract(address).await;
        });
    });
    on_cleanup(move || {
        if let Some(session) = ctx.session() {
            session.stop_watching();
        }
    });

    view! {
        <div class="app-layout">
            <h1 class="app-title">"Task dApp"</h1>

            <WalletBar />
            <ErrorBanner />
            <Notices />

            <main class="main-grid">
                <div class="main-column">
                    <TaskForm />
                    <TaskList />
                </div>
                <aside class="side-column">
                    <ActivityLog />
                </aside>
            </main>
        </div>
    }
}
