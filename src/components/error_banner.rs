//! Error Banner Component
//!
//! Shows the last error until it is dismissed or the next read clears it.

use leptos::prelude::*;
use task_dapp_core::{Action, StateStore};

use crate::store::{use_app_store, ReactiveStore};

#[component]
pub fn ErrorBanner() -> impl IntoView {
    let store = use_app_store();
    let error = Memo::new(move |_| store.with(|s| s.error.clone()));

    view! {
        <Show when=move || error.with(|e| !e.is_empty())>
            <div class="error-banner" role="alert">
                <span class="error-text">{move || error.get()}</span>
                <button
                    class="dismiss-btn"
                    on:click=move |_| ReactiveStore(store).dispatch(Action::SetError(String::new()))
                >
                    "×"
                </button>
            </div>
        </Show>
    }
}
