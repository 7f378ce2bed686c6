//! Activity Log Component
//!
//! Decoded contract events, newest first, linked to the block explorer
//! when the network has one.

use leptos::prelude::*;
use task_dapp_core::chain::transaction_url;

use crate::context::use_app_context;
use crate::store::use_app_store;

#[component]
pub fn ActivityLog() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();
    let can_read = Memo::new(move |_| store.with(|s| s.can_read()));
    let chain_id = Memo::new(move |_| store.with(|s| s.identity.chain_id));
    let entries = Memo::new(move |_| store.with(|s| s.logs.to_vec()));

    view! {
        <section class="activity-log">
            <div class="log-header">
                <h2>"Activity"</h2>
                <button
                    class="reload-btn"
                    disabled=move || !can_read.get()
                    on:click=move |_| ctx.spawn(|session| async move {
                        session.load_logs().await;
                    })
                >
                    "Reload"
                </button>
            </div>
            <Show
                when=move || entries.with(|e| !e.is_empty())
                fallback=|| view! { <p class="empty">"No events yet"</p> }
            >
                <ul class="log-entries">
                    {move || entries.get().into_iter().map(|entry| {
                        let link = entry.hash.and_then(|hash| transaction_url(chain_id.get(), &hash));
                        view! {
                            <li class="log-entry">
                                <span class="log-text">{entry.text}</span>
                                {link.map(|url| view! {
                                    <a class="log-link" href=url target="_blank" rel="noreferrer">"View tx"</a>
                                })}
                            </li>
                        }
                    }).collect_view()}
                </ul>
            </Show>
        </section>
    }
}
