//! Wallet Bar Component
//!
//! Network, account and balance, with connect/disconnect controls.

use leptos::prelude::*;
use leptos::task::spawn_local;
use task_dapp_core::chain::chain_label;
use tracing::warn;

use crate::commands;
use crate::context::use_app_context;

#[component]
pub fn WalletBar() -> impl IntoView {
    let ctx = use_app_context();
    let store = ctx.store;

    let account = Memo::new(move |_| store.with(|s| s.identity.account));
    let chain_id = Memo::new(move |_| store.with(|s| s.identity.chain_id));
    let tx_pending = Memo::new(move |_| store.with(|s| s.tx_pending));
    let (balance, set_balance) = signal::<Option<String>>(None);

    // Balance follows the account and is refreshed once a write settles
    Effect::new(move |_| {
        let requested = account.get();
        if tx_pending.get() {
            return;
        }
        ctx.spawn(move |session| async move {
            let label = match requested {
                Some(address) => session.balance_label(address).await,
                None => None,
            };
            if account.get_untracked() == requested {
                set_balance.set(label);
            }
        });
    });

    let network = move || {
        let label = chain_label(chain_id.get());
        if label.is_empty() { "Unknown".to_string() } else { label }
    };
    let account_text = move || {
        account
            .get()
            .map(|address| address.to_string())
            .unwrap_or_else(|| "Not connected".to_string())
    };

    view! {
        <div class="wallet-bar">
            <div class="wallet-info">
                <div class="wallet-field">
                    <span class="wallet-label">"Network"</span>
                    <span class="wallet-value">{network}</span>
                </div>
                <div class="wallet-field">
                    <span class="wallet-label">"Account"</span>
                    <span class="wallet-value mono" title=account_text>{account_text}</span>
                </div>
                {move || balance.get().map(|label| view! {
                    <div class="wallet-field">
                        <span class="wallet-label balance">"Balance"</span>
                        <span class="wallet-value balance">{label}</span>
                    </div>
                })}
            </div>

            <div class="wallet-actions">
                <Show
                    when=move || account.get().is_some()
                    fallback=move || view! {
                        <button
                            class="wallet-btn"
                            disabled=move || !ctx.has_wallet()
                            title=move || if ctx.has_wallet() { "" } else { "No wallet extension detected" }
                            on:click=move |_| ctx.spawn(|session| async move {
                                session.connect_wallet().await;
                            })
                        >
                            "Connect Wallet"
                        </button>
                    }
                >
                    <button
                        class="wallet-btn"
                        on:click=move |_| ctx.spawn(|session| async move {
                            session.disconnect_wallet().await;
                        })
                    >
                        "Disconnect"
                    </button>
                    <button
                        class="copy-btn"
                        on:click=move |_| {
                            if let Some(address) = account.get_untracked() {
                                spawn_local(async move {
                                    if let Err(e) = commands::copy_text(&address.to_string()).await {
                                        warn!(error = %e, "copy failed");
                                    }
                                });
                            }
                        }
                    >
                        "Copy"
                    </button>
                </Show>
            </div>
        </div>
    }
}
