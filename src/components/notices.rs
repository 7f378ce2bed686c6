//! Notices Component

use leptos::prelude::*;

use crate::store::use_app_store;

/// Most recent notices, newest first
#[component]
pub fn Notices() -> impl IntoView {
    let store = use_app_store();
    let notices = Memo::new(move |_| store.with(|s| s.notices.to_vec()));

    view! {
        <Show when=move || notices.with(|n| !n.is_empty())>
            <ul class="notices">
                {move || notices.get().into_iter().map(|notice| view! {
                    <li class="notice">{notice.text}</li>
                }).collect_view()}
            </ul>
        </Show>
    }
}
