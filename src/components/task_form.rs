//! Task Form Component
//!
//! Input for creating a new task.

use leptos::prelude::*;

use crate::context::use_app_context;

#[component]
pub fn TaskForm() -> impl IntoView {
    let ctx = use_app_context();
    let store = ctx.store;

    let (new_text, set_new_text) = signal(String::new());
    let submitting = move || store.with(|s| s.tx_pending);
    let disabled = move || store.with(|s| !s.can_write() || s.tx_pending);

    let create_task = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let text = new_text.get();
        if text.trim().is_empty() { return; }
        ctx.spawn(move |session| async move {
            if session.create_task(&text).await {
                set_new_text.set(String::new());
            }
        });
    };

    view! {
        <form class="task-form" on:submit=create_task>
            <input
                type="text"
                placeholder="Describe a new task..."
                prop:value=move || new_text.get()
                disabled=disabled
                on:input=move |ev| set_new_text.set(event_target_value(&ev))
            />
            <button type="submit" disabled=move || disabled() || new_text.with(|t| t.trim().is_empty())>
                {move || if submitting() { "Submitting..." } else { "Add Task" }}
            </button>
        </form>
    }
}
