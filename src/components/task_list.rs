//! Task List Component
//!
//! Tasks as read from the contract, with inline edit and complete.

use alloy_primitives::U256;
use leptos::prelude::*;
use task_dapp_core::Task;

use crate::context::use_app_context;

#[component]
pub fn TaskList() -> impl IntoView {
    let ctx = use_app_context();
    let store = ctx.store;

    let tasks = Memo::new(move |_| store.with(|s| s.tasks.clone()));
    let is_loading = Memo::new(move |_| store.with(|s| s.is_loading));
    // Only one row is edited at a time
    let editing = RwSignal::new(None::<U256>);
    let draft = RwSignal::new(String::new());

    let refresh = move |_| ctx.spawn(|session| async move { session.load_tasks().await });

    view! {
        <section class="task-list">
            <div class="task-list-header">
                <h2>"Tasks"</h2>
                <button
                    class="refresh-btn"
                    disabled=move || is_loading.get() || !store.with(|s| s.can_read())
                    on:click=refresh
                >
                    {move || if is_loading.get() { "Loading..." } else { "Refresh" }}
                </button>
            </div>
            <Show
                when=move || tasks.with(|t| !t.is_empty())
                fallback=|| view! { <p class="empty">"No tasks yet"</p> }
            >
                <ul class="task-rows">
                    <For
                        each=move || tasks.get()
                        key=|task| (task.id, task.completed, task.description.clone())
                        let:task
                    >
                        <TaskRow task=task editing=editing draft=draft />
                    </For>
                </ul>
            </Show>
        </section>
    }
}

#[component]
fn TaskRow(task: Task, editing: RwSignal<Option<U256>>, draft: RwSignal<String>) -> impl IntoView {
    let ctx = use_app_context();
    let store = ctx.store;

    let id = task.id;
    let completed = task.completed;
    let description = task.description;
    let is_editing = move || editing.get() == Some(id);
    let locked = move || store.with(|s| !s.can_write() || s.tx_pending);

    let start_edit = {
        let description = description.clone();
        move |_| {
            draft.set(description.clone());
            editing.set(Some(id));
        }
    };
    let save_edit = move |_| {
        let text = draft.get_untracked();
        if text.trim().is_empty() { return; }
        ctx.spawn(move |session| async move {
            if session.update_task(id, &text).await {
                editing.set(None);
                draft.set(String::new());
            }
        });
    };
    let complete = move |_| ctx.spawn(move |session| async move {
        session.complete_task(id).await;
    });

    view! {
        <li class=if completed { "task-row completed" } else { "task-row" }>
            <span class="task-id">"#" {id.to_string()}</span>
            <Show
                when=is_editing
                fallback=move || view! { <span class="task-description">{description.clone()}</span> }
            >
                <input
                    type="text"
                    class="task-edit-input"
                    prop:value=move || draft.get()
                    on:input=move |ev| draft.set(event_target_value(&ev))
                />
                <button class="save-btn" disabled=locked on:click=save_edit>"Save"</button>
                <button class="cancel-btn" on:click=move |_| editing.set(None)>"Cancel"</button>
            </Show>
            {(!completed).then(|| view! {
                <button class="edit-btn" disabled=locked on:click=start_edit>"Edit"</button>
                <button class="complete-btn" disabled=locked on:click=complete>"Complete"</button>
            })}
        </li>
    }
}
