//! UI Components
//!
//! Leptos views over the app store.

mod activity_log;
mod error_banner;
mod notices;
mod task_form;
mod task_list;
mod wallet_bar;

pub use activity_log::ActivityLog;
pub use error_banner::ErrorBanner;
pub use notices::Notices;
pub use task_form::TaskForm;
pub use task_list::TaskList;
pub use wallet_bar::WalletBar;
