//! Browser Bindings
//!
//! Transports for the core provider seam, plus small browser helpers.

mod clipboard;
mod ethereum;
mod http;
mod timer;

use std::rc::Rc;

use task_dapp_core::{AppConfig, ChainProvider};
use tracing::{info, warn};

pub use clipboard::*;
pub use ethereum::InjectedProvider;
pub use http::HttpTransport;
pub use timer::*;

/// Injected wallet if there is one, else the configured public endpoint
pub fn detect_provider(config: &AppConfig) -> Option<ChainProvider> {
    if let Some(injected) = InjectedProvider::detect() {
        info!("using injected wallet provider");
        return Some(ChainProvider::wallet(Rc::new(injected)));
    }
    match &config.public_rpc_url {
        Some(url) => {
            info!(url = %url, "no wallet detected, reading through public endpoint");
            Some(ChainProvider::read_only(Rc::new(HttpTransport::new(url.clone()))))
        }
        None => {
            warn!("no wallet detected and no public endpoint configured");
            None
        }
    }
}
