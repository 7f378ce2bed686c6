//! Build-time Configuration
//!
//! Values baked in by the bundler through environment variables.

use task_dapp_core::AppConfig;

/// `TASK_DAPP_CONTRACT_ADDRESS` and `TASK_DAPP_PUBLIC_RPC`, with defaults
pub fn from_env() -> AppConfig {
    AppConfig::default()
        .with_contract_address(option_env!("TASK_DAPP_CONTRACT_ADDRESS"))
        .with_public_rpc_url(option_env!("TASK_DAPP_PUBLIC_RPC"))
}
