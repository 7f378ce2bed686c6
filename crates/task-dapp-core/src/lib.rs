//! Task dApp Core
//!
//! Everything behind the task list view: the EIP-1193 provider adapter,
//! the contract gateway, the reducer store and the loop that keeps the
//! activity log in step with the chain. Nothing here touches the DOM, so
//! the whole crate also builds and tests natively.

pub mod abi;
pub mod chain;
pub mod config;
pub mod error;
pub mod feed;
pub mod gateway;
pub mod models;
pub mod provider;
pub mod reconcile;
pub mod session;
pub mod store;
pub mod wallet;

#[cfg(test)]
mod testing;

pub use config::AppConfig;
pub use error::{Error, Result, RpcError};
pub use gateway::ContractGateway;
pub use models::{ActivityLogEntry, DomainEvent, NoticeEntry, Signer, Task, WalletIdentity};
pub use provider::{ChainProvider, Eip1193, EventHandler, ListenerId, ProviderKind, Sleep};
pub use reconcile::EventReconciler;
pub use session::TaskSession;
pub use store::{Action, AppState, LocalStore, StateStore};
