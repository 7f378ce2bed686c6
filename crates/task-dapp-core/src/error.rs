//! Error Types
//!
//! `RpcError` is what a transport reports; `Error` is what the rest of the
//! crate returns.

use thiserror::Error;

/// Error object returned by an EIP-1193 `request` call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (code {code})")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    /// The user dismissed or rejected the wallet prompt
    pub const USER_REJECTED: i64 = 4001;
    /// The requested account or method has not been authorized
    pub const UNAUTHORIZED: i64 = 4100;
    /// JSON-RPC internal error, also used for transport failures
    pub const INTERNAL: i64 = -32603;

    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    /// Failure below the JSON-RPC layer (network, serialization)
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(Self::INTERNAL, message)
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == Self::USER_REJECTED
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("no wallet extension detected")]
    NoWallet,

    #[error("wallet is not connected")]
    NotConnected,

    #[error("task description must not be empty")]
    EmptyDescription,

    #[error("failed to read tasks: {0}")]
    Read(String),

    #[error("transaction failed: {0}")]
    Write(String),

    #[error("log does not match the task contract: {0}")]
    LogDecode(String),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("malformed provider response: {0}")]
    Decode(String),
}

impl Error {
    pub fn read(err: impl std::fmt::Display) -> Self {
        Error::Read(err.to_string())
    }

    /// Wrap a failed submission, keeping the wallet's wording for rejections
    pub fn write(err: Error) -> Self {
        match err {
            Error::Rpc(rpc) if rpc.is_user_rejection() => {
                Error::Write("rejected in wallet".to_string())
            }
            Error::Rpc(rpc) => Error::Write(rpc.message),
            Error::Write(_) | Error::NoWallet | Error::NotConnected | Error::EmptyDescription => err,
            other => Error::Write(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_rejection_maps_to_write() {
        let err = Error::write(Error::Rpc(RpcError::new(4001, "User denied transaction signature.")));
        assert_eq!(err.to_string(), "transaction failed: rejected in wallet");
    }

    #[test]
    fn test_revert_keeps_provider_message() {
        let err = Error::write(Error::Rpc(RpcError::new(3, "execution reverted: unknown task")));
        assert_eq!(err.to_string(), "transaction failed: execution reverted: unknown task");
    }

    #[test]
    fn test_not_connected_passes_through() {
        assert!(matches!(Error::write(Error::NotConnected), Error::NotConnected));
    }
}
