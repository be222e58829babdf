//! Error types for the chain gateway

use alloy::primitives::TxHash;
use thiserror::Error;

/// Failures reported by the wallet / chain reader capability
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// No signing account is available
    #[error("Wallet not connected")]
    NotConnected,

    /// The wallet refused to sign or the node refused the signed transaction
    ///
    /// This covers gas-estimation reverts, nonce conflicts and signer
    /// failures; the message is surfaced to the user verbatim.
    #[error("{0}")]
    Rejected(String),

    /// Transport or node error on a read
    #[error("RPC error: {0}")]
    Rpc(String),

    /// No receipt arrived within the configured window
    #[error("Timed out after {waited_secs}s waiting for receipt of {tx}")]
    Timeout { tx: TxHash, waited_secs: u64 },

    #[error("Unsupported chain id {0}")]
    UnsupportedChain(u64),

    /// The target contract address is the zero-address sentinel
    #[error("{0} contract not deployed")]
    NotDeployed(&'static str),

    /// Returned bytes did not match the ABI
    #[error("Decode error: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Whether a later poll might succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Rpc(_) => true,
            Self::Timeout { .. } => true,

            Self::NotConnected => false,
            Self::Rejected(_) => false,
            Self::UnsupportedChain(_) => false,
            Self::NotDeployed(_) => false,
            Self::Decode(_) => false,
        }
    }

    /// Error category for metrics and logs
    pub fn category(&self) -> &'static str {
        match self {
            Self::NotConnected => "session",
            Self::Rejected(_) => "wallet",
            Self::Rpc(_) => "rpc",
            Self::Timeout { .. } => "timeout",
            Self::UnsupportedChain(_) => "chain",
            Self::NotDeployed(_) => "config",
            Self::Decode(_) => "decode",
        }
    }

    pub fn rpc(err: impl std::fmt::Display) -> Self {
        Self::Rpc(err.to_string())
    }

    pub fn rejected(err: impl std::fmt::Display) -> Self {
        Self::Rejected(err.to_string())
    }
}
