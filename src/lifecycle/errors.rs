//! Error taxonomy for the transaction lifecycle
//!
//! - [`Rejection`]: a local precondition failed; nothing was sent
//! - [`LifecycleError::Wallet`]: the wallet or node refused the write
//! - [`LifecycleError::Reverted`]: the transaction was mined and failed
//! - [`LifecycleError::Observe`]: the receipt could not be obtained
//!
//! None of these are retried automatically; the user re-initiates.

use crate::gateway::GatewayError;
use alloy::primitives::{TxHash, U256};
use thiserror::Error;

/// Maximum message length accepted by the vault panel, in characters
pub const MAX_MESSAGE_CHARS: usize = 280;

/// User-correctable precondition failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("Please connect your wallet")]
    NotConnected,

    /// The panel's contract address is the zero-address sentinel
    #[error("{contract} contract not deployed yet")]
    ContractNotDeployed { contract: &'static str },

    #[error("Mint limit reached ({limit} per wallet)")]
    MintLimitReached { limit: U256 },

    #[error("Max supply reached!")]
    MaxSupplyReached,

    #[error("Please enter a message")]
    EmptyMessage,

    #[error("Message too long (max {max} characters, got {len})")]
    MessageTooLong { len: usize, max: usize },

    #[error("Please enter a valid amount")]
    InvalidAmount,

    #[error("Insufficient balance")]
    InsufficientBalance,
}

impl Rejection {
    /// Stable reason code for metrics and scripting
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::NotConnected => "not_connected",
            Self::ContractNotDeployed { .. } => "contract_not_deployed",
            Self::MintLimitReached { .. } => "mint_limit_reached",
            Self::MaxSupplyReached => "max_supply_reached",
            Self::EmptyMessage => "empty_message",
            Self::MessageTooLong { .. } => "message_too_long",
            Self::InvalidAmount => "invalid_amount",
            Self::InsufficientBalance => "insufficient_balance",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("{0}")]
    Rejected(#[from] Rejection),

    /// A previous transaction on this panel has not reached a terminal state
    #[error("A transaction is already in progress")]
    Busy,

    #[error("{0}")]
    Wallet(GatewayError),

    #[error("Transaction {tx} failed on-chain")]
    Reverted { tx: TxHash },

    #[error("Could not confirm transaction {tx}: {source}")]
    Observe {
        tx: TxHash,
        #[source]
        source: GatewayError,
    },
}

impl LifecycleError {
    /// Error category for metrics and observability
    pub fn category(&self) -> &'static str {
        match self {
            Self::Rejected(_) => "precondition",
            Self::Busy => "busy",
            Self::Wallet(_) => "wallet",
            Self::Reverted { .. } => "reverted",
            Self::Observe { .. } => "observe",
        }
    }

    /// Transaction hash, if the write got as far as the chain
    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            Self::Reverted { tx } | Self::Observe { tx, .. } => Some(*tx),
            _ => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(r) => Some(r),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_display() {
        assert_eq!(Rejection::MaxSupplyReached.to_string(), "Max supply reached!");
        assert_eq!(
            Rejection::MintLimitReached { limit: U256::from(5) }.to_string(),
            "Mint limit reached (5 per wallet)"
        );
        assert_eq!(
            Rejection::ContractNotDeployed { contract: "StorageVault" }.to_string(),
            "StorageVault contract not deployed yet"
        );
        assert_eq!(
            Rejection::MessageTooLong { len: 281, max: MAX_MESSAGE_CHARS }.to_string(),
            "Message too long (max 280 characters, got 281)"
        );
    }

    #[test]
    fn test_categories_and_hashes() {
        let err = LifecycleError::from(Rejection::InsufficientBalance);
        assert_eq!(err.category(), "precondition");
        assert_eq!(err.rejection(), Some(&Rejection::InsufficientBalance));
        assert_eq!(err.tx_hash(), None);

        let tx = TxHash::repeat_byte(0x11);
        let err = LifecycleError::Reverted { tx };
        assert_eq!(err.category(), "reverted");
        assert_eq!(err.tx_hash(), Some(tx));
    }

    #[test]
    fn test_wallet_message_passes_through() {
        let err = LifecycleError::Wallet(GatewayError::Rejected("User rejected the request.".into()));
        assert_eq!(err.to_string(), "User rejected the request.");
    }
}
