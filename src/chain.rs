//! Supported Base networks

use alloy::primitives::TxHash;
use serde::{Deserialize, Serialize};

/// Chain id of Base mainnet
pub const BASE_MAINNET_ID: u64 = 8453;

/// Chain id of Base Sepolia testnet
pub const BASE_SEPOLIA_ID: u64 = 84532;

/// The two networks this client knows how to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupportedChain {
    Base,
    BaseSepolia,
}

impl SupportedChain {
    /// Resolve a configured chain id.
    ///
    /// Anything other than Base mainnet falls back to Base Sepolia.
    pub fn from_id(id: u64) -> Self {
        match id {
            BASE_MAINNET_ID => Self::Base,
            BASE_SEPOLIA_ID => Self::BaseSepolia,
            other => {
                tracing::warn!(
                    chain_id = other,
                    "Unknown chain id, falling back to Base Sepolia"
                );
                Self::BaseSepolia
            }
        }
    }

    /// Strict lookup used when the caller asks to switch networks
    pub fn try_from_id(id: u64) -> Option<Self> {
        match id {
            BASE_MAINNET_ID => Some(Self::Base),
            BASE_SEPOLIA_ID => Some(Self::BaseSepolia),
            _ => None,
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            Self::Base => BASE_MAINNET_ID,
            Self::BaseSepolia => BASE_SEPOLIA_ID,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Base => "Base",
            Self::BaseSepolia => "Base Sepolia",
        }
    }

    pub fn explorer_url(&self) -> &'static str {
        match self {
            Self::Base => "https://basescan.org",
            Self::BaseSepolia => "https://sepolia.basescan.org",
        }
    }

    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Self::Base => "https://mainnet.base.org",
            Self::BaseSepolia => "https://sepolia.base.org",
        }
    }

    /// Block explorer link for a transaction
    pub fn tx_url(&self, hash: &TxHash) -> String {
        format!("{}/tx/{}", self.explorer_url(), hash)
    }
}

impl std::fmt::Display for SupportedChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_ids() {
        assert_eq!(SupportedChain::from_id(8453), SupportedChain::Base);
        assert_eq!(SupportedChain::from_id(84532), SupportedChain::BaseSepolia);
        assert_eq!(SupportedChain::Base.id(), BASE_MAINNET_ID);
    }

    #[test]
    fn test_unknown_id_falls_back_to_sepolia() {
        assert_eq!(SupportedChain::from_id(1), SupportedChain::BaseSepolia);
        assert!(SupportedChain::try_from_id(1).is_none());
    }

    #[test]
    fn test_tx_url() {
        let hash = TxHash::repeat_byte(0xab);
        let url = SupportedChain::BaseSepolia.tx_url(&hash);
        assert!(url.starts_with("https://sepolia.basescan.org/tx/0xabab"));
    }

    #[test]
    fn test_display_carries_id_once() {
        assert_eq!(SupportedChain::BaseSepolia.to_string(), "Base Sepolia (84532)");
        assert_eq!(SupportedChain::Base.to_string().matches("8453").count(), 1);
    }
}
