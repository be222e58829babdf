//! Common types used throughout the client

use alloy::primitives::{Address, Log, TxHash, U256};
use serde::{Deserialize, Serialize};

/// One polled on-chain field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CounterKey {
    /// NFT `totalSupply()`
    TotalSupply,
    /// NFT `MAX_SUPPLY()`
    MaxSupply,
    /// NFT `MINT_LIMIT_PER_WALLET()`
    MintLimit,
    /// NFT `balanceOf(account)`
    NftBalance(Address),
    /// NFT `mintCount(account)`
    MintCount(Address),
    /// Vault `getMessages(account)`
    Messages(Address),
    /// Native ETH balance of the account
    NativeBalance(Address),
}

impl CounterKey {
    /// Short label for logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            Self::TotalSupply => "total_supply",
            Self::MaxSupply => "max_supply",
            Self::MintLimit => "mint_limit",
            Self::NftBalance(_) => "nft_balance",
            Self::MintCount(_) => "mint_count",
            Self::Messages(_) => "messages",
            Self::NativeBalance(_) => "native_balance",
        }
    }

    /// Keys describing the NFT drop for an optional account
    pub fn mint_keys(account: Option<Address>) -> Vec<CounterKey> {
        let mut keys = vec![Self::TotalSupply, Self::MaxSupply, Self::MintLimit];
        if let Some(account) = account {
            keys.push(Self::NftBalance(account));
            keys.push(Self::MintCount(account));
        }
        keys
    }
}

/// Decoded value of a [`CounterKey`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    Uint(U256),
    Messages(Vec<String>),
}

impl FieldValue {
    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Self::Uint(v) => Some(*v),
            Self::Messages(_) => None,
        }
    }

    pub fn as_messages(&self) -> Option<&[String]> {
        match self {
            Self::Messages(m) => Some(m),
            Self::Uint(_) => None,
        }
    }
}

/// What the application learns from a mined transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptSummary {
    pub tx_hash: TxHash,
    /// `true` when the transaction executed without reverting
    pub success: bool,
    pub block_number: Option<u64>,
    pub logs: Vec<Log>,
}

/// The wallet session as the controller sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub account: Option<Address>,
    pub chain_id: u64,
}

impl Session {
    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }
}
