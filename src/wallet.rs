//! Wallet management module

use crate::chain::SupportedChain;
use alloy::network::EthereumWallet;
use alloy::primitives::{utils::format_ether, Address, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Environment variable holding the hex-encoded signing key
pub const PRIVATE_KEY_ENV: &str = "DROPPER_PRIVATE_KEY";

/// Wallet manager holding the local signing key
#[derive(Clone)]
pub struct WalletManager {
    signer: Arc<PrivateKeySigner>,
}

impl WalletManager {
    /// Create a wallet from a hex key, with or without `0x`
    pub fn from_hex(key: &str) -> Result<Self> {
        let bytes: B256 = key
            .trim()
            .parse()
            .context("Private key must be 32 hex-encoded bytes")?;
        if bytes == B256::ZERO {
            anyhow::bail!("Invalid private key: all-zero key rejected");
        }
        let signer = PrivateKeySigner::from_bytes(&bytes).context("Invalid secp256k1 private key")?;
        Ok(Self {
            signer: Arc::new(signer),
        })
    }

    /// Create a wallet from a file containing the hex key
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read key file: {}", path))?;
        Self::from_hex(&content)
    }

    /// Key from `DROPPER_PRIVATE_KEY`; `None` means a read-only session
    pub fn from_env() -> Result<Option<Self>> {
        match std::env::var(PRIVATE_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Self::from_hex(&key).map(Some),
            _ => Ok(None),
        }
    }

    /// Account address
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Wallet filler for the provider
    pub fn ethereum_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.as_ref().clone())
    }
}

impl std::fmt::Debug for WalletManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletManager")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Connection summary shown by `dropper status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletStatus {
    pub address: Address,
    pub chain_id: u64,
    pub target: SupportedChain,
    pub balance: Option<U256>,
}

impl WalletStatus {
    pub fn is_correct_chain(&self) -> bool {
        self.chain_id == self.target.id()
    }

    /// Network label, or "Wrong Network" when the node serves another chain
    pub fn network_label(&self) -> &'static str {
        if self.is_correct_chain() {
            self.target.name()
        } else {
            "Wrong Network"
        }
    }

    /// Balance with four decimals, e.g. `0.0050 ETH`
    pub fn balance_label(&self) -> String {
        match self.balance {
            Some(balance) => format!("{} ETH", format_eth_4(balance)),
            None => "0 ETH".to_string(),
        }
    }
}

/// Format wei as ETH rounded to four decimals
pub fn format_eth_4(wei: U256) -> String {
    let eth: f64 = format_ether(wei).parse().unwrap_or(0.0);
    format!("{:.4}", eth)
}
