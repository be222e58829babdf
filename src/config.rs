//! Configuration module for the dropper client
//!
//! Configuration is layered: an optional TOML file, then environment
//! variables prefixed with `DROPPER_` (a `.env` file is honoured). The
//! resulting [`AppConfig`] is validated once at startup and never mutated
//! afterwards; components receive it by reference or behind an `Arc`.

use crate::chain::SupportedChain;
use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Prefix for environment overrides, e.g. `DROPPER_CHAIN_ID`
pub const ENV_PREFIX: &str = "DROPPER";

/// Creator address that receives tips unless overridden
pub const DEFAULT_TIP_RECIPIENT: Address = address!("742d35cc6634c0532925a3b844bc9e7595f0beb0");

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The WalletConnect-style project id is the one value we cannot run without
    #[error("walletconnect_project_id is not set (export {ENV_PREFIX}_WALLETCONNECT_PROJECT_ID)")]
    MissingProjectId,

    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Failed to load configuration: {0}")]
    Source(#[from] config::ConfigError),
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Numeric chain selector (8453 mainnet, 84532 Sepolia)
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// RPC endpoint override; the chain's public endpoint is used otherwise
    #[serde(default)]
    pub rpc_url: Option<String>,

    /// Builder Badge NFT contract (zero address = not deployed)
    #[serde(default)]
    pub nft_contract: Address,

    /// Storage vault contract (zero address = not deployed)
    #[serde(default)]
    pub vault_contract: Address,

    /// Receiver of tips
    #[serde(default = "default_tip_recipient")]
    pub tip_recipient: Address,

    /// Required project identifier for the wallet session
    #[serde(default)]
    pub walletconnect_project_id: Option<String>,

    /// Content-addressed storage gateway for NFT metadata
    #[serde(default = "default_ipfs_gateway")]
    pub ipfs_gateway: String,

    /// Polling interval for on-chain counters
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Give up waiting for a receipt after this long
    #[serde(default = "default_receipt_timeout")]
    pub receipt_timeout_secs: u64,

    /// Receipt polling cadence
    #[serde(default = "default_receipt_poll")]
    pub receipt_poll_millis: u64,

    /// Monitoring and metrics
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Enable Prometheus metrics
    #[serde(default)]
    pub enable_metrics: bool,

    /// Metrics port
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enable_metrics: false,
            metrics_port: default_metrics_port(),
        }
    }
}

// Default value functions
fn default_chain_id() -> u64 { crate::chain::BASE_SEPOLIA_ID }
fn default_tip_recipient() -> Address { DEFAULT_TIP_RECIPIENT }
fn default_ipfs_gateway() -> String { "https://gateway.pinata.cloud/ipfs/".to_string() }
fn default_poll_interval() -> u64 { 10 }
fn default_receipt_timeout() -> u64 { 120 }
fn default_receipt_poll() -> u64 { 1_000 }
fn default_metrics_port() -> u16 { 9090 }

impl AppConfig {
    /// Load configuration from an optional TOML file plus the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::load_with_env(path, None)
    }

    /// Load configuration with an explicit environment map.
    ///
    /// `env` replaces the process environment when given, which keeps tests
    /// independent of each other.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            );
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values that would make the client unusable
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.walletconnect_project_id.as_deref() {
            Some(id) if !id.trim().is_empty() => {}
            _ => return Err(ConfigError::MissingProjectId),
        }

        if self.tip_recipient == Address::ZERO {
            return Err(ConfigError::InvalidField {
                field: "tip_recipient",
                reason: "tips would be burned to the zero address".to_string(),
            });
        }

        if let Some(rpc) = &self.rpc_url {
            Url::parse(rpc).map_err(|e| ConfigError::InvalidField {
                field: "rpc_url",
                reason: e.to_string(),
            })?;
        }

        Url::parse(&self.ipfs_gateway).map_err(|e| ConfigError::InvalidField {
            field: "ipfs_gateway",
            reason: e.to_string(),
        })?;

        if self.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidField {
                field: "poll_interval_secs",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    /// Resolved target chain
    pub fn chain(&self) -> SupportedChain {
        SupportedChain::from_id(self.chain_id)
    }

    /// RPC endpoint: explicit override or the chain's public endpoint
    pub fn rpc_endpoint(&self) -> Result<Url, ConfigError> {
        let raw = self
            .rpc_url
            .clone()
            .unwrap_or_else(|| self.chain().default_rpc_url().to_string());
        Url::parse(&raw).map_err(|e| ConfigError::InvalidField {
            field: "rpc_url",
            reason: e.to_string(),
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.receipt_timeout_secs)
    }

    pub fn receipt_poll(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_millis)
    }

    /// Configuration for tests and local tooling; still needs a project id to validate
    pub fn for_chain(chain: SupportedChain) -> Self {
        Self {
            chain_id: chain.id(),
            rpc_url: None,
            nft_contract: Address::ZERO,
            vault_contract: Address::ZERO,
            tip_recipient: default_tip_recipient(),
            walletconnect_project_id: None,
            ipfs_gateway: default_ipfs_gateway(),
            poll_interval_secs: default_poll_interval(),
            receipt_timeout_secs: default_receipt_timeout(),
            receipt_poll_millis: default_receipt_poll(),
            monitoring: MonitoringConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_missing_project_id_is_fatal() {
        let err = AppConfig::load_with_env(None, env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingProjectId));
    }

    #[test]
    fn test_blank_project_id_is_fatal() {
        let err = AppConfig::load_with_env(
            None,
            env(&[("DROPPER_WALLETCONNECT_PROJECT_ID", "   ")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingProjectId));
    }

    #[test]
    fn test_defaults_from_env() {
        let config = AppConfig::load_with_env(
            None,
            env(&[("DROPPER_WALLETCONNECT_PROJECT_ID", "proj-123")]),
        )
        .unwrap();
        assert_eq!(config.chain(), SupportedChain::BaseSepolia);
        assert_eq!(config.nft_contract, Address::ZERO);
        assert_eq!(config.tip_recipient, DEFAULT_TIP_RECIPIENT);
        assert_eq!(config.poll_interval(), Duration::from_secs(10));
        assert_eq!(
            config.rpc_endpoint().unwrap().as_str(),
            "https://sepolia.base.org/"
        );
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::load_with_env(
            None,
            env(&[
                ("DROPPER_WALLETCONNECT_PROJECT_ID", "proj-123"),
                ("DROPPER_CHAIN_ID", "8453"),
                ("DROPPER_NFT_CONTRACT", "0x1111111111111111111111111111111111111111"),
                ("DROPPER_MONITORING__ENABLE_METRICS", "true"),
            ]),
        )
        .unwrap();
        assert_eq!(config.chain(), SupportedChain::Base);
        assert_eq!(config.nft_contract, Address::repeat_byte(0x11));
        assert!(config.monitoring.enable_metrics);
    }

    #[test]
    fn test_zero_tip_recipient_rejected() {
        let mut config = AppConfig::for_chain(SupportedChain::Base);
        config.walletconnect_project_id = Some("p".into());
        config.tip_recipient = Address::ZERO;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidField { field: "tip_recipient", .. })
        ));
    }

    #[test]
    fn test_bad_gateway_url_rejected() {
        let mut config = AppConfig::for_chain(SupportedChain::Base);
        config.walletconnect_project_id = Some("p".into());
        config.ipfs_gateway = "not a url".into();
        assert!(config.validate().is_err());
    }
}
