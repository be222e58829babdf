//! Application state shared by the CLI commands

use crate::chain::SupportedChain;
use crate::config::AppConfig;
use crate::gateway::{ChainGateway, GatewayError};
use crate::lifecycle::{Panel, TransactionController};
use crate::notify::NotificationSink;
use crate::panels::{
    MintController, MintPanel, MintStats, TipController, TipPanel, VaultController, VaultPanel,
};
use crate::state_cache::{ChainStateCache, CounterSnapshot, PollerHandle};
use crate::types::CounterKey;
use crate::wallet::{format_eth_4, WalletStatus};
use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Machine-readable summary printed by `dropper status --json`
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub checked_at: DateTime<Utc>,
    pub chain: String,
    pub chain_id: u64,
    pub address: Option<Address>,
    pub network: Option<String>,
    pub balance_eth: Option<String>,
    pub mint: MintStats,
    pub progress_percent: u64,
    pub messages: usize,
}

/// Gateway, cache, notifier and the three panel controllers
pub struct Dropper {
    config: AppConfig,
    gateway: Arc<dyn ChainGateway>,
    cache: Arc<ChainStateCache>,
    pub mint: MintController,
    pub vault: VaultController,
    pub tip: TipController,
}

impl Dropper {
    pub fn new(
        config: AppConfig,
        gateway: Arc<dyn ChainGateway>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        let cache = Arc::new(ChainStateCache::new(gateway.clone(), config.poll_interval()));
        let mint = TransactionController::new(
            MintPanel::new(config.nft_contract),
            gateway.clone(),
            cache.clone(),
            notifier.clone(),
        );
        let vault = TransactionController::new(
            VaultPanel::new(config.vault_contract),
            gateway.clone(),
            cache.clone(),
            notifier.clone(),
        );
        let tip = TransactionController::new(
            TipPanel::new(config.tip_recipient),
            gateway.clone(),
            cache.clone(),
            notifier,
        );

        Self {
            config,
            gateway,
            cache,
            mint,
            vault,
            tip,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn gateway(&self) -> &Arc<dyn ChainGateway> {
        &self.gateway
    }

    pub fn cache(&self) -> &Arc<ChainStateCache> {
        &self.cache
    }

    /// Every counter any panel displays, for the connected account
    pub fn tracked_keys(&self) -> Vec<CounterKey> {
        let account = self.gateway.connected_account();
        let mut keys = self.mint.panel().tracked_keys(account);
        keys.extend(self.vault.panel().tracked_keys(account));
        keys.extend(self.tip.panel().tracked_keys(account));
        keys
    }

    /// Fetch every tracked counter once
    pub async fn refresh_all(&self) {
        self.cache.refresh_many(&self.tracked_keys()).await;
    }

    /// Poll tracked counters at the configured interval
    pub fn start_polling(&self) -> PollerHandle {
        let keys = self.tracked_keys();
        info!(keys = keys.len(), interval_secs = self.config.poll_interval_secs, "Starting poller");
        self.cache.spawn_poller(keys, self.config.poll_interval())
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        self.cache.snapshot(self.gateway.connected_account())
    }

    pub fn mint_stats(&self) -> MintStats {
        MintStats::from_snapshot(&self.snapshot())
    }

    /// Messages stored by the connected account, as last fetched
    pub fn messages(&self) -> Vec<String> {
        self.snapshot().messages.unwrap_or_default()
    }

    /// `None` when no wallet is connected
    pub async fn wallet_status(&self) -> Result<Option<WalletStatus>, GatewayError> {
        let Some(address) = self.gateway.connected_account() else {
            return Ok(None);
        };
        let chain_id = self.gateway.current_chain_id().await?;
        let balance = self.cache.get_uint(&CounterKey::NativeBalance(address));
        Ok(Some(WalletStatus {
            address,
            chain_id,
            target: self.config.chain(),
            balance,
        }))
    }

    /// Wallet status plus drop progress, from the cache
    pub async fn status_report(&self) -> Result<StatusReport, GatewayError> {
        let status = self.wallet_status().await?;
        let chain = self.config.chain();
        let mint = self.mint_stats();
        Ok(StatusReport {
            checked_at: Utc::now(),
            chain: chain.name().to_string(),
            chain_id: chain.id(),
            address: status.as_ref().map(|s| s.address),
            network: status.as_ref().map(|s| s.network_label().to_string()),
            balance_eth: status.as_ref().and_then(|s| s.balance).map(format_eth_4),
            progress_percent: mint.progress_percent(),
            mint,
            messages: self.messages().len(),
        })
    }

    /// Point the session at another chain and reload every counter
    pub async fn switch_chain(&self, chain_id: u64) -> Result<SupportedChain, GatewayError> {
        let chain =
            SupportedChain::try_from_id(chain_id).ok_or(GatewayError::UnsupportedChain(chain_id))?;
        self.gateway.switch_chain(chain_id).await?;
        let keys = self.tracked_keys();
        self.cache.invalidate(&keys);
        self.cache.refresh_many(&keys).await;
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::BASE_MAINNET_ID;
    use crate::test_utils::{MockGateway, RecordingNotifier, MOCK_ACCOUNT, MOCK_NFT, MOCK_VAULT};
    use alloy::primitives::U256;

    fn config() -> AppConfig {
        let mut config = AppConfig::for_chain(SupportedChain::BaseSepolia);
        config.nft_contract = MOCK_NFT;
        config.vault_contract = MOCK_VAULT;
        config
    }

    #[tokio::test]
    async fn test_tracked_keys_cover_all_panels() {
        let gateway = Arc::new(MockGateway::connected());
        let app = Dropper::new(config(), gateway, RecordingNotifier::new());
        let keys = app.tracked_keys();
        assert!(keys.contains(&CounterKey::MintCount(MOCK_ACCOUNT)));
        assert!(keys.contains(&CounterKey::Messages(MOCK_ACCOUNT)));
        assert!(keys.contains(&CounterKey::NativeBalance(MOCK_ACCOUNT)));
    }

    #[tokio::test]
    async fn test_status_and_stats() {
        let gateway = Arc::new(MockGateway::connected());
        gateway.set_supply(250, 1000);
        gateway.set_native_balance(MOCK_ACCOUNT, U256::from(5_000_000_000_000_000u64));
        let app = Dropper::new(config(), gateway.clone(), RecordingNotifier::new());
        app.refresh_all().await;

        assert_eq!(app.mint_stats().progress_percent(), 25);
        let status = app.wallet_status().await.unwrap().unwrap();
        assert!(status.is_correct_chain());
        assert_eq!(status.balance_label(), "0.0050 ETH");

        app.switch_chain(BASE_MAINNET_ID).await.unwrap();
        let status = app.wallet_status().await.unwrap().unwrap();
        assert_eq!(status.network_label(), "Wrong Network");
    }

    #[tokio::test]
    async fn test_status_report_serializes() {
        let gateway = Arc::new(MockGateway::connected());
        gateway.set_supply(5, 10);
        gateway.set_messages(MOCK_ACCOUNT, vec!["a".into(), "b".into()]);
        let app = Dropper::new(config(), gateway, RecordingNotifier::new());
        app.refresh_all().await;

        let report = app.status_report().await.unwrap();
        assert_eq!(report.progress_percent, 50);
        assert_eq!(report.messages, 2);
        assert_eq!(report.network.as_deref(), Some("Base Sepolia"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["chain_id"], 84532);
        assert!(json["checked_at"].is_string());
    }

    #[tokio::test]
    async fn test_disconnected_has_no_status() {
        let gateway = Arc::new(MockGateway::disconnected());
        let app = Dropper::new(config(), gateway, RecordingNotifier::new());
        assert_eq!(app.wallet_status().await.unwrap(), None);
        assert!(app.switch_chain(1).await.is_err());
    }
}
