//! Read cache for polled on-chain counters
//!
//! Every panel reads supply, balances and message lists through one
//! [`ChainStateCache`] instead of polling on its own. Reads are independent
//! and uncoordinated: a failed read keeps the last known value (stale but
//! available) and is retried on the next poll. Concurrent refreshes of the
//! same key resolve last-write-wins.

use crate::gateway::{ChainGateway, GatewayError};
use crate::metrics::metrics;
use crate::types::{CounterKey, FieldValue};
use alloy::primitives::{Address, U256};
use dashmap::DashMap;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// A cached field and when it was fetched
#[derive(Debug, Clone)]
pub struct CachedValue {
    pub value: FieldValue,
    pub fetched_at: Instant,
    /// Set by [`ChainStateCache::invalidate`]; cleared by the next successful read
    pub invalidated: bool,
}

/// Point-in-time view of the counters a precheck needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub account: Option<Address>,
    pub total_supply: Option<U256>,
    pub max_supply: Option<U256>,
    pub mint_limit: Option<U256>,
    pub nft_balance: Option<U256>,
    pub mint_count: Option<U256>,
    pub native_balance: Option<U256>,
    pub messages: Option<Vec<String>>,
}

pub struct ChainStateCache {
    gateway: Arc<dyn ChainGateway>,
    entries: DashMap<CounterKey, CachedValue>,
    ttl: Duration,
}

impl ChainStateCache {
    /// `ttl` is normally the polling interval
    pub fn new(gateway: Arc<dyn ChainGateway>, ttl: Duration) -> Self {
        Self {
            gateway,
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Last known value, however old
    pub fn get(&self, key: &CounterKey) -> Option<FieldValue> {
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    pub fn get_uint(&self, key: &CounterKey) -> Option<U256> {
        self.get(key).and_then(|value| value.as_uint())
    }

    /// Younger than the TTL and not invalidated
    pub fn is_fresh(&self, key: &CounterKey) -> bool {
        self.entries
            .get(key)
            .map(|entry| !entry.invalidated && entry.fetched_at.elapsed() < self.ttl)
            .unwrap_or(false)
    }

    /// Fetch one key now.
    ///
    /// Returns the value held after the attempt: the new one on success, the
    /// stale one (or `None`) on failure.
    pub async fn refresh(&self, key: &CounterKey) -> Option<FieldValue> {
        match self.gateway.read_field(key).await {
            Ok(value) => {
                self.entries.insert(
                    *key,
                    CachedValue {
                        value: value.clone(),
                        fetched_at: Instant::now(),
                        invalidated: false,
                    },
                );
                Some(value)
            }
            Err(e) => {
                self.record_failure(key, &e);
                self.get(key)
            }
        }
    }

    /// Refresh several keys concurrently; each one succeeds or fails alone
    pub async fn refresh_many(&self, keys: &[CounterKey]) {
        join_all(keys.iter().map(|key| self.refresh(key))).await;
    }

    /// Cached value if fresh, otherwise fetch it
    pub async fn get_or_refresh(&self, key: &CounterKey) -> Option<FieldValue> {
        if self.is_fresh(key) {
            return self.get(key);
        }
        self.refresh(key).await
    }

    /// Mark keys stale so the next read goes to the chain
    pub fn invalidate(&self, keys: &[CounterKey]) {
        for key in keys {
            if let Some(mut entry) = self.entries.get_mut(key) {
                entry.invalidated = true;
            }
        }
    }

    /// Everything a precheck may look at, for one account
    pub fn snapshot(&self, account: Option<Address>) -> CounterSnapshot {
        let per_account = |make: fn(Address) -> CounterKey| {
            account.and_then(|a| self.get_uint(&make(a)))
        };
        CounterSnapshot {
            account,
            total_supply: self.get_uint(&CounterKey::TotalSupply),
            max_supply: self.get_uint(&CounterKey::MaxSupply),
            mint_limit: self.get_uint(&CounterKey::MintLimit),
            nft_balance: per_account(CounterKey::NftBalance),
            mint_count: per_account(CounterKey::MintCount),
            native_balance: per_account(CounterKey::NativeBalance),
            messages: account.and_then(|a| {
                self.get(&CounterKey::Messages(a))
                    .and_then(|v| v.as_messages().map(<[String]>::to_vec))
            }),
        }
    }

    /// Poll `keys` every `interval` until the handle is stopped or dropped.
    ///
    /// The first poll happens immediately.
    pub fn spawn_poller(self: &Arc<Self>, keys: Vec<CounterKey>, interval: Duration) -> PollerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let cache = Arc::clone(self);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        cache.refresh_many(&keys).await;
                        debug!(keys = keys.len(), "Polled on-chain counters");
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        PollerHandle {
            shutdown: shutdown_tx,
            task: Some(task),
        }
    }

    fn record_failure(&self, key: &CounterKey, error: &GatewayError) {
        metrics()
            .read_failures
            .with_label_values(&[key.label()])
            .inc();
        if error.is_retryable() {
            warn!(key = key.label(), error = %error, "Read failed, keeping last known value");
        } else {
            debug!(key = key.label(), error = %error, "Read skipped");
        }
    }
}

/// Stops the poller when dropped
pub struct PollerHandle {
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Stop polling and wait for the task to finish
    pub async fn stop(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockGateway;

    fn cache_with(gateway: Arc<MockGateway>) -> Arc<ChainStateCache> {
        Arc::new(ChainStateCache::new(gateway, Duration::from_secs(10)))
    }

    #[tokio::test]
    async fn test_refresh_and_snapshot() {
        let gateway = Arc::new(MockGateway::connected());
        gateway.set_supply(3, 100);
        gateway.set_mint_limit(5);
        let account = gateway.account().unwrap();
        let cache = cache_with(gateway.clone());

        cache.refresh_many(&CounterKey::mint_keys(Some(account))).await;
        let snapshot = cache.snapshot(Some(account));
        assert_eq!(snapshot.total_supply, Some(U256::from(3)));
        assert_eq!(snapshot.max_supply, Some(U256::from(100)));
        assert_eq!(snapshot.mint_limit, Some(U256::from(5)));
        assert_eq!(snapshot.mint_count, Some(U256::ZERO));
        assert!(cache.is_fresh(&CounterKey::TotalSupply));
    }

    #[tokio::test]
    async fn test_failed_read_keeps_stale_value() {
        let gateway = Arc::new(MockGateway::connected());
        gateway.set_supply(7, 100);
        let cache = cache_with(gateway.clone());

        cache.refresh(&CounterKey::TotalSupply).await;
        gateway.fail_reads(true);
        gateway.set_supply(8, 100);

        let value = cache.refresh(&CounterKey::TotalSupply).await;
        assert_eq!(value, Some(FieldValue::Uint(U256::from(7))));
        assert_eq!(cache.get_uint(&CounterKey::TotalSupply), Some(U256::from(7)));
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let gateway = Arc::new(MockGateway::connected());
        gateway.set_supply(1, 10);
        let cache = cache_with(gateway.clone());

        cache.refresh(&CounterKey::TotalSupply).await;
        gateway.set_supply(2, 10);

        // fresh value is served from cache
        let cached = cache.get_or_refresh(&CounterKey::TotalSupply).await;
        assert_eq!(cached, Some(FieldValue::Uint(U256::from(1))));

        cache.invalidate(&[CounterKey::TotalSupply]);
        assert!(!cache.is_fresh(&CounterKey::TotalSupply));
        let refetched = cache.get_or_refresh(&CounterKey::TotalSupply).await;
        assert_eq!(refetched, Some(FieldValue::Uint(U256::from(2))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_refreshes_on_interval() {
        let gateway = Arc::new(MockGateway::connected());
        gateway.set_supply(1, 10);
        let cache = cache_with(gateway.clone());

        let handle = cache.spawn_poller(vec![CounterKey::TotalSupply], Duration::from_secs(10));
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(cache.get_uint(&CounterKey::TotalSupply), Some(U256::from(1)));

        gateway.set_supply(4, 10);
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(cache.get_uint(&CounterKey::TotalSupply), Some(U256::from(4)));

        handle.stop().await;
        gateway.set_supply(9, 10);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(cache.get_uint(&CounterKey::TotalSupply), Some(U256::from(4)));
    }
}
