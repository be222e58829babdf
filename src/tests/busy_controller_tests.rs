//! Sequential writes per panel
//!
//! A second submit while a transaction is unresolved is refused without
//! touching the wallet; other panels are unaffected.

#[cfg(test)]
mod busy_controller_tests {
    use crate::lifecycle::{LifecycleError, LifecycleState, TransactionController, TxStatus};
    use crate::panels::{MintPanel, VaultPanel};
    use crate::state_cache::ChainStateCache;
    use crate::test_utils::{MockGateway, RecordingNotifier, MOCK_ACCOUNT, MOCK_NFT, MOCK_VAULT};
    use crate::types::CounterKey;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    async fn wait_until_confirming<P: crate::lifecycle::Panel>(controller: &TransactionController<P>) {
        timeout(Duration::from_secs(5), async {
            while !matches!(controller.state(), LifecycleState::Confirming { .. }) {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("controller never reached Confirming");
    }

    #[tokio::test]
    async fn test_second_submit_is_busy() {
        let gateway = Arc::new(MockGateway::connected());
        gateway.hold_receipts();
        let notifier = RecordingNotifier::new();
        let cache = Arc::new(ChainStateCache::new(gateway.clone(), Duration::from_secs(10)));
        cache.refresh_many(&CounterKey::mint_keys(Some(MOCK_ACCOUNT))).await;

        let mint = Arc::new(TransactionController::new(
            MintPanel::new(MOCK_NFT),
            gateway.clone(),
            cache.clone(),
            notifier.clone(),
        ));
        let vault = TransactionController::new(
            VaultPanel::new(MOCK_VAULT),
            gateway.clone(),
            cache.clone(),
            notifier.clone(),
        );

        let running = tokio::spawn({
            let mint = mint.clone();
            async move { mint.run().await }
        });
        wait_until_confirming(&mint).await;
        assert_eq!(mint.pending().map(|p| p.status), Some(TxStatus::Confirming));

        assert_eq!(mint.submit().await, Err(LifecycleError::Busy));
        assert!(!mint.reset());
        assert_eq!(gateway.submit_count(), 1);

        // another panel is independent
        vault.set_input("while minting".into());
        let stored = vault.submit().await;
        assert!(stored.is_ok());
        assert_eq!(gateway.submit_count(), 2);

        gateway.release_receipts();
        let outcome = running.await.unwrap().unwrap();
        assert!(outcome.token_id.is_some());
        assert_eq!(mint.pending().map(|p| p.status), Some(TxStatus::Confirmed));

        // terminal state accepts a new action
        assert!(mint.submit().await.is_ok());
        assert_eq!(gateway.submit_count(), 3);
    }

    #[tokio::test]
    async fn test_dropped_submit_frees_the_panel() {
        let gateway = Arc::new(MockGateway::connected());
        gateway.stall_signatures(true);
        let notifier = RecordingNotifier::new();
        let cache = Arc::new(ChainStateCache::new(gateway.clone(), Duration::from_secs(10)));
        cache.refresh_many(&CounterKey::mint_keys(Some(MOCK_ACCOUNT))).await;
        let mint = TransactionController::new(
            MintPanel::new(MOCK_NFT),
            gateway.clone(),
            cache,
            notifier.clone(),
        );

        // the wallet never answers and the caller gives up
        let gave_up = timeout(Duration::from_millis(50), mint.submit()).await;
        assert!(gave_up.is_err());

        assert_eq!(mint.state(), LifecycleState::Idle);
        assert_eq!(mint.pending(), None);
        assert!(mint.reset());

        gateway.stall_signatures(false);
        let tx = mint.submit().await.unwrap();
        assert_eq!(mint.state(), LifecycleState::Confirming { tx });
        assert_eq!(gateway.submit_count(), 1);
    }
}
