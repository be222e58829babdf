//! End-to-end scenarios through the public `Dropper` API against the mock chain

use alloy::primitives::utils::parse_ether;
use alloy::primitives::{Address, U256};
use base_dropper::config::AppConfig;
use base_dropper::lifecycle::{LifecycleError, LifecycleState, Rejection};
use base_dropper::notify::NotificationKind;
use base_dropper::panels::{TipInput, TipPreset};
use base_dropper::test_utils::{MockGateway, RecordingNotifier, MOCK_ACCOUNT, MOCK_NFT, MOCK_VAULT};
use base_dropper::types::CounterKey;
use base_dropper::{Dropper, SupportedChain};
use std::sync::Arc;

fn config(nft: Address, vault: Address) -> AppConfig {
    let mut config = AppConfig::for_chain(SupportedChain::BaseSepolia);
    config.walletconnect_project_id = Some("test-project".to_string());
    config.nft_contract = nft;
    config.vault_contract = vault;
    config
}

fn setup(gateway: MockGateway, nft: Address, vault: Address) -> (Dropper, Arc<MockGateway>, Arc<RecordingNotifier>) {
    let gateway = Arc::new(gateway);
    let notifier = RecordingNotifier::new();
    let app = Dropper::new(config(nft, vault), gateway.clone(), notifier.clone());
    (app, gateway, notifier)
}

#[tokio::test]
async fn mint_below_limit_updates_balance_and_count() {
    let (app, gateway, notifier) = setup(MockGateway::connected(), MOCK_NFT, MOCK_VAULT);
    gateway.set_mint_limit(5);
    gateway.set_mint_count(MOCK_ACCOUNT, 4);
    gateway.set_nft_balance(MOCK_ACCOUNT, 4);
    gateway.set_supply(40, 1000);
    app.refresh_all().await;

    let before = app.mint_stats();
    assert!(before.can_mint());

    let outcome = app.mint.run().await.unwrap();
    assert_eq!(outcome.token_id, Some(U256::from(40)));

    let after = app.mint_stats();
    assert_eq!(after.balance, Some(U256::from(5)));
    assert_eq!(after.mint_count, Some(U256::from(5)));
    assert_eq!(after.total_supply, Some(U256::from(41)));
    assert!(!after.can_mint());
    assert_eq!(notifier.count(NotificationKind::Success), 1);
}

#[tokio::test]
async fn mint_at_max_supply_is_rejected() {
    let (app, gateway, notifier) = setup(MockGateway::connected(), MOCK_NFT, MOCK_VAULT);
    gateway.set_supply(1000, 1000);
    app.refresh_all().await;

    let err = app.mint.run().await.unwrap_err();
    assert_eq!(err, LifecycleError::Rejected(Rejection::MaxSupplyReached));
    assert!(err.to_string().to_lowercase().contains("max supply reached"));
    assert_eq!(gateway.submit_count(), 0);
    assert_eq!(notifier.messages(NotificationKind::Error), vec!["Max supply reached!"]);
}

#[tokio::test]
async fn overlong_message_never_produces_a_hash() {
    let (app, gateway, _notifier) = setup(MockGateway::connected(), MOCK_NFT, MOCK_VAULT);
    app.vault.set_input("a".repeat(281));

    let err = app.vault.submit().await.unwrap_err();
    assert!(err.to_string().to_lowercase().contains("message too long"));
    assert_eq!(err.tx_hash(), None);
    assert_eq!(app.vault.pending(), None);
    assert_eq!(app.vault.state(), LifecycleState::Idle);
    assert_eq!(gateway.submit_count(), 0);
}

#[tokio::test]
async fn tip_over_balance_is_rejected() {
    let (app, gateway, _notifier) = setup(MockGateway::connected(), MOCK_NFT, MOCK_VAULT);
    gateway.set_native_balance(MOCK_ACCOUNT, parse_ether("0.005").unwrap());
    app.refresh_all().await;

    app.tip.set_input(TipInput::custom("0.01"));
    let err = app.tip.run().await.unwrap_err();
    assert_eq!(err.rejection(), Some(&Rejection::InsufficientBalance));
    assert!(err.to_string().to_lowercase().contains("insufficient balance"));
    assert_eq!(gateway.submit_count(), 0);
}

#[tokio::test]
async fn tip_preset_sends_value_and_refreshes_balance() {
    let (app, gateway, notifier) = setup(MockGateway::connected(), MOCK_NFT, MOCK_VAULT);
    gateway.set_native_balance(MOCK_ACCOUNT, parse_ether("0.005").unwrap());
    app.refresh_all().await;

    app.tip.update_input(|input| input.select_preset(TipPreset::Coffee));
    app.tip.run().await.unwrap();

    let sent = gateway.submitted();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].is_transfer());
    assert_eq!(sent[0].value, parse_ether("0.001").unwrap());
    assert_eq!(
        app.cache().get_uint(&CounterKey::NativeBalance(MOCK_ACCOUNT)),
        Some(parse_ether("0.004").unwrap())
    );
    assert_eq!(app.tip.input(), TipInput::default());
    assert_eq!(
        notifier.messages(NotificationKind::Success),
        vec!["Tip sent successfully! Thank you!"]
    );
}

#[tokio::test]
async fn vault_at_zero_address_is_not_deployed() {
    let (app, gateway, _notifier) = setup(MockGateway::connected(), MOCK_NFT, Address::ZERO);
    for message in ["", "gm", &"a".repeat(281)] {
        app.vault.set_input(message.to_string());
        let err = app.vault.submit().await.unwrap_err();
        assert!(err.to_string().to_lowercase().contains("contract not deployed"));
    }
    assert_eq!(gateway.submit_count(), 0);
}

#[tokio::test]
async fn wallet_rejection_returns_to_idle() {
    let (app, gateway, notifier) = setup(MockGateway::connected(), MOCK_NFT, MOCK_VAULT);
    app.refresh_all().await;
    gateway.reject_next_submit("User denied transaction signature.");

    let err = app.mint.run().await.unwrap_err();
    assert!(matches!(err, LifecycleError::Wallet(_)));
    assert_eq!(app.mint.state(), LifecycleState::Idle);
    assert_eq!(
        notifier.messages(NotificationKind::Error),
        vec!["User denied transaction signature."]
    );

    // the user re-initiates; nothing was retried behind their back
    assert_eq!(gateway.submit_count(), 1);
    app.mint.run().await.unwrap();
    assert_eq!(gateway.submit_count(), 2);
}

#[tokio::test]
async fn stale_counters_survive_failed_polls() {
    let (app, gateway, _notifier) = setup(MockGateway::connected(), MOCK_NFT, MOCK_VAULT);
    gateway.set_supply(12, 100);
    app.refresh_all().await;

    gateway.fail_reads(true);
    gateway.set_supply(13, 100);
    app.refresh_all().await;

    assert_eq!(app.mint_stats().total_supply, Some(U256::from(12)));
    assert_eq!(app.mint_stats().progress_percent(), 12);
}
