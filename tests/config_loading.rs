//! Configuration loading from TOML files layered with environment overrides

use alloy::primitives::address;
use base_dropper::config::{AppConfig, ConfigError};
use base_dropper::SupportedChain;
use std::collections::HashMap;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
    Some(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
}

#[test]
fn file_values_are_loaded() {
    let file = write_config(
        r#"
chain_id = 8453
walletconnect_project_id = "abc123"
nft_contract = "0x1111111111111111111111111111111111111111"
poll_interval_secs = 5

[monitoring]
enable_metrics = true
metrics_port = 9100
"#,
    );

    let config = AppConfig::load_with_env(Some(file.path()), env(&[])).unwrap();
    assert_eq!(config.chain(), SupportedChain::Base);
    assert_eq!(config.nft_contract, address!("1111111111111111111111111111111111111111"));
    assert_eq!(config.poll_interval_secs, 5);
    assert!(config.monitoring.enable_metrics);
    assert_eq!(config.monitoring.metrics_port, 9100);
    assert_eq!(
        config.rpc_endpoint().unwrap().as_str(),
        "https://mainnet.base.org/"
    );
}

#[test]
fn environment_overrides_file() {
    let file = write_config(
        r#"
chain_id = 8453
walletconnect_project_id = "abc123"
"#,
    );
    let config = AppConfig::load_with_env(
        Some(file.path()),
        env(&[("DROPPER_CHAIN_ID", "84532"), ("DROPPER_POLL_INTERVAL_SECS", "30")]),
    )
    .unwrap();
    assert_eq!(config.chain(), SupportedChain::BaseSepolia);
    assert_eq!(config.poll_interval_secs, 30);
}

#[test]
fn missing_project_id_aborts() {
    let file = write_config("chain_id = 84532\n");
    let err = AppConfig::load_with_env(Some(file.path()), env(&[])).unwrap_err();
    assert!(matches!(err, ConfigError::MissingProjectId));
}

#[test]
fn unknown_chain_falls_back_to_sepolia() {
    let config = AppConfig::load_with_env(
        None,
        env(&[("DROPPER_CHAIN_ID", "1"), ("DROPPER_WALLETCONNECT_PROJECT_ID", "x")]),
    )
    .unwrap();
    assert_eq!(config.chain(), SupportedChain::BaseSepolia);
    assert_eq!(config.chain().explorer_url(), "https://sepolia.basescan.org");
}
