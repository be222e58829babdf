//! Test Utilities Module
//!
//! In-memory stand-ins for the chain gateway and the notification sink, so
//! lifecycle behaviour can be exercised deterministically without a node.
//!
//! These utilities are only compiled when running tests or when the
//! `test_utils` feature is enabled.

#![cfg(any(test, feature = "test_utils"))]

use crate::contracts::{ContractCall, IBuilderBadge, IStorageVault};
use crate::gateway::{ChainGateway, GatewayError};
use crate::notify::{NotificationKind, NotificationSink};
use crate::types::{CounterKey, FieldValue, ReceiptSummary};
use alloy::primitives::{address, keccak256, Address, Log, TxHash, U256};
use alloy::sol_types::{SolCall, SolEvent};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Contract addresses the mock pretends are deployed
pub const MOCK_NFT: Address = address!("0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a");
pub const MOCK_VAULT: Address = address!("0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b");
pub const MOCK_ACCOUNT: Address = address!("acacacacacacacacacacacacacacacacacacacac");

#[derive(Debug, Default)]
struct ChainState {
    total_supply: U256,
    max_supply: U256,
    mint_limit: U256,
    nft_balances: HashMap<Address, U256>,
    mint_counts: HashMap<Address, U256>,
    messages: HashMap<Address, Vec<String>>,
    native: HashMap<Address, U256>,
}

#[derive(Debug, Default)]
struct Behaviour {
    fail_reads: bool,
    reject_with: Option<String>,
    revert_next: bool,
}

#[derive(Debug, Default)]
struct Journal {
    submitted: Vec<ContractCall>,
    pending: HashMap<TxHash, (Address, ContractCall)>,
    reads: HashMap<CounterKey, usize>,
    receipt_waits: usize,
    nonce: u64,
}

/// In-memory chain with a single optional account
///
/// Writes take effect when their receipt is awaited, mirroring the
/// submitted → mined ordering of a real node.
pub struct MockGateway {
    account: Mutex<Option<Address>>,
    chain_id: Mutex<u64>,
    nft: Address,
    vault: Address,
    state: Mutex<ChainState>,
    behaviour: Mutex<Behaviour>,
    journal: Mutex<Journal>,
    hold_receipts: AtomicBool,
    stall_signatures: AtomicBool,
    release: Notify,
}

impl MockGateway {
    /// Gateway with no wallet session
    pub fn disconnected() -> Self {
        Self::with_contracts(None, MOCK_NFT, MOCK_VAULT)
    }

    /// Gateway with [`MOCK_ACCOUNT`] connected
    pub fn connected() -> Self {
        Self::with_contracts(Some(MOCK_ACCOUNT), MOCK_NFT, MOCK_VAULT)
    }

    pub fn with_contracts(account: Option<Address>, nft: Address, vault: Address) -> Self {
        let state = ChainState {
            max_supply: U256::from(1_000),
            mint_limit: U256::from(5),
            ..Default::default()
        };
        Self {
            account: Mutex::new(account),
            chain_id: Mutex::new(crate::chain::BASE_SEPOLIA_ID),
            nft,
            vault,
            state: Mutex::new(state),
            behaviour: Mutex::new(Behaviour::default()),
            journal: Mutex::new(Journal::default()),
            hold_receipts: AtomicBool::new(false),
            stall_signatures: AtomicBool::new(false),
            release: Notify::new(),
        }
    }

    pub fn account(&self) -> Option<Address> {
        *self.account.lock()
    }

    pub fn set_supply(&self, total: u64, max: u64) {
        let mut state = self.state.lock();
        state.total_supply = U256::from(total);
        state.max_supply = U256::from(max);
    }

    pub fn set_mint_limit(&self, limit: u64) {
        self.state.lock().mint_limit = U256::from(limit);
    }

    pub fn set_mint_count(&self, account: Address, count: u64) {
        self.state.lock().mint_counts.insert(account, U256::from(count));
    }

    pub fn set_nft_balance(&self, account: Address, balance: u64) {
        self.state.lock().nft_balances.insert(account, U256::from(balance));
    }

    pub fn set_native_balance(&self, account: Address, wei: U256) {
        self.state.lock().native.insert(account, wei);
    }

    pub fn set_messages(&self, account: Address, messages: Vec<String>) {
        self.state.lock().messages.insert(account, messages);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.behaviour.lock().fail_reads = fail;
    }

    /// The next submission is refused by the wallet with `message`
    pub fn reject_next_submit(&self, message: &str) {
        self.behaviour.lock().reject_with = Some(message.to_string());
    }

    /// The next mined transaction reverts
    pub fn revert_next(&self) {
        self.behaviour.lock().revert_next = true;
    }

    /// Keep receipts pending until [`MockGateway::release_receipts`]
    pub fn hold_receipts(&self) {
        self.hold_receipts.store(true, Ordering::SeqCst);
    }

    pub fn release_receipts(&self) {
        self.hold_receipts.store(false, Ordering::SeqCst);
        self.release.notify_waiters();
    }

    /// The wallet never answers signature requests
    pub fn stall_signatures(&self, stall: bool) {
        self.stall_signatures.store(stall, Ordering::SeqCst);
    }

    /// Every call handed to the wallet, in order
    pub fn submitted(&self) -> Vec<ContractCall> {
        self.journal.lock().submitted.clone()
    }

    pub fn submit_count(&self) -> usize {
        self.journal.lock().submitted.len()
    }

    /// How many times `key` was read from the chain
    pub fn read_count(&self, key: &CounterKey) -> usize {
        self.journal.lock().reads.get(key).copied().unwrap_or(0)
    }

    pub fn receipt_waits(&self) -> usize {
        self.journal.lock().receipt_waits
    }

    fn read(&self, key: &CounterKey) -> Result<FieldValue, GatewayError> {
        let state = self.state.lock();
        let uint = |map: &HashMap<Address, U256>, a: &Address| {
            FieldValue::Uint(map.get(a).copied().unwrap_or_default())
        };
        let nft_key = !matches!(key, CounterKey::Messages(_) | CounterKey::NativeBalance(_));
        if nft_key && self.nft == Address::ZERO {
            return Err(GatewayError::NotDeployed("BuilderBadge"));
        }
        Ok(match key {
            CounterKey::TotalSupply => FieldValue::Uint(state.total_supply),
            CounterKey::MaxSupply => FieldValue::Uint(state.max_supply),
            CounterKey::MintLimit => FieldValue::Uint(state.mint_limit),
            CounterKey::NftBalance(a) => uint(&state.nft_balances, a),
            CounterKey::MintCount(a) => uint(&state.mint_counts, a),
            CounterKey::NativeBalance(a) => uint(&state.native, a),
            CounterKey::Messages(a) => {
                if self.vault == Address::ZERO {
                    return Err(GatewayError::NotDeployed("StorageVault"));
                }
                FieldValue::Messages(state.messages.get(a).cloned().unwrap_or_default())
            }
        })
    }

    /// Apply a mined call; returns the logs it emits
    fn apply(&self, from: Address, call: &ContractCall) -> Vec<Log> {
        let mut state = self.state.lock();
        if call.is_transfer() {
            let balance = state.native.entry(from).or_default();
            *balance = balance.saturating_sub(call.value);
            return Vec::new();
        }

        if call.to == self.nft {
            if let Ok(mint) = IBuilderBadge::safeMintCall::abi_decode(&call.input) {
                let token_id = state.total_supply;
                state.total_supply += U256::from(1);
                *state.nft_balances.entry(mint.to).or_default() += U256::from(1);
                *state.mint_counts.entry(from).or_default() += U256::from(1);
                let event = IBuilderBadge::NFTMinted {
                    to: mint.to,
                    tokenId: token_id,
                };
                return vec![Log {
                    address: self.nft,
                    data: event.encode_log_data(),
                }];
            }
        }

        if call.to == self.vault {
            if let Ok(store) = IStorageVault::storeMessageCall::abi_decode(&call.input) {
                state.messages.entry(from).or_default().push(store.message);
            }
        }
        Vec::new()
    }
}

#[async_trait]
impl ChainGateway for MockGateway {
    fn connected_account(&self) -> Option<Address> {
        self.account()
    }

    async fn current_chain_id(&self) -> Result<u64, GatewayError> {
        Ok(*self.chain_id.lock())
    }

    async fn read_field(&self, key: &CounterKey) -> Result<FieldValue, GatewayError> {
        *self.journal.lock().reads.entry(*key).or_default() += 1;
        if self.behaviour.lock().fail_reads {
            return Err(GatewayError::Rpc("mock read failure".to_string()));
        }
        self.read(key)
    }

    async fn token_uri(&self, token_id: U256) -> Result<String, GatewayError> {
        if self.nft == Address::ZERO {
            return Err(GatewayError::NotDeployed("BuilderBadge"));
        }
        Ok(format!("ipfs://QmMockBadges/{token_id}.json"))
    }

    async fn request_signature_and_submit(
        &self,
        call: ContractCall,
    ) -> Result<TxHash, GatewayError> {
        let from = self.account().ok_or(GatewayError::NotConnected)?;
        if self.stall_signatures.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let mut journal = self.journal.lock();
        journal.submitted.push(call.clone());

        if let Some(message) = self.behaviour.lock().reject_with.take() {
            return Err(GatewayError::Rejected(message));
        }

        journal.nonce += 1;
        let hash = keccak256(journal.nonce.to_be_bytes());
        journal.pending.insert(hash, (from, call));
        Ok(hash)
    }

    async fn wait_for_receipt(&self, tx: TxHash) -> Result<ReceiptSummary, GatewayError> {
        self.journal.lock().receipt_waits += 1;
        while self.hold_receipts.load(Ordering::SeqCst) {
            let released = self.release.notified();
            if !self.hold_receipts.load(Ordering::SeqCst) {
                break;
            }
            released.await;
        }

        let (from, call) = self
            .journal
            .lock()
            .pending
            .remove(&tx)
            .ok_or_else(|| GatewayError::Rpc(format!("unknown transaction {tx}")))?;

        let reverted = std::mem::take(&mut self.behaviour.lock().revert_next);
        let logs = if reverted { Vec::new() } else { self.apply(from, &call) };

        Ok(ReceiptSummary {
            tx_hash: tx,
            success: !reverted,
            block_number: Some(1),
            logs,
        })
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), GatewayError> {
        crate::chain::SupportedChain::try_from_id(chain_id)
            .ok_or(GatewayError::UnsupportedChain(chain_id))?;
        *self.chain_id.lock() = chain_id;
        Ok(())
    }
}

/// One notification as it was shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub kind: NotificationKind,
    pub key: Option<String>,
    pub message: String,
}

/// Notification sink that remembers everything
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    shown: Mutex<Vec<Recorded>>,
    dismissed: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn all(&self) -> Vec<Recorded> {
        self.shown.lock().clone()
    }

    pub fn count(&self, kind: NotificationKind) -> usize {
        self.shown.lock().iter().filter(|n| n.kind == kind).count()
    }

    pub fn messages(&self, kind: NotificationKind) -> Vec<String> {
        self.shown
            .lock()
            .iter()
            .filter(|n| n.kind == kind)
            .map(|n| n.message.clone())
            .collect()
    }

    pub fn dismissed(&self) -> Vec<String> {
        self.dismissed.lock().clone()
    }

    fn push(&self, kind: NotificationKind, key: Option<&str>, message: &str) {
        self.shown.lock().push(Recorded {
            kind,
            key: key.map(str::to_string),
            message: message.to_string(),
        });
    }
}

impl NotificationSink for RecordingNotifier {
    fn success(&self, key: Option<&str>, message: &str) {
        self.push(NotificationKind::Success, key, message);
    }

    fn error(&self, key: Option<&str>, message: &str) {
        self.push(NotificationKind::Error, key, message);
    }

    fn loading(&self, key: &str, message: &str) {
        self.push(NotificationKind::Loading, Some(key), message);
    }

    fn dismiss(&self, key: &str) {
        self.dismissed.lock().push(key.to_string());
    }
}
