//! Chain access for the dropper
//!
//! The [`ChainGateway`] trait is the only seam between the transaction
//! lifecycle and the outside world. It bundles two collaborators:
//! - the **chain state reader**: read-only contract fields and balances
//! - the **wallet connector**: session, signing and submission
//!
//! [`AlloyGateway`] talks to a Base JSON-RPC endpoint through alloy. Tests use
//! the in-memory `MockGateway` from `test_utils`.

pub mod alloy_gateway;
pub mod errors;

pub use alloy_gateway::AlloyGateway;
pub use errors::GatewayError;

use crate::contracts::ContractCall;
use crate::types::{CounterKey, FieldValue, ReceiptSummary, Session};
use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;

#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Signing account, if a wallet is connected
    fn connected_account(&self) -> Option<Address>;

    /// Chain id reported by the node
    async fn current_chain_id(&self) -> Result<u64, GatewayError>;

    /// Read one on-chain field
    async fn read_field(&self, key: &CounterKey) -> Result<FieldValue, GatewayError>;

    /// NFT `tokenURI(tokenId)`
    async fn token_uri(&self, token_id: U256) -> Result<String, GatewayError>;

    /// Sign and broadcast a write; resolves once the node accepted it
    async fn request_signature_and_submit(&self, call: ContractCall)
        -> Result<TxHash, GatewayError>;

    /// Suspend until the transaction is mined
    async fn wait_for_receipt(&self, tx: TxHash) -> Result<ReceiptSummary, GatewayError>;

    /// Point the session at another supported chain
    async fn switch_chain(&self, chain_id: u64) -> Result<(), GatewayError>;

    /// Current session snapshot
    async fn session(&self) -> Result<Session, GatewayError> {
        Ok(Session {
            account: self.connected_account(),
            chain_id: self.current_chain_id().await?,
        })
    }
}
