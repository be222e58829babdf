//! JSON-RPC gateway backed by an alloy HTTP provider

use super::{ChainGateway, GatewayError};
use crate::chain::SupportedChain;
use crate::config::AppConfig;
use crate::contracts::{is_deployed, ContractCall, IBuilderBadge, IStorageVault};
use crate::metrics::{metrics, Timer};
use crate::types::{CounterKey, FieldValue, ReceiptSummary};
use crate::wallet::WalletManager;
use alloy::network::{ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

struct Connection {
    chain: SupportedChain,
    provider: DynProvider,
}

/// Gateway over a Base RPC endpoint with an optional local signer
pub struct AlloyGateway {
    connection: RwLock<Connection>,
    wallet: Option<WalletManager>,
    nft: Address,
    vault: Address,
    /// RPC override, only honoured for the configured chain
    rpc_override: Option<(SupportedChain, Url)>,
    receipt_timeout: Duration,
    receipt_poll: Duration,
}

impl AlloyGateway {
    /// Build a gateway from validated configuration
    pub fn new(config: &AppConfig, wallet: Option<WalletManager>) -> Result<Self, GatewayError> {
        let chain = config.chain();
        let url = config
            .rpc_endpoint()
            .map_err(|e| GatewayError::Rpc(e.to_string()))?;
        let rpc_override = config.rpc_url.as_ref().map(|_| (chain, url.clone()));
        let provider = connect(url, wallet.as_ref());

        Ok(Self {
            connection: RwLock::new(Connection { chain, provider }),
            wallet,
            nft: config.nft_contract,
            vault: config.vault_contract,
            rpc_override,
            receipt_timeout: config.receipt_timeout(),
            receipt_poll: config.receipt_poll(),
        })
    }

    /// Chain the gateway is currently pointed at
    pub fn chain(&self) -> SupportedChain {
        self.connection.read().chain
    }

    fn provider(&self) -> DynProvider {
        self.connection.read().provider.clone()
    }

    async fn call_view<C: SolCall + Send>(&self, to: Address, call: C) -> Result<C::Return, GatewayError> {
        let tx = TransactionRequest::default()
            .with_to(to)
            .with_input(call.abi_encode());
        let timer = Timer::new();
        let output = self.provider().call(tx).await.map_err(GatewayError::rpc)?;
        timer.observe_duration(&metrics().read_latency);
        C::abi_decode_returns(&output).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    fn nft(&self) -> Result<Address, GatewayError> {
        if is_deployed(self.nft) {
            Ok(self.nft)
        } else {
            Err(GatewayError::NotDeployed("BuilderBadge"))
        }
    }

    fn vault(&self) -> Result<Address, GatewayError> {
        if is_deployed(self.vault) {
            Ok(self.vault)
        } else {
            Err(GatewayError::NotDeployed("StorageVault"))
        }
    }
}

fn connect(url: Url, wallet: Option<&WalletManager>) -> DynProvider {
    match wallet {
        Some(wallet) => ProviderBuilder::new()
            .wallet(wallet.ethereum_wallet())
            .connect_http(url)
            .erased(),
        None => ProviderBuilder::new().connect_http(url).erased(),
    }
}

#[async_trait]
impl ChainGateway for AlloyGateway {
    fn connected_account(&self) -> Option<Address> {
        self.wallet.as_ref().map(WalletManager::address)
    }

    async fn current_chain_id(&self) -> Result<u64, GatewayError> {
        self.provider().get_chain_id().await.map_err(GatewayError::rpc)
    }

    async fn read_field(&self, key: &CounterKey) -> Result<FieldValue, GatewayError> {
        let value = match *key {
            CounterKey::TotalSupply => {
                FieldValue::Uint(self.call_view(self.nft()?, IBuilderBadge::totalSupplyCall {}).await?)
            }
            CounterKey::MaxSupply => {
                FieldValue::Uint(self.call_view(self.nft()?, IBuilderBadge::MAX_SUPPLYCall {}).await?)
            }
            CounterKey::MintLimit => FieldValue::Uint(
                self.call_view(self.nft()?, IBuilderBadge::MINT_LIMIT_PER_WALLETCall {})
                    .await?,
            ),
            CounterKey::NftBalance(owner) => FieldValue::Uint(
                self.call_view(self.nft()?, IBuilderBadge::balanceOfCall { owner })
                    .await?,
            ),
            CounterKey::MintCount(minter) => FieldValue::Uint(
                self.call_view(self.nft()?, IBuilderBadge::mintCountCall { minter })
                    .await?,
            ),
            CounterKey::Messages(owner) => FieldValue::Messages(
                self.call_view(self.vault()?, IStorageVault::getMessagesCall { owner })
                    .await?,
            ),
            CounterKey::NativeBalance(account) => FieldValue::Uint(
                self.provider()
                    .get_balance(account)
                    .await
                    .map_err(GatewayError::rpc)?,
            ),
        };
        debug!(key = key.label(), "Read on-chain field");
        Ok(value)
    }

    async fn token_uri(&self, token_id: U256) -> Result<String, GatewayError> {
        self.call_view(self.nft()?, IBuilderBadge::tokenURICall { tokenId: token_id })
            .await
    }

    async fn request_signature_and_submit(
        &self,
        call: ContractCall,
    ) -> Result<TxHash, GatewayError> {
        let from = self.connected_account().ok_or(GatewayError::NotConnected)?;

        let mut tx = TransactionRequest::default()
            .with_from(from)
            .with_to(call.to)
            .with_value(call.value);
        if !call.is_transfer() {
            tx = tx.with_input(call.input.clone());
        }

        let pending = self
            .provider()
            .send_transaction(tx)
            .await
            .map_err(GatewayError::rejected)?;
        let hash = *pending.tx_hash();
        info!(function = call.function, tx = %hash, "Transaction submitted");
        Ok(hash)
    }

    async fn wait_for_receipt(&self, tx: TxHash) -> Result<ReceiptSummary, GatewayError> {
        let provider = self.provider();
        let poll = self.receipt_poll;

        let wait = async {
            loop {
                match provider.get_transaction_receipt(tx).await {
                    Ok(Some(receipt)) => return receipt,
                    Ok(None) => {}
                    // Transient node errors are absorbed by the next poll
                    Err(e) => debug!(tx = %tx, error = %e, "Receipt poll failed"),
                }
                tokio::time::sleep(poll).await;
            }
        };

        let receipt = tokio::time::timeout(self.receipt_timeout, wait)
            .await
            .map_err(|_| GatewayError::Timeout {
                tx,
                waited_secs: self.receipt_timeout.as_secs(),
            })?;

        Ok(ReceiptSummary {
            tx_hash: tx,
            success: ReceiptResponse::status(&receipt),
            block_number: receipt.block_number,
            logs: receipt
                .inner
                .logs()
                .iter()
                .map(|log| log.inner.clone())
                .collect(),
        })
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), GatewayError> {
        let chain =
            SupportedChain::try_from_id(chain_id).ok_or(GatewayError::UnsupportedChain(chain_id))?;

        let url = match &self.rpc_override {
            Some((configured, url)) if *configured == chain => url.clone(),
            _ => Url::parse(chain.default_rpc_url()).map_err(GatewayError::rpc)?,
        };

        let provider = connect(url, self.wallet.as_ref());
        *self.connection.write() = Connection { chain, provider };
        info!(chain = %chain, "Switched chain");
        Ok(())
    }
}
