//! NFT mint panel

use crate::contracts::{decode_minted_token_id, is_deployed, ContractCall};
use crate::lifecycle::{Panel, Rejection};
use crate::state_cache::CounterSnapshot;
use crate::types::{CounterKey, ReceiptSummary};
use alloy::primitives::{Address, U256};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct MintPanel {
    nft: Address,
}

impl MintPanel {
    pub fn new(nft: Address) -> Self {
        Self { nft }
    }

    pub fn contract(&self) -> Address {
        self.nft
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintOutcome {
    /// From the `NFTMinted` event; `None` if the receipt carried no such log
    pub token_id: Option<U256>,
}

impl Panel for MintPanel {
    type Input = ();
    type Outcome = MintOutcome;

    fn name(&self) -> &'static str {
        "mint"
    }

    fn precheck(&self, snapshot: &CounterSnapshot, _input: &()) -> Result<ContractCall, Rejection> {
        if !is_deployed(self.nft) {
            return Err(Rejection::ContractNotDeployed {
                contract: "BuilderBadge",
            });
        }
        let account = snapshot.account.ok_or(Rejection::NotConnected)?;

        // counters that failed to load are left to the contract
        if let (Some(count), Some(limit)) = (snapshot.mint_count, snapshot.mint_limit) {
            if count >= limit {
                return Err(Rejection::MintLimitReached { limit });
            }
        }

        if let (Some(total), Some(max)) = (snapshot.total_supply, snapshot.max_supply) {
            if total >= max {
                return Err(Rejection::MaxSupplyReached);
            }
        }

        Ok(ContractCall::safe_mint(self.nft, account))
    }

    fn confirming_message(&self) -> &'static str {
        "Confirming transaction..."
    }

    fn success_message(&self, outcome: &MintOutcome) -> String {
        match outcome.token_id {
            Some(id) => format!("NFT minted successfully! Token #{id}"),
            None => "NFT minted successfully!".to_string(),
        }
    }

    fn decode_outcome(&self, receipt: &ReceiptSummary) -> MintOutcome {
        MintOutcome {
            token_id: decode_minted_token_id(&receipt.logs),
        }
    }

    fn dependent_keys(&self, account: Address) -> Vec<CounterKey> {
        vec![
            CounterKey::TotalSupply,
            CounterKey::NftBalance(account),
            CounterKey::MintCount(account),
        ]
    }

    fn tracked_keys(&self, account: Option<Address>) -> Vec<CounterKey> {
        if !is_deployed(self.nft) {
            return Vec::new();
        }
        CounterKey::mint_keys(account)
    }
}

/// Drop progress as displayed next to the mint button
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MintStats {
    pub total_supply: Option<U256>,
    pub max_supply: Option<U256>,
    pub balance: Option<U256>,
    pub mint_count: Option<U256>,
    pub mint_limit: Option<U256>,
}

impl MintStats {
    pub fn from_snapshot(snapshot: &CounterSnapshot) -> Self {
        Self {
            total_supply: snapshot.total_supply,
            max_supply: snapshot.max_supply,
            balance: snapshot.nft_balance,
            mint_count: snapshot.mint_count,
            mint_limit: snapshot.mint_limit,
        }
    }

    /// `supply * 100 / max` in integer arithmetic; zero when unknown
    pub fn progress_percent(&self) -> u64 {
        match (self.total_supply, self.max_supply) {
            (Some(total), Some(max)) if !max.is_zero() => {
                let pct = total.saturating_mul(U256::from(100)) / max;
                u64::try_from(pct).unwrap_or(u64::MAX)
            }
            _ => 0,
        }
    }

    /// Whether the mint button would be enabled
    pub fn can_mint(&self) -> bool {
        matches!((self.mint_count, self.mint_limit), (Some(c), Some(l)) if c < l)
    }

    pub fn remaining_for_wallet(&self) -> Option<U256> {
        Some(self.mint_limit?.saturating_sub(self.mint_count?))
    }
}

impl std::fmt::Display for MintStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = |v: Option<U256>| v.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string());
        write!(
            f,
            "Minted {} / {} ({}%) | You own {} | Minted by you {} / {}",
            show(self.total_supply),
            show(self.max_supply),
            self.progress_percent(),
            show(self.balance),
            show(self.mint_count),
            show(self.mint_limit),
        )
    }
}
