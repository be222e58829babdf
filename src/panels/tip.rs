//! Tip jar panel: plain ETH transfer to the creator

use crate::contracts::ContractCall;
use crate::lifecycle::{Panel, Rejection};
use crate::state_cache::CounterSnapshot;
use crate::types::{CounterKey, ReceiptSummary};
use alloy::primitives::utils::parse_ether;
use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Suggested tip sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TipPreset {
    Coffee,
    Lunch,
    Generous,
}

impl TipPreset {
    pub const ALL: [TipPreset; 3] = [Self::Coffee, Self::Lunch, Self::Generous];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Coffee => "Coffee",
            Self::Lunch => "Lunch",
            Self::Generous => "Generous",
        }
    }

    /// Amount in ETH, as typed by a user
    pub fn amount(&self) -> &'static str {
        match self {
            Self::Coffee => "0.001",
            Self::Lunch => "0.005",
            Self::Generous => "0.01",
        }
    }
}

/// Tip form; a preset and a custom amount are mutually exclusive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TipInput {
    preset: Option<TipPreset>,
    custom: String,
}

impl TipInput {
    pub fn preset(preset: TipPreset) -> Self {
        Self {
            preset: Some(preset),
            custom: String::new(),
        }
    }

    pub fn custom(amount: impl Into<String>) -> Self {
        Self {
            preset: None,
            custom: amount.into(),
        }
    }

    /// Selecting a preset clears the custom amount
    pub fn select_preset(&mut self, preset: TipPreset) {
        self.preset = Some(preset);
        self.custom.clear();
    }

    /// Typing a custom amount clears the preset
    pub fn set_custom(&mut self, amount: impl Into<String>) {
        self.preset = None;
        self.custom = amount.into();
    }

    /// The amount that would be sent; the preset wins when set
    pub fn amount(&self) -> Option<&str> {
        match self.preset {
            Some(preset) => Some(preset.amount()),
            None if !self.custom.trim().is_empty() => Some(self.custom.trim()),
            None => None,
        }
    }
}

/// Parse a user-typed ETH amount into wei; only positive values are valid
pub fn parse_tip_amount(amount: &str) -> Result<U256, Rejection> {
    let amount = amount.trim();
    if amount.is_empty() || amount.starts_with('-') {
        return Err(Rejection::InvalidAmount);
    }
    match parse_ether(amount) {
        Ok(wei) if !wei.is_zero() => Ok(wei),
        _ => Err(Rejection::InvalidAmount),
    }
}

#[derive(Debug, Clone)]
pub struct TipPanel {
    recipient: Address,
}

impl TipPanel {
    pub fn new(recipient: Address) -> Self {
        Self { recipient }
    }

    pub fn recipient(&self) -> Address {
        self.recipient
    }
}

impl Panel for TipPanel {
    type Input = TipInput;
    type Outcome = ();

    fn name(&self) -> &'static str {
        "tip"
    }

    fn precheck(&self, snapshot: &CounterSnapshot, input: &TipInput) -> Result<ContractCall, Rejection> {
        snapshot.account.ok_or(Rejection::NotConnected)?;

        let value = parse_tip_amount(input.amount().ok_or(Rejection::InvalidAmount)?)?;
        if let Some(balance) = snapshot.native_balance {
            if value > balance {
                return Err(Rejection::InsufficientBalance);
            }
        }

        Ok(ContractCall::transfer(self.recipient, value))
    }

    fn confirming_message(&self) -> &'static str {
        "Sending tip..."
    }

    fn success_message(&self, _outcome: &()) -> String {
        "Tip sent successfully! Thank you!".to_string()
    }

    fn decode_outcome(&self, _receipt: &ReceiptSummary) {}

    fn dependent_keys(&self, account: Address) -> Vec<CounterKey> {
        vec![CounterKey::NativeBalance(account)]
    }

    fn tracked_keys(&self, account: Option<Address>) -> Vec<CounterKey> {
        account.map(CounterKey::NativeBalance).into_iter().collect()
    }
}
