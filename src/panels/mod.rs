//! The three user actions of the dApp

pub mod mint;
pub mod tip;
pub mod vault;

pub use mint::{MintOutcome, MintPanel, MintStats};
pub use tip::{parse_tip_amount, TipInput, TipPanel, TipPreset};
pub use vault::VaultPanel;

use crate::lifecycle::TransactionController;

pub type MintController = TransactionController<MintPanel>;
pub type VaultController = TransactionController<VaultPanel>;
pub type TipController = TransactionController<TipPanel>;
