//! What varies between the mint, vault and tip panels

use super::errors::Rejection;
use crate::contracts::ContractCall;
use crate::state_cache::CounterSnapshot;
use crate::types::{CounterKey, ReceiptSummary};
use alloy::primitives::Address;
use std::fmt::Debug;

/// One instantiation of the transaction lifecycle
pub trait Panel: Send + Sync + 'static {
    /// Transient form input; `Default` is the cleared form
    type Input: Clone + Default + Debug + Send + Sync;

    /// Result decoded from a successful receipt
    type Outcome: Clone + Debug + PartialEq + Send + Sync;

    /// Panel name for logs
    fn name(&self) -> &'static str;

    /// Pure eligibility check.
    ///
    /// Returns the write to submit, or the reason it may not be submitted.
    fn precheck(&self, snapshot: &CounterSnapshot, input: &Self::Input)
        -> Result<ContractCall, Rejection>;

    /// Progress text shown while the transaction is being mined
    fn confirming_message(&self) -> &'static str;

    fn success_message(&self, outcome: &Self::Outcome) -> String;

    /// Extract the panel result from a successful receipt
    fn decode_outcome(&self, receipt: &ReceiptSummary) -> Self::Outcome;

    /// Counters to refresh after a confirmed write by `account`
    fn dependent_keys(&self, account: Address) -> Vec<CounterKey>;

    /// Counters this panel displays and polls
    fn tracked_keys(&self, account: Option<Address>) -> Vec<CounterKey>;
}
