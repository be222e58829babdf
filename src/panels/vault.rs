//! Message vault panel

use crate::contracts::{is_deployed, ContractCall};
use crate::lifecycle::{Panel, Rejection, MAX_MESSAGE_CHARS};
use crate::state_cache::CounterSnapshot;
use crate::types::{CounterKey, ReceiptSummary};
use alloy::primitives::Address;

#[derive(Debug, Clone)]
pub struct VaultPanel {
    vault: Address,
}

impl VaultPanel {
    pub fn new(vault: Address) -> Self {
        Self { vault }
    }

    pub fn contract(&self) -> Address {
        self.vault
    }
}

impl Panel for VaultPanel {
    /// Draft message text
    type Input = String;
    type Outcome = ();

    fn name(&self) -> &'static str {
        "vault"
    }

    fn precheck(&self, snapshot: &CounterSnapshot, message: &String) -> Result<ContractCall, Rejection> {
        if !is_deployed(self.vault) {
            return Err(Rejection::ContractNotDeployed {
                contract: "Storage Vault",
            });
        }
        snapshot.account.ok_or(Rejection::NotConnected)?;

        if message.trim().is_empty() {
            return Err(Rejection::EmptyMessage);
        }
        let len = message.chars().count();
        if len > MAX_MESSAGE_CHARS {
            return Err(Rejection::MessageTooLong {
                len,
                max: MAX_MESSAGE_CHARS,
            });
        }

        Ok(ContractCall::store_message(self.vault, message.clone()))
    }

    fn confirming_message(&self) -> &'static str {
        "Storing message on-chain..."
    }

    fn success_message(&self, _outcome: &()) -> String {
        "Message stored on-chain!".to_string()
    }

    fn decode_outcome(&self, _receipt: &ReceiptSummary) {}

    fn dependent_keys(&self, account: Address) -> Vec<CounterKey> {
        vec![CounterKey::Messages(account)]
    }

    fn tracked_keys(&self, account: Option<Address>) -> Vec<CounterKey> {
        match account {
            Some(account) if is_deployed(self.vault) => vec![CounterKey::Messages(account)],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MOCK_ACCOUNT, MOCK_VAULT};

    fn connected() -> CounterSnapshot {
        CounterSnapshot {
            account: Some(MOCK_ACCOUNT),
            ..Default::default()
        }
    }

    #[test]
    fn test_accepts_message_at_limit() {
        let message = "é".repeat(MAX_MESSAGE_CHARS);
        let call = VaultPanel::new(MOCK_VAULT).precheck(&connected(), &message).unwrap();
        assert_eq!(call.function, "storeMessage");
        assert_eq!(call.to, MOCK_VAULT);
    }

    #[test]
    fn test_rejects_long_message() {
        let message = "a".repeat(281);
        let err = VaultPanel::new(MOCK_VAULT).precheck(&connected(), &message).unwrap_err();
        assert_eq!(err, Rejection::MessageTooLong { len: 281, max: 280 });
    }

    #[test]
    fn test_rejects_blank_message() {
        let err = VaultPanel::new(MOCK_VAULT)
            .precheck(&connected(), &"   \n".to_string())
            .unwrap_err();
        assert_eq!(err, Rejection::EmptyMessage);
    }

    #[test]
    fn test_zero_address_wins_over_message_checks() {
        let panel = VaultPanel::new(Address::ZERO);
        for message in ["", "hello", &"a".repeat(500)] {
            let err = panel.precheck(&connected(), &message.to_string()).unwrap_err();
            assert!(matches!(err, Rejection::ContractNotDeployed { .. }));
        }
        assert!(panel.tracked_keys(Some(MOCK_ACCOUNT)).is_empty());
    }

    #[test]
    fn test_requires_account() {
        let err = VaultPanel::new(MOCK_VAULT)
            .precheck(&CounterSnapshot::default(), &"hi".to_string())
            .unwrap_err();
        assert_eq!(err, Rejection::NotConnected);
    }
}
