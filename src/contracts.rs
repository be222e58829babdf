//! ABI bindings for the two external contracts and the write descriptor
//! handed to the wallet.

use alloy::primitives::{Address, Bytes, Log, U256};
use alloy::sol;
use alloy::sol_types::{SolCall, SolEvent};

sol! {
    /// Builder Badge capped-supply NFT
    #[derive(Debug)]
    interface IBuilderBadge {
        function totalSupply() external view returns (uint256);
        function balanceOf(address owner) external view returns (uint256);
        function MAX_SUPPLY() external view returns (uint256);
        function MINT_LIMIT_PER_WALLET() external view returns (uint256);
        function mintCount(address minter) external view returns (uint256);
        function tokenURI(uint256 tokenId) external view returns (string);
        function safeMint(address to) external payable;

        event NFTMinted(address indexed to, uint256 indexed tokenId);
    }

    /// Per-account message storage
    #[derive(Debug)]
    interface IStorageVault {
        function getMessages(address owner) external view returns (string[]);
        function storeMessage(string message) external;
    }
}

/// A state-changing call waiting for the wallet's signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    /// Contract or plain recipient
    pub to: Address,
    /// ABI-encoded calldata; empty for a plain value transfer
    pub input: Bytes,
    /// Native value attached
    pub value: U256,
    /// Function name, for logs and notifications
    pub function: &'static str,
}

impl ContractCall {
    pub fn safe_mint(nft: Address, to: Address) -> Self {
        Self {
            to: nft,
            input: IBuilderBadge::safeMintCall { to }.abi_encode().into(),
            value: U256::ZERO,
            function: "safeMint",
        }
    }

    pub fn store_message(vault: Address, message: String) -> Self {
        Self {
            to: vault,
            input: IStorageVault::storeMessageCall { message }.abi_encode().into(),
            value: U256::ZERO,
            function: "storeMessage",
        }
    }

    pub fn transfer(to: Address, value: U256) -> Self {
        Self {
            to,
            input: Bytes::new(),
            value,
            function: "transfer",
        }
    }

    /// True for a plain native-currency transfer
    pub fn is_transfer(&self) -> bool {
        self.input.is_empty()
    }
}

/// The zero address stands for "not deployed yet"
pub fn is_deployed(address: Address) -> bool {
    address != Address::ZERO
}

/// Token id carried by the first `NFTMinted` event in a receipt's logs
pub fn decode_minted_token_id(logs: &[Log]) -> Option<U256> {
    logs.iter()
        .filter(|log| log.topics().first() == Some(&IBuilderBadge::NFTMinted::SIGNATURE_HASH))
        .find_map(|log| IBuilderBadge::NFTMinted::decode_log_data(&log.data).ok())
        .map(|event| event.tokenId)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{B256, LogData};

    fn minted_log(contract: Address, to: Address, token_id: u64) -> Log {
        let event = IBuilderBadge::NFTMinted {
            to,
            tokenId: U256::from(token_id),
        };
        Log {
            address: contract,
            data: event.encode_log_data(),
        }
    }

    #[test]
    fn test_decode_minted_token_id() {
        let nft = Address::repeat_byte(0x01);
        let unrelated = Log {
            address: nft,
            data: LogData::new_unchecked(vec![B256::repeat_byte(0x99)], Bytes::new()),
        };
        let logs = vec![unrelated, minted_log(nft, Address::repeat_byte(0x02), 42)];
        assert_eq!(decode_minted_token_id(&logs), Some(U256::from(42)));
    }

    #[test]
    fn test_decode_without_event() {
        assert_eq!(decode_minted_token_id(&[]), None);
    }

    #[test]
    fn test_safe_mint_calldata() {
        let call = ContractCall::safe_mint(Address::repeat_byte(0x01), Address::repeat_byte(0x02));
        assert_eq!(&call.input[..4], IBuilderBadge::safeMintCall::SELECTOR.as_slice());
        assert_eq!(call.value, U256::ZERO);
        assert!(!call.is_transfer());
    }

    #[test]
    fn test_transfer_has_no_calldata() {
        let call = ContractCall::transfer(Address::repeat_byte(0x03), U256::from(5));
        assert!(call.is_transfer());
        assert_eq!(call.function, "transfer");
    }

    #[test]
    fn test_zero_address_is_not_deployed() {
        assert!(!is_deployed(Address::ZERO));
        assert!(is_deployed(Address::repeat_byte(0x01)));
    }
}
