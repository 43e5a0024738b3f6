//! Token metadata and decoded approval calls.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Metadata of an ERC-20 contract, looked up on demand and cached.
///
/// `symbol`/`decimals` are optional: a token that does not answer the
/// metadata calls still renders a consent prompt, just without them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
    pub contract_address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
}

impl TokenData {
    /// Placeholder metadata for a contract whose metadata calls failed.
    pub fn unknown(contract_address: Address) -> Self {
        Self { contract_address, symbol: None, decimals: None }
    }
}

/// The decoded fields of an ERC-20 `approve(spender, amount)` call, produced
/// by reclassifying a `signTransaction` event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenApproval {
    #[serde(rename = "tokenData")]
    pub token: TokenData,
    pub spender: Address,
    pub amount: U256,
}
