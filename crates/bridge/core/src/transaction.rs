//! Partial transaction descriptions supplied by embedded pages.

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// A partial description of a contract call or value transfer, as supplied by
/// the embedded page alongside a `signTransaction` event.
///
/// `gas`, `gasPrice` and `nonce` may be absent; they are concretely populated
/// by the transaction preparer before the config reaches a signer. A `nonce`
/// supplied by the page is ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionConfig {
    pub from: Address,
    pub to: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    /// Gas limit. Pages are inconsistent about the field name, so both `gas`
    /// and `gasLimit` are accepted.
    #[serde(default, alias = "gasLimit", skip_serializing_if = "Option::is_none")]
    pub gas: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
}

impl TransactionConfig {
    /// Returns the call payload, or an empty byte string when absent.
    pub fn input(&self) -> Bytes {
        self.data.clone().unwrap_or_default()
    }
}

/// Execution parameters computed by the transaction preparer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreparedFees {
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: u128,
}

/// A [`TransactionConfig`] with all execution parameters concretely
/// populated. Only this form is handed to a signer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedTransaction {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: u128,
}

impl PreparedTransaction {
    /// Combines the page-supplied config with resolved fees.
    ///
    /// The fee fields are taken from `fees` as-is: the preparer has already
    /// folded bounds-checked page-supplied values into them, and the nonce
    /// always comes from the preparer.
    pub fn new(config: &TransactionConfig, fees: PreparedFees) -> Self {
        Self {
            from: config.from,
            to: config.to,
            data: config.input(),
            value: config.value.unwrap_or_default(),
            nonce: fees.nonce,
            gas_limit: fees.gas_limit,
            gas_price: fees.gas_price,
        }
    }
}
