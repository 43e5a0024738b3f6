//! Calldata classification.
//!
//! Inspects outgoing transaction data and recognizes ERC-20 `approve`
//! calls, so consent can show the spender and amount instead of opaque
//! bytes. Token metadata is looked up on chain and memoized per contract.

use crate::eth::chain::ChainClient;
use alloy_primitives::{Address, Bytes};
use alloy_sol_types::{sol, SolCall};
use dapp_bridge_core::{TokenApproval, TokenData};
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, warn};

sol! {
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
    }
}

/// The consent-relevant shape of one transaction's calldata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classified {
    /// Anything that is not a recognized token operation.
    Plain,
    /// An ERC-20 `approve(spender, amount)` call.
    TokenApproval(TokenApproval),
}

/// On-chain token metadata lookups with a per-contract cache.
pub struct TokenRegistry {
    chain: Arc<dyn ChainClient>,
    cache: Mutex<HashMap<Address, TokenData>>,
}

impl TokenRegistry {
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self { chain, cache: Mutex::new(HashMap::new()) }
    }

    /// Returns the metadata of the token at `contract`.
    ///
    /// Lookup failures degrade to [`TokenData::unknown`] rather than failing
    /// the surrounding flow; a token without `symbol()` is still approvable.
    pub async fn metadata(&self, contract: Address) -> TokenData {
        if let Some(hit) = self.cache.lock().get(&contract) {
            return hit.clone();
        }

        let symbol = self.read::<IERC20::symbolCall>(contract, IERC20::symbolCall {}).await;
        let decimals = self.read::<IERC20::decimalsCall>(contract, IERC20::decimalsCall {}).await;
        if symbol.is_none() && decimals.is_none() {
            warn!(target: "bridge::classify", %contract, "token metadata unavailable");
        }

        let data = TokenData { contract_address: contract, symbol, decimals };
        self.cache.lock().insert(contract, data.clone());
        data
    }

    async fn read<C: SolCall>(&self, contract: Address, call: C) -> Option<C::Return> {
        let ret = self.chain.call(contract, call.abi_encode().into()).await.ok()?;
        C::abi_decode_returns(&ret).ok()
    }
}

/// Classifies prepared transactions ahead of consent.
pub struct TransactionClassifier {
    tokens: TokenRegistry,
}

impl TransactionClassifier {
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self { tokens: TokenRegistry::new(chain) }
    }

    pub async fn classify(&self, to: Address, data: &[u8]) -> Classified {
        if !data.starts_with(&IERC20::approveCall::SELECTOR) {
            return Classified::Plain;
        }
        match IERC20::approveCall::abi_decode(data) {
            Ok(call) => {
                debug!(target: "bridge::classify", token = %to, spender = %call.spender, "detected token approval");
                let token = self.tokens.metadata(to).await;
                Classified::TokenApproval(TokenApproval {
                    token,
                    spender: call.spender,
                    amount: call.amount,
                })
            }
            // Matching selector but undecodable arguments: treat as plain
            // calldata and let the user judge the raw transaction.
            Err(_) => Classified::Plain,
        }
    }
}

/// Re-encodes an approval from its decoded fields, so the transaction that
/// gets signed is exactly what consent displayed.
pub fn approval_calldata(approval: &TokenApproval) -> Bytes {
    IERC20::approveCall { spender: approval.spender, amount: approval.amount }.abi_encode().into()
}
