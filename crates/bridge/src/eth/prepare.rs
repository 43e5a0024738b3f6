//! Transaction preparation.
//!
//! Fills the fields a dapp typically omits before the transaction is shown
//! for consent: nonce, gas limit and gas price. Page-provided fee fields win
//! over lookups, the nonce is always taken from pending state.

use crate::eth::{
    chain::ChainClient,
    error::{BridgeError, Result},
};
use dapp_bridge_core::{PreparedFees, TransactionConfig};
use std::sync::Arc;
use tracing::trace;

#[derive(Clone)]
pub struct TransactionPreparer {
    chain: Arc<dyn ChainClient>,
}

impl TransactionPreparer {
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self { chain }
    }

    /// Resolves the fee fields of `config` against the node.
    ///
    /// Lookups only happen for fields the page left unset, so a fully
    /// specified transaction costs a single nonce query.
    pub async fn prepare(&self, config: &TransactionConfig) -> Result<PreparedFees> {
        let nonce =
            self.chain.transaction_count(config.from).await.map_err(BridgeError::Preparation)?;

        // Page-supplied fees are untrusted and may not fit their slots.
        let gas_limit = match config.gas {
            Some(gas) => {
                u64::try_from(gas).map_err(|_| BridgeError::ValueOutOfRange("gas"))?
            }
            None => self.chain.estimate_gas(config).await.map_err(BridgeError::Preparation)?,
        };

        let gas_price = match config.gas_price {
            Some(price) => {
                u128::try_from(price).map_err(|_| BridgeError::ValueOutOfRange("gasPrice"))?
            }
            None => self.chain.gas_price().await.map_err(BridgeError::Preparation)?,
        };

        trace!(target: "bridge::prepare", %nonce, %gas_limit, %gas_price, "prepared fees");
        Ok(PreparedFees { nonce, gas_limit, gas_price })
    }
}
