//! Read and broadcast access to the backing chain.

use alloy_primitives::{Address, Bytes, TxHash, TxKind};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types_eth::{TransactionInput, TransactionRequest};
use async_trait::async_trait;
use dapp_bridge_core::TransactionConfig;
use url::Url;

/// Errors surfaced by the node while preparing or broadcasting.
#[derive(thiserror::Error, Debug)]
pub enum ChainClientError {
    #[error("rpc transport error: {0}")]
    Transport(String),
    #[error("execution reverted: {0}")]
    Revert(String),
}

impl ChainClientError {
    fn from_rpc(err: impl std::fmt::Display) -> Self {
        let message = err.to_string();
        if message.contains("revert") {
            Self::Revert(message)
        } else {
            Self::Transport(message)
        }
    }
}

/// The chain operations the bridge relies on.
///
/// Abstracted so the dispatcher can be driven against a mock node in tests.
#[async_trait]
pub trait ChainClient: Send + Sync + 'static {
    /// Pending-state transaction count of `address`, used as the next nonce.
    async fn transaction_count(&self, address: Address) -> Result<u64, ChainClientError>;

    /// Gas estimate for the given call.
    async fn estimate_gas(&self, config: &TransactionConfig) -> Result<u64, ChainClientError>;

    /// Current gas price in wei.
    async fn gas_price(&self) -> Result<u128, ChainClientError>;

    /// Executes a read-only call against latest state.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainClientError>;

    /// Broadcasts a signed, RLP encoded transaction.
    async fn send_raw_transaction(&self, tx: Bytes) -> Result<TxHash, ChainClientError>;
}

/// [`ChainClient`] over an HTTP JSON-RPC endpoint.
pub struct HttpChainClient {
    provider: DynProvider,
}

impl HttpChainClient {
    pub fn new(rpc_url: Url) -> Self {
        Self { provider: ProviderBuilder::new().connect_http(rpc_url).erased() }
    }
}

fn call_request(config: &TransactionConfig) -> TransactionRequest {
    TransactionRequest {
        from: Some(config.from),
        to: Some(TxKind::Call(config.to)),
        value: config.value,
        input: TransactionInput::new(config.input()),
        ..Default::default()
    }
}

#[async_trait]
impl ChainClient for HttpChainClient {
    async fn transaction_count(&self, address: Address) -> Result<u64, ChainClientError> {
        self.provider
            .get_transaction_count(address)
            .pending()
            .await
            .map_err(ChainClientError::from_rpc)
    }

    async fn estimate_gas(&self, config: &TransactionConfig) -> Result<u64, ChainClientError> {
        self.provider.estimate_gas(call_request(config)).await.map_err(ChainClientError::from_rpc)
    }

    async fn gas_price(&self) -> Result<u128, ChainClientError> {
        self.provider.get_gas_price().await.map_err(ChainClientError::from_rpc)
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainClientError> {
        let request = TransactionRequest {
            to: Some(TxKind::Call(to)),
            input: TransactionInput::new(data),
            ..Default::default()
        };
        self.provider.call(request).await.map_err(ChainClientError::from_rpc)
    }

    async fn send_raw_transaction(&self, tx: Bytes) -> Result<TxHash, ChainClientError> {
        let pending = self
            .provider
            .send_raw_transaction(&tx)
            .await
            .map_err(ChainClientError::from_rpc)?;
        Ok(*pending.tx_hash())
    }
}
