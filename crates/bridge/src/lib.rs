//! In-process provider bridge between an embedded dapp page and a local
//! wallet.
//!
//! The page talks EIP-1193 through an injected shim; its requests arrive
//! here as `{name, id, object}` events on an IPC channel. The bridge decodes
//! them, prepares and classifies transactions, collects human consent,
//! signs with a credential-derived key and pushes the results back into the
//! page as `window.ethereum` invocations.
//!
//! ```no_run
//! use dapp_bridge::{eth::{api::BridgeApi, chain::HttpChainClient, sign::LocalSigner}, BridgeConfig};
//! use dapp_bridge_channel::{duplex, ChannelConnection};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BridgeConfig::default();
//! let chain = Arc::new(HttpChainClient::new(config.rpc_url.parse()?));
//! let (api, _ui_events) = BridgeApi::new(config.clone(), chain, Arc::new(LocalSigner));
//!
//! let (_page, wallet) = duplex(&config.channel_name);
//! let (inbound, outbound) = wallet.split();
//! tokio::spawn(ChannelConnection::new(&config.channel_name, api).serve(inbound, outbound));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod eth;

pub use config::BridgeConfig;
pub use eth::{
    api::BridgeApi,
    chain::{ChainClient, ChainClientError, HttpChainClient},
    classify::{Classified, TokenRegistry, TransactionClassifier},
    consent::{Approval, ConsentBroker, ConsentRequest, PendingConsent, UiEvent},
    error::BridgeError,
    prepare::TransactionPreparer,
    sign::{ec_recover, LocalSigner, SignedTransaction, Signer},
};
