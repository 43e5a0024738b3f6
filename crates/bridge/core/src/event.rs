//! Inbound event model.
//!
//! Events arrive from the embedded page as `{name, id, object}` and are
//! decoded in two stages: first into [`RawEvent`] (so that an unknown `name`
//! can be ignored without an error, and a malformed `object` can still be
//! answered under its `id`), then into the typed [`DappEvent`] union.

use crate::transaction::TransactionConfig;
use alloy_primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};

/// An event as it appears on the wire, before the payload is interpreted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub name: String,
    pub id: u64,
    #[serde(default)]
    pub object: serde_json::Value,
}

impl RawEvent {
    pub fn new(name: impl Into<String>, id: u64, object: serde_json::Value) -> Self {
        Self { name: name.into(), id, object }
    }
}

/// A fully decoded request from the embedded page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DappEvent {
    /// Correlation identifier, unique per outstanding request.
    pub id: u64,
    pub kind: EventKind,
}

/// The fixed set of request kinds a page may send, each with its own typed
/// payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    RequestAccounts,
    SignTransaction(TransactionConfig),
    SignMessage(SignMessagePayload),
    SignPersonalMessage(SignMessagePayload),
    SignTypedMessage(SignTypedMessagePayload),
    EcRecover(EcRecoverPayload),
    WatchAsset(WatchAssetPayload),
    AddEthereumChain(AddChainPayload),
}

impl EventKind {
    /// The wire-level `name` of this event kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RequestAccounts => "requestAccounts",
            Self::SignTransaction(_) => "signTransaction",
            Self::SignMessage(_) => "signMessage",
            Self::SignPersonalMessage(_) => "signPersonalMessage",
            Self::SignTypedMessage(_) => "signTypedMessage",
            Self::EcRecover(_) => "ecRecover",
            Self::WatchAsset(_) => "watchAsset",
            Self::AddEthereumChain(_) => "addEthereumChain",
        }
    }
}

/// Payload of `signMessage` and `signPersonalMessage`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignMessagePayload {
    /// Hex encoded message bytes.
    pub data: Bytes,
}

/// Payload of `signTypedMessage`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignTypedMessagePayload {
    /// The EIP-712 payload as a JSON string, passed through verbatim by the
    /// injected provider.
    pub raw: String,
}

/// Payload of `ecRecover`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcRecoverPayload {
    /// Hex encoded message that was signed.
    pub message: Bytes,
    /// Hex encoded 65-byte signature.
    pub signature: Bytes,
}

/// Payload of `watchAsset` (EIP-747 shape).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchAssetPayload {
    #[serde(rename = "type")]
    pub asset_type: String,
    pub options: WatchAssetOptions,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchAssetOptions {
    pub address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Payload of `addEthereumChain` (EIP-3085 shape).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainPayload {
    /// Hex encoded chain id, e.g. `0x19`.
    pub chain_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rpc_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub block_explorer_urls: Vec<String>,
}

/// Error produced when a known event's payload does not match its schema.
#[derive(Debug, thiserror::Error)]
#[error("malformed `{name}` event: {source}")]
pub struct EventDecodeError {
    pub name: String,
    #[source]
    pub source: serde_json::Error,
}

impl DappEvent {
    /// Decodes a [`RawEvent`] into a typed event.
    ///
    /// Returns `Ok(None)` for an unrecognized `name`: pages may send request
    /// kinds from newer provider revisions, and those are ignored rather
    /// than answered with an error.
    pub fn from_raw(raw: RawEvent) -> Result<Option<Self>, EventDecodeError> {
        let RawEvent { name, id, object } = raw;

        fn payload<T: serde::de::DeserializeOwned>(
            name: &str,
            object: serde_json::Value,
        ) -> Result<T, EventDecodeError> {
            serde_json::from_value(object)
                .map_err(|source| EventDecodeError { name: name.to_string(), source })
        }

        let kind = match name.as_str() {
            "requestAccounts" => EventKind::RequestAccounts,
            "signTransaction" => EventKind::SignTransaction(payload(&name, object)?),
            "signMessage" => EventKind::SignMessage(payload(&name, object)?),
            "signPersonalMessage" => EventKind::SignPersonalMessage(payload(&name, object)?),
            "signTypedMessage" => EventKind::SignTypedMessage(payload(&name, object)?),
            "ecRecover" => EventKind::EcRecover(payload(&name, object)?),
            "watchAsset" => EventKind::WatchAsset(payload(&name, object)?),
            "addEthereumChain" => EventKind::AddEthereumChain(payload(&name, object)?),
            _ => return Ok(None),
        };

        Ok(Some(Self { id, kind }))
    }
}
