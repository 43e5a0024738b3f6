//! Bridge-level errors and their wire mapping.

use crate::eth::chain::ChainClientError;
use dapp_bridge_core::EventDecodeError;
use dapp_bridge_rpc::{ChannelError, ChannelResponse, ErrorCode};
use serde::Serialize;

pub(crate) type Result<T> = std::result::Result<T, BridgeError>;

/// Everything that can go wrong while handling one request.
#[derive(thiserror::Error, Debug)]
pub enum BridgeError {
    /// The event name was recognized but its payload did not decode.
    #[error("malformed `{0}` event: {1}")]
    MalformedEvent(String, String),
    /// Another request with the same id is still outstanding.
    #[error("request id {0} is already outstanding")]
    DuplicateRequestId(u64),
    /// Nonce or fee lookup against the node failed.
    #[error("failed to prepare transaction: {0}")]
    Preparation(#[source] ChainClientError),
    /// A page-supplied numeric field does not fit its transaction slot.
    #[error("transaction field `{0}` is out of range")]
    ValueOutOfRange(&'static str),
    /// The user declined the consent prompt. Carries the reason verbatim.
    #[error("{0}")]
    UserRejected(String),
    /// The consent prompt stayed unanswered past the configured deadline.
    #[error("consent request timed out")]
    ConsentTimedOut,
    /// The consent surface went away before settling the prompt.
    #[error("consent surface disconnected")]
    ConsentUnavailable,
    /// The supplied credential did not yield a usable signing key, or the
    /// signing operation itself failed.
    #[error("signer error: {0}")]
    Signer(String),
    /// A signature failed to parse or recover.
    #[error(transparent)]
    Signature(#[from] alloy_primitives::SignatureError),
    /// Broadcasting the signed transaction failed.
    #[error("failed to send transaction: {0}")]
    Broadcast(#[source] ChainClientError),
    #[error("{0}")]
    Internal(String),
}

impl From<EventDecodeError> for BridgeError {
    fn from(err: EventDecodeError) -> Self {
        Self::MalformedEvent(err.name, err.source.to_string())
    }
}

impl From<alloy_signer::Error> for BridgeError {
    fn from(err: alloy_signer::Error) -> Self {
        Self::Signer(err.to_string())
    }
}

impl BridgeError {
    /// Maps the error onto the code space of the injected provider.
    pub fn to_channel_error(&self) -> ChannelError {
        match self {
            Self::MalformedEvent(..)
            | Self::Signature(_)
            | Self::DuplicateRequestId(_)
            | Self::ValueOutOfRange(_) => ChannelError::invalid_params(self.to_string()),
            Self::UserRejected(reason) => ChannelError::user_rejected(reason.clone()),
            Self::ConsentTimedOut => {
                ChannelError { code: ErrorCode::UserRejected, message: self.to_string().into() }
            }
            Self::ConsentUnavailable => ChannelError::disconnected(),
            Self::Broadcast(_) => ChannelError::transaction_rejected(self.to_string()),
            Self::Preparation(_) | Self::Signer(_) | Self::Internal(_) => {
                ChannelError::internal_error_with(self.to_string())
            }
        }
    }
}

/// Folds a handler outcome into the terminal response for `id`.
pub(crate) trait ToChannelResponse {
    fn to_channel_response(self, id: u64) -> ChannelResponse;
}

impl<T: Serialize> ToChannelResponse for Result<T> {
    fn to_channel_response(self, id: u64) -> ChannelResponse {
        match self {
            Ok(value) => ChannelResponse::success(id, value),
            Err(err) => ChannelResponse::error(id, err.to_channel_error()),
        }
    }
}
