//! Rendering of responses as injected-provider invocations.
//!
//! The host webview delivers wallet-side messages by evaluating a small
//! script against the page, where the injected shim exposes
//! `window.ethereum.sendResponse`, `sendError` and `setAddress`. Every
//! dynamic value is embedded through JSON encoding, so payloads containing
//! quote characters cannot break out of the generated invocation.

use crate::response::{ChannelResponse, ResponseResult};
use alloy_primitives::Address;

/// A message pushed from the wallet into the embedded page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutboundMessage {
    /// The terminal response or error of one request.
    Respond(ChannelResponse),
    /// Updates the shim's notion of the active address, emitted when account
    /// access is granted.
    SetAddress(Address),
}

impl OutboundMessage {
    /// Renders the invocation evaluated inside the page.
    pub fn render(&self) -> String {
        match self {
            Self::Respond(ChannelResponse { id, result: ResponseResult::Success(value) }) => {
                format!("window.ethereum.sendResponse({id}, {})", json_literal(value))
            }
            Self::Respond(ChannelResponse { id, result: ResponseResult::Error(error) }) => {
                format!(
                    "window.ethereum.sendError({id}, {})",
                    json_literal(&serde_json::Value::String(error.message.clone().into_owned()))
                )
            }
            Self::SetAddress(address) => {
                format!(
                    "window.ethereum.setAddress({})",
                    json_literal(&serde_json::Value::String(address.to_string()))
                )
            }
        }
    }

    /// The correlation id this message settles, if it is a terminal response.
    pub fn response_id(&self) -> Option<u64> {
        match self {
            Self::Respond(resp) => Some(resp.id),
            Self::SetAddress(_) => None,
        }
    }
}

impl From<ChannelResponse> for OutboundMessage {
    fn from(resp: ChannelResponse) -> Self {
        Self::Respond(resp)
    }
}

fn json_literal(value: &serde_json::Value) -> String {
    // Infallible for values that came out of serde_json.
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}
