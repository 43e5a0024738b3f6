//! Inbound message framing.

use dapp_bridge_core::RawEvent;
use serde::{Deserialize, Serialize};

/// The transport-level envelope around inbound events, mirroring the host
/// webview's `ipc-message` shape: a channel name and positional arguments,
/// of which the first is the event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelEnvelope {
    pub channel: String,
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
}

impl ChannelEnvelope {
    /// Wraps a single event for the given channel.
    pub fn new(channel: impl Into<String>, event: &RawEvent) -> Self {
        Self {
            channel: channel.into(),
            args: vec![serde_json::to_value(event).unwrap_or(serde_json::Value::Null)],
        }
    }

    /// Extracts the event if this envelope is addressed to `channel`.
    ///
    /// Returns `None` for a foreign channel name, an empty argument list, or
    /// a first argument that is not event-shaped; none of those are
    /// answerable, so they are dropped rather than errored.
    pub fn into_event(self, channel: &str) -> Option<RawEvent> {
        if self.channel != channel {
            return None;
        }
        let first = self.args.into_iter().next()?;
        serde_json::from_value(first).ok()
    }
}
