//! # dapp-bridge-channel
//!
//! The single named, bidirectional message channel between an embedded
//! untrusted page and the host wallet process. Inbound messages are JSON
//! envelopes tagged with a channel name so several logical channels can share
//! one transport; outbound messages are rendered injected-provider
//! invocations.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod connection;
mod endpoint;
mod envelope;

pub use connection::ChannelConnection;
pub use endpoint::{duplex, PageEndpoint, WalletEndpoint};
pub use envelope::ChannelEnvelope;

use dapp_bridge_core::RawEvent;
use dapp_bridge_rpc::OutboundMessage;

/// Handles events received on a channel connection.
///
/// One handler serves one embedded-page session; it is cloned per inbound
/// event so that long-running requests (consent prompts) do not block the
/// channel.
#[async_trait::async_trait]
pub trait EventHandler: Clone + Send + Sync + 'static {
    /// Invoked for every event addressed to this channel, in arrival order.
    ///
    /// Returns the messages to push back into the page, usually exactly one
    /// terminal response. An empty vector means the event was ignored.
    async fn on_event(&self, event: RawEvent) -> Vec<OutboundMessage>;
}
