//! In-memory duplex endpoints.
//!
//! Embedders wire the connection to a real webview transport; tests and the
//! integration harness use this in-memory pair instead. The page side speaks
//! the same envelope format an injected provider would.

use crate::envelope::ChannelEnvelope;
use dapp_bridge_core::RawEvent;
use futures::channel::mpsc;

/// The untrusted side of the channel: what an embedded page sees.
pub struct PageEndpoint {
    channel_name: String,
    to_wallet: mpsc::UnboundedSender<String>,
    from_wallet: mpsc::UnboundedReceiver<String>,
}

/// The trusted side of the channel, handed to a [`ChannelConnection`].
///
/// [`ChannelConnection`]: crate::ChannelConnection
pub struct WalletEndpoint {
    inbound: mpsc::UnboundedReceiver<String>,
    outbound: mpsc::UnboundedSender<String>,
}

/// Creates a connected in-memory channel pair. `channel_name` is the name the
/// page side stamps on its envelopes.
pub fn duplex(channel_name: impl Into<String>) -> (PageEndpoint, WalletEndpoint) {
    let (to_wallet, inbound) = mpsc::unbounded();
    let (outbound, from_wallet) = mpsc::unbounded();
    (
        PageEndpoint { channel_name: channel_name.into(), to_wallet, from_wallet },
        WalletEndpoint { inbound, outbound },
    )
}

impl PageEndpoint {
    /// Sends one event to the wallet, wrapped in this endpoint's envelope.
    /// Delivery is fire-and-forget and ordered; a closed wallet side is
    /// ignored, as a navigated-away page cannot observe it either.
    pub fn send_event(&self, event: &RawEvent) {
        let envelope = ChannelEnvelope::new(self.channel_name.clone(), event);
        if let Ok(text) = serde_json::to_string(&envelope) {
            let _ = self.to_wallet.unbounded_send(text);
        }
    }

    /// Sends a raw transport message, bypassing envelope construction.
    pub fn send_raw(&self, text: impl Into<String>) {
        let _ = self.to_wallet.unbounded_send(text.into());
    }

    /// Receives the next rendered provider invocation from the wallet.
    pub async fn next_message(&mut self) -> Option<String> {
        use futures::StreamExt;
        self.from_wallet.next().await
    }
}

impl WalletEndpoint {
    /// Splits into the inbound stream and outbound sink expected by
    /// [`ChannelConnection::serve`].
    ///
    /// [`ChannelConnection::serve`]: crate::ChannelConnection::serve
    pub fn split(
        self,
    ) -> (mpsc::UnboundedReceiver<String>, mpsc::UnboundedSender<String>) {
        (self.inbound, self.outbound)
    }
}
