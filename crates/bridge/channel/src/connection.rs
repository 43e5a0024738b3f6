//! Per-connection event loop.

use crate::{envelope::ChannelEnvelope, EventHandler};
use dapp_bridge_rpc::OutboundMessage;
use futures::{stream::FuturesUnordered, Sink, SinkExt, Stream, StreamExt};
use std::pin::Pin;
use tracing::{trace, warn};

type PendingEvent = Pin<Box<dyn std::future::Future<Output = Vec<OutboundMessage>> + Send>>;

/// Drives one embedded-page connection: picks up inbound envelopes in FIFO
/// arrival order, runs the handler for each, and forwards completions to the
/// outbound sink as they finish.
///
/// Handler invocations run concurrently, so a request suspended on user
/// consent does not hold up later events; completion order across distinct
/// request ids is therefore not guaranteed.
pub struct ChannelConnection<H> {
    channel_name: String,
    handler: H,
}

impl<H: EventHandler> ChannelConnection<H> {
    pub fn new(channel_name: impl Into<String>, handler: H) -> Self {
        Self { channel_name: channel_name.into(), handler }
    }

    /// Serves the connection until the inbound stream ends. In-flight
    /// requests are drained before returning, so every accepted event still
    /// receives its terminal message.
    pub async fn serve<In, Out>(self, mut inbound: In, mut outbound: Out)
    where
        In: Stream<Item = String> + Unpin,
        Out: Sink<String> + Unpin,
    {
        let Self { channel_name, handler } = self;
        let mut pending: FuturesUnordered<PendingEvent> = FuturesUnordered::new();

        loop {
            tokio::select! {
                maybe_text = inbound.next() => {
                    let Some(text) = maybe_text else { break };
                    if let Some(event) = decode(&channel_name, &text) {
                        trace!(target: "bridge::channel", name = %event.name, id = event.id, "accepted event");
                        let handler = handler.clone();
                        pending.push(Box::pin(async move { handler.on_event(event).await }));
                    }
                }
                Some(messages) = pending.next() => {
                    if forward(&mut outbound, messages).await.is_err() {
                        return;
                    }
                }
            }
        }

        // Page navigated away or the transport closed: settle what's left.
        while let Some(messages) = pending.next().await {
            if forward(&mut outbound, messages).await.is_err() {
                return;
            }
        }
    }
}

async fn forward<Out>(outbound: &mut Out, messages: Vec<OutboundMessage>) -> Result<(), ()>
where
    Out: Sink<String> + Unpin,
{
    for message in messages {
        trace!(target: "bridge::channel", id = ?message.response_id(), "sending message");
        if outbound.send(message.render()).await.is_err() {
            warn!(target: "bridge::channel", "outbound transport closed");
            return Err(());
        }
    }
    Ok(())
}

fn decode(channel_name: &str, text: &str) -> Option<dapp_bridge_core::RawEvent> {
    match serde_json::from_str::<ChannelEnvelope>(text) {
        Ok(envelope) => envelope.into_event(channel_name),
        Err(err) => {
            warn!(target: "bridge::channel", %err, "dropping undecodable message");
            None
        }
    }
}
