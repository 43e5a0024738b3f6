//! Human consent flow.
//!
//! Every sensitive operation suspends on a [`PendingConsent`] until the
//! wallet UI settles it with an approval or a rejection. The broker owns the
//! handler side: it hands prompts to the UI over a channel and awaits the
//! decision on a oneshot slot, so a single dispatcher task can keep serving
//! other requests while one sits in front of the user.

use crate::eth::error::{BridgeError, Result};
use alloy_primitives::{Address, Bytes};
use dapp_bridge_core::{Passphrase, PreparedTransaction, TokenApproval};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};

/// What the user is being asked to allow.
#[derive(Clone, Debug)]
pub enum ConsentRequest {
    /// A page wants to know the active account.
    AccountAccess,
    /// A plain transaction, with fees already resolved.
    SendTransaction { transaction: PreparedTransaction },
    /// An ERC-20 approval, decoded for display.
    TokenApproval { approval: TokenApproval, transaction: PreparedTransaction },
    /// A message signature. `personal` selects EIP-191 prefixing.
    SignMessage { data: Bytes, personal: bool },
    /// An EIP-712 signature, with the payload as the page sent it.
    SignTypedMessage { raw: String },
    /// A request to track a token in the wallet.
    WatchAsset { address: Address, symbol: Option<String>, decimals: Option<u8> },
    /// A request to switch or add a chain.
    AddChain { chain_id: String, chain_name: Option<String> },
}

/// What an approval carries back, depending on the request.
#[derive(Clone, Debug)]
pub enum Approval {
    /// Account access: the address to expose to the page.
    Account(Address),
    /// Signing operations: the credential unlocking the key.
    Credential(Passphrase),
    /// Watch-asset and add-chain style acknowledgements.
    Ack,
}

/// The UI's verdict on one prompt.
#[derive(Debug)]
pub enum ConsentDecision {
    Approved(Approval),
    /// Carries the reason shown to the page, verbatim.
    Rejected(String),
}

/// One prompt handed to the wallet UI, settled exactly once.
#[derive(Debug)]
pub struct PendingConsent {
    id: u64,
    request: ConsentRequest,
    decision: oneshot::Sender<ConsentDecision>,
}

impl PendingConsent {
    /// Correlation id of the request awaiting this consent.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn request(&self) -> &ConsentRequest {
        &self.request
    }

    pub fn approve(self, approval: Approval) {
        let _ = self.decision.send(ConsentDecision::Approved(approval));
    }

    pub fn reject(self, reason: impl Into<String>) {
        let _ = self.decision.send(ConsentDecision::Rejected(reason.into()));
    }
}

/// Everything the wallet UI receives from the bridge.
#[derive(Debug)]
pub enum UiEvent {
    /// A prompt that must be settled.
    Consent(PendingConsent),
    /// A previously approved flow ran to completion, successfully or not.
    /// Lets the UI dismiss progress indicators and surface failures.
    FlowFinished { error: Option<String> },
}

/// Handler-side entry point for consent prompts.
#[derive(Clone)]
pub struct ConsentBroker {
    ui: mpsc::UnboundedSender<UiEvent>,
    timeout: Option<Duration>,
}

impl ConsentBroker {
    /// Returns a broker and the stream of [`UiEvent`]s the wallet UI must
    /// consume.
    pub fn new(timeout: Option<Duration>) -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (ui, rx) = mpsc::unbounded_channel();
        (Self { ui, timeout }, rx)
    }

    /// Asks the user for consent and suspends until the prompt is settled.
    pub async fn request(&self, id: u64, request: ConsentRequest) -> Result<Approval> {
        let (tx, rx) = oneshot::channel();
        trace!(target: "bridge::consent", %id, "prompting for consent");
        self.ui
            .send(UiEvent::Consent(PendingConsent { id, request, decision: tx }))
            .map_err(|_| BridgeError::ConsentUnavailable)?;

        let decision = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, rx)
                .await
                .map_err(|_| BridgeError::ConsentTimedOut)?,
            None => rx.await,
        };

        match decision {
            Ok(ConsentDecision::Approved(approval)) => Ok(approval),
            Ok(ConsentDecision::Rejected(reason)) => {
                debug!(target: "bridge::consent", %id, %reason, "consent rejected");
                Err(BridgeError::UserRejected(reason))
            }
            // The prompt was dropped without a decision.
            Err(_) => Err(BridgeError::ConsentUnavailable),
        }
    }

    /// Tells the UI that an approved flow finished.
    pub fn notify_finished(&self, error: Option<String>) {
        let _ = self.ui.send(UiEvent::FlowFinished { error });
    }
}
