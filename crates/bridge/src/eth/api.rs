//! Request dispatcher.
//!
//! [`BridgeApi::execute`] is the single entry point: it takes one decoded
//! page event through preparation, classification, consent and signing, and
//! returns the messages to push back into the page. Each flow produces
//! exactly one terminal response for its id, no matter where it fails.

use crate::{
    config::BridgeConfig,
    eth::{
        chain::ChainClient,
        classify::{approval_calldata, Classified, TransactionClassifier},
        consent::{Approval, ConsentBroker, ConsentRequest, UiEvent},
        error::{BridgeError, Result, ToChannelResponse},
        prepare::TransactionPreparer,
        sign::Signer,
    },
};
use alloy_dyn_abi::TypedData;
use alloy_primitives::Address;
use async_trait::async_trait;
use dapp_bridge_channel::EventHandler;
use dapp_bridge_core::{
    event::{
        AddChainPayload, EcRecoverPayload, SignMessagePayload, SignTypedMessagePayload,
        WatchAssetPayload,
    },
    DappEvent, EventKind, Passphrase, PreparedTransaction, RawEvent, TransactionConfig,
};
use dapp_bridge_rpc::{ChannelResponse, OutboundMessage};
use parking_lot::{Mutex, RwLock};
use std::{collections::HashSet, sync::Arc};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

/// The wallet side of one provider bridge.
#[derive(Clone)]
pub struct BridgeApi {
    config: Arc<BridgeConfig>,
    chain: Arc<dyn ChainClient>,
    signer: Arc<dyn Signer>,
    preparer: TransactionPreparer,
    classifier: Arc<TransactionClassifier>,
    consent: ConsentBroker,
    /// Address granted to the page, if account access was approved.
    active_address: Arc<RwLock<Option<Address>>>,
    /// Ids of requests currently in flight, to refuse duplicates.
    outstanding: Arc<Mutex<HashSet<u64>>>,
}

impl BridgeApi {
    /// Builds the api and returns the stream of [`UiEvent`]s the wallet UI
    /// must consume.
    pub fn new(
        config: BridgeConfig,
        chain: Arc<dyn ChainClient>,
        signer: Arc<dyn Signer>,
    ) -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (consent, ui) = ConsentBroker::new(config.consent_timeout);
        let api = Self {
            config: Arc::new(config),
            preparer: TransactionPreparer::new(chain.clone()),
            classifier: Arc::new(TransactionClassifier::new(chain.clone())),
            chain,
            signer,
            consent,
            active_address: Arc::new(RwLock::new(None)),
            outstanding: Arc::new(Mutex::new(HashSet::new())),
        };
        (api, ui)
    }

    /// The address currently exposed to the page.
    pub fn active_address(&self) -> Option<Address> {
        *self.active_address.read()
    }

    /// Executes one request to completion.
    pub async fn execute(&self, event: DappEvent) -> Vec<OutboundMessage> {
        let id = event.id;
        trace!(target: "bridge::api", %id, name = event.kind.name(), "executing request");
        if !self.outstanding.lock().insert(id) {
            warn!(target: "bridge::api", %id, "duplicate request id");
            let err: Result<()> = Err(BridgeError::DuplicateRequestId(id));
            return vec![err.to_channel_response(id).into()];
        }

        let out = self.dispatch(event).await;
        self.outstanding.lock().remove(&id);
        out
    }

    async fn dispatch(&self, event: DappEvent) -> Vec<OutboundMessage> {
        let id = event.id;
        match event.kind {
            EventKind::RequestAccounts => self.request_accounts(id).await,
            EventKind::SignTransaction(config) => {
                fold(id, self.sign_transaction(id, config).await)
            }
            EventKind::SignMessage(payload) => {
                fold(id, self.sign_message(id, payload, false).await)
            }
            EventKind::SignPersonalMessage(payload) => {
                fold(id, self.sign_message(id, payload, true).await)
            }
            EventKind::SignTypedMessage(payload) => {
                fold(id, self.sign_typed_message(id, payload).await)
            }
            EventKind::EcRecover(payload) => fold(id, self.ec_recover(payload)),
            EventKind::WatchAsset(payload) => fold(id, self.watch_asset(id, payload).await),
            EventKind::AddEthereumChain(payload) => fold(id, self.add_chain(id, payload).await),
        }
    }

    /// `requestAccounts`: the only flow with a non-terminal side message,
    /// `setAddress` precedes the response so the shim knows the account
    /// before the promise resolves.
    async fn request_accounts(&self, id: u64) -> Vec<OutboundMessage> {
        let granted = self
            .consent
            .request(id, ConsentRequest::AccountAccess)
            .await
            .and_then(expect_account);
        let address = match granted {
            Ok(address) => address,
            Err(err) => return vec![ChannelResponse::error(id, err.to_channel_error()).into()],
        };

        *self.active_address.write() = Some(address);
        debug!(target: "bridge::api", %id, %address, "account access granted");
        vec![
            OutboundMessage::SetAddress(address),
            ChannelResponse::batch(id, [address.to_string()]).into(),
        ]
    }

    async fn sign_transaction(&self, id: u64, config: TransactionConfig) -> Result<String> {
        let fees = self.preparer.prepare(&config).await?;
        let prepared = PreparedTransaction::new(&config, fees);

        let (request, transaction) =
            match self.classifier.classify(config.to, &prepared.data).await {
                Classified::TokenApproval(approval) => {
                    // Sign exactly what consent displayed: the calldata is
                    // re-encoded from the decoded spender and amount.
                    let mut transaction = prepared.clone();
                    transaction.data = approval_calldata(&approval);
                    (
                        ConsentRequest::TokenApproval { approval, transaction: prepared },
                        transaction,
                    )
                }
                Classified::Plain => {
                    (ConsentRequest::SendTransaction { transaction: prepared.clone() }, prepared)
                }
            };

        let credential = expect_credential(self.consent.request(id, request).await?)?;
        self.broadcast(id, transaction, credential).await
    }

    /// Signs and broadcasts an approved transaction, reporting the outcome
    /// of the post-consent stage back to the UI.
    async fn broadcast(
        &self,
        id: u64,
        transaction: PreparedTransaction,
        credential: Passphrase,
    ) -> Result<String> {
        let result = async {
            let signed =
                self.signer.sign_transaction(&credential, &transaction, self.config.chain_id)?;
            let hash = self
                .chain
                .send_raw_transaction(signed.encoded)
                .await
                .map_err(BridgeError::Broadcast)?;
            debug!(target: "bridge::api", %id, %hash, "transaction broadcast");
            Ok(format!("{hash}"))
        }
        .await;

        self.consent.notify_finished(result.as_ref().err().map(ToString::to_string));
        result
    }

    async fn sign_message(
        &self,
        id: u64,
        payload: SignMessagePayload,
        personal: bool,
    ) -> Result<String> {
        let request = ConsentRequest::SignMessage { data: payload.data.clone(), personal };
        let credential = expect_credential(self.consent.request(id, request).await?)?;
        let result = if personal {
            self.signer.sign_personal(&credential, &payload.data)
        } else {
            self.signer.sign_hash(&credential, &payload.data)
        };
        self.consent.notify_finished(result.as_ref().err().map(ToString::to_string));
        result
    }

    async fn sign_typed_message(&self, id: u64, payload: SignTypedMessagePayload) -> Result<String> {
        // Validate the payload before bothering the user with a prompt.
        let typed: TypedData = serde_json::from_str(&payload.raw).map_err(|err| {
            BridgeError::MalformedEvent("signTypedMessage".to_string(), err.to_string())
        })?;

        let request = ConsentRequest::SignTypedMessage { raw: payload.raw };
        let credential = expect_credential(self.consent.request(id, request).await?)?;
        let result = self.signer.sign_typed_data(&credential, &typed);
        self.consent.notify_finished(result.as_ref().err().map(ToString::to_string));
        result
    }

    /// `ecRecover` involves no secret, so it settles without consent.
    fn ec_recover(&self, payload: EcRecoverPayload) -> Result<String> {
        let address = crate::eth::sign::ec_recover(&payload.message, &payload.signature)?;
        Ok(address.to_string())
    }

    async fn watch_asset(&self, id: u64, payload: WatchAssetPayload) -> Result<bool> {
        let request = ConsentRequest::WatchAsset {
            address: payload.options.address,
            symbol: payload.options.symbol,
            decimals: payload.options.decimals,
        };
        expect_ack(self.consent.request(id, request).await?)?;
        Ok(true)
    }

    async fn add_chain(&self, id: u64, payload: AddChainPayload) -> Result<bool> {
        let request = ConsentRequest::AddChain {
            chain_id: payload.chain_id,
            chain_name: payload.chain_name,
        };
        expect_ack(self.consent.request(id, request).await?)?;
        Ok(true)
    }
}

#[async_trait]
impl EventHandler for BridgeApi {
    async fn on_event(&self, raw: RawEvent) -> Vec<OutboundMessage> {
        let id = raw.id;
        match DappEvent::from_raw(raw) {
            Ok(Some(event)) => self.execute(event).await,
            // Unknown event names are not answerable: the page is not
            // waiting on a promise the bridge knows about.
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(target: "bridge::api", %id, %err, "malformed event");
                let err: Result<()> = Err(err.into());
                vec![err.to_channel_response(id).into()]
            }
        }
    }
}

fn fold<T: serde::Serialize>(id: u64, result: Result<T>) -> Vec<OutboundMessage> {
    vec![result.to_channel_response(id).into()]
}

fn expect_account(approval: Approval) -> Result<Address> {
    match approval {
        Approval::Account(address) => Ok(address),
        other => Err(unexpected_approval(&other)),
    }
}

fn expect_credential(approval: Approval) -> Result<Passphrase> {
    match approval {
        Approval::Credential(credential) => Ok(credential),
        other => Err(unexpected_approval(&other)),
    }
}

fn expect_ack(approval: Approval) -> Result<()> {
    match approval {
        Approval::Ack => Ok(()),
        other => Err(unexpected_approval(&other)),
    }
}

fn unexpected_approval(approval: &Approval) -> BridgeError {
    BridgeError::Internal(format!("approval does not fit the request: {approval:?}"))
}
