//! Dispatcher flows at the api level.

use crate::utils::*;
use alloy_consensus::{transaction::SignerRecoverable, Transaction, TxEnvelope};
use alloy_eips::eip2718::Decodable2718;
use alloy_primitives::{hex, Bytes, U256};
use alloy_sol_types::SolCall;
use dapp_bridge::{
    eth::classify::IERC20, Approval, BridgeApi, BridgeConfig, ConsentRequest, LocalSigner,
};
use dapp_bridge_core::{
    event::{
        AddChainPayload, EcRecoverPayload, SignMessagePayload, SignTypedMessagePayload,
        WatchAssetOptions, WatchAssetPayload,
    },
    DappEvent, EventKind, Passphrase,
};
use dapp_bridge_rpc::{ChannelResponse, OutboundMessage, ResponseResult};
use std::sync::Arc;

fn success_value(messages: &[OutboundMessage]) -> serde_json::Value {
    let terminal: Vec<_> = messages.iter().filter(|m| m.response_id().is_some()).collect();
    assert_eq!(terminal.len(), 1, "expected exactly one terminal response");
    match terminal[0] {
        OutboundMessage::Respond(ChannelResponse { result: ResponseResult::Success(value), .. }) => {
            value.clone()
        }
        other => panic!("expected a success response, got {other:?}"),
    }
}

fn error_of(messages: &[OutboundMessage]) -> (u64, i64, String) {
    let terminal: Vec<_> = messages.iter().filter(|m| m.response_id().is_some()).collect();
    assert_eq!(terminal.len(), 1, "expected exactly one terminal response");
    match terminal[0] {
        OutboundMessage::Respond(ChannelResponse { id, result: ResponseResult::Error(error) }) => {
            (*id, error.code.code(), error.message.to_string())
        }
        other => panic!("expected an error response, got {other:?}"),
    }
}

#[tokio::test]
async fn account_access_sets_address_then_responds() {
    let (api, _probe) = bridge(Arc::new(MockChain::default()), Decision::Approve);

    let out = api.execute(DappEvent { id: 1, kind: EventKind::RequestAccounts }).await;
    assert_eq!(out.len(), 2);
    assert!(matches!(out[0], OutboundMessage::SetAddress(a) if a == SENDER));
    assert_eq!(success_value(&out), serde_json::json!([SENDER.to_string()]));
    assert_eq!(api.active_address(), Some(SENDER));
}

#[tokio::test]
async fn plain_transaction_is_signed_and_broadcast() {
    let chain = Arc::new(MockChain::default());
    let (api, mut probe) = bridge(chain.clone(), Decision::Approve);

    let config = transaction_config(SPENDER, None);
    let out = api
        .execute(DappEvent { id: 2, kind: EventKind::SignTransaction(config) })
        .await;

    let hash = success_value(&out);
    let broadcasts = chain.broadcasts.lock();
    assert_eq!(broadcasts.len(), 1);
    assert_eq!(hash, serde_json::json!(format!("{}", alloy_primitives::keccak256(&broadcasts[0]))));

    assert!(matches!(
        probe.requests.recv().await,
        Some(ConsentRequest::SendTransaction { transaction })
            if transaction.nonce == 7 && transaction.gas_limit == 21_000
    ));
    assert_eq!(probe.finished.recv().await, Some(None));
}

#[tokio::test]
async fn approve_calldata_prompts_with_decoded_fields() {
    let chain = Arc::new(MockChain::default());
    let (api, mut probe) = bridge(chain.clone(), Decision::Approve);

    let amount = U256::from(1_000_000u64);
    let data: Bytes = IERC20::approveCall { spender: SPENDER, amount }.abi_encode().into();
    let config = transaction_config(TOKEN, Some(data.clone()));
    let out = api
        .execute(DappEvent { id: 7, kind: EventKind::SignTransaction(config) })
        .await;
    success_value(&out);

    let Some(ConsentRequest::TokenApproval { approval, transaction }) = probe.requests.recv().await
    else {
        panic!("expected a token approval prompt")
    };
    assert_eq!(approval.spender, SPENDER);
    assert_eq!(approval.amount, amount);
    assert_eq!(approval.token.symbol.as_deref(), Some("USDC"));
    assert_eq!(approval.token.decimals, Some(6));
    assert_eq!(transaction.gas_limit, 21_000);

    // The broadcast transaction carries exactly the calldata that was
    // decoded for display, and is signed by the credential's key.
    let broadcasts = chain.broadcasts.lock();
    let envelope = TxEnvelope::decode_2718(&mut broadcasts[0].as_ref()).unwrap();
    assert_eq!(envelope.input().as_ref(), data.as_ref());
    assert_eq!(envelope.recover_signer().unwrap(), SENDER);
}

#[tokio::test]
async fn rejection_reason_reaches_the_page_verbatim() {
    let chain = Arc::new(MockChain::default());
    let (api, _probe) = bridge(chain.clone(), Decision::Reject("User denied transaction"));

    let out = api
        .execute(DappEvent { id: 3, kind: EventKind::SignTransaction(transaction_config(SPENDER, None)) })
        .await;

    let (id, code, message) = error_of(&out);
    assert_eq!(id, 3);
    assert_eq!(code, 4001);
    assert_eq!(message, "User denied transaction");
    assert!(chain.broadcasts.lock().is_empty());
}

#[tokio::test]
async fn duplicate_id_is_refused_while_outstanding() {
    let chain = Arc::new(MockChain::default());
    let (api, mut ui) = BridgeApi::new(BridgeConfig::default(), chain, Arc::new(LocalSigner));

    let first = {
        let api = api.clone();
        tokio::spawn(async move {
            api.execute(DappEvent { id: 5, kind: EventKind::RequestAccounts }).await
        })
    };
    // Wait until the first request is parked on its consent prompt.
    let Some(dapp_bridge::UiEvent::Consent(pending)) = ui.recv().await else {
        panic!("expected a consent prompt")
    };

    let out = api.execute(DappEvent { id: 5, kind: EventKind::RequestAccounts }).await;
    let (_, code, message) = error_of(&out);
    assert_eq!(code, -32602);
    assert!(message.contains("already outstanding"));

    // The original request is unaffected.
    pending.approve(Approval::Account(SENDER));
    let out = first.await.unwrap();
    assert_eq!(success_value(&out), serde_json::json!([SENDER.to_string()]));

    // Once settled, the id may be reused.
    let reused = {
        let api = api.clone();
        tokio::spawn(async move {
            api.execute(DappEvent { id: 5, kind: EventKind::RequestAccounts }).await
        })
    };
    let Some(dapp_bridge::UiEvent::Consent(pending)) = ui.recv().await else {
        panic!("expected a consent prompt")
    };
    pending.approve(Approval::Account(SENDER));
    success_value(&reused.await.unwrap());
}

#[tokio::test]
async fn oversized_gas_gets_an_error_response_and_frees_the_id() {
    let chain = Arc::new(MockChain::default());
    let (api, _probe) = bridge(chain.clone(), Decision::Approve);

    let mut config = transaction_config(SPENDER, None);
    config.gas = Some(U256::from(u64::MAX) + U256::from(1u64));
    let out = api
        .execute(DappEvent { id: 20, kind: EventKind::SignTransaction(config) })
        .await;

    let (id, code, message) = error_of(&out);
    assert_eq!(id, 20);
    assert_eq!(code, -32602);
    assert!(message.contains("gas"));
    assert!(chain.broadcasts.lock().is_empty());

    // The id was released on the error path and can be used again.
    let out = api
        .execute(DappEvent {
            id: 20,
            kind: EventKind::SignTransaction(transaction_config(SPENDER, None)),
        })
        .await;
    success_value(&out);
}

#[tokio::test]
async fn broadcast_failure_reports_to_page_and_ui() {
    let chain = Arc::new(MockChain { fail_broadcast: true, ..Default::default() });
    let (api, mut probe) = bridge(chain, Decision::Approve);

    let out = api
        .execute(DappEvent { id: 4, kind: EventKind::SignTransaction(transaction_config(SPENDER, None)) })
        .await;

    let (_, code, message) = error_of(&out);
    assert_eq!(code, -32003);
    assert!(message.contains("insufficient funds"));

    let finished = probe.finished.recv().await.unwrap();
    assert!(finished.unwrap().contains("insufficient funds"));
}

#[tokio::test]
async fn metadata_failure_still_prompts_for_the_approval() {
    let chain = Arc::new(MockChain { symbol: None, decimals: None, ..Default::default() });
    let (api, mut probe) = bridge(chain, Decision::Approve);

    let data: Bytes =
        IERC20::approveCall { spender: SPENDER, amount: U256::MAX }.abi_encode().into();
    let out = api
        .execute(DappEvent { id: 6, kind: EventKind::SignTransaction(transaction_config(TOKEN, Some(data))) })
        .await;
    success_value(&out);

    let Some(ConsentRequest::TokenApproval { approval, .. }) = probe.requests.recv().await else {
        panic!("expected a token approval prompt")
    };
    assert_eq!(approval.token.symbol, None);
    assert_eq!(approval.token.decimals, None);
    assert_eq!(approval.amount, U256::MAX);
}

#[tokio::test]
async fn message_signatures_settle_and_recover() {
    let (api, _probe) = bridge(Arc::new(MockChain::default()), Decision::Approve);
    let message = Bytes::from_static(b"hello bridge");

    let personal = api
        .execute(DappEvent {
            id: 10,
            kind: EventKind::SignPersonalMessage(SignMessagePayload { data: message.clone() }),
        })
        .await;
    let raw = api
        .execute(DappEvent {
            id: 11,
            kind: EventKind::SignMessage(SignMessagePayload { data: message.clone() }),
        })
        .await;

    let personal_sig = success_value(&personal);
    assert_ne!(personal_sig, success_value(&raw));

    // ecRecover closes the loop over the personal signature.
    let signature: Bytes =
        hex::decode(personal_sig.as_str().unwrap()).unwrap().into();
    let out = api
        .execute(DappEvent {
            id: 12,
            kind: EventKind::EcRecover(EcRecoverPayload { message, signature }),
        })
        .await;
    assert_eq!(success_value(&out), serde_json::json!(SENDER.to_string()));
}

#[tokio::test]
async fn signing_never_exposes_the_credential_in_prompts() {
    // The prompt for a signature carries the message, not the credential;
    // the credential only travels back through the approval.
    let (api, mut probe) = bridge(Arc::new(MockChain::default()), Decision::Approve);
    let out = api
        .execute(DappEvent {
            id: 13,
            kind: EventKind::SignPersonalMessage(SignMessagePayload {
                data: Bytes::from_static(b"payload"),
            }),
        })
        .await;
    success_value(&out);

    let Some(ConsentRequest::SignMessage { data, personal }) = probe.requests.recv().await else {
        panic!("expected a sign prompt")
    };
    assert!(personal);
    assert_eq!(data.as_ref(), b"payload");
    // And the debug rendering of a credential stays redacted.
    assert_eq!(format!("{:?}", Passphrase::new(MNEMONIC)), "Passphrase(<redacted>)");
}

#[tokio::test]
async fn approved_watch_asset_answers_true() {
    let (api, mut probe) = bridge(Arc::new(MockChain::default()), Decision::Approve);

    let payload = WatchAssetPayload {
        asset_type: "ERC20".to_string(),
        options: WatchAssetOptions {
            address: TOKEN,
            symbol: Some("USDC".to_string()),
            decimals: Some(6),
            image: None,
        },
    };
    let out = api.execute(DappEvent { id: 30, kind: EventKind::WatchAsset(payload) }).await;
    assert_eq!(success_value(&out), serde_json::json!(true));

    assert!(matches!(
        probe.requests.recv().await,
        Some(ConsentRequest::WatchAsset { address, .. }) if address == TOKEN
    ));
}

#[tokio::test]
async fn approved_add_chain_answers_true() {
    let (api, mut probe) = bridge(Arc::new(MockChain::default()), Decision::Approve);

    let payload = AddChainPayload {
        chain_id: "0x152".to_string(),
        chain_name: Some("Cronos Testnet".to_string()),
        rpc_urls: vec!["https://evm-t3.cronos.org".to_string()],
        block_explorer_urls: Vec::new(),
    };
    let out =
        api.execute(DappEvent { id: 31, kind: EventKind::AddEthereumChain(payload) }).await;
    assert_eq!(success_value(&out), serde_json::json!(true));

    assert!(matches!(
        probe.requests.recv().await,
        Some(ConsentRequest::AddChain { chain_id, .. }) if chain_id == "0x152"
    ));
}

#[tokio::test]
async fn typed_message_signs_after_consent() {
    let (api, mut probe) = bridge(Arc::new(MockChain::default()), Decision::Approve);

    let raw = r#"{
        "types": {
            "EIP712Domain": [
                {"name": "name", "type": "string"},
                {"name": "chainId", "type": "uint256"}
            ],
            "Transfer": [
                {"name": "to", "type": "address"},
                {"name": "amount", "type": "uint256"}
            ]
        },
        "primaryType": "Transfer",
        "domain": {"name": "Bridge", "chainId": 25},
        "message": {
            "to": "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045",
            "amount": "1000"
        }
    }"#;
    let out = api
        .execute(DappEvent {
            id: 32,
            kind: EventKind::SignTypedMessage(SignTypedMessagePayload { raw: raw.to_string() }),
        })
        .await;
    let signature = success_value(&out);
    assert_eq!(hex::decode(signature.as_str().unwrap()).unwrap().len(), 65);

    assert!(matches!(
        probe.requests.recv().await,
        Some(ConsentRequest::SignTypedMessage { raw: prompted }) if prompted == raw
    ));
}

#[tokio::test]
async fn undecodable_typed_message_errors_before_consent() {
    let (api, mut probe) = bridge(Arc::new(MockChain::default()), Decision::Approve);

    let out = api
        .execute(DappEvent {
            id: 33,
            kind: EventKind::SignTypedMessage(SignTypedMessagePayload {
                raw: "not an eip-712 payload".to_string(),
            }),
        })
        .await;

    let (id, code, message) = error_of(&out);
    assert_eq!(id, 33);
    assert_eq!(code, -32602);
    assert!(message.contains("signTypedMessage"));
    // The user was never prompted.
    assert!(probe.requests.try_recv().is_err());
}

#[tokio::test]
async fn consent_timeout_fails_the_request() {
    let chain = Arc::new(MockChain::default());
    let config = BridgeConfig::default().with_consent_timeout(std::time::Duration::from_millis(50));
    let (api, mut ui) = BridgeApi::new(config, chain, Arc::new(LocalSigner));

    // Hold the prompt without settling it.
    let hold = tokio::spawn(async move {
        let pending = ui.recv().await;
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        drop(pending);
    });

    let out = api.execute(DappEvent { id: 8, kind: EventKind::RequestAccounts }).await;
    let (_, code, message) = error_of(&out);
    assert_eq!(code, 4001);
    assert!(message.contains("timed out"));
    hold.abort();
}
