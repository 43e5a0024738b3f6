//! Credential-based signing.
//!
//! Keys never outlive a single operation: the credential collected at
//! consent time is turned into an in-memory signer, used once and dropped.
//! The credential is either a BIP-39 mnemonic or a hex encoded private key.

use crate::eth::error::{BridgeError, Result};
use alloy_consensus::{SignableTransaction, TxLegacy};
use alloy_dyn_abi::TypedData;
use alloy_eips::eip2718::Encodable2718;
use alloy_primitives::{hex, keccak256, Address, Bytes, Signature, TxHash, TxKind, B256};
use alloy_signer::SignerSync;
use alloy_signer_local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner};
use dapp_bridge_core::{Passphrase, PreparedTransaction};

/// A transaction signed and ready for broadcast.
#[derive(Clone, Debug)]
pub struct SignedTransaction {
    pub hash: TxHash,
    /// EIP-2718 encoding, as accepted by `eth_sendRawTransaction`.
    pub encoded: Bytes,
}

/// Signing operations backed by a user-supplied credential.
pub trait Signer: Send + Sync + 'static {
    /// Signs a raw digest. Inputs of exactly 32 bytes are signed as-is,
    /// anything else is keccak-hashed first.
    fn sign_hash(&self, credential: &Passphrase, data: &[u8]) -> Result<String>;

    /// Signs with the EIP-191 personal-message prefix.
    fn sign_personal(&self, credential: &Passphrase, data: &[u8]) -> Result<String>;

    /// Signs an EIP-712 typed data payload.
    fn sign_typed_data(&self, credential: &Passphrase, data: &TypedData) -> Result<String>;

    /// Signs a legacy transaction for `chain_id`.
    fn sign_transaction(
        &self,
        credential: &Passphrase,
        tx: &PreparedTransaction,
        chain_id: u64,
    ) -> Result<SignedTransaction>;
}

/// [`Signer`] deriving a key from the credential on every call.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalSigner;

impl Signer for LocalSigner {
    fn sign_hash(&self, credential: &Passphrase, data: &[u8]) -> Result<String> {
        let wallet = wallet_from_credential(credential)?;
        let hash = if data.len() == 32 { B256::from_slice(data) } else { keccak256(data) };
        let signature = wallet.sign_hash_sync(&hash)?;
        Ok(encode_signature(&signature))
    }

    fn sign_personal(&self, credential: &Passphrase, data: &[u8]) -> Result<String> {
        let wallet = wallet_from_credential(credential)?;
        let signature = wallet.sign_message_sync(data)?;
        Ok(encode_signature(&signature))
    }

    fn sign_typed_data(&self, credential: &Passphrase, data: &TypedData) -> Result<String> {
        let wallet = wallet_from_credential(credential)?;
        let signature = wallet.sign_dynamic_typed_data_sync(data)?;
        Ok(encode_signature(&signature))
    }

    fn sign_transaction(
        &self,
        credential: &Passphrase,
        tx: &PreparedTransaction,
        chain_id: u64,
    ) -> Result<SignedTransaction> {
        let wallet = wallet_from_credential(credential)?;
        if wallet.address() != tx.from {
            return Err(BridgeError::Signer(format!(
                "credential does not control {}",
                tx.from
            )));
        }

        let tx = TxLegacy {
            chain_id: Some(chain_id),
            nonce: tx.nonce,
            gas_price: tx.gas_price,
            gas_limit: tx.gas_limit,
            to: TxKind::Call(tx.to),
            value: tx.value,
            input: tx.data.clone(),
        };
        let signature = wallet.sign_hash_sync(&tx.signature_hash())?;
        let signed = tx.into_signed(signature);
        Ok(SignedTransaction { hash: *signed.hash(), encoded: signed.encoded_2718().into() })
    }
}

/// Recovers the EIP-191 signer of `message` from a 65 byte signature.
pub fn ec_recover(message: &[u8], signature: &[u8]) -> Result<Address> {
    let signature = Signature::from_raw(signature)?;
    Ok(signature.recover_address_from_msg(message)?)
}

fn wallet_from_credential(credential: &Passphrase) -> Result<PrivateKeySigner> {
    let secret = credential.expose().trim();
    if secret.split_whitespace().count() >= 12 {
        MnemonicBuilder::<English>::default()
            .phrase(secret)
            .build()
            .map_err(|err| BridgeError::Signer(err.to_string()))
    } else {
        secret
            .strip_prefix("0x")
            .unwrap_or(secret)
            .parse::<PrivateKeySigner>()
            .map_err(|err| BridgeError::Signer(err.to_string()))
    }
}

fn encode_signature(signature: &Signature) -> String {
    hex::encode_prefixed(signature.as_bytes())
}
