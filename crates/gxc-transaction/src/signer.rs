//! Transaction signing.
//!
//! The signing digest is `SHA-256(chain_id || body)`, where `body` is the
//! canonical encoding of the unsigned transaction. Online signing encodes
//! a [`Transaction`] value; offline signing starts from the hex produced by
//! [`Transaction::to_unsigned_hex`]. Both hash the same bytes and use the
//! same deterministic nonce rule, so they yield identical signatures.

use gxc_primitives::ec::{CompactSignature, PrivateKey, PublicKey};
use gxc_primitives::hash::sha256;
use gxc_primitives::PrimitivesError;

use crate::config::parse_chain_id;
use crate::layout;
use crate::transaction::{SignedTransaction, Transaction};
use crate::TransactionError;

/// Digest over the chain id and an already-encoded transaction body.
pub fn digest_body(chain_id: &[u8; 32], body: &[u8]) -> [u8; 32] {
    let mut message = Vec::with_capacity(chain_id.len() + body.len());
    message.extend_from_slice(chain_id);
    message.extend_from_slice(body);
    sha256(&message)
}

/// Signing digest of a transaction.
pub fn digest(tx: &Transaction, chain_id: &[u8; 32]) -> Result<[u8; 32], TransactionError> {
    Ok(digest_body(chain_id, &tx.to_bytes()?))
}

/// Sign a digest with one key.
pub fn sign_digest(key: &PrivateKey, digest: &[u8; 32]) -> Result<CompactSignature, TransactionError> {
    key.sign_compact(digest).map_err(|e| match e {
        PrimitivesError::SignatureCanonicalization { attempts } => {
            TransactionError::SignatureCanonicalization { attempts }
        }
        other => TransactionError::Primitives(other),
    })
}

/// Sign `tx` with each key in order.
///
/// # Returns
/// The signed transaction, `InvalidTransaction` if there are no operations
/// or no keys, or `UnsupportedOperation` if any operation cannot be
/// encoded.
pub fn sign_transaction(
    tx: Transaction,
    keys: &[&PrivateKey],
    chain_id: &[u8; 32],
) -> Result<SignedTransaction, TransactionError> {
    if tx.operations.is_empty() {
        return Err(TransactionError::InvalidTransaction(
            "transaction has no operations".to_string(),
        ));
    }
    if keys.is_empty() {
        return Err(TransactionError::InvalidTransaction(
            "no signing keys".to_string(),
        ));
    }

    let digest = digest(&tx, chain_id)?;
    let signatures = keys
        .iter()
        .map(|key| sign_digest(key, &digest))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        digest = %hex::encode(digest),
        keys = keys.len(),
        operations = tx.operations.len(),
        "signed transaction"
    );
    Ok(SignedTransaction::new(tx, signatures))
}

/// Sign a serialized unsigned transaction without any network access.
///
/// # Arguments
/// * `wif` - The signing key in WIF.
/// * `unsigned_hex` - Output of [`Transaction::to_unsigned_hex`]: the body
///   followed by an empty signature count.
/// * `chain_id` - Hex chain id.
///
/// The input must follow the canonical layout exactly: a header, registered
/// operations, an empty extension slot and a zero signature count, with
/// nothing after it.
///
/// # Returns
/// The 65-byte compact signature as hex, `InvalidTransaction` for input
/// that is cut short, has trailing bytes or carries signatures, or
/// `UnsupportedOperation` for an unregistered operation tag.
pub fn offline_sign(wif: &str, unsigned_hex: &str, chain_id: &str) -> Result<String, TransactionError> {
    let key = PrivateKey::from_wif(wif)?;
    let chain_id = parse_chain_id(chain_id)?;

    let bytes = hex::decode(unsigned_hex.trim())?;
    let body = layout::split_unsigned(&bytes)?;

    let digest = digest_body(&chain_id, body);
    let signature = sign_digest(&key, &digest)?;
    tracing::debug!(digest = %hex::encode(digest), "signed offline transaction");
    Ok(signature.to_hex())
}

/// Public keys recovered from each signature of a signed transaction.
pub fn recover_signers(
    signed: &SignedTransaction,
    chain_id: &[u8; 32],
) -> Result<Vec<PublicKey>, TransactionError> {
    let digest = digest(signed.transaction(), chain_id)?;
    signed
        .signatures()
        .iter()
        .map(|sig| sig.recover_public_key(&digest).map_err(TransactionError::from))
        .collect()
}
