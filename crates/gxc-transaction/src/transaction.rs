//! Transactions and signed transactions.
//!
//! A [`Transaction`] is assembled from a reference block, an expiration and
//! an ordered list of operations, then consumed by signing into a
//! [`SignedTransaction`] that is not modified afterwards.

use std::io::Write;

use gxc_primitives::ec::{CompactSignature, PrivateKey};
use gxc_primitives::hash::sha256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::ChainConfig;
use crate::encoder::{to_bytes, Encodable, Encoder};
use crate::operation::Operation;
use crate::signer;
use crate::types::{Extensions, Time};
use crate::TransactionError;

/// Length in bytes of a transaction id.
pub const TRANSACTION_ID_LEN: usize = 20;

/// An unsigned transaction.
///
/// # Wire format
///
/// | Field            | Encoding                  |
/// |------------------|---------------------------|
/// | ref_block_num    | u16 LE                    |
/// | ref_block_prefix | u32 LE                    |
/// | expiration       | u32 LE (Unix seconds)     |
/// | operations       | varint count + operations |
/// | extensions       | varint 0                  |
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Low 16 bits of the reference block number.
    pub ref_block_num: u16,
    /// Bytes 4..8 of the reference block id, little-endian.
    pub ref_block_prefix: u32,
    /// Time after which the transaction can no longer be included.
    pub expiration: Time,
    /// Operations in execution order.
    pub operations: Vec<Operation>,
    #[serde(default)]
    pub extensions: Extensions,
}

impl Transaction {
    /// Create an empty transaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation.
    pub fn push_operation(&mut self, op: impl Into<Operation>) -> &mut Self {
        self.operations.push(op.into());
        self
    }

    /// Tie the transaction to a recent block so it cannot be replayed on a fork.
    ///
    /// # Arguments
    /// * `block_num` - Height of the reference block.
    /// * `block_id` - Hex id of the same block (at least 8 bytes).
    ///
    /// # Returns
    /// `InvalidHex` for malformed hex, or `InvalidTransaction` if the id is
    /// too short.
    pub fn set_reference_block(&mut self, block_num: u32, block_id: &str) -> Result<&mut Self, TransactionError> {
        let id = hex::decode(block_id)?;
        let prefix = id.get(4..8).ok_or_else(|| {
            TransactionError::InvalidTransaction(format!(
                "reference block id has {} bytes, need at least 8",
                id.len()
            ))
        })?;
        self.ref_block_num = (block_num & 0xffff) as u16;
        self.ref_block_prefix = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);
        Ok(self)
    }

    /// Set the expiration to `head_time` plus the configured window.
    pub fn set_expiration(&mut self, head_time: Time, config: &ChainConfig) -> &mut Self {
        self.expiration = head_time.add_secs(config.expiration_window_secs);
        self
    }

    /// Canonical bytes of the transaction body.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        to_bytes(self)
    }

    /// Hex of the body followed by an empty signature list.
    ///
    /// This is the form accepted by [`signer::offline_sign`].
    pub fn to_unsigned_hex(&self) -> Result<String, TransactionError> {
        let mut bytes = self.to_bytes()?;
        bytes.push(0);
        Ok(hex::encode(bytes))
    }

    /// Transaction id: the first 20 bytes of SHA-256 of the body, hex.
    pub fn id(&self) -> Result<String, TransactionError> {
        let digest = sha256(&self.to_bytes()?);
        Ok(hex::encode(&digest[..TRANSACTION_ID_LEN]))
    }

    /// Sign with every key in order, consuming the transaction.
    pub fn sign(self, keys: &[&PrivateKey], chain_id: &[u8; 32]) -> Result<SignedTransaction, TransactionError> {
        signer::sign_transaction(self, keys, chain_id)
    }
}

impl Encodable for Transaction {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.write_u16(self.ref_block_num)
            .write_u32(self.ref_block_prefix)
            .encode(&self.expiration)
            .encode(&self.operations)
            .encode(&self.extensions);
    }
}

/// A transaction with its signatures attached.
///
/// Serializes to the flat JSON object nodes expect: the transaction fields
/// plus `signatures` as hex strings.
#[derive(Clone, Debug, PartialEq)]
pub struct SignedTransaction {
    transaction: Transaction,
    signatures: Vec<CompactSignature>,
}

impl SignedTransaction {
    pub(crate) fn new(transaction: Transaction, signatures: Vec<CompactSignature>) -> Self {
        SignedTransaction {
            transaction,
            signatures,
        }
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn signatures(&self) -> &[CompactSignature] {
        &self.signatures
    }

    /// Same as the unsigned transaction's id; signatures do not affect it.
    pub fn id(&self) -> Result<String, TransactionError> {
        self.transaction.id()
    }

    /// Body followed by the signature list.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        to_bytes(self)
    }

    pub fn to_hex(&self) -> Result<String, TransactionError> {
        self.to_bytes().map(hex::encode)
    }

    pub fn into_parts(self) -> (Transaction, Vec<CompactSignature>) {
        (self.transaction, self.signatures)
    }
}

impl Encodable for SignedTransaction {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.encode(&self.transaction)
            .write_uvarint(self.signatures.len() as u64);
        for sig in &self.signatures {
            enc.write_raw(sig.as_bytes());
        }
    }
}

#[derive(Serialize)]
struct SignedTransactionRef<'a> {
    ref_block_num: u16,
    ref_block_prefix: u32,
    expiration: Time,
    operations: &'a [Operation],
    extensions: &'a Extensions,
    signatures: Vec<String>,
}

#[derive(Deserialize)]
struct SignedTransactionOwned {
    ref_block_num: u16,
    ref_block_prefix: u32,
    expiration: Time,
    operations: Vec<Operation>,
    #[serde(default)]
    extensions: Extensions,
    #[serde(default)]
    signatures: Vec<String>,
}

impl Serialize for SignedTransaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let tx = &self.transaction;
        SignedTransactionRef {
            ref_block_num: tx.ref_block_num,
            ref_block_prefix: tx.ref_block_prefix,
            expiration: tx.expiration,
            operations: &tx.operations,
            extensions: &tx.extensions,
            signatures: self.signatures.iter().map(CompactSignature::to_hex).collect(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SignedTransaction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let owned = SignedTransactionOwned::deserialize(deserializer)?;
        let signatures = owned
            .signatures
            .iter()
            .map(|s| CompactSignature::from_hex(s))
            .collect::<Result<Vec<_>, _>>()
            .map_err(serde::de::Error::custom)?;
        Ok(SignedTransaction {
            transaction: Transaction {
                ref_block_num: owned.ref_block_num,
                ref_block_prefix: owned.ref_block_prefix,
                expiration: owned.expiration,
                operations: owned.operations,
                extensions: owned.extensions,
            },
            signatures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_block() {
        let mut tx = Transaction::new();
        tx.set_reference_block(0x0123_4567, "01234567a1b2c3d4e5f60718293a4b5c6d7e8f90")
            .unwrap();
        assert_eq!(tx.ref_block_num, 0x4567);
        assert_eq!(tx.ref_block_prefix, 0xd4c3_b2a1);
    }

    #[test]
    fn test_reference_block_rejects_short_id() {
        let mut tx = Transaction::new();
        assert!(matches!(
            tx.set_reference_block(1, "0011223344"),
            Err(TransactionError::InvalidTransaction(_))
        ));
        assert!(matches!(
            tx.set_reference_block(1, "not hex"),
            Err(TransactionError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_expiration_window() {
        let mut tx = Transaction::new();
        let config = ChainConfig::default();
        tx.set_expiration(Time::from_unix(1_548_398_000), &config);
        assert_eq!(tx.expiration.unix(), 1_548_398_600);
    }

    #[test]
    fn test_empty_transaction_encoding() {
        let tx = Transaction {
            ref_block_num: 0x1234,
            ref_block_prefix: 0xdead_beef,
            expiration: Time::from_unix(1),
            ..Default::default()
        };
        assert_eq!(hex::encode(tx.to_bytes().unwrap()), "3412efbeadde010000000000");
        assert_eq!(tx.to_unsigned_hex().unwrap(), "3412efbeadde01000000000000");
    }
}
