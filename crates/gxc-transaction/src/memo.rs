//! Encrypted transfer memos.
//!
//! Key agreement is ECDH on secp256k1: the shared secret is the
//! x-coordinate of `sender_scalar * recipient_point`. Per memo,
//!
//! ```text
//! seed = SHA-512(decimal(nonce) || hex(SHA-512(shared_secret)))
//! key  = seed[0..32], iv = seed[32..48]
//! body = SHA-256(plaintext)[0..4] || plaintext, PKCS#7 padded
//! message = AES-256-CBC(key, iv, body)
//! ```
//!
//! The nonce must never repeat for a key pair; [`Memo::encrypt`] draws it
//! from the OS random number generator.

use std::io::Write;

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes256;
use gxc_primitives::ec::{PrivateKey, PublicKey};
use gxc_primitives::hash::{sha256, sha512};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::encoder::{Encodable, Encoder};
use crate::types::{number_or_string, Buffer};
use crate::TransactionError;

const BLOCK_LEN: usize = 16;
const CHECKSUM_LEN: usize = 4;

/// An encrypted memo attached to a transfer.
///
/// Wire order: from (33 bytes), to (33 bytes), nonce (u64 LE), message buffer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memo {
    /// Sender's memo key.
    pub from: PublicKey,
    /// Recipient's memo key.
    pub to: PublicKey,
    /// Per-memo nonce. Accepted from JSON as a number or a decimal string.
    #[serde(deserialize_with = "number_or_string")]
    pub nonce: u64,
    /// AES-256-CBC ciphertext.
    pub message: Buffer,
}

impl Memo {
    /// Encrypt `plaintext` from `sender` to `to` under a fresh random nonce.
    pub fn encrypt(sender: &PrivateKey, to: &PublicKey, plaintext: &[u8]) -> Result<Self, TransactionError> {
        Self::encrypt_with_nonce(sender, to, plaintext, OsRng.next_u64())
    }

    /// Encrypt with a caller-chosen nonce.
    ///
    /// Reusing a nonce for the same key pair leaks plaintext relationships;
    /// prefer [`Memo::encrypt`] outside of tests.
    pub fn encrypt_with_nonce(
        sender: &PrivateKey,
        to: &PublicKey,
        plaintext: &[u8],
        nonce: u64,
    ) -> Result<Self, TransactionError> {
        let (key, iv) = derive_key_iv(&sender.shared_secret(to)?, nonce);

        let mut body = Vec::with_capacity(CHECKSUM_LEN + plaintext.len() + BLOCK_LEN);
        body.extend_from_slice(&sha256(plaintext)[..CHECKSUM_LEN]);
        body.extend_from_slice(plaintext);
        let pad = BLOCK_LEN - body.len() % BLOCK_LEN;
        body.resize(body.len() + pad, pad as u8);

        Ok(Memo {
            from: sender.public_key().clone(),
            to: to.clone(),
            nonce,
            message: Buffer(cbc_encrypt(&key, &iv, &body)),
        })
    }

    /// Decrypt the memo with either the sender's or the recipient's key.
    ///
    /// # Returns
    /// The plaintext, `MemoCounterpartyMismatch` if `key` is neither party,
    /// `InvalidMemoCiphertext` for a ciphertext that is not whole blocks,
    /// or `MemoChecksumMismatch` if the padding or checksum is wrong.
    pub fn decrypt(&self, key: &PrivateKey) -> Result<Vec<u8>, TransactionError> {
        let own = key.public_key();
        let counterparty = if *own == self.to {
            &self.from
        } else if *own == self.from {
            &self.to
        } else {
            return Err(TransactionError::MemoCounterpartyMismatch(own.to_string()));
        };

        let ciphertext = self.message.as_bytes();
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
            return Err(TransactionError::InvalidMemoCiphertext(format!(
                "length {} is not a positive multiple of {}",
                ciphertext.len(),
                BLOCK_LEN
            )));
        }

        let (aes_key, iv) = derive_key_iv(&key.shared_secret(counterparty)?, self.nonce);
        let body = cbc_decrypt(&aes_key, &iv, ciphertext);

        // Memos written without padding when the body was block-aligned
        // are still in circulation, so the unpadded body is a second candidate.
        let candidates = [strip_padding(&body), Some(body.as_slice())];
        let plaintext = candidates.into_iter().flatten().find_map(verify_checksum);
        plaintext.ok_or(TransactionError::MemoChecksumMismatch)
    }

    /// Decrypt and interpret the plaintext as UTF-8.
    pub fn decrypt_to_string(&self, key: &PrivateKey) -> Result<String, TransactionError> {
        String::from_utf8(self.decrypt(key)?)
            .map_err(|e| TransactionError::InvalidMemoCiphertext(e.to_string()))
    }
}

impl Encodable for Memo {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.encode(&self.from)
            .encode(&self.to)
            .write_u64(self.nonce)
            .encode(&self.message);
    }
}

fn derive_key_iv(secret: &[u8; 32], nonce: u64) -> ([u8; 32], [u8; 16]) {
    let mut seed_input = nonce.to_string().into_bytes();
    seed_input.extend_from_slice(hex::encode(sha512(secret)).as_bytes());
    let seed = sha512(&seed_input);
    let mut key = [0u8; 32];
    let mut iv = [0u8; 16];
    key.copy_from_slice(&seed[..32]);
    iv.copy_from_slice(&seed[32..48]);
    (key, iv)
}

fn strip_padding(body: &[u8]) -> Option<&[u8]> {
    let pad = usize::from(*body.last()?);
    if pad == 0 || pad > BLOCK_LEN || pad > body.len() {
        return None;
    }
    let (data, padding) = body.split_at(body.len() - pad);
    padding.iter().all(|b| usize::from(*b) == pad).then_some(data)
}

fn verify_checksum(body: &[u8]) -> Option<Vec<u8>> {
    if body.len() < CHECKSUM_LEN {
        return None;
    }
    let (checksum, plaintext) = body.split_at(CHECKSUM_LEN);
    (checksum == &sha256(plaintext)[..CHECKSUM_LEN]).then(|| plaintext.to_vec())
}

/// AES-256-CBC over whole blocks; `data` must already be padded.
fn cbc_encrypt(key: &[u8; 32], iv: &[u8; 16], data: &[u8]) -> Vec<u8> {
    let cipher = Aes256::new(GenericArray::from_slice(key));
    let mut prev = *iv;
    let mut out = Vec::with_capacity(data.len());
    for chunk in data.chunks(BLOCK_LEN) {
        let mut block = GenericArray::clone_from_slice(chunk);
        for (b, p) in block.iter_mut().zip(prev.iter()) {
            *b ^= p;
        }
        cipher.encrypt_block(&mut block);
        prev.copy_from_slice(&block);
        out.extend_from_slice(&block);
    }
    out
}

fn cbc_decrypt(key: &[u8; 32], iv: &[u8; 16], data: &[u8]) -> Vec<u8> {
    let cipher = Aes256::new(GenericArray::from_slice(key));
    let mut prev = *iv;
    let mut out = Vec::with_capacity(data.len());
    for chunk in data.chunks(BLOCK_LEN) {
        let mut block = GenericArray::clone_from_slice(chunk);
        cipher.decrypt_block(&mut block);
        for (b, p) in block.iter_mut().zip(prev.iter()) {
            *b ^= p;
        }
        prev.copy_from_slice(chunk);
        out.extend_from_slice(&block);
    }
    out
}
