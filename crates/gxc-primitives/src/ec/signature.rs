//! Canonical compact recoverable ECDSA signatures.
//!
//! Graphene nodes only accept 65-byte compact signatures
//! (`header || r || s`, header = 27 + 4 + recovery id) whose `r` and `s`
//! are low-S and each fit in exactly 32 bytes of minimal DER: the high bit
//! of the first byte is clear, and a zero first byte is only allowed when
//! the second byte has its high bit set. Signatures that miss this are
//! regenerated with RFC6979 additional data derived from an attempt
//! counter, so the result stays deterministic for a given key and digest.

use std::fmt;

use ecdsa::hazmat::SignPrimitive;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use k256::FieldBytes;
use sha2::Sha256;

use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::hash::sha256;
use crate::PrimitivesError;

/// Length of a compact signature.
pub const COMPACT_SIGNATURE_LEN: usize = 65;

/// Header offset for a compressed-key compact signature.
const COMPRESSED_HEADER_BASE: u8 = 27 + 4;

/// Upper bound on nonce retries before giving up.
pub const MAX_SIGNING_ATTEMPTS: u32 = 1024;

/// Attempts after which a retry is logged at warn level.
const WARN_AFTER_ATTEMPTS: u32 = 16;

/// A 65-byte compact recoverable signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompactSignature([u8; COMPACT_SIGNATURE_LEN]);

impl CompactSignature {
    /// Wrap 65 raw bytes, checking the length and header byte.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let arr: [u8; COMPACT_SIGNATURE_LEN] = bytes.try_into().map_err(|_| {
            PrimitivesError::InvalidSignature(format!(
                "expected {} bytes, got {}",
                COMPACT_SIGNATURE_LEN,
                bytes.len()
            ))
        })?;
        if !(27..27 + 8).contains(&arr[0]) {
            return Err(PrimitivesError::InvalidSignature(format!(
                "invalid header byte {}",
                arr[0]
            )));
        }
        Ok(CompactSignature(arr))
    }

    /// Parse a hex-encoded compact signature.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        Self::from_bytes(&hex::decode(hex_str)?)
    }

    /// The raw 65 bytes.
    pub fn as_bytes(&self) -> &[u8; COMPACT_SIGNATURE_LEN] {
        &self.0
    }

    /// Lowercase hex of the raw bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Recovery id (0..=3) carried in the header byte.
    pub fn recovery_id(&self) -> u8 {
        (self.0[0] - 27) & 3
    }

    /// Whether `r` and `s` satisfy the canonical encoding rule.
    pub fn is_canonical(&self) -> bool {
        is_canonical(&self.0[1..])
    }

    /// Recover the signer's public key from the signature and digest.
    ///
    /// # Returns
    /// The recovered key with the default prefix, or `InvalidSignature`.
    pub fn recover_public_key(&self, digest: &[u8; 32]) -> Result<PublicKey, PrimitivesError> {
        let sig = Signature::from_slice(&self.0[1..])
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        let recovery_id = RecoveryId::from_byte(self.recovery_id())
            .ok_or_else(|| PrimitivesError::InvalidSignature("invalid recovery id".to_string()))?;
        let vk = VerifyingKey::recover_from_prehash(digest, &sig, recovery_id)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        Ok(PublicKey::from_k256_verifying_key(&vk, crate::DEFAULT_ADDRESS_PREFIX))
    }
}

impl fmt::Debug for CompactSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompactSignature({})", self.to_hex())
    }
}

/// Check the canonical rule on a 64-byte `r || s`.
pub fn is_canonical(rs: &[u8]) -> bool {
    rs.len() == 64 && is_canonical_half(&rs[..32]) && is_canonical_half(&rs[32..])
}

fn is_canonical_half(v: &[u8]) -> bool {
    v[0] & 0x80 == 0 && !(v[0] == 0 && v[1] & 0x80 == 0)
}

/// Sign a digest, retrying until the signature is canonical.
///
/// Attempt 0 is plain RFC6979 (identical to k256's own signer); attempt
/// `n > 0` feeds `SHA-256(n as u32 LE)` as RFC6979 additional data. Each
/// candidate is low-S normalized, then recovery ids 0..4 are tried until
/// one recovers the signer's key.
///
/// # Returns
/// The compact signature, or `SignatureCanonicalization` if no attempt
/// produced a canonical, recoverable signature.
pub fn sign_canonical(
    key: &PrivateKey,
    digest: &[u8; 32],
) -> Result<CompactSignature, PrimitivesError> {
    let expected = key.signing_key().verifying_key();
    let z = FieldBytes::from(*digest);

    for attempt in 0..MAX_SIGNING_ATTEMPTS {
        let extra = if attempt == 0 {
            Vec::new()
        } else {
            sha256(&attempt.to_le_bytes()).to_vec()
        };
        let (sig, _) = key
            .to_scalar()
            .try_sign_prehashed_rfc6979::<Sha256>(&z, &extra)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        let sig = sig.normalize_s().unwrap_or(sig);
        let rs = sig.to_bytes();

        if !is_canonical(&rs) {
            if attempt >= WARN_AFTER_ATTEMPTS {
                tracing::warn!(attempt, "non-canonical signature, retrying");
            }
            continue;
        }

        for id in 0..4u8 {
            let Some(recovery_id) = RecoveryId::from_byte(id) else {
                continue;
            };
            let recovered = match VerifyingKey::recover_from_prehash(digest, &sig, recovery_id) {
                Ok(vk) => vk,
                Err(_) => continue,
            };
            if &recovered == expected {
                let mut out = [0u8; COMPACT_SIGNATURE_LEN];
                out[0] = COMPRESSED_HEADER_BASE + id;
                out[1..].copy_from_slice(&rs);
                tracing::debug!(attempts = attempt + 1, recovery_id = id, "produced canonical signature");
                return Ok(CompactSignature(out));
            }
        }
        return Err(PrimitivesError::SignatureCanonicalization {
            attempts: attempt + 1,
        });
    }

    Err(PrimitivesError::SignatureCanonicalization {
        attempts: MAX_SIGNING_ATTEMPTS,
    })
}
