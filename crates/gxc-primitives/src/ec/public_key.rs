//! secp256k1 public key in Graphene's chain-prefixed string format.
//!
//! The string form is `<prefix><Base58(compressed point || checksum)>`
//! where the checksum is the first 4 bytes of RIPEMD-160 of the
//! compressed point, e.g. `GXC6cFT1...`.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use k256::ecdsa::VerifyingKey;
use k256::elliptic_curve::sec1::FromEncodedPoint;
use k256::{AffinePoint, ProjectivePoint};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::base58;
use crate::ec::address::Address;
use crate::hash::ripemd160_checksum;
use crate::{PrimitivesError, DEFAULT_ADDRESS_PREFIX};

/// Length of a compressed public key in bytes (prefix + 32 byte x-coordinate).
pub const COMPRESSED_LEN: usize = 33;

/// A secp256k1 public key bound to a chain address prefix.
///
/// Equality and hashing consider only the curve point, so the same key
/// parsed under two prefixes compares equal.
#[derive(Clone, Debug)]
pub struct PublicKey {
    /// The underlying k256 verifying key.
    inner: VerifyingKey,
    /// Chain prefix used by the string form.
    prefix: String,
}

impl PublicKey {
    /// Create a PublicKey from SEC1 bytes using the default `GXC` prefix.
    ///
    /// # Arguments
    /// * `bytes` - A 33-byte compressed (or 65-byte uncompressed) SEC1 point.
    ///
    /// # Returns
    /// `Ok(PublicKey)` on success, `InvalidPublicKey` for a wrong length or
    /// tag byte, or `PointNotOnCurve` if the coordinates are not a curve point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        Self::from_bytes_with_prefix(bytes, DEFAULT_ADDRESS_PREFIX)
    }

    /// Create a PublicKey from SEC1 bytes with an explicit chain prefix.
    pub fn from_bytes_with_prefix(bytes: &[u8], prefix: &str) -> Result<Self, PrimitivesError> {
        let well_formed = match bytes.len() {
            COMPRESSED_LEN => bytes[0] == 0x02 || bytes[0] == 0x03,
            65 => bytes[0] == 0x04,
            n => {
                return Err(PrimitivesError::InvalidPublicKey(format!(
                    "expected {} bytes, got {}",
                    COMPRESSED_LEN, n
                )))
            }
        };
        if !well_formed {
            return Err(PrimitivesError::InvalidPublicKey(format!(
                "invalid SEC1 tag byte 0x{:02x}",
                bytes[0]
            )));
        }
        let vk = VerifyingKey::from_sec1_bytes(bytes).map_err(|_| PrimitivesError::PointNotOnCurve)?;
        Ok(PublicKey {
            inner: vk,
            prefix: prefix.to_string(),
        })
    }

    /// Create a PublicKey from a hex-encoded SEC1 string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Parse a chain-formatted public key string with the given prefix.
    ///
    /// # Arguments
    /// * `s` - A string such as `GXC6cFT1...`.
    /// * `prefix` - The expected chain prefix.
    ///
    /// # Returns
    /// `PrefixMismatch` if the string does not start with `prefix`,
    /// `InvalidBase58` for a malformed body, `ChecksumMismatch` if the
    /// RIPEMD-160 checksum fails, or `PointNotOnCurve` for a bad point.
    pub fn from_str_with_prefix(s: &str, prefix: &str) -> Result<Self, PrimitivesError> {
        let body = s.strip_prefix(prefix).ok_or_else(|| PrimitivesError::PrefixMismatch {
            expected: prefix.to_string(),
            got: s.chars().take(prefix.chars().count()).collect(),
        })?;
        let payload = base58::ripemd_check_decode(body)?;
        if payload.len() != COMPRESSED_LEN {
            return Err(PrimitivesError::InvalidPublicKey(format!(
                "expected {} byte payload, got {}",
                COMPRESSED_LEN,
                payload.len()
            )));
        }
        Self::from_bytes_with_prefix(&payload, prefix)
    }

    /// Return the chain prefix used by the string form.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Return the same key bound to a different chain prefix.
    pub fn with_prefix(&self, prefix: &str) -> Self {
        PublicKey {
            inner: self.inner,
            prefix: prefix.to_string(),
        }
    }

    /// Serialize the public key in compressed SEC1 format (33 bytes).
    ///
    /// This is also the key's canonical binary encoding on the wire.
    pub fn to_compressed(&self) -> [u8; COMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize the compressed key as a lowercase hexadecimal string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }

    /// First 4 bytes of RIPEMD-160 of the compressed point.
    pub fn checksum(&self) -> [u8; 4] {
        ripemd160_checksum(&self.to_compressed())
    }

    /// Derive the Graphene address of this key, carrying the same prefix.
    pub fn to_address(&self) -> Address {
        Address::from_public_key(self)
    }

    /// Construct a PublicKey from a k256 `VerifyingKey`.
    pub(crate) fn from_k256_verifying_key(vk: &VerifyingKey, prefix: &str) -> Self {
        PublicKey {
            inner: *vk,
            prefix: prefix.to_string(),
        }
    }

    /// Convert this public key to a k256 `ProjectivePoint` for EC arithmetic.
    pub(crate) fn to_projective_point(&self) -> Result<ProjectivePoint, PrimitivesError> {
        let encoded = self.inner.to_encoded_point(false);
        Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
            .map(ProjectivePoint::from)
            .ok_or(PrimitivesError::PointNotOnCurve)
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_compressed() == other.to_compressed()
    }
}

impl Eq for PublicKey {}

impl Hash for PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_compressed().hash(state);
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            self.prefix,
            base58::ripemd_check_encode(&self.to_compressed())
        )
    }
}

impl FromStr for PublicKey {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_with_prefix(s, DEFAULT_ADDRESS_PREFIX)
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
