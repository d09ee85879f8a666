//! Graphene address derived from a public key.
//!
//! `address = RIPEMD-160(SHA-512(compressed point))`, rendered as
//! `<prefix><Base58(address || RIPEMD-160(address)[0..4])>`. The string
//! form is the sort key Graphene uses for key authorities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::base58;
use crate::ec::public_key::PublicKey;
use crate::hash::{ripemd160, sha512};
use crate::{PrimitivesError, DEFAULT_ADDRESS_PREFIX};

/// Length of the raw address digest.
pub const ADDRESS_LEN: usize = 20;

/// A 20-byte Graphene address bound to a chain prefix.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    data: [u8; ADDRESS_LEN],
    prefix: String,
}

impl Address {
    /// Derive the address of a public key, keeping the key's prefix.
    pub fn from_public_key(key: &PublicKey) -> Self {
        Address {
            data: ripemd160(&sha512(&key.to_compressed())),
            prefix: key.prefix().to_string(),
        }
    }

    /// Wrap a raw 20-byte digest.
    pub fn from_bytes(data: [u8; ADDRESS_LEN], prefix: &str) -> Self {
        Address {
            data,
            prefix: prefix.to_string(),
        }
    }

    /// Parse a chain-formatted address string with the given prefix.
    ///
    /// # Returns
    /// `PrefixMismatch`, `InvalidBase58`, `ChecksumMismatch` or
    /// `InvalidAddress` (wrong payload length) on failure.
    pub fn from_str_with_prefix(s: &str, prefix: &str) -> Result<Self, PrimitivesError> {
        let body = s.strip_prefix(prefix).ok_or_else(|| PrimitivesError::PrefixMismatch {
            expected: prefix.to_string(),
            got: s.chars().take(prefix.chars().count()).collect(),
        })?;
        let payload = base58::ripemd_check_decode(body)?;
        let data: [u8; ADDRESS_LEN] = payload.as_slice().try_into().map_err(|_| {
            PrimitivesError::InvalidAddress(format!(
                "expected {} byte payload, got {}",
                ADDRESS_LEN,
                payload.len()
            ))
        })?;
        Ok(Self::from_bytes(data, prefix))
    }

    /// The raw 20-byte digest, which is also the binary wire form.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.data
    }

    /// The chain prefix used by the string form.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix, base58::ripemd_check_encode(&self.data))
    }
}

impl FromStr for Address {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_with_prefix(s, DEFAULT_ADDRESS_PREFIX)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
