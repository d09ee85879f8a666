//! Hash function primitives for the GXChain SDK.
//!
//! Provides SHA-256, double SHA-256, SHA-512 and RIPEMD-160. Graphene
//! mixes these in several places: WIF checksums use SHA-256d, public key
//! and address checksums use RIPEMD-160, addresses and memo key material
//! start from SHA-512.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};

/// Compute SHA-256 hash of the input data.
///
/// # Arguments
/// * `data` - Byte slice to hash.
///
/// # Returns
/// A 32-byte SHA-256 digest.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute double SHA-256 (SHA-256d) hash of the input data.
///
/// Used for the WIF checksum. Computes SHA-256(SHA-256(data)).
///
/// # Arguments
/// * `data` - Byte slice to hash.
///
/// # Returns
/// A 32-byte double-SHA-256 digest.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Compute RIPEMD-160 hash of the input data.
///
/// # Arguments
/// * `data` - Byte slice to hash.
///
/// # Returns
/// A 20-byte RIPEMD-160 digest.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute SHA-512 hash of the input data.
///
/// # Arguments
/// * `data` - Byte slice to hash.
///
/// # Returns
/// A 64-byte SHA-512 digest.
pub fn sha512(data: &[u8]) -> [u8; 64] {
    let mut hasher = Sha512::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 64];
    output.copy_from_slice(&result);
    output
}

/// First four bytes of RIPEMD-160(data).
///
/// This is the checksum appended to Graphene public keys and addresses
/// before Base58 encoding.
pub fn ripemd160_checksum(data: &[u8]) -> [u8; 4] {
    let digest = ripemd160(data);
    [digest[0], digest[1], digest[2], digest[3]]
}
