//! secp256k1 private key with Graphene-specific functionality.
//!
//! Wraps a k256 signing key and adds WIF encoding, brain-key derivation,
//! the ECDH shared secret used by memos, and canonical compact signing.
//! The matching public key is derived once at construction and cached.

use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::Scalar;
use rand::rngs::OsRng;
use zeroize::Zeroize;

use crate::base58;
use crate::ec::public_key::PublicKey;
use crate::ec::signature::{self, CompactSignature};
use crate::hash::{sha256, sha512};
use crate::{PrimitivesError, DEFAULT_ADDRESS_PREFIX};

/// Length of a serialized private key in bytes.
const PRIVATE_KEY_BYTES_LEN: usize = 32;

/// WIF version byte.
const WIF_VERSION: u8 = 0x80;

/// WIF payload length after the checksum is removed: version byte + scalar.
const WIF_PAYLOAD_LEN: usize = 1 + PRIVATE_KEY_BYTES_LEN;

/// A secp256k1 private key for signing and memo encryption.
#[derive(Clone, Debug)]
pub struct PrivateKey {
    /// The underlying k256 signing key.
    inner: SigningKey,
    /// Public key derived at construction.
    public: PublicKey,
}

impl PrivateKey {
    /// Generate a new random private key using the OS random number generator.
    pub fn new() -> Self {
        Self::from_signing_key(SigningKey::random(&mut OsRng))
    }

    /// Create a private key from a raw 32-byte scalar.
    ///
    /// # Arguments
    /// * `bytes` - A 32-byte big-endian scalar.
    ///
    /// # Returns
    /// `Ok(PrivateKey)` if the scalar is non-zero and below the curve order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_BYTES_LEN {
            return Err(PrimitivesError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_BYTES_LEN,
                bytes.len()
            )));
        }
        let signing_key = SigningKey::from_bytes(bytes.into())
            .map_err(|e| PrimitivesError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self::from_signing_key(signing_key))
    }

    /// Create a private key from a 64-character hexadecimal string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.is_empty() {
            return Err(PrimitivesError::InvalidPrivateKey(
                "private key hex is empty".to_string(),
            ));
        }
        let mut bytes = hex::decode(hex_str)?;
        let key = Self::from_bytes(&bytes);
        bytes.zeroize();
        key
    }

    /// Create a private key from a WIF string.
    ///
    /// Graphene WIF is `Base58Check(0x80 || scalar)` with no compression flag.
    ///
    /// # Returns
    /// `InvalidBase58` for a malformed string, `ChecksumMismatch` if the
    /// checksum fails, or `InvalidWif` for a wrong length or version byte.
    pub fn from_wif(wif: &str) -> Result<Self, PrimitivesError> {
        let mut payload = base58::check_decode(wif)?;
        let result = Self::from_wif_payload(&payload);
        payload.zeroize();
        result
    }

    fn from_wif_payload(payload: &[u8]) -> Result<Self, PrimitivesError> {
        if payload.len() != WIF_PAYLOAD_LEN {
            return Err(PrimitivesError::InvalidWif(format!(
                "invalid length {}",
                payload.len()
            )));
        }
        if payload[0] != WIF_VERSION {
            return Err(PrimitivesError::InvalidWif(format!(
                "invalid version byte 0x{:02x}",
                payload[0]
            )));
        }
        Self::from_bytes(&payload[1..])
    }

    /// Derive a private key from a brain-key phrase and sequence number.
    ///
    /// `scalar = SHA-256(SHA-512(phrase + " " + sequence))`. The phrase is
    /// used exactly as given, without normalization.
    ///
    /// # Arguments
    /// * `phrase` - The brain-key words.
    /// * `sequence` - Derivation index, `0` for the first key.
    pub fn from_brain_key(phrase: &str, sequence: u32) -> Result<Self, PrimitivesError> {
        let mut input = format!("{} {}", phrase, sequence).into_bytes();
        let mut seed = sha512(&input);
        let mut scalar = sha256(&seed);
        let key = Self::from_bytes(&scalar);
        input.zeroize();
        seed.zeroize();
        scalar.zeroize();
        key
    }

    /// Encode the private key as a WIF string.
    pub fn to_wif(&self) -> String {
        let mut payload = Vec::with_capacity(1 + PRIVATE_KEY_BYTES_LEN);
        payload.push(WIF_VERSION);
        payload.extend_from_slice(&self.to_bytes());
        let wif = base58::check_encode(&payload);
        payload.zeroize();
        wif
    }

    /// Serialize the private key as a 32-byte big-endian array.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.inner.to_bytes());
        out
    }

    /// Serialize the private key as a lowercase hexadecimal string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// The public key derived from this private key, with the `GXC` prefix.
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Produce a canonical compact recoverable signature over a 32-byte digest.
    ///
    /// See [`signature::sign_canonical`] for the retry rules.
    pub fn sign_compact(&self, digest: &[u8; 32]) -> Result<CompactSignature, PrimitivesError> {
        signature::sign_canonical(self, digest)
    }

    /// Compute the ECDH shared secret with another party's public key.
    ///
    /// The secret is the x-coordinate of `self.scalar * other.point`,
    /// big-endian and left-padded to 32 bytes.
    ///
    /// # Returns
    /// The 32-byte secret, or `PointNotOnCurve` if `other` cannot be decoded.
    pub fn shared_secret(&self, other: &PublicKey) -> Result<[u8; 32], PrimitivesError> {
        let point = other.to_projective_point()? * self.to_scalar();
        let encoded = point.to_affine().to_encoded_point(false);
        let x = encoded.x().ok_or(PrimitivesError::PointNotOnCurve)?;
        let mut out = [0u8; 32];
        out.copy_from_slice(x);
        Ok(out)
    }

    /// Access the underlying k256 `SigningKey`.
    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.inner
    }

    /// Convert the private key to a k256 `Scalar` for arithmetic operations.
    pub(crate) fn to_scalar(&self) -> Scalar {
        *self.inner.as_nonzero_scalar().as_ref()
    }

    fn from_signing_key(inner: SigningKey) -> Self {
        let public = PublicKey::from_k256_verifying_key(inner.verifying_key(), DEFAULT_ADDRESS_PREFIX);
        PrivateKey { inner, public }
    }
}

impl Default for PrivateKey {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PrivateKey {}

#[cfg(test)]
mod tests {
    use super::*;

    /// Well-known key: scalar 0x0c28fca386c7a227600b2fe50b7cae11ec86d3bf1fbe471be89827e19d72aa1d.
    const KNOWN_HEX: &str = "0c28fca386c7a227600b2fe50b7cae11ec86d3bf1fbe471be89827e19d72aa1d";
    const KNOWN_WIF: &str = "5HueCGU8rMjxEXxiPuD5BDku4MkFqeZyd4dZ1jvhTVqvbTLvyTJ";

    #[test]
    fn test_known_wif_vector() {
        let key = PrivateKey::from_hex(KNOWN_HEX).unwrap();
        assert_eq!(key.to_wif(), KNOWN_WIF);
        let parsed = PrivateKey::from_wif(KNOWN_WIF).unwrap();
        assert_eq!(parsed.to_hex(), KNOWN_HEX);
    }

    #[test]
    fn test_serialization_roundtrips() {
        let pk = PrivateKey::new();
        assert_eq!(PrivateKey::from_bytes(&pk.to_bytes()).unwrap(), pk);
        assert_eq!(PrivateKey::from_hex(&pk.to_hex()).unwrap(), pk);
        assert_eq!(PrivateKey::from_wif(&pk.to_wif()).unwrap(), pk);
    }

    #[test]
    fn test_wif_checksum_mismatch() {
        let mut decoded = base58::decode(KNOWN_WIF).unwrap();
        let last = decoded.len() - 1;
        decoded[last] ^= 0xff;
        let tampered = base58::encode(&decoded);
        assert!(matches!(
            PrivateKey::from_wif(&tampered),
            Err(PrimitivesError::ChecksumMismatch)
        ));
    }

    #[test]
    fn test_wif_wrong_version() {
        let mut payload = vec![0xef];
        payload.extend_from_slice(&hex::decode(KNOWN_HEX).unwrap());
        let wif = base58::check_encode(&payload);
        assert!(matches!(PrivateKey::from_wif(&wif), Err(PrimitivesError::InvalidWif(_))));
    }

    #[test]
    fn test_wif_malformed() {
        assert!(matches!(
            PrivateKey::from_wif("5HueCGU8rMjxEXxiPuD5BDku4MkFqeZyd4dZ1jvhTVqvbTLvyT0"),
            Err(PrimitivesError::InvalidBase58(_))
        ));
        assert!(matches!(
            PrivateKey::from_wif("5HueCGU8rMjxEXxiPuD5BDku4MkFqeZyd4dZ1jvhTVqv"),
            Err(PrimitivesError::ChecksumMismatch)
        ));
    }

    #[test]
    fn test_wif_wrong_length_with_valid_checksum() {
        let mut payload = vec![WIF_VERSION];
        payload.extend_from_slice(&hex::decode(KNOWN_HEX).unwrap());
        payload.push(0x01);
        let compressed_style = base58::check_encode(&payload);
        assert!(matches!(
            PrivateKey::from_wif(&compressed_style),
            Err(PrimitivesError::InvalidWif(_))
        ));
    }

    #[test]
    fn test_brain_key_derivation() {
        let phrase = "correct horse battery staple";
        let key = PrivateKey::from_brain_key(phrase, 0).unwrap();
        let expected = sha256(&sha512(b"correct horse battery staple 0"));
        assert_eq!(key.to_bytes(), expected);

        let next = PrivateKey::from_brain_key(phrase, 1).unwrap();
        assert_ne!(key, next);
    }

    #[test]
    fn test_public_key_is_cached_and_stable() {
        let key = PrivateKey::from_hex(KNOWN_HEX).unwrap();
        let a = key.public_key().clone();
        let b = PrivateKey::from_wif(&key.to_wif()).unwrap().public_key().clone();
        assert_eq!(a, b);
        assert_eq!(a.prefix(), "GXC");
    }

    #[test]
    fn test_shared_secret_is_symmetric() {
        let alice = PrivateKey::from_brain_key("alice", 0).unwrap();
        let bob = PrivateKey::from_brain_key("bob", 0).unwrap();
        let ab = alice.shared_secret(bob.public_key()).unwrap();
        let ba = bob.shared_secret(alice.public_key()).unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_invalid_scalar() {
        assert!(PrivateKey::from_bytes(&[0u8; 32]).is_err());
        assert!(PrivateKey::from_bytes(&[0xffu8; 32]).is_err());
        assert!(PrivateKey::from_bytes(&[1u8; 31]).is_err());
        assert!(PrivateKey::from_hex("").is_err());
    }
}
