//! Key-pair helpers for account registration and key validation.

use crate::bip39::generate_brain_key;
use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::PrimitivesError;

/// A brain key together with the first key derived from it.
#[derive(Clone, Debug)]
pub struct KeyPair {
    /// The brain-key phrase.
    pub brain_key: String,
    /// Private key derived with sequence 0.
    pub private_key: PrivateKey,
}

impl KeyPair {
    /// Derive a key pair from a brain-key phrase with sequence 0.
    ///
    /// An empty phrase generates a fresh 12-word phrase first.
    pub fn from_brain_key(brain_key: &str) -> Result<Self, PrimitivesError> {
        let brain_key = if brain_key.is_empty() {
            generate_brain_key()?
        } else {
            brain_key.to_string()
        };
        let private_key = PrivateKey::from_brain_key(&brain_key, 0)?;
        Ok(KeyPair {
            brain_key,
            private_key,
        })
    }

    /// Generate a key pair from a fresh brain key.
    pub fn generate() -> Result<Self, PrimitivesError> {
        Self::from_brain_key("")
    }

    /// The private key in WIF form.
    pub fn private_wif(&self) -> String {
        self.private_key.to_wif()
    }

    /// The public key in chain string form.
    pub fn public_key(&self) -> &PublicKey {
        self.private_key.public_key()
    }
}

/// Convert a WIF private key to its `GXC`-prefixed public key string.
pub fn private_to_public(wif: &str) -> Result<String, PrimitivesError> {
    Ok(PrivateKey::from_wif(wif)?.public_key().to_string())
}

/// Whether `wif` is a valid WIF private key.
pub fn is_valid_private(wif: &str) -> bool {
    PrivateKey::from_wif(wif).is_ok()
}

/// Whether `key` is a valid `GXC`-prefixed public key string.
pub fn is_valid_public(key: &str) -> bool {
    key.parse::<PublicKey>().is_ok()
}
