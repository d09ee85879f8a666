//! Brain-key phrase generation.
//!
//! Fresh brain keys are 12-word English BIP-39 mnemonics built from 128
//! bits of OS randomness. Only the phrase is taken from BIP-39; keys are
//! then derived with the Graphene brain-key hash
//! (see [`PrivateKey::from_brain_key`](crate::ec::PrivateKey::from_brain_key)),
//! not the BIP-39 PBKDF2 seed.

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

use crate::PrimitivesError;

/// Entropy length for a 12-word phrase.
const ENTROPY_LEN: usize = 16;

/// Generate a new 12-word brain-key phrase from secure randomness.
pub fn generate_brain_key() -> Result<String, PrimitivesError> {
    let mut entropy = [0u8; ENTROPY_LEN];
    OsRng.fill_bytes(&mut entropy);
    let phrase = brain_key_from_entropy(&entropy);
    entropy.zeroize();
    phrase
}

/// Build the brain-key phrase for the given entropy.
///
/// # Arguments
/// * `entropy` - 16 to 32 bytes, a multiple of 4.
pub fn brain_key_from_entropy(entropy: &[u8]) -> Result<String, PrimitivesError> {
    let mnemonic = ::bip39::Mnemonic::from_entropy(entropy)
        .map_err(|e| PrimitivesError::Mnemonic(e.to_string()))?;
    Ok(mnemonic.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_entropy_vector() {
        let phrase = brain_key_from_entropy(&[0u8; 16]).unwrap();
        assert_eq!(
            phrase,
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about"
        );
    }

    #[test]
    fn test_generated_phrase_has_twelve_words() {
        let phrase = generate_brain_key().unwrap();
        assert_eq!(phrase.split(' ').count(), 12);
        assert_ne!(phrase, generate_brain_key().unwrap());
    }

    #[test]
    fn test_rejects_bad_entropy_length() {
        assert!(matches!(
            brain_key_from_entropy(&[0u8; 5]),
            Err(PrimitivesError::Mnemonic(_))
        ));
    }
}
