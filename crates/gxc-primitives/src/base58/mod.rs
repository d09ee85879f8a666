//! Base58 encoding and decoding with the two Graphene checksum schemes.
//!
//! WIF private keys carry a double-SHA-256 checksum (Base58Check), while
//! public keys and addresses carry a RIPEMD-160 checksum. Both schemes
//! append the first 4 bytes of the digest to the payload before encoding.

use zeroize::Zeroize;

use crate::hash::{ripemd160_checksum, sha256d};
use crate::PrimitivesError;

/// Length of the checksum appended by both schemes.
const CHECKSUM_LEN: usize = 4;

/// Encode a byte slice to a Base58 string.
///
/// Uses Bitcoin's Base58 alphabet. Leading zero bytes
/// are encoded as leading '1' characters.
///
/// # Arguments
/// * `data` - The bytes to encode.
///
/// # Returns
/// A Base58-encoded string.
pub fn encode(data: &[u8]) -> String {
    bs58::encode(data).with_alphabet(bs58::Alphabet::BITCOIN).into_string()
}

/// Decode a Base58 string to a byte vector.
///
/// # Arguments
/// * `s` - The Base58 string to decode.
///
/// # Returns
/// `Ok(Vec<u8>)` on success, or `InvalidBase58` for characters outside the alphabet.
pub fn decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    bs58::decode(s)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_vec()
        .map_err(|e| PrimitivesError::InvalidBase58(e.to_string()))
}

/// Encode a byte slice with a 4-byte double-SHA-256 checksum appended (Base58Check).
///
/// # Arguments
/// * `data` - The bytes to encode (version byte + payload for WIF).
///
/// # Returns
/// A Base58Check-encoded string.
pub fn check_encode(data: &[u8]) -> String {
    let checksum = sha256d(data);
    let mut payload = data.to_vec();
    payload.extend_from_slice(&checksum[..CHECKSUM_LEN]);
    encode(&payload)
}

/// Decode a Base58Check string, verifying the 4-byte double-SHA-256 checksum.
///
/// # Arguments
/// * `s` - The Base58Check string to decode.
///
/// # Returns
/// The payload without its checksum, `InvalidBase58` if the string is not
/// Base58 or too short, or `ChecksumMismatch` if the checksum fails.
pub fn check_decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    let mut decoded = decode(s)?;
    let result = split_checksum(&decoded).and_then(|(payload, checksum)| {
        if checksum != &sha256d(payload)[..CHECKSUM_LEN] {
            return Err(PrimitivesError::ChecksumMismatch);
        }
        Ok(payload.to_vec())
    });
    // WIF payloads carry key material.
    decoded.zeroize();
    result
}

/// Encode a byte slice with a 4-byte RIPEMD-160 checksum appended.
///
/// This is the body of a chain-formatted public key or address string,
/// without the chain prefix.
pub fn ripemd_check_encode(data: &[u8]) -> String {
    let mut payload = data.to_vec();
    payload.extend_from_slice(&ripemd160_checksum(data));
    encode(&payload)
}

/// Decode a Base58 string carrying a trailing RIPEMD-160 checksum.
///
/// # Arguments
/// * `s` - The Base58 body (chain prefix already removed).
///
/// # Returns
/// The payload without its checksum, or `InvalidBase58` / `ChecksumMismatch`.
pub fn ripemd_check_decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    let decoded = decode(s)?;
    let (payload, checksum) = split_checksum(&decoded)?;
    if checksum != ripemd160_checksum(payload) {
        return Err(PrimitivesError::ChecksumMismatch);
    }
    Ok(payload.to_vec())
}

fn split_checksum(decoded: &[u8]) -> Result<(&[u8], &[u8]), PrimitivesError> {
    if decoded.len() < CHECKSUM_LEN {
        return Err(PrimitivesError::InvalidBase58(
            "data too short for checksum".to_string(),
        ));
    }
    Ok(decoded.split_at(decoded.len() - CHECKSUM_LEN))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base58_leading_zeros() {
        let input = hex::decode("000000287FB4CD").unwrap();
        assert_eq!(encode(&input), "111233QC4");
        assert_eq!(decode("111233QC4").unwrap(), input);
    }

    #[test]
    fn test_base58_known_vector() {
        let input = hex::decode("0123456789ABCDEF").unwrap();
        assert_eq!(encode(&input), "C3CPq7c8PY");
    }

    #[test]
    fn test_base58_rejects_characters_outside_alphabet() {
        assert!(matches!(decode("0OIl"), Err(PrimitivesError::InvalidBase58(_))));
    }

    #[test]
    fn test_check_decode_detects_tampering() {
        let payload = vec![0x80, 0x01, 0x02, 0x03];
        let mut encoded = check_encode(&payload);
        assert_eq!(check_decode(&encoded).unwrap(), payload);

        let last = encoded.pop().unwrap();
        encoded.push(if last == '1' { '2' } else { '1' });
        assert!(matches!(check_decode(&encoded), Err(PrimitivesError::ChecksumMismatch)));
    }

    #[test]
    fn test_ripemd_check_roundtrip_and_tampering() {
        let payload = [7u8; 33];
        let encoded = ripemd_check_encode(&payload);
        assert_eq!(ripemd_check_decode(&encoded).unwrap(), payload.to_vec());

        let mut bytes = decode(&encoded).unwrap();
        bytes[0] ^= 0x01;
        let tampered = encode(&bytes);
        assert!(matches!(
            ripemd_check_decode(&tampered),
            Err(PrimitivesError::ChecksumMismatch)
        ));
    }

    #[test]
    fn test_short_input_is_a_base58_error() {
        assert!(matches!(ripemd_check_decode("1"), Err(PrimitivesError::InvalidBase58(_))));
    }
}
