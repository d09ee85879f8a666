/// GXChain SDK - Cryptographic primitives, hashing, and utilities.
///
/// This crate provides the foundational building blocks for the GXChain SDK:
/// - Hash functions (SHA-256, SHA-256d, SHA-512, RIPEMD-160)
/// - Base58 and Base58Check encoding/decoding
/// - Graphene unsigned varint encoding
/// - secp256k1 key material (WIF private keys, chain-prefixed public keys, addresses)
/// - Canonical compact recoverable signatures
/// - Brain-key phrase generation

pub mod hash;
pub mod util;
pub mod base58;
pub mod ec;
pub mod bip39;

mod error;
pub use error::PrimitivesError;

/// Address prefix used by GXChain public keys and addresses.
pub const DEFAULT_ADDRESS_PREFIX: &str = "GXC";
