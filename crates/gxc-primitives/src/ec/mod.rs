/// Elliptic curve cryptography on secp256k1.
///
/// Provides WIF private keys, chain-prefixed public keys, addresses,
/// canonical compact recoverable signatures and brain-key key pairs.

pub mod private_key;
pub mod public_key;
pub mod address;
pub mod signature;
pub mod key_pair;

pub use address::Address;
pub use key_pair::KeyPair;
pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use signature::CompactSignature;
