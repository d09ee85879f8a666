//! Chain parameters needed to build and sign transactions.

use serde::{Deserialize, Serialize};

use crate::TransactionError;

/// Default distance between the head block time and a transaction's expiration.
pub const DEFAULT_EXPIRATION_WINDOW_SECS: u32 = 600;

/// Per-network signing parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Hex-encoded 32-byte chain id mixed into every signing digest.
    /// Empty until set; nodes report it through `get_chain_id`.
    pub chain_id: String,
    /// Prefix of public key and address strings.
    pub address_prefix: String,
    /// Seconds added to the head block time to get a transaction's expiration.
    pub expiration_window_secs: u32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        ChainConfig {
            chain_id: String::new(),
            address_prefix: gxc_primitives::DEFAULT_ADDRESS_PREFIX.to_string(),
            expiration_window_secs: DEFAULT_EXPIRATION_WINDOW_SECS,
        }
    }
}

impl ChainConfig {
    /// Config for the chain identified by `chain_id` (hex).
    pub fn with_chain_id(chain_id: impl Into<String>) -> Self {
        ChainConfig {
            chain_id: chain_id.into(),
            ..Default::default()
        }
    }

    /// The chain id as raw bytes.
    ///
    /// # Returns
    /// `InvalidChainId` unless `chain_id` is exactly 32 bytes of hex.
    pub fn chain_id_bytes(&self) -> Result<[u8; 32], TransactionError> {
        parse_chain_id(&self.chain_id)
    }
}

pub(crate) fn parse_chain_id(chain_id: &str) -> Result<[u8; 32], TransactionError> {
    let bytes = hex::decode(chain_id)
        .map_err(|e| TransactionError::InvalidChainId(format!("{}: {}", chain_id, e)))?;
    <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| {
        TransactionError::InvalidChainId(format!("expected 32 bytes, got {}", bytes.len()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ChainConfig::default();
        assert_eq!(config.address_prefix, "GXC");
        assert_eq!(config.expiration_window_secs, 600);
        assert!(config.chain_id_bytes().is_err());

        let config = ChainConfig::with_chain_id("ab".repeat(32));
        assert_eq!(config.chain_id_bytes().unwrap(), [0xab; 32]);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ChainConfig = serde_json::from_str(r#"{"address_prefix":"TEST"}"#).unwrap();
        assert_eq!(config.address_prefix, "TEST");
        assert_eq!(config.expiration_window_secs, DEFAULT_EXPIRATION_WINDOW_SECS);
    }

    #[test]
    fn test_invalid_chain_id() {
        let too_long = "00".repeat(33);
        for bad in ["", "zz", "4f7d", too_long.as_str()] {
            let config = ChainConfig::with_chain_id(bad);
            assert!(matches!(
                config.chain_id_bytes(),
                Err(TransactionError::InvalidChainId(_))
            ));
        }
    }
}
