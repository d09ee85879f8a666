use gxc_primitives::PrimitivesError;

/// Error types for encoding, signing and memo operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// The underlying writer failed; everything after `offset` was dropped.
    #[error("encoding failed at byte {offset}: {source}")]
    Encoding {
        /// Bytes successfully written before the failure.
        offset: usize,
        /// The writer's error.
        source: std::io::Error,
    },
    /// An operation with an unregistered type tag cannot be binary-encoded or signed.
    #[error("unsupported operation type {tag}: only JSON passthrough is available")]
    UnsupportedOperation {
        /// The unregistered type tag.
        tag: u64,
    },
    /// A non-empty extension set that has no binary encoding.
    #[error("unsupported extension: {0}")]
    UnsupportedExtension(String),
    /// No canonical recoverable signature could be produced.
    #[error("no canonical signature found after {attempts} attempts")]
    SignatureCanonicalization {
        /// Nonce attempts made before giving up.
        attempts: u32,
    },
    /// The decrypted memo checksum (or its padding) does not match.
    #[error("memo checksum mismatch")]
    MemoChecksumMismatch,
    /// The decrypting key is neither the memo sender nor the recipient.
    #[error("memo counterparty mismatch: {0} is neither sender nor recipient")]
    MemoCounterpartyMismatch(String),
    /// The memo ciphertext has an impossible length.
    #[error("invalid memo ciphertext: {0}")]
    InvalidMemoCiphertext(String),
    /// A malformed `space.type.instance` object id.
    #[error("invalid object id: {0}")]
    InvalidObjectId(String),
    /// A malformed `type:instance` vote id.
    #[error("invalid vote id: {0}")]
    InvalidVoteId(String),
    /// A timestamp outside the protocol's 32-bit range or in the wrong format.
    #[error("invalid time: {0}")]
    InvalidTime(String),
    /// Malformed hex input.
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    /// The chain id is not 32 bytes of hex.
    #[error("invalid chain id: {0}")]
    InvalidChainId(String),
    /// The transaction structure is invalid.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
    /// JSON (de)serialization failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// An underlying primitives error (forwarded from `gxc-primitives`).
    #[error("primitives error: {0}")]
    Primitives(#[from] PrimitivesError),
}

impl From<hex::FromHexError> for TransactionError {
    fn from(e: hex::FromHexError) -> Self {
        TransactionError::InvalidHex(e.to_string())
    }
}
