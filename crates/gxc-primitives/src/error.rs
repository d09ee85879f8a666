/// Unified error type for all primitives operations.
///
/// Each failed key-format check has its own variant so callers can tell a
/// bad Base58 payload apart from a checksum, prefix or curve-point failure.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid WIF format: {0}")]
    InvalidWif(String),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("prefix mismatch: expected {expected}, got {got}")]
    PrefixMismatch { expected: String, got: String },

    #[error("point not on curve")]
    PointNotOnCurve,

    #[error("no canonical signature found after {attempts} attempts")]
    SignatureCanonicalization { attempts: u32 },

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    #[error("mnemonic error: {0}")]
    Mnemonic(String),

    #[error("varint too large")]
    VarIntTooLarge,

    #[error("unexpected end of data")]
    UnexpectedEof,
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}
