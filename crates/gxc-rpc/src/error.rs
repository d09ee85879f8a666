//! Error types for RPC calls.

use gxc_transaction::TransactionError;

/// Errors that can occur when calling a node.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// The HTTP request failed or timed out.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A request or response body could not be (de)serialized.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The node answered with a JSON-RPC error object.
    #[error("remote error ({code}): {message}")]
    Remote {
        /// JSON-RPC error code.
        code: i64,
        /// Error message reported by the node.
        message: String,
    },

    /// The node answered with a non-success HTTP status.
    #[error("unexpected status code: {0}")]
    UnexpectedStatus(u16),

    /// The transaction could not be encoded or identified.
    #[error("transaction error: {0}")]
    Transaction(#[from] TransactionError),
}
