/// GXChain SDK - Canonical operation encoding and transaction signing.
///
/// Provides the sticky-error byte encoder, the protocol value types, the
/// operation envelope with its tag registry, authority canonicalization,
/// vote ids, memo encryption, and online/offline transaction signing.

pub mod encoder;
pub mod types;
pub mod authority;
pub mod vote;
pub mod memo;
pub mod operation;
pub mod transaction;
pub mod signer;
pub mod config;
mod layout;

mod error;
pub use error::TransactionError;
pub use encoder::{Encodable, Encoder};
pub use operation::{Operation, OperationType};
pub use transaction::{SignedTransaction, Transaction};
pub use config::ChainConfig;
