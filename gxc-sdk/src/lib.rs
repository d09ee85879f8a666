#![deny(missing_docs)]

//! GXChain SDK - Complete SDK.
//!
//! Re-exports all GXChain SDK components for convenient single-crate usage:
//! key material and hashing (`primitives`), canonical encoding and signing
//! (`transaction`), and the JSON-RPC transport (`rpc`).

pub use gxc_primitives as primitives;
pub use gxc_rpc as rpc;
pub use gxc_transaction as transaction;
