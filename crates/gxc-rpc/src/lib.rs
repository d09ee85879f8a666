#![deny(missing_docs)]

//! # gxc-rpc
//!
//! JSON-RPC plumbing for talking to GXChain nodes: a [`Transport`]
//! abstraction with explicit capability flags, an HTTP implementation,
//! and typed wrappers for the broadcast and database APIs.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use gxc_rpc::{BroadcastApi, HttpTransport, RpcConfig};
//!
//! let transport = HttpTransport::new(&RpcConfig {
//!     url: "https://node.example.com/rpc".to_string(),
//!     ..Default::default()
//! })
//! .unwrap();
//! let broadcast = BroadcastApi::new(Arc::new(transport), 2);
//! ```

pub mod broadcast;
pub mod database;
pub mod error;
pub mod transport;
pub mod types;

#[cfg(test)]
mod tests;

pub use broadcast::{BroadcastApi, Broadcaster};
pub use database::DatabaseApi;
pub use error::RpcError;
pub use transport::{Capabilities, HttpTransport, Transport};
pub use types::{BroadcastResponse, DynamicGlobalProperties, RpcConfig};
