//! # vexgate Store
//!
//! gRPC client crate for the backend document store the gateway marshals
//! for. [`RemoteStore`] implements the core [`DocumentStore`] trait with a
//! lazily connected channel and a bounded timeout on every call.
//!
//! [`DocumentStore`]: vexgate_core::DocumentStore

pub mod client;
pub mod remote;

pub use client::DocStoreClient;
pub use remote::{RemoteStore, DEFAULT_CALL_TIMEOUT};
