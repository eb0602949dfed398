//! # vexgate API
//!
//! JSON-over-HTTP surface of the gateway: seven POST operations mirroring
//! the store's capabilities (`/create`, `/add`, `/search`, `/get`,
//! `/delete`, `/list`, `/count`), each taking a schema-less JSON envelope.

pub mod rest;

pub use rest::RestApi;
