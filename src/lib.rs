//! # vexgate
//!
//! A marshaling gateway for a vector-search document store.
//!
//! vexgate accepts loosely typed, schema-less JSON documents and queries,
//! infers field types, negotiates per-table schemas with the backend
//! engine, and speaks its strongly typed little-endian wire format.
//!
//! ## Quick Start
//!
//! ```bash
//! cargo install vexgate
//! vexgate --http-port 8080 --store-addr http://127.0.0.1:10000
//! ```
//!
//! A table springs into existence on the first document written to it:
//!
//! ```bash
//! curl -X POST localhost:8080/add -d \
//!   '{"table": "users", "docs": {"_id": "u1", "age": 30, "vec": [0.1, 0.2, 0.3]}}'
//! ```
//!
//! ## Crate Structure
//!
//! - [`vexgate-core`](https://docs.rs/vexgate-core) - type inference, schema cache, wire marshaling
//! - [`vexgate-store`](https://docs.rs/vexgate-store) - gRPC client for the backend store
//! - [`vexgate-api`](https://docs.rs/vexgate-api) - the JSON-over-HTTP surface

// Re-export core types
pub use vexgate_core::{
    DocumentStore, Error, FieldType, Gateway, InferredValue, Result, SchemaCache, TableSchema,
};

// Re-export the store client
pub use vexgate_store::RemoteStore;

// Re-export API
pub use vexgate_api::RestApi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        DocumentStore, Error, FieldType, Gateway, InferredValue, RemoteStore, RestApi, Result,
        SchemaCache, TableSchema,
    };
}
