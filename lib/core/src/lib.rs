//! # vexgate Core
//!
//! Core library for the vexgate marshaling gateway.
//!
//! The gateway accepts schema-less JSON documents and queries and speaks a
//! strongly typed wire representation to a backend vector-search engine.
//! This crate provides the pieces that translate between the two worlds:
//!
//! - [`InferredValue`] - type inference over generic JSON values
//! - [`TableSchema`] / [`SchemaCache`] - the per-table schema view,
//!   reconciled lazily against the backend
//! - [`wire`] - the typed wire messages and their fixed-width encodings
//! - [`Gateway`] - the seven operations (create, add, search, get, delete,
//!   list, count) over a [`DocumentStore`] collaborator
//!
//! ## Example
//!
//! ```rust,ignore
//! use vexgate_core::Gateway;
//!
//! let gateway = Gateway::new(store);
//! // First write to an unknown table infers its schema and creates it.
//! let added = gateway
//!     .add("default", "users", &serde_json::json!({"_id": "u1", "vec": [0.1, 0.2]}))
//!     .await?;
//! ```

pub mod document;
pub mod encode;
pub mod error;
pub mod gateway;
pub mod infer;
pub mod project;
pub mod query;
pub mod schema;
pub mod store;
pub mod wire;

pub use document::{assemble_document, AssembledDocument, PRIMARY_KEY};
pub use error::{Error, Result};
pub use gateway::Gateway;
pub use infer::InferredValue;
pub use schema::{SchemaCache, TableSchema};
pub use store::DocumentStore;
pub use wire::{FieldType, ResponseCode};
