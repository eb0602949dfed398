//! The backend document-store collaborator.

use crate::error::Result;
use crate::wire::{
    DbMeta, DbTableName, DocCondition, Documents, ResponseStatus, SearchRequest, SearchResponse,
    TableDetail, TableStatus,
};

/// Backend vector-search engine the gateway marshals for. The store is the
/// sole source of truth for table existence and query execution. All calls
/// are unary; implementations bound every call with a timeout and surface
/// elapsed deadlines as [`Error::Timeout`](crate::Error::Timeout).
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    async fn create_table(&self, meta: DbMeta) -> Result<ResponseStatus>;
    async fn check_table(&self, name: DbTableName) -> Result<TableStatus>;
    async fn add_or_update(&self, docs: Documents) -> Result<ResponseStatus>;
    async fn get(&self, condition: DocCondition) -> Result<Documents>;
    async fn delete(&self, condition: DocCondition) -> Result<ResponseStatus>;
    async fn search(&self, request: SearchRequest) -> Result<SearchResponse>;
    async fn query_table_detail(&self, name: DbTableName) -> Result<TableDetail>;
}
