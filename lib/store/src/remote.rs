//! [`DocumentStore`] implementation backed by the remote engine.

use std::future::Future;
use std::time::Duration;

use tonic::transport::{Channel, Endpoint};
use tracing::warn;

use vexgate_core::wire::{
    DbMeta, DbTableName, DocCondition, Documents, ResponseStatus, SearchRequest, SearchResponse,
    TableDetail, TableStatus,
};
use vexgate_core::{DocumentStore, Error, Result};

use crate::client::DocStoreClient;

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(1);

/// Remote document store reached over gRPC. The channel connects lazily,
/// and every call runs under a bounded timeout; an elapsed deadline fails
/// the operation without touching any gateway state.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: DocStoreClient<Channel>,
    timeout: Duration,
}

impl RemoteStore {
    /// Build a store client for `addr` (e.g. `http://127.0.0.1:10000`).
    /// The connection is established on first use.
    pub fn connect_lazy(addr: &str) -> std::result::Result<Self, tonic::transport::Error> {
        let channel = Endpoint::from_shared(addr.to_string())?.connect_lazy();
        Ok(Self {
            client: DocStoreClient::new(channel),
            timeout: DEFAULT_CALL_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn call<F, R>(&self, call: F) -> Result<R>
    where
        F: Future<Output = std::result::Result<tonic::Response<R>, tonic::Status>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(response)) => Ok(response.into_inner()),
            Ok(Err(status)) => {
                warn!(code = ?status.code(), "store call failed");
                Err(Error::Backend(status.message().to_string()))
            }
            Err(_) => Err(Error::Timeout),
        }
    }
}

impl DocumentStore for RemoteStore {
    async fn create_table(&self, meta: DbMeta) -> Result<ResponseStatus> {
        let mut client = self.client.clone();
        self.call(async move { client.create(meta).await }).await
    }

    async fn check_table(&self, name: DbTableName) -> Result<TableStatus> {
        let mut client = self.client.clone();
        self.call(async move { client.check_table(name).await })
            .await
    }

    async fn add_or_update(&self, docs: Documents) -> Result<ResponseStatus> {
        let mut client = self.client.clone();
        self.call(async move { client.add_or_update(docs).await })
            .await
    }

    async fn get(&self, condition: DocCondition) -> Result<Documents> {
        let mut client = self.client.clone();
        self.call(async move { client.get(condition).await }).await
    }

    async fn delete(&self, condition: DocCondition) -> Result<ResponseStatus> {
        let mut client = self.client.clone();
        self.call(async move { client.delete(condition).await })
            .await
    }

    async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
        let mut client = self.client.clone();
        self.call(async move { client.search(request).await }).await
    }

    async fn query_table_detail(&self, name: DbTableName) -> Result<TableDetail> {
        let mut client = self.client.clone();
        self.call(async move { client.query_table_detail(name).await })
            .await
    }
}
