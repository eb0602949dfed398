//! Unary gRPC client for the backend document store.
//!
//! Written in the shape tonic-build emits so the wire behavior matches a
//! generated client exactly; the message types live in `vexgate_core::wire`.

use tonic::codegen::*;
use vexgate_core::wire::{
    DbMeta, DbTableName, DocCondition, Documents, ResponseStatus, SearchRequest, SearchResponse,
    TableDetail, TableStatus,
};

#[derive(Debug, Clone)]
pub struct DocStoreClient<T> {
    inner: tonic::client::Grpc<T>,
}

impl DocStoreClient<tonic::transport::Channel> {
    pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
    where
        D: TryInto<tonic::transport::Endpoint>,
        D::Error: Into<StdError>,
    {
        let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
        Ok(Self::new(conn))
    }
}

impl<T> DocStoreClient<T>
where
    T: tonic::client::GrpcService<tonic::body::BoxBody>,
    T::Error: Into<StdError>,
    T::ResponseBody: Body<Data = Bytes> + Send + 'static,
    <T::ResponseBody as Body>::Error: Into<StdError> + Send,
{
    pub fn new(inner: T) -> Self {
        let inner = tonic::client::Grpc::new(inner);
        Self { inner }
    }

    async fn ready(&mut self) -> Result<(), tonic::Status> {
        self.inner.ready().await.map_err(|e| {
            tonic::Status::new(
                tonic::Code::Unknown,
                format!("Service was not ready: {}", e.into()),
            )
        })
    }

    pub async fn create(
        &mut self,
        request: impl tonic::IntoRequest<DbMeta>,
    ) -> Result<tonic::Response<ResponseStatus>, tonic::Status> {
        self.ready().await?;
        let codec = tonic::codec::ProstCodec::default();
        let path = http::uri::PathAndQuery::from_static("/docstore.DocStore/Create");
        let mut req = request.into_request();
        req.extensions_mut()
            .insert(GrpcMethod::new("docstore.DocStore", "Create"));
        self.inner.unary(req, path, codec).await
    }

    pub async fn check_table(
        &mut self,
        request: impl tonic::IntoRequest<DbTableName>,
    ) -> Result<tonic::Response<TableStatus>, tonic::Status> {
        self.ready().await?;
        let codec = tonic::codec::ProstCodec::default();
        let path = http::uri::PathAndQuery::from_static("/docstore.DocStore/CheckTable");
        let mut req = request.into_request();
        req.extensions_mut()
            .insert(GrpcMethod::new("docstore.DocStore", "CheckTable"));
        self.inner.unary(req, path, codec).await
    }

    pub async fn add_or_update(
        &mut self,
        request: impl tonic::IntoRequest<Documents>,
    ) -> Result<tonic::Response<ResponseStatus>, tonic::Status> {
        self.ready().await?;
        let codec = tonic::codec::ProstCodec::default();
        let path = http::uri::PathAndQuery::from_static("/docstore.DocStore/AddOrUpdate");
        let mut req = request.into_request();
        req.extensions_mut()
            .insert(GrpcMethod::new("docstore.DocStore", "AddOrUpdate"));
        self.inner.unary(req, path, codec).await
    }

    pub async fn get(
        &mut self,
        request: impl tonic::IntoRequest<DocCondition>,
    ) -> Result<tonic::Response<Documents>, tonic::Status> {
        self.ready().await?;
        let codec = tonic::codec::ProstCodec::default();
        let path = http::uri::PathAndQuery::from_static("/docstore.DocStore/Get");
        let mut req = request.into_request();
        req.extensions_mut()
            .insert(GrpcMethod::new("docstore.DocStore", "Get"));
        self.inner.unary(req, path, codec).await
    }

    pub async fn delete(
        &mut self,
        request: impl tonic::IntoRequest<DocCondition>,
    ) -> Result<tonic::Response<ResponseStatus>, tonic::Status> {
        self.ready().await?;
        let codec = tonic::codec::ProstCodec::default();
        let path = http::uri::PathAndQuery::from_static("/docstore.DocStore/Delete");
        let mut req = request.into_request();
        req.extensions_mut()
            .insert(GrpcMethod::new("docstore.DocStore", "Delete"));
        self.inner.unary(req, path, codec).await
    }

    pub async fn search(
        &mut self,
        request: impl tonic::IntoRequest<SearchRequest>,
    ) -> Result<tonic::Response<SearchResponse>, tonic::Status> {
        self.ready().await?;
        let codec = tonic::codec::ProstCodec::default();
        let path = http::uri::PathAndQuery::from_static("/docstore.DocStore/Search");
        let mut req = request.into_request();
        req.extensions_mut()
            .insert(GrpcMethod::new("docstore.DocStore", "Search"));
        self.inner.unary(req, path, codec).await
    }

    pub async fn query_table_detail(
        &mut self,
        request: impl tonic::IntoRequest<DbTableName>,
    ) -> Result<tonic::Response<TableDetail>, tonic::Status> {
        self.ready().await?;
        let codec = tonic::codec::ProstCodec::default();
        let path = http::uri::PathAndQuery::from_static("/docstore.DocStore/QueryTableDetail");
        let mut req = request.into_request();
        req.extensions_mut()
            .insert(GrpcMethod::new("docstore.DocStore", "QueryTableDetail"));
        self.inner.unary(req, path, codec).await
    }
}
