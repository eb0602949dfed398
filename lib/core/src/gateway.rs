//! The marshaling gateway: schema negotiation plus the seven operations
//! the JSON surface exposes.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::document::{
    assemble_document, creation_request, default_primary_key_meta, parse_field_meta,
};
use crate::error::{Error, Result};
use crate::project;
use crate::query;
use crate::schema::{SchemaCache, TableSchema};
use crate::store::DocumentStore;
use crate::wire::{
    DbMeta, DbTableName, Documents, ResponseCode, ResponseStatus, TableMeta,
};

/// Gateway over a [`DocumentStore`]. Holds the process-wide schema cache;
/// everything else is built per request and discarded.
pub struct Gateway<S> {
    store: S,
    cache: SchemaCache,
}

impl<S: DocumentStore> Gateway<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: SchemaCache::new(),
        }
    }

    /// Cached schema for a table, fetching from the store on first touch.
    /// `None` means the table does not exist upstream yet; creation is
    /// deferred to the first document write. Nothing is installed when the
    /// backend call fails.
    async fn ensure_schema(&self, db: &str, table: &str) -> Result<Option<Arc<TableSchema>>> {
        if let Some(schema) = self.cache.lookup(db, table) {
            return Ok(Some(schema));
        }
        let status = self
            .store
            .check_table(DbTableName {
                db_name: db.to_string(),
                table_name: table.to_string(),
            })
            .await?;
        if !status.is_existed {
            return Ok(None);
        }
        let Some(meta) = status.exist_table else {
            return Ok(None);
        };
        match TableSchema::from_db_meta(&meta, table) {
            Some(schema) => Ok(Some(self.cache.install(db, table, schema))),
            None => Ok(None),
        }
    }

    /// Explicit table creation from a declared field list. A vector field
    /// is mandatory; a STRING `_id` is appended when the caller declares
    /// no primary key.
    pub async fn create(
        &self,
        db: &str,
        table: &str,
        body: &Map<String, Value>,
    ) -> Result<ResponseStatus> {
        let mut table_meta = TableMeta {
            name: table.to_string(),
            desc: None,
            fields_meta: Vec::new(),
        };
        if let Some(desc) = body.get("desc") {
            table_meta.desc = Some(
                desc.as_str()
                    .ok_or_else(|| Error::InvalidInput("table desc must be a string".into()))?
                    .to_string(),
            );
        }

        let fields = body
            .get("fields")
            .ok_or_else(|| Error::InvalidInput("fields must be specified".into()))?;
        let mut has_primary_key = false;
        let mut has_vector_field = false;
        let mut declare = |spec: &Value| -> Result<()> {
            let spec = spec
                .as_object()
                .ok_or_else(|| Error::InvalidInput("field declarations must be objects".into()))?;
            let declared = parse_field_meta(spec)?;
            has_primary_key |= declared.is_primary_key;
            has_vector_field |= declared.is_vector;
            table_meta.fields_meta.push(declared.meta);
            Ok(())
        };
        match fields {
            Value::Array(items) => {
                for item in items {
                    declare(item)?;
                }
            }
            Value::Object(_) => declare(fields)?,
            _ => return Err(Error::InvalidInput("fields format error".into())),
        }

        if !has_vector_field {
            return Err(Error::InvalidInput(
                "table must declare a vector field".into(),
            ));
        }
        if !has_primary_key {
            table_meta.fields_meta.push(default_primary_key_meta());
        }

        self.store
            .create_table(DbMeta {
                db_name: db.to_string(),
                tables_meta: vec![table_meta],
            })
            .await
    }

    /// Add or update documents. `docs` is a single object or an array of
    /// objects; on an unseen table the first document's inferred schema
    /// creates the table and is installed in the cache. In the array form
    /// a malformed document is skipped with a log line; creation failure
    /// aborts the whole request.
    pub async fn add(&self, db: &str, table: &str, docs: &Value) -> Result<usize> {
        let mut schema = self.ensure_schema(db, table).await?;

        let (batch, single) = match docs {
            Value::Array(items) => (items.iter().collect::<Vec<_>>(), false),
            Value::Object(_) => (vec![docs], true),
            _ => return Err(Error::InvalidInput("docs format error".into())),
        };

        let mut documents = Vec::with_capacity(batch.len());
        for doc in batch {
            let Some(object) = doc.as_object() else {
                if single {
                    return Err(Error::InvalidInput("docs format error".into()));
                }
                warn!("document is not an object, skipping");
                continue;
            };
            match assemble_document(object, schema.as_deref()) {
                Ok(assembled) => {
                    if schema.is_none() {
                        schema = Some(self.create_for_first_write(db, table, &assembled).await?);
                    }
                    documents.push(assembled.document);
                }
                Err(e) if single => return Err(e),
                Err(e) => warn!(error = %e, "skipping malformed document"),
            }
        }

        if documents.is_empty() {
            return Err(Error::InvalidInput("no valid documents to add".into()));
        }
        let added = documents.len();
        self.store
            .add_or_update(Documents {
                db_name: db.to_string(),
                table_name: table.to_string(),
                docs: documents,
            })
            .await?;
        Ok(added)
    }

    /// Implicit creation on first write. The store treats a repeated
    /// creation as "table exists", so racing requests converge on the same
    /// schema; the cache is only written after the store accepted it.
    async fn create_for_first_write(
        &self,
        db: &str,
        table: &str,
        assembled: &crate::document::AssembledDocument,
    ) -> Result<Arc<TableSchema>> {
        let meta = creation_request(db, table, assembled)?;
        let inferred = assembled
            .inferred
            .as_ref()
            .ok_or_else(|| Error::InvalidInput("first write carries no inferred schema".into()))?;
        let status = self
            .store
            .create_table(meta)
            .await
            .map_err(|e| Error::CreateTable(e.to_string()))?;
        match status.code() {
            ResponseCode::Ok | ResponseCode::TableExist => {}
            code => {
                return Err(Error::CreateTable(format!(
                    "store rejected creation ({:?}): {}",
                    code, status.output_info
                )))
            }
        }
        debug!(db, table, fields = inferred.schema.len(), "table created implicitly");
        Ok(self.cache.install(db, table, inferred.schema.clone()))
    }

    /// Vector search. The table must exist; the query is validated against
    /// its schema before the store is called.
    pub async fn search(&self, db: &str, table: &str, body: &Map<String, Value>) -> Result<Value> {
        let schema = self
            .ensure_schema(db, table)
            .await?
            .ok_or_else(|| Error::TableNotFound(format!("{}/{}", db, table)))?;
        let request = query::search_request_from(db, table, body, &schema)?;
        let response = self.store.search(request).await?;
        Ok(project::search_response_to_json(&response))
    }

    /// Fetch documents by ids or filters.
    pub async fn get(&self, db: &str, table: &str, body: &Map<String, Value>) -> Result<Value> {
        let condition = query::condition_from(db, table, body, true)?;
        let docs = self.store.get(condition).await?;
        Ok(project::documents_to_json(&docs))
    }

    /// Delete documents by ids or filters.
    pub async fn delete(
        &self,
        db: &str,
        table: &str,
        body: &Map<String, Value>,
    ) -> Result<ResponseStatus> {
        let condition = query::condition_from(db, table, body, false)?;
        self.store.delete(condition).await
    }

    /// Catalog listing. Empty `db` lists databases, empty `table` lists
    /// the db's tables, both present yields the table's field types
    /// (populating the cache on the way).
    pub async fn list(&self, db: &str, table: &str) -> Result<Value> {
        if db.is_empty() || table.is_empty() {
            let status = self
                .store
                .check_table(DbTableName {
                    db_name: db.to_string(),
                    table_name: table.to_string(),
                })
                .await?;
            if db.is_empty() {
                return Ok(json!({ "DBs": status.db_names }));
            }
            let tables: Vec<String> = status
                .exist_table
                .map(|meta| meta.tables_meta.into_iter().map(|t| t.name).collect())
                .unwrap_or_default();
            return Ok(json!({ "Db": db, "Tables": tables }));
        }

        match self.ensure_schema(db, table).await? {
            Some(schema) => Ok(json!({
                "Db": db,
                "Table": table,
                "Fields": project::schema_type_names(&schema),
            })),
            None => Ok(json!({ "Db": db, "Table": table })),
        }
    }

    /// Document counts for a table; `None` when the store has nothing to
    /// report.
    pub async fn count(&self, db: &str, table: &str) -> Result<Option<project::TableStats>> {
        let detail = self
            .store
            .query_table_detail(DbTableName {
                db_name: db.to_string(),
                table_name: table.to_string(),
            })
            .await?;
        if !detail.query_status {
            return Ok(None);
        }
        Ok(Some(project::table_stats(db, table, &detail)))
    }

    #[cfg(test)]
    pub(crate) fn cached_schema(&self, db: &str, table: &str) -> Option<Arc<TableSchema>> {
        self.cache.lookup(db, table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{FieldType, SearchResponse, TableDetail, TableStatus};
    use parking_lot::Mutex;
    use serde_json::json;

    #[derive(Default)]
    struct MockState {
        check_calls: usize,
        creates: Vec<DbMeta>,
        adds: Vec<Documents>,
    }

    #[derive(Default)]
    struct MockStore {
        existing: Option<DbMeta>,
        check_times_out: bool,
        create_fails: bool,
        state: Mutex<MockState>,
    }

    impl MockStore {
        fn with_table(meta: DbMeta) -> Self {
            Self {
                existing: Some(meta),
                ..Default::default()
            }
        }
    }

    impl DocumentStore for MockStore {
        async fn create_table(&self, meta: DbMeta) -> Result<ResponseStatus> {
            if self.create_fails {
                return Err(Error::Backend("create refused".into()));
            }
            self.state.lock().creates.push(meta);
            Ok(ResponseStatus::default())
        }

        async fn check_table(&self, _name: DbTableName) -> Result<TableStatus> {
            if self.check_times_out {
                return Err(Error::Timeout);
            }
            self.state.lock().check_calls += 1;
            Ok(TableStatus {
                is_existed: self.existing.is_some(),
                db_names: vec!["default".into()],
                exist_table: self.existing.clone(),
            })
        }

        async fn add_or_update(&self, docs: Documents) -> Result<ResponseStatus> {
            self.state.lock().adds.push(docs);
            Ok(ResponseStatus::default())
        }

        async fn get(&self, condition: DocCondition) -> Result<Documents> {
            Ok(Documents {
                db_name: condition.db_name,
                table_name: condition.table_name,
                docs: vec![],
            })
        }

        async fn delete(&self, _condition: DocCondition) -> Result<ResponseStatus> {
            Ok(ResponseStatus::default())
        }

        async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
            Ok(SearchResponse {
                db_name: request.db_name,
                table_name: request.table_name,
                results: vec![],
            })
        }

        async fn query_table_detail(&self, _name: DbTableName) -> Result<TableDetail> {
            Ok(TableDetail {
                query_status: true,
                current_valid_docs: 3,
                total_docs: 4,
                deleted_docs: 1,
            })
        }
    }

    use crate::wire::{DocCondition, FieldMeta, SearchRequest};

    fn users_meta() -> DbMeta {
        DbMeta {
            db_name: "default".into(),
            tables_meta: vec![TableMeta {
                name: "users".into(),
                desc: None,
                fields_meta: vec![
                    FieldMeta {
                        name: "_id".into(),
                        r#type: FieldType::String as i32,
                        ..Default::default()
                    },
                    FieldMeta {
                        name: "age".into(),
                        r#type: FieldType::Long as i32,
                        ..Default::default()
                    },
                    FieldMeta {
                        name: "vec".into(),
                        r#type: FieldType::Vector as i32,
                        ..Default::default()
                    },
                ],
            }],
        }
    }

    #[tokio::test]
    async fn first_write_creates_table_and_installs_schema() {
        let gateway = Gateway::new(MockStore::default());
        let docs = json!([{"_id": "u1", "age": 30, "vec": [0.1, 0.2, 0.3]}]);
        let added = gateway.add("default", "users", &docs).await.unwrap();
        assert_eq!(added, 1);

        let schema = gateway.cached_schema("default", "users").unwrap();
        assert_eq!(schema.field_type("_id"), Some(FieldType::String));
        assert_eq!(schema.field_type("age"), Some(FieldType::Int));
        assert_eq!(schema.field_type("vec"), Some(FieldType::Vector));

        let state = gateway.store.state.lock();
        assert_eq!(state.creates.len(), 1);
        assert_eq!(state.adds.len(), 1);
        let vec_meta = state.creates[0].tables_meta[0]
            .fields_meta
            .iter()
            .find(|f| f.name == "vec")
            .and_then(|f| f.vec_meta.as_ref())
            .unwrap();
        assert_eq!(vec_meta.dimension, 3);
    }

    #[tokio::test]
    async fn second_add_reuses_cache_without_checking() {
        let gateway = Gateway::new(MockStore::default());
        let docs = json!({"_id": "u1", "vec": [0.5]});
        gateway.add("default", "users", &docs).await.unwrap();
        gateway
            .add("default", "users", &json!({"_id": "u2", "vec": [0.7]}))
            .await
            .unwrap();

        let state = gateway.store.state.lock();
        assert_eq!(state.check_calls, 1);
        assert_eq!(state.creates.len(), 1);
    }

    #[tokio::test]
    async fn existing_table_schema_drives_promotion() {
        let gateway = Gateway::new(MockStore::with_table(users_meta()));
        let docs = json!({"_id": "u1", "age": 30});
        gateway.add("default", "users", &docs).await.unwrap();

        let state = gateway.store.state.lock();
        assert!(state.creates.is_empty());
        let age = state.adds[0].docs[0]
            .fields
            .iter()
            .find(|f| f.name == "age")
            .unwrap();
        assert_eq!(age.field_type(), FieldType::Long);
        assert_eq!(age.value.len(), 8);
    }

    #[tokio::test]
    async fn malformed_document_in_batch_is_skipped() {
        let gateway = Gateway::new(MockStore::with_table(users_meta()));
        let docs = json!([
            {"_id": "u1", "age": 30},
            {"_id": 1.5},
            {"_id": "u2", "age": 31}
        ]);
        let added = gateway.add("default", "users", &docs).await.unwrap();
        assert_eq!(added, 2);
    }

    #[tokio::test]
    async fn single_malformed_document_is_an_error() {
        let gateway = Gateway::new(MockStore::with_table(users_meta()));
        let err = gateway
            .add("default", "users", &json!({"_id": 1.5}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PrimaryKey(_)));
    }

    #[tokio::test]
    async fn creation_failure_aborts_the_request() {
        let store = MockStore {
            create_fails: true,
            ..Default::default()
        };
        let gateway = Gateway::new(store);
        let err = gateway
            .add("default", "users", &json!([{"vec": [0.1]}]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CreateTable(_)));
        assert!(gateway.cached_schema("default", "users").is_none());
    }

    #[tokio::test]
    async fn check_timeout_leaves_cache_untouched() {
        let store = MockStore {
            check_times_out: true,
            ..Default::default()
        };
        let gateway = Gateway::new(store);
        let err = gateway
            .add("default", "users", &json!({"vec": [0.1]}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout));
        assert!(gateway.cached_schema("default", "users").is_none());
    }

    #[tokio::test]
    async fn search_on_missing_table_is_rejected() {
        let gateway = Gateway::new(MockStore::default());
        let body = json!({"vector_query": {"vec": [0.1]}});
        let err = gateway
            .search("default", "users", body.as_object().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TableNotFound(_)));
    }

    #[tokio::test]
    async fn search_validates_against_fetched_schema() {
        let gateway = Gateway::new(MockStore::with_table(users_meta()));
        let body = json!({"vector_query": {"age": [0.1]}});
        let err = gateway
            .search("default", "users", body.as_object().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotVectorField(_)));

        let body = json!({"vector_query": {"vec": [0.1, 0.2]}});
        let value = gateway
            .search("default", "users", body.as_object().unwrap())
            .await
            .unwrap();
        assert_eq!(value["Table"], json!("users"));
    }

    #[tokio::test]
    async fn create_requires_a_vector_field() {
        let gateway = Gateway::new(MockStore::default());
        let body = json!({"fields": [{"name": "title", "type": "string"}]});
        let err = gateway
            .create("default", "docs", body.as_object().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let body = json!({"fields": [
            {"name": "title", "type": "string"},
            {"name": "emb", "type": "vector", "dimension": 4}
        ]});
        gateway
            .create("default", "docs", body.as_object().unwrap())
            .await
            .unwrap();
        let state = gateway.store.state.lock();
        let fields = &state.creates[0].tables_meta[0].fields_meta;
        // `_id` appended since no primary key was declared.
        assert!(fields.iter().any(|f| f.name == "_id"));
    }

    #[tokio::test]
    async fn list_and_count_project_store_answers() {
        let gateway = Gateway::new(MockStore::with_table(users_meta()));
        let listing = gateway.list("default", "users").await.unwrap();
        assert_eq!(listing["Fields"]["age"], json!("long"));

        let listing = gateway.list("", "").await.unwrap();
        assert_eq!(listing["DBs"], json!(["default"]));

        let stats = gateway.count("default", "users").await.unwrap().unwrap();
        assert_eq!(stats.current_docs, 3);
        assert_eq!(stats.deleted_docs, 1);
    }
}
