//! Typed wire messages exchanged with the backend document store.
//!
//! These are the prost messages the store's gRPC surface speaks. They are
//! written out with derive attributes rather than generated from a .proto at
//! build time, so the workspace compiles without a protobuf toolchain; the
//! field numbering is the contract and must not be reshuffled.

/// Field type of a table column. Closed set; `Vector` fields carry an
/// associated dimension in their [`VectorMeta`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum FieldType {
    Int = 0,
    Long = 1,
    Float = 2,
    Double = 3,
    String = 4,
    MultiString = 5,
    Vector = 6,
    Keyword = 7,
}

impl FieldType {
    /// Lower-case name used on the JSON surface ("int", "multi_string", ...).
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Int => "int",
            FieldType::Long => "long",
            FieldType::Float => "float",
            FieldType::Double => "double",
            FieldType::String => "string",
            FieldType::MultiString => "multi_string",
            FieldType::Vector => "vector",
            FieldType::Keyword => "keyword",
        }
    }

    /// Inverse of [`type_name`](Self::type_name).
    pub fn from_type_name(name: &str) -> Option<FieldType> {
        match name {
            "int" => Some(FieldType::Int),
            "long" => Some(FieldType::Long),
            "float" => Some(FieldType::Float),
            "double" => Some(FieldType::Double),
            "string" => Some(FieldType::String),
            "multi_string" => Some(FieldType::MultiString),
            "vector" => Some(FieldType::Vector),
            "keyword" => Some(FieldType::Keyword),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ResponseCode {
    Ok = 0,
    InputParameterError = 1,
    TableExist = 2,
    InternalError = 3,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResponseStatus {
    #[prost(int32, tag = "1")]
    pub code: i32,
    #[prost(string, tag = "2")]
    pub output_info: String,
}

impl ResponseStatus {
    pub fn code(&self) -> ResponseCode {
        ResponseCode::try_from(self.code).unwrap_or(ResponseCode::InternalError)
    }
}

/// A single typed field value. `value` holds the fixed-width encoding for
/// numeric types, the raw bytes for strings and the concatenated f32 bit
/// patterns for vectors; multi-string fields use `mul_str_value` instead.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Field {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(enumeration = "FieldType", tag = "2")]
    pub r#type: i32,
    #[prost(bytes = "vec", tag = "3")]
    pub value: Vec<u8>,
    #[prost(string, repeated, tag = "4")]
    pub mul_str_value: Vec<String>,
}

impl Field {
    pub fn field_type(&self) -> FieldType {
        FieldType::try_from(self.r#type).unwrap_or(FieldType::Int)
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Document {
    #[prost(bytes = "vec", tag = "1")]
    pub id: Vec<u8>,
    #[prost(message, repeated, tag = "2")]
    pub fields: Vec<Field>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Documents {
    #[prost(string, tag = "1")]
    pub db_name: String,
    #[prost(string, tag = "2")]
    pub table_name: String,
    #[prost(message, repeated, tag = "3")]
    pub docs: Vec<Document>,
}

/// Index/storage parameters for a vector column.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VectorMeta {
    #[prost(enumeration = "FieldType", tag = "1")]
    pub data_type: i32,
    #[prost(int32, tag = "2")]
    pub dimension: i32,
    #[prost(bool, tag = "3")]
    pub is_normalization: bool,
    #[prost(string, tag = "4")]
    pub store_type: String,
    #[prost(string, tag = "5")]
    pub store_param: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FieldMeta {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(enumeration = "FieldType", tag = "2")]
    pub r#type: i32,
    #[prost(string, optional, tag = "3")]
    pub desc: Option<String>,
    #[prost(bool, tag = "4")]
    pub is_index: bool,
    #[prost(bool, tag = "5")]
    pub is_store: bool,
    #[prost(message, optional, tag = "6")]
    pub vec_meta: Option<VectorMeta>,
    #[prost(string, optional, tag = "7")]
    pub embedding_model: Option<String>,
    #[prost(string, optional, tag = "8")]
    pub words_tokenizer: Option<String>,
}

impl FieldMeta {
    pub fn field_type(&self) -> FieldType {
        FieldType::try_from(self.r#type).unwrap_or(FieldType::Int)
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TableMeta {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, optional, tag = "2")]
    pub desc: Option<String>,
    #[prost(message, repeated, tag = "3")]
    pub fields_meta: Vec<FieldMeta>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DbMeta {
    #[prost(string, tag = "1")]
    pub db_name: String,
    #[prost(message, repeated, tag = "2")]
    pub tables_meta: Vec<TableMeta>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DbTableName {
    #[prost(string, tag = "1")]
    pub db_name: String,
    #[prost(string, tag = "2")]
    pub table_name: String,
}

/// Answer to CheckTable. With an empty request it doubles as a catalog
/// listing: `db_names` carries every database the store knows about.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TableStatus {
    #[prost(bool, tag = "1")]
    pub is_existed: bool,
    #[prost(string, repeated, tag = "2")]
    pub db_names: Vec<String>,
    #[prost(message, optional, tag = "3")]
    pub exist_table: Option<DbMeta>,
}

/// Numeric range predicate. Both bounds are always populated; unset sides
/// keep the open-ended sentinel encoding (see `query::range_filters_from`).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RangeFilter {
    #[prost(string, tag = "1")]
    pub field_name: String,
    #[prost(bytes = "vec", tag = "2")]
    pub lower_value: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub upper_value: Vec<u8>,
    #[prost(bool, tag = "4")]
    pub include_lower: bool,
    #[prost(bool, tag = "5")]
    pub include_upper: bool,
}

/// Equality predicate on a string field. `is_union` selects OR (true) or
/// AND (false) combination with sibling terms.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TermFilter {
    #[prost(string, tag = "1")]
    pub field_name: String,
    #[prost(string, tag = "2")]
    pub value: String,
    #[prost(bool, tag = "3")]
    pub is_union: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VectorQuery {
    #[prost(string, tag = "1")]
    pub field_name: String,
    #[prost(bytes = "vec", tag = "2")]
    pub value: Vec<u8>,
    #[prost(float, tag = "3")]
    pub min_score: f32,
    #[prost(float, tag = "4")]
    pub max_score: f32,
    #[prost(float, tag = "5")]
    pub boost: f32,
    #[prost(bool, tag = "6")]
    pub is_boost: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchRequest {
    #[prost(string, tag = "1")]
    pub db_name: String,
    #[prost(string, tag = "2")]
    pub table_name: String,
    #[prost(message, repeated, tag = "3")]
    pub vec_queries: Vec<VectorQuery>,
    #[prost(message, repeated, tag = "4")]
    pub range_filters: Vec<RangeFilter>,
    #[prost(message, repeated, tag = "5")]
    pub term_filters: Vec<TermFilter>,
    #[prost(int32, tag = "6")]
    pub topn: i32,
    #[prost(string, tag = "7")]
    pub retrieval_params: String,
    #[prost(bool, tag = "8")]
    pub brute_force_search: bool,
    #[prost(bool, tag = "9")]
    pub is_l2: bool,
    #[prost(string, repeated, tag = "10")]
    pub pack_fields: Vec<String>,
    #[prost(bool, tag = "11")]
    pub is_pack_all_fields: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResultItem {
    #[prost(float, tag = "1")]
    pub score: f32,
    #[prost(message, repeated, tag = "2")]
    pub fields: Vec<Field>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchResult {
    #[prost(int32, tag = "1")]
    pub total: i32,
    #[prost(string, tag = "2")]
    pub msg: String,
    #[prost(message, repeated, tag = "3")]
    pub result_items: Vec<ResultItem>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchResponse {
    #[prost(string, tag = "1")]
    pub db_name: String,
    #[prost(string, tag = "2")]
    pub table_name: String,
    #[prost(message, repeated, tag = "3")]
    pub results: Vec<SearchResult>,
}

/// Selection condition for Get/Delete. When `ids` is non-empty the filters
/// are ignored by the store, so the assembler clears them up front.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DocCondition {
    #[prost(string, tag = "1")]
    pub db_name: String,
    #[prost(string, tag = "2")]
    pub table_name: String,
    #[prost(bytes = "vec", repeated, tag = "3")]
    pub ids: Vec<Vec<u8>>,
    #[prost(message, repeated, tag = "4")]
    pub range_filters: Vec<RangeFilter>,
    #[prost(message, repeated, tag = "5")]
    pub term_filters: Vec<TermFilter>,
    #[prost(int32, tag = "6")]
    pub limit: i32,
    #[prost(bool, tag = "7")]
    pub include_all_fields: bool,
    #[prost(string, repeated, tag = "8")]
    pub pack_fields: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TableDetail {
    #[prost(bool, tag = "1")]
    pub query_status: bool,
    #[prost(int64, tag = "2")]
    pub current_valid_docs: i64,
    #[prost(int64, tag = "3")]
    pub total_docs: i64,
    #[prost(int64, tag = "4")]
    pub deleted_docs: i64,
}
