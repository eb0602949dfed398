//! Projection of typed store results back to generic JSON values.
//!
//! The store returns numeric field values as decimal text; a field that
//! fails to parse is reported as a field-scoped decode error on its
//! document instead of failing the whole response.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::schema::TableSchema;
use crate::wire::{Document, Documents, Field, FieldType, SearchResponse, TableDetail};

/// Key under which per-field decode failures are reported on a document.
pub const DECODE_ERRORS_KEY: &str = "_decode_errors";

/// Render one typed field, or the reason it could not be decoded.
pub fn project_field(field: &Field) -> std::result::Result<Value, String> {
    match field.field_type() {
        FieldType::String | FieldType::Keyword => {
            Ok(Value::String(String::from_utf8_lossy(&field.value).into_owned()))
        }
        FieldType::Int => {
            let text = String::from_utf8_lossy(&field.value);
            let parsed: i32 = text
                .parse()
                .map_err(|_| format!("'{}' is not a 32-bit integer", text))?;
            Ok(Value::from(parsed))
        }
        FieldType::Long => {
            let text = String::from_utf8_lossy(&field.value);
            let parsed: i64 = text
                .parse()
                .map_err(|_| format!("'{}' is not a 64-bit integer", text))?;
            Ok(Value::from(parsed))
        }
        FieldType::Float | FieldType::Double => {
            let text = String::from_utf8_lossy(&field.value);
            let parsed: f64 = text
                .parse()
                .map_err(|_| format!("'{}' is not a number", text))?;
            serde_json::Number::from_f64(parsed)
                .map(Value::Number)
                .ok_or_else(|| format!("'{}' is not a finite number", text))
        }
        FieldType::MultiString => Ok(Value::Array(
            field
                .mul_str_value
                .iter()
                .cloned()
                .map(Value::String)
                .collect(),
        )),
        // Vectors are not reconstructed; the raw value passes through.
        FieldType::Vector => {
            Ok(Value::String(String::from_utf8_lossy(&field.value).into_owned()))
        }
    }
}

fn project_fields(fields: &[Field]) -> Map<String, Value> {
    let mut object = Map::new();
    let mut errors = Map::new();
    for field in fields {
        match project_field(field) {
            Ok(value) => {
                object.insert(field.name.clone(), value);
            }
            Err(reason) => {
                errors.insert(field.name.clone(), Value::String(reason));
            }
        }
    }
    if !errors.is_empty() {
        object.insert(DECODE_ERRORS_KEY.to_string(), Value::Object(errors));
    }
    object
}

pub fn document_to_json(doc: &Document) -> Value {
    Value::Object(project_fields(&doc.fields))
}

pub fn documents_to_json(docs: &Documents) -> Value {
    json!({
        "Db": docs.db_name,
        "Table": docs.table_name,
        "Docs": docs.docs.iter().map(document_to_json).collect::<Vec<_>>(),
    })
}

pub fn search_response_to_json(response: &SearchResponse) -> Value {
    let mut results = Map::new();
    if let Some(result) = response.results.last() {
        results.insert("ResultSize".into(), Value::from(result.total));
        results.insert("Msg".into(), Value::String(result.msg.clone()));
        let items: Vec<Value> = result
            .result_items
            .iter()
            .map(|item| {
                let mut object = project_fields(&item.fields);
                object.insert("score".into(), Value::from(item.score));
                Value::Object(object)
            })
            .collect();
        results.insert("ResultItems".into(), Value::Array(items));
    }
    json!({
        "Db": response.db_name,
        "Table": response.table_name,
        "SearchResults": results,
    })
}

/// Table statistics surfaced by the `count` operation.
#[derive(Debug, Clone, Serialize)]
pub struct TableStats {
    #[serde(rename = "Db")]
    pub db: String,
    #[serde(rename = "Table")]
    pub table: String,
    #[serde(rename = "CurrentDocs")]
    pub current_docs: i64,
    #[serde(rename = "TotalDocs")]
    pub total_docs: i64,
    #[serde(rename = "DeletedDocs")]
    pub deleted_docs: i64,
}

pub fn table_stats(db: &str, table: &str, detail: &TableDetail) -> TableStats {
    TableStats {
        db: db.to_string(),
        table: table.to_string(),
        current_docs: detail.current_valid_docs,
        total_docs: detail.total_docs,
        deleted_docs: detail.deleted_docs,
    }
}

/// The `list` fields projection: field name to type name.
pub fn schema_type_names(schema: &TableSchema) -> Value {
    let mut object = Map::new();
    for (name, field_type) in schema.iter() {
        object.insert(name.clone(), Value::String(field_type.type_name().into()));
    }
    Value::Object(object)
}
