//! Document assembly: generic key-value input to typed wire documents.

use std::collections::HashMap;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::encode;
use crate::error::{Error, Result};
use crate::infer::InferredValue;
use crate::schema::TableSchema;
use crate::wire::{DbMeta, Document, Field, FieldMeta, FieldType, TableMeta, VectorMeta};

pub const PRIMARY_KEY: &str = "_id";

const VECTOR_STORE_TYPE: &str = "Mmap";
const VECTOR_STORE_PARAM: &str = "{\"cache_size\" : 2000}";

/// A typed document plus, for tables the store has not seen yet, the
/// schema inferred from it.
#[derive(Debug, Clone)]
pub struct AssembledDocument {
    pub document: Document,
    pub inferred: Option<InferredTable>,
}

/// Schema inferred from the first document written to an unseen table.
/// Vector fields record the dimension observed at first write, which the
/// creation request fixes for the table.
#[derive(Debug, Clone)]
pub struct InferredTable {
    pub schema: TableSchema,
    pub vec_metas: HashMap<String, VectorMeta>,
}

/// Build a typed document from a generic JSON object.
///
/// With `schema` present the table already exists and every field is
/// reconciled against it; otherwise field types are accumulated into an
/// [`InferredTable`] for implicit creation.
pub fn assemble_document(
    doc: &Map<String, Value>,
    schema: Option<&TableSchema>,
) -> Result<AssembledDocument> {
    let mut document = Document::default();
    let mut inferred = schema.is_none().then(|| InferredTable {
        schema: TableSchema::new(),
        vec_metas: HashMap::new(),
    });

    let mut has_primary_key = false;
    for (name, value) in doc {
        if name == PRIMARY_KEY {
            has_primary_key = true;
            let field = primary_key_field(value)?;
            document.id = field.value.clone();
            if let Some(inferred) = inferred.as_mut() {
                inferred.schema.insert(PRIMARY_KEY, field.field_type());
            }
            document.fields.push(field);
            continue;
        }

        let classified = InferredValue::classify(value)
            .map_err(|e| Error::InvalidInput(format!("field '{}': {}", name, e)))?;
        let field = match schema {
            Some(schema) => {
                let recorded = schema.field_type(name).ok_or_else(|| {
                    Error::InvalidInput(format!("field '{}' is not in the table schema", name))
                })?;
                classified.into_field(name, Some(recorded))?
            }
            None => {
                let dimension = classified.dimension();
                let field = classified.into_field(name, None)?;
                if let Some(inferred) = inferred.as_mut() {
                    inferred.schema.insert(name.clone(), field.field_type());
                    if let Some(dim) = dimension {
                        inferred.vec_metas.insert(name.clone(), vector_meta(dim));
                    }
                }
                field
            }
        };
        document.fields.push(field);
    }

    if !has_primary_key {
        let generated = Uuid::new_v4().to_string();
        let field = Field {
            name: PRIMARY_KEY.to_string(),
            r#type: FieldType::String as i32,
            value: generated.into_bytes(),
            mul_str_value: vec![],
        };
        document.id = field.value.clone();
        if let Some(inferred) = inferred.as_mut() {
            inferred.schema.insert(PRIMARY_KEY, FieldType::String);
        }
        document.fields.push(field);
    }

    Ok(AssembledDocument {
        document,
        inferred,
    })
}

/// The primary key is either a string or a non-decimal numeric, which
/// becomes the document's 8-byte LONG identity.
fn primary_key_field(value: &Value) -> Result<Field> {
    match value {
        Value::String(s) => Ok(Field {
            name: PRIMARY_KEY.to_string(),
            r#type: FieldType::String as i32,
            value: s.clone().into_bytes(),
            mul_str_value: vec![],
        }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(long_primary_key(i));
            }
            let f = n
                .as_f64()
                .ok_or_else(|| Error::PrimaryKey("unrepresentable number".into()))?;
            if encode::is_decimal(f) {
                Err(Error::PrimaryKey("primary key must not be decimal".into()))
            } else {
                Ok(long_primary_key(f as i64))
            }
        }
        _ => Err(Error::PrimaryKey(
            "primary key must be a string or an integer".into(),
        )),
    }
}

fn long_primary_key(id: i64) -> Field {
    Field {
        name: PRIMARY_KEY.to_string(),
        r#type: FieldType::Long as i32,
        value: encode::int64_bytes(id),
        mul_str_value: vec![],
    }
}

fn vector_meta(dimension: usize) -> VectorMeta {
    VectorMeta {
        data_type: FieldType::Float as i32,
        dimension: dimension as i32,
        is_normalization: false,
        store_type: VECTOR_STORE_TYPE.to_string(),
        store_param: VECTOR_STORE_PARAM.to_string(),
    }
}

/// Build the implicit CreateTable request from a first document. Every
/// field is stored; everything but strings is indexed; vector fields carry
/// the dimension observed in the document.
pub fn creation_request(db: &str, table: &str, assembled: &AssembledDocument) -> Result<DbMeta> {
    let inferred = assembled
        .inferred
        .as_ref()
        .ok_or_else(|| Error::InvalidInput("document was assembled against an existing table".into()))?;

    let fields_meta = assembled
        .document
        .fields
        .iter()
        .map(|field| {
            let field_type = field.field_type();
            FieldMeta {
                name: field.name.clone(),
                r#type: field.r#type,
                desc: None,
                is_index: field_type != FieldType::String,
                is_store: true,
                vec_meta: inferred.vec_metas.get(&field.name).cloned(),
                embedding_model: None,
                words_tokenizer: None,
            }
        })
        .collect();

    Ok(DbMeta {
        db_name: db.to_string(),
        tables_meta: vec![TableMeta {
            name: table.to_string(),
            desc: None,
            fields_meta,
        }],
    })
}

/// Parsed explicit field declaration from the `create` surface.
pub struct DeclaredField {
    pub meta: FieldMeta,
    pub is_primary_key: bool,
    pub is_vector: bool,
}

/// Parse one field declaration of an explicit table-creation request.
/// Recognized keys: `name`, `type`, `desc`, `index`, `store`, `dimension`,
/// `normalization`, `embedding_model`, `words_tokenizer`; anything else is
/// ignored with a diagnostic.
pub fn parse_field_meta(spec: &Map<String, Value>) -> Result<DeclaredField> {
    let mut meta = FieldMeta {
        is_store: true,
        ..Default::default()
    };
    let mut index_override = None;

    for (key, value) in spec {
        match key.as_str() {
            "name" => {
                meta.name = value
                    .as_str()
                    .ok_or_else(|| Error::InvalidInput("field name must be a string".into()))?
                    .to_string();
            }
            "type" => {
                let type_name = value
                    .as_str()
                    .ok_or_else(|| Error::InvalidInput("field type must be a string".into()))?;
                let field_type = FieldType::from_type_name(type_name).ok_or_else(|| {
                    Error::InvalidInput(format!("unknown field type '{}'", type_name))
                })?;
                meta.r#type = field_type as i32;
            }
            "desc" => {
                let desc = value
                    .as_str()
                    .ok_or_else(|| Error::InvalidInput("field desc must be a string".into()))?;
                meta.desc = Some(desc.to_string());
            }
            "index" => {
                index_override = Some(value.as_bool().ok_or_else(|| {
                    Error::InvalidInput("field index must be a boolean".into())
                })?);
            }
            "store" => {
                meta.is_store = value
                    .as_bool()
                    .ok_or_else(|| Error::InvalidInput("field store must be a boolean".into()))?;
            }
            "dimension" => {
                let dim = integral_value(value).ok_or_else(|| {
                    Error::InvalidInput("vector dimension must be an integer".into())
                })?;
                if dim <= 0 {
                    return Err(Error::InvalidInput(
                        "vector dimension must be positive".into(),
                    ));
                }
                let vec_meta = meta.vec_meta.get_or_insert_with(VectorMeta::default);
                vec_meta.dimension = dim as i32;
                vec_meta.data_type = FieldType::Float as i32;
            }
            "normalization" => {
                let normalization = value.as_bool().ok_or_else(|| {
                    Error::InvalidInput("vector normalization must be a boolean".into())
                })?;
                meta.vec_meta.get_or_insert_with(VectorMeta::default).is_normalization =
                    normalization;
            }
            "embedding_model" => {
                let model = value.as_str().ok_or_else(|| {
                    Error::InvalidInput("embedding_model must be a string".into())
                })?;
                meta.embedding_model = Some(model.to_string());
            }
            "words_tokenizer" => {
                let tokenizer = value.as_str().ok_or_else(|| {
                    Error::InvalidInput("words_tokenizer must be a string".into())
                })?;
                meta.words_tokenizer = Some(tokenizer.to_string());
            }
            other => {
                tracing::warn!(key = other, "ignoring unrecognized field key");
            }
        }
    }

    if meta.name.is_empty() {
        return Err(Error::InvalidInput("field declaration needs a name".into()));
    }
    let field_type = meta.field_type();
    let is_vector = field_type == FieldType::Vector;
    if is_vector {
        match meta.vec_meta.as_mut() {
            Some(vec_meta) if vec_meta.dimension > 0 => {
                if vec_meta.store_type.is_empty() {
                    vec_meta.store_type = VECTOR_STORE_TYPE.to_string();
                    vec_meta.store_param = VECTOR_STORE_PARAM.to_string();
                }
            }
            _ => {
                return Err(Error::InvalidInput(format!(
                    "vector field '{}' needs a positive dimension",
                    meta.name
                )))
            }
        }
    }
    meta.is_index = index_override.unwrap_or(field_type != FieldType::String);

    Ok(DeclaredField {
        is_primary_key: meta.name == PRIMARY_KEY,
        is_vector,
        meta,
    })
}

/// Field meta for the `_id` column appended when an explicit creation
/// request declares no primary key.
pub fn default_primary_key_meta() -> FieldMeta {
    FieldMeta {
        name: PRIMARY_KEY.to_string(),
        r#type: FieldType::String as i32,
        desc: None,
        is_index: true,
        is_store: true,
        vec_meta: None,
        embedding_model: None,
        words_tokenizer: None,
    }
}

fn integral_value(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    let f = n.as_f64()?;
    (!encode::is_decimal(f)).then_some(f as i64)
}
