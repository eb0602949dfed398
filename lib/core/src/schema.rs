//! Per-table schemas and the process-wide schema cache.

use std::collections::HashMap;
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;

use crate::wire::{DbMeta, FieldType};

/// Field-name to field-type mapping for one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSchema {
    fields: HashMap<String, FieldType>,
}

impl TableSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a schema from the table metadata the store reports for
    /// `table` (CheckTable answers carry the whole database).
    pub fn from_db_meta(meta: &DbMeta, table: &str) -> Option<Self> {
        let table_meta = meta.tables_meta.iter().find(|t| t.name == table)?;
        let fields = table_meta
            .fields_meta
            .iter()
            .map(|f| (f.name.clone(), f.field_type()))
            .collect();
        Some(Self { fields })
    }

    pub fn insert(&mut self, name: impl Into<String>, field_type: FieldType) {
        self.fields.insert(name.into(), field_type);
    }

    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.fields.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldType)> {
        self.fields.iter()
    }

    /// Default pack set for searches: every non-vector field.
    pub fn non_vector_fields(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|(_, t)| **t != FieldType::Vector)
            .map(|(name, _)| name.clone())
            .collect()
    }
}

/// Process-wide cache of table schemas, keyed `"{db}/{table}"`.
///
/// Populated on demand and never evicted; every concurrent request reads
/// it, and installs happen under the write lock so a reader never observes
/// a partially built schema.
#[derive(Debug, Default)]
pub struct SchemaCache {
    tables: RwLock<AHashMap<String, Arc<TableSchema>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(db: &str, table: &str) -> String {
        format!("{}/{}", db, table)
    }

    pub fn lookup(&self, db: &str, table: &str) -> Option<Arc<TableSchema>> {
        self.tables.read().get(&Self::key(db, table)).cloned()
    }

    /// Install a schema for a table, fixing it for the rest of the process
    /// lifetime. Returns the shared handle.
    pub fn install(&self, db: &str, table: &str, schema: TableSchema) -> Arc<TableSchema> {
        let schema = Arc::new(schema);
        self.tables
            .write()
            .insert(Self::key(db, table), schema.clone());
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{FieldMeta, TableMeta};

    fn sample_meta() -> DbMeta {
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

    #[test]
    fn schema_from_db_meta_picks_the_named_table() {
        let schema = TableSchema::from_db_meta(&sample_meta(), "users").unwrap();
        assert_eq!(schema.field_type("age"), Some(FieldType::Long));
        assert_eq!(schema.field_type("vec"), Some(FieldType::Vector));
        assert!(TableSchema::from_db_meta(&sample_meta(), "absent").is_none());
    }

    #[test]
    fn non_vector_fields_skip_vectors() {
        let schema = TableSchema::from_db_meta(&sample_meta(), "users").unwrap();
        let mut packed = schema.non_vector_fields();
        packed.sort();
        assert_eq!(packed, vec!["_id".to_string(), "age".to_string()]);
    }

    #[test]
    fn cache_lookup_and_install() {
        let cache = SchemaCache::new();
        assert!(cache.lookup("db", "t").is_none());

        let mut schema = TableSchema::new();
        schema.insert("_id", FieldType::String);
        cache.install("db", "t", schema);

        let cached = cache.lookup("db", "t").unwrap();
        assert_eq!(cached.field_type("_id"), Some(FieldType::String));
        // Keys are db-scoped.
        assert!(cache.lookup("other", "t").is_none());
    }
}
