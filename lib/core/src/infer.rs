//! Ad-hoc type inference over the generic JSON value space.
//!
//! Inbound documents carry no declared schema; every scalar or array is
//! classified into exactly one [`FieldType`] and its wire encoding. The
//! classification is a closed tagged variant so downstream matches stay
//! exhaustive.

use serde_json::Value;

use crate::encode;
use crate::error::{Error, Result};
use crate::wire::{Field, FieldType};

/// A classified input value, not yet committed to a wire width.
///
/// Integral numerics carry the full 64-bit value; whether they encode as 4
/// or 8 bytes is decided during schema reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub enum InferredValue {
    Int(i64),
    Float(f32),
    Str(String),
    MultiStr(Vec<String>),
    Vector(Vec<f32>),
}

impl InferredValue {
    /// Classify a generic value.
    ///
    /// Booleans are integers (1/0). A numeric literal is a float exactly
    /// when its canonical text carries a fractional separator. Arrays must
    /// be homogeneous: all strings (multi-string) or all numerics (vector);
    /// empty and mixed arrays are ambiguous and rejected.
    pub fn classify(value: &Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(InferredValue::Int(i64::from(*b))),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Ok(InferredValue::Int(i));
                }
                let f = n
                    .as_f64()
                    .ok_or_else(|| Error::InvalidInput("unrepresentable number".into()))?;
                if encode::is_decimal(f) {
                    Ok(InferredValue::Float(f as f32))
                } else {
                    Ok(InferredValue::Int(f as i64))
                }
            }
            Value::String(s) => Ok(InferredValue::Str(s.clone())),
            Value::Array(items) => Self::classify_array(items),
            Value::Null => Err(Error::InvalidInput("null is not a field value".into())),
            Value::Object(_) => Err(Error::InvalidInput(
                "nested objects are not field values".into(),
            )),
        }
    }

    fn classify_array(items: &[Value]) -> Result<Self> {
        let mut all_string = true;
        let mut all_number = true;
        for item in items {
            match item {
                Value::String(_) => all_number = false,
                Value::Number(_) => all_string = false,
                _ => {
                    all_string = false;
                    all_number = false;
                }
            }
        }
        if all_string == all_number {
            // Covers both the empty array (ambiguous) and mixed contents.
            return Err(Error::InvalidInput(
                "array fields must be all-string or all-numeric".into(),
            ));
        }
        if all_string {
            let strings = items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect();
            Ok(InferredValue::MultiStr(strings))
        } else {
            let floats = items
                .iter()
                .filter_map(Value::as_f64)
                .map(|f| f as f32)
                .collect();
            Ok(InferredValue::Vector(floats))
        }
    }

    /// The field type this value infers to, before any schema promotion.
    pub fn field_type(&self) -> FieldType {
        match self {
            InferredValue::Int(_) => FieldType::Int,
            InferredValue::Float(_) => FieldType::Float,
            InferredValue::Str(_) => FieldType::String,
            InferredValue::MultiStr(_) => FieldType::MultiString,
            InferredValue::Vector(_) => FieldType::Vector,
        }
    }

    /// Element count for vector values.
    pub fn dimension(&self) -> Option<usize> {
        match self {
            InferredValue::Vector(v) => Some(v.len()),
            _ => None,
        }
    }

    /// Commit this value to a typed wire field, reconciling against the
    /// table's recorded type when one exists. The only permitted coercion
    /// is INT<->LONG, re-encoded at the schema's width; any other mismatch
    /// rejects the document.
    pub fn into_field(self, name: &str, schema_type: Option<FieldType>) -> Result<Field> {
        let inferred = self.field_type();
        let mismatch = |expected: FieldType| Error::FieldTypeMismatch {
            field: name.to_string(),
            expected: expected.type_name(),
            actual: inferred.type_name(),
        };

        let (field_type, value, mul_str_value) = match self {
            InferredValue::Int(i) => match schema_type {
                None | Some(FieldType::Int) => (FieldType::Int, encode::int32_bytes(i as i32), vec![]),
                Some(FieldType::Long) => (FieldType::Long, encode::int64_bytes(i), vec![]),
                Some(other) => return Err(mismatch(other)),
            },
            InferredValue::Float(f) => match schema_type {
                None | Some(FieldType::Float) => (FieldType::Float, encode::float32_bytes(f), vec![]),
                Some(other) => return Err(mismatch(other)),
            },
            InferredValue::Str(s) => match schema_type {
                None | Some(FieldType::String) => (FieldType::String, s.into_bytes(), vec![]),
                Some(other) => return Err(mismatch(other)),
            },
            InferredValue::MultiStr(strings) => match schema_type {
                None | Some(FieldType::MultiString) => (FieldType::MultiString, vec![], strings),
                Some(other) => return Err(mismatch(other)),
            },
            InferredValue::Vector(floats) => match schema_type {
                None | Some(FieldType::Vector) => {
                    (FieldType::Vector, encode::vector_bytes(&floats), vec![])
                }
                Some(other) => return Err(mismatch(other)),
            },
        };

        Ok(Field {
            name: name.to_string(),
            r#type: field_type as i32,
            value,
            mul_str_value,
        })
    }
}
