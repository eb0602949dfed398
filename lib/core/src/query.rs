//! Filter and query assembly: generic nested JSON to typed predicates.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::encode;
use crate::error::{Error, Result};
use crate::schema::TableSchema;
use crate::wire::{DocCondition, RangeFilter, SearchRequest, TermFilter, VectorQuery};

const DEFAULT_TOPN: i32 = 10;
const DEFAULT_LIMIT: i32 = 10;
const DEFAULT_MIN_SCORE: f32 = -1.0;
const DEFAULT_MAX_SCORE: f32 = 999_999.0;
const RETRIEVAL_PARAMS_L2: &str = "{\"metric_type\":\"L2\"}";
const RETRIEVAL_PARAMS_INNER_PRODUCT: &str = "{\"metric_type\":\"InnerProduct\"}";

// Open-ended numeric range sentinels carried on unset bounds.
const RANGE_LOWER_SENTINEL: f32 = -9_999_999.0;
const RANGE_UPPER_SENTINEL: f32 = 99_999_999.0;

fn open_range_filter(field: &str) -> RangeFilter {
    RangeFilter {
        field_name: field.to_string(),
        lower_value: encode::float32_bytes(RANGE_LOWER_SENTINEL),
        upper_value: encode::float32_bytes(RANGE_UPPER_SENTINEL),
        include_lower: false,
        include_upper: false,
    }
}

/// Apply one comparison operator to a filter under construction. Decimal
/// values encode as f32 bits, integral ones as i32. Returns false for
/// operators outside eq/lt/lte/gt/gte, which the caller skips.
fn apply_range_operator(filter: &mut RangeFilter, op: &str, value: f64) -> bool {
    if !matches!(op, "eq" | "lt" | "lte" | "gt" | "gte") {
        warn!(op, field = %filter.field_name, "unsupported range operator, skipping");
        return false;
    }
    let encoded = if encode::is_decimal(value) {
        encode::float32_bytes(value as f32)
    } else {
        encode::int32_bytes(value as i32)
    };
    match op {
        "lt" => {
            filter.upper_value = encoded;
            filter.include_upper = false;
        }
        "lte" => {
            filter.upper_value = encoded;
            filter.include_upper = true;
        }
        "gt" => {
            filter.lower_value = encoded;
            filter.include_lower = false;
        }
        "gte" => {
            filter.lower_value = encoded;
            filter.include_lower = true;
        }
        "eq" => {
            filter.lower_value = encoded.clone();
            filter.upper_value = encoded;
            filter.include_lower = true;
            filter.include_upper = true;
        }
        _ => unreachable!("operator set checked above"),
    }
    true
}

/// Assemble range filters from `{field: {op: number, ...}, ...}`.
///
/// Fields with malformed payloads or no recognized operator are dropped
/// with a diagnostic; the call fails only when nothing at all could be
/// built.
pub fn range_filters_from(value: &Value) -> Result<Vec<RangeFilter>> {
    let fields = value
        .as_object()
        .ok_or_else(|| Error::InvalidInput("range filters must be an object".into()))?;

    let mut filters = Vec::new();
    'fields: for (field_name, spec) in fields {
        let Some(operators) = spec.as_object() else {
            warn!(field = %field_name, "range filter value is not an object, skipping");
            continue;
        };
        let mut filter = open_range_filter(field_name);
        let mut recognized = false;
        for (op, op_value) in operators {
            let Some(number) = op_value.as_f64() else {
                warn!(field = %field_name, op = %op, "range filter value is not numeric, skipping field");
                continue 'fields;
            };
            recognized |= apply_range_operator(&mut filter, op, number);
        }
        if recognized {
            filters.push(filter);
        }
    }

    if filters.is_empty() {
        return Err(Error::InvalidInput("no usable range filters".into()));
    }
    Ok(filters)
}

/// Assemble term filters from `{field: {"value": s, "operator": "or"|"and"}}`.
/// A missing operator means OR. Undecodable fields are skipped; at least
/// one filter must survive.
pub fn term_filters_from(value: &Value) -> Result<Vec<TermFilter>> {
    let fields = value
        .as_object()
        .ok_or_else(|| Error::InvalidInput("term filters must be an object".into()))?;

    let mut filters = Vec::new();
    'fields: for (field_name, spec) in fields {
        let Some(entries) = spec.as_object() else {
            warn!(field = %field_name, "term filter value is not an object, skipping");
            continue;
        };
        let mut term_value = None;
        let mut is_union = true;
        for (key, entry) in entries {
            match key.as_str() {
                "value" => match entry.as_str() {
                    Some(s) => term_value = Some(s.to_string()),
                    None => {
                        warn!(field = %field_name, "term filter value is not a string, skipping field");
                        continue 'fields;
                    }
                },
                "operator" => match entry.as_str() {
                    Some("or") => is_union = true,
                    Some("and") => is_union = false,
                    _ => {
                        warn!(field = %field_name, "term filter operator must be \"or\" or \"and\", skipping field");
                        continue 'fields;
                    }
                },
                other => {
                    warn!(field = %field_name, key = other, "unexpected term filter key, skipping field");
                    continue 'fields;
                }
            }
        }
        let Some(term_value) = term_value else {
            warn!(field = %field_name, "term filter has no value, skipping field");
            continue;
        };
        filters.push(TermFilter {
            field_name: field_name.clone(),
            value: term_value,
            is_union,
        });
    }

    if filters.is_empty() {
        return Err(Error::InvalidInput("no usable term filters".into()));
    }
    Ok(filters)
}

/// Assemble one per-field vector query. Reserved keys `min_score`,
/// `max_score` and `weight` tune the scoring window; exactly one other key
/// must name a VECTOR field of the table and carry an all-numeric array.
pub fn vector_query_from(spec: &Map<String, Value>, schema: &TableSchema) -> Result<VectorQuery> {
    let mut query = VectorQuery {
        field_name: String::new(),
        value: Vec::new(),
        min_score: DEFAULT_MIN_SCORE,
        max_score: DEFAULT_MAX_SCORE,
        boost: 1.0,
        is_boost: true,
    };

    for (key, value) in spec {
        match key.as_str() {
            "min_score" => match value.as_f64() {
                Some(v) => query.min_score = v as f32,
                None => warn!("min_score is not numeric, keeping default"),
            },
            "max_score" => match value.as_f64() {
                Some(v) => query.max_score = v as f32,
                None => warn!("max_score is not numeric, keeping default"),
            },
            "weight" => match value.as_f64() {
                Some(v) => {
                    query.boost = v as f32;
                    query.is_boost = true;
                }
                None => warn!("weight is not numeric, keeping default"),
            },
            field_name => {
                if !query.field_name.is_empty() {
                    return Err(Error::InvalidInput(
                        "vector query must name exactly one vector field".into(),
                    ));
                }
                if schema.field_type(field_name) != Some(crate::wire::FieldType::Vector) {
                    return Err(Error::NotVectorField(field_name.to_string()));
                }
                let Some(items) = value.as_array() else {
                    return Err(Error::InvalidInput(format!(
                        "vector query value for '{}' must be an array",
                        field_name
                    )));
                };
                let mut floats = Vec::with_capacity(items.len());
                for item in items {
                    match item.as_f64() {
                        Some(f) => floats.push(f as f32),
                        None => {
                            return Err(Error::InvalidInput(format!(
                                "vector query for '{}' must be all-numeric",
                                field_name
                            )))
                        }
                    }
                }
                if floats.is_empty() {
                    return Err(Error::InvalidInput(format!(
                        "vector query for '{}' is empty",
                        field_name
                    )));
                }
                query.field_name = field_name.to_string();
                query.value = encode::vector_bytes(&floats);
            }
        }
    }

    if query.field_name.is_empty() {
        return Err(Error::InvalidInput(
            "vector query names no vector field".into(),
        ));
    }
    Ok(query)
}

/// Merge an optional `filters` payload (`{"range_filters": .., "term_filters": ..}`)
/// into the destination vectors. Assembly failures inside a group are
/// diagnostics, not errors; an unknown group name is a client error when
/// `strict`, a diagnostic otherwise.
fn collect_filters(
    filters: &Value,
    range_out: &mut Vec<RangeFilter>,
    term_out: &mut Vec<TermFilter>,
    strict: bool,
) -> Result<bool> {
    let groups = filters
        .as_object()
        .ok_or_else(|| Error::InvalidInput("filters must be an object".into()))?;

    let mut any = false;
    for (name, group) in groups {
        match name.as_str() {
            "range_filters" => match range_filters_from(group) {
                Ok(mut filters) => {
                    any = true;
                    range_out.append(&mut filters);
                }
                Err(e) => debug!(error = %e, "range filters not usable"),
            },
            "term_filters" => match term_filters_from(group) {
                Ok(mut filters) => {
                    any = true;
                    term_out.append(&mut filters);
                }
                Err(e) => debug!(error = %e, "term filters not usable"),
            },
            other => {
                if strict {
                    return Err(Error::InvalidInput(format!(
                        "unknown filter group '{}'",
                        other
                    )));
                }
                warn!(group = other, "unknown filter group, ignoring");
            }
        }
    }
    Ok(any)
}

/// Assemble a full search request from the operation payload.
pub fn search_request_from(
    db: &str,
    table: &str,
    body: &Map<String, Value>,
    schema: &TableSchema,
) -> Result<SearchRequest> {
    let mut request = SearchRequest {
        db_name: db.to_string(),
        table_name: table.to_string(),
        vec_queries: Vec::new(),
        range_filters: Vec::new(),
        term_filters: Vec::new(),
        topn: DEFAULT_TOPN,
        retrieval_params: RETRIEVAL_PARAMS_L2.to_string(),
        brute_force_search: false,
        is_l2: true,
        pack_fields: Vec::new(),
        is_pack_all_fields: false,
    };

    let vector_query = body
        .get("vector_query")
        .ok_or_else(|| Error::InvalidInput("vector_query must be specified".into()))?;
    match vector_query {
        Value::Object(spec) => request.vec_queries.push(vector_query_from(spec, schema)?),
        Value::Array(items) => {
            for item in items {
                let spec = item.as_object().ok_or_else(|| {
                    Error::InvalidInput("vector_query entries must be objects".into())
                })?;
                request.vec_queries.push(vector_query_from(spec, schema)?);
            }
            if request.vec_queries.is_empty() {
                return Err(Error::InvalidInput("vector_query is empty".into()));
            }
        }
        _ => return Err(Error::InvalidInput("vector_query format error".into())),
    }

    if let Some(filters) = body.get("filters") {
        if let Err(e) = collect_filters(
            filters,
            &mut request.range_filters,
            &mut request.term_filters,
            false,
        ) {
            warn!(error = %e, "ignoring malformed filters");
        }
    }

    match body.get("pack_fields") {
        Some(Value::String(field)) => request.pack_fields.push(field.clone()),
        Some(Value::Array(items)) => {
            for item in items {
                match item.as_str() {
                    Some(field) => request.pack_fields.push(field.to_string()),
                    None => warn!("pack_fields entry is not a string, skipping"),
                }
            }
        }
        Some(_) => {
            warn!("pack_fields format error, packing all fields");
            request.is_pack_all_fields = true;
        }
        None => request.pack_fields = schema.non_vector_fields(),
    }

    if let Some(topn) = body.get("topn") {
        match topn.as_f64() {
            Some(v) if !encode::is_decimal(v) => request.topn = v as i32,
            _ => warn!("topn must be an integer, keeping default"),
        }
    }

    if let Some(brute) = body.get("force_brute_search") {
        match brute.as_bool() {
            Some(v) => request.brute_force_search = v,
            None => warn!("force_brute_search must be a boolean, keeping default"),
        }
    }

    if let Some(metric) = body.get("metric_type") {
        match metric.as_str() {
            Some("L2") => request.is_l2 = true,
            Some("InnerProduct") => {
                request.is_l2 = false;
                request.retrieval_params = RETRIEVAL_PARAMS_INNER_PRODUCT.to_string();
            }
            _ => warn!("unknown metric_type, keeping L2"),
        }
    }

    Ok(request)
}

/// Document ids for get/delete: a single string or integer, or an array of
/// either (never both). Decimal ids are rejected.
pub fn parse_ids(value: &Value) -> Result<Vec<Vec<u8>>> {
    match value {
        Value::String(s) => Ok(vec![s.clone().into_bytes()]),
        Value::Number(_) => {
            let id = integral_id(value)
                .ok_or_else(|| Error::InvalidInput("id must not be decimal".into()))?;
            Ok(vec![encode::int64_bytes(id)])
        }
        Value::Array(items) => {
            let mut strings = Vec::new();
            let mut longs = Vec::new();
            for item in items {
                match item {
                    Value::String(s) => strings.push(s.clone().into_bytes()),
                    Value::Number(_) => match integral_id(item) {
                        Some(id) => longs.push(encode::int64_bytes(id)),
                        None => warn!("decimal id skipped"),
                    },
                    _ => return Err(Error::InvalidInput("ids format error".into())),
                }
            }
            match (strings.is_empty(), longs.is_empty()) {
                (false, true) => Ok(strings),
                (true, false) => Ok(longs),
                _ => Err(Error::InvalidInput("ids format not consistent".into())),
            }
        }
        _ => Err(Error::InvalidInput("ids format error".into())),
    }
}

fn integral_id(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    let f = n.as_f64()?;
    (!encode::is_decimal(f)).then_some(f as i64)
}

/// Assemble the selection condition for get/delete. At least one of `ids`
/// and `filters` must be usable; ids win and suppress filters.
pub fn condition_from(
    db: &str,
    table: &str,
    body: &Map<String, Value>,
    for_get: bool,
) -> Result<DocCondition> {
    let mut condition = DocCondition {
        db_name: db.to_string(),
        table_name: table.to_string(),
        ids: Vec::new(),
        range_filters: Vec::new(),
        term_filters: Vec::new(),
        limit: DEFAULT_LIMIT,
        include_all_fields: for_get,
        pack_fields: Vec::new(),
    };

    if let Some(ids) = body.get("ids") {
        condition.ids = parse_ids(ids)?;
    }

    let mut has_filters = false;
    if let Some(filters) = body.get("filters") {
        has_filters = collect_filters(
            filters,
            &mut condition.range_filters,
            &mut condition.term_filters,
            true,
        )?;
    }

    if for_get {
        match body.get("pack_fields") {
            Some(Value::String(field)) => condition.pack_fields.push(field.clone()),
            Some(Value::Array(items)) => {
                for item in items {
                    match item.as_str() {
                        Some(field) => condition.pack_fields.push(field.to_string()),
                        None => warn!("pack_fields entry is not a string, skipping"),
                    }
                }
            }
            Some(_) => warn!("pack_fields format error, ignoring"),
            None => {}
        }
        if let Some(limit) = body.get("limit") {
            match limit.as_f64() {
                Some(v) if !encode::is_decimal(v) => condition.limit = v as i32,
                _ => warn!("limit must be an integer, keeping default"),
            }
        }
    }

    if condition.ids.is_empty() && !has_filters {
        return Err(Error::InvalidInput(
            "one of ids and filters must be specified".into(),
        ));
    }
    if !condition.ids.is_empty() {
        condition.range_filters.clear();
        condition.term_filters.clear();
    }
    Ok(condition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::FieldType;
    use serde_json::json;

    fn vector_schema() -> TableSchema {
        let mut schema = TableSchema::new();
        schema.insert("_id", FieldType::String);
        schema.insert("age", FieldType::Int);
        schema.insert("vec", FieldType::Vector);
        schema
    }

    #[test]
    fn range_filter_combines_operators_per_field() {
        let filters = range_filters_from(&json!({"age": {"gte": 18, "lt": 65}})).unwrap();
        assert_eq!(filters.len(), 1);
        let filter = &filters[0];
        assert_eq!(filter.field_name, "age");
        assert!(filter.include_lower);
        assert!(!filter.include_upper);
        assert_eq!(encode::decode_int32(&filter.lower_value), Some(18));
        assert_eq!(encode::decode_int32(&filter.upper_value), Some(65));
    }

    #[test]
    fn range_filter_eq_sets_both_bounds_inclusive() {
        let filters = range_filters_from(&json!({"age": {"eq": 21}})).unwrap();
        let filter = &filters[0];
        assert!(filter.include_lower && filter.include_upper);
        assert_eq!(filter.lower_value, filter.upper_value);
        assert_eq!(encode::decode_int32(&filter.lower_value), Some(21));
    }

    #[test]
    fn decimal_range_bound_encodes_as_float() {
        let filters = range_filters_from(&json!({"score": {"gte": 0.5}})).unwrap();
        assert_eq!(encode::decode_float32(&filters[0].lower_value), Some(0.5));
        // Untouched side keeps the open-ended sentinel.
        assert_eq!(
            encode::decode_float32(&filters[0].upper_value),
            Some(99_999_999.0)
        );
    }

    #[test]
    fn unsupported_operator_drops_the_field() {
        // "between" is unknown; the field builds nothing, so the call fails.
        let err = range_filters_from(&json!({"age": {"between": 5}})).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        // With a sibling field the request still succeeds.
        let filters =
            range_filters_from(&json!({"age": {"between": 5}, "score": {"gt": 1}})).unwrap();
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].field_name, "score");
    }

    #[test]
    fn term_filter_operator_maps_to_union() {
        let filters =
            term_filters_from(&json!({"city": {"value": "NYC", "operator": "and"}})).unwrap();
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].value, "NYC");
        assert!(!filters[0].is_union);

        // Default is OR.
        let filters = term_filters_from(&json!({"city": {"value": "NYC"}})).unwrap();
        assert!(filters[0].is_union);
    }

    #[test]
    fn undecodable_term_filter_is_skipped() {
        let filters = term_filters_from(&json!({
            "bad": {"value": 7},
            "city": {"value": "NYC"}
        }))
        .unwrap();
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].field_name, "city");

        assert!(term_filters_from(&json!({"bad": {"value": 7}})).is_err());
    }

    #[test]
    fn vector_query_encodes_and_takes_weight() {
        let spec = json!({"vec": [1, 2, 3], "weight": 0.5});
        let query = vector_query_from(spec.as_object().unwrap(), &vector_schema()).unwrap();
        assert_eq!(query.field_name, "vec");
        assert_eq!(query.boost, 0.5);
        assert_eq!(query.min_score, -1.0);
        assert_eq!(query.max_score, 999_999.0);
        assert_eq!(query.value.len(), 12);
        assert_eq!(encode::decode_float32(&query.value[0..4]), Some(1.0));
        assert_eq!(encode::decode_float32(&query.value[4..8]), Some(2.0));
        assert_eq!(encode::decode_float32(&query.value[8..12]), Some(3.0));
    }

    #[test]
    fn vector_query_rejects_unknown_and_non_vector_fields() {
        let spec = json!({"missing": [1.0]});
        let err = vector_query_from(spec.as_object().unwrap(), &vector_schema()).unwrap_err();
        assert!(matches!(err, Error::NotVectorField(_)));

        let spec = json!({"age": [1.0]});
        let err = vector_query_from(spec.as_object().unwrap(), &vector_schema()).unwrap_err();
        assert!(matches!(err, Error::NotVectorField(_)));
    }

    #[test]
    fn vector_query_rejects_non_numeric_arrays() {
        let spec = json!({"vec": [1.0, "x"]});
        assert!(vector_query_from(spec.as_object().unwrap(), &vector_schema()).is_err());
        let spec = json!({"vec": []});
        assert!(vector_query_from(spec.as_object().unwrap(), &vector_schema()).is_err());
    }

    #[test]
    fn search_request_defaults() {
        let body = json!({"vector_query": {"vec": [0.1, 0.2]}});
        let request =
            search_request_from("default", "t", body.as_object().unwrap(), &vector_schema())
                .unwrap();
        assert_eq!(request.topn, 10);
        assert!(request.is_l2);
        assert!(!request.brute_force_search);
        assert_eq!(request.retrieval_params, "{\"metric_type\":\"L2\"}");
        // pack_fields defaults to every non-vector field.
        let mut packed = request.pack_fields.clone();
        packed.sort();
        assert_eq!(packed, vec!["_id".to_string(), "age".to_string()]);
    }

    #[test]
    fn search_request_inner_product_and_topn() {
        let body = json!({
            "vector_query": {"vec": [0.1, 0.2]},
            "metric_type": "InnerProduct",
            "topn": 50,
            "force_brute_search": true,
            "pack_fields": ["age"]
        });
        let request =
            search_request_from("default", "t", body.as_object().unwrap(), &vector_schema())
                .unwrap();
        assert!(!request.is_l2);
        assert_eq!(
            request.retrieval_params,
            "{\"metric_type\":\"InnerProduct\"}"
        );
        assert_eq!(request.topn, 50);
        assert!(request.brute_force_search);
        assert_eq!(request.pack_fields, vec!["age".to_string()]);
    }

    #[test]
    fn ids_must_be_homogeneous() {
        assert_eq!(parse_ids(&json!("u1")).unwrap(), vec![b"u1".to_vec()]);
        assert_eq!(
            parse_ids(&json!(7)).unwrap(),
            vec![encode::int64_bytes(7)]
        );
        assert!(parse_ids(&json!(["u1", 7])).is_err());
        assert!(parse_ids(&json!(7.5)).is_err());
        assert!(parse_ids(&json!([])).is_err());

        let ids = parse_ids(&json!([1, 2])).unwrap();
        assert_eq!(ids, vec![encode::int64_bytes(1), encode::int64_bytes(2)]);
    }

    #[test]
    fn condition_requires_ids_or_filters_and_prefers_ids() {
        let body = json!({});
        assert!(condition_from("db", "t", body.as_object().unwrap(), true).is_err());

        let body = json!({
            "ids": ["u1"],
            "filters": {"term_filters": {"city": {"value": "NYC"}}}
        });
        let condition = condition_from("db", "t", body.as_object().unwrap(), true).unwrap();
        assert_eq!(condition.ids.len(), 1);
        assert!(condition.term_filters.is_empty());
        assert!(condition.include_all_fields);
        assert_eq!(condition.limit, 10);

        let body = json!({"filters": {"range_filters": {"age": {"gt": 3}}}, "limit": 5});
        let condition = condition_from("db", "t", body.as_object().unwrap(), true).unwrap();
        assert_eq!(condition.range_filters.len(), 1);
        assert_eq!(condition.limit, 5);
    }

    #[test]
    fn condition_rejects_unknown_filter_group() {
        let body = json!({"filters": {"geo_filters": {}}});
        assert!(condition_from("db", "t", body.as_object().unwrap(), false).is_err());
    }
}
