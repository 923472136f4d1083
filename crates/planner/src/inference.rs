//! Derives the joins a specification needs from the fields it references.
//!
//! Only `fields`, `extraFields`, aggregates, filters, `order` and `group` are
//! scanned. Join conditions are not, so a join whose condition references a
//! field behind another join needs that other join listed explicitly.

use model::{
    QuerySpec, SchemaModel,
    spec::{AggregateParam, FieldsParam, GroupParam, JoinsParam, OrderParam},
};
use query_builder::ast::common::AggregateFn;
use serde_json::Value;

/// Join keys required by `spec`, deduplicated, in order of first reference.
pub fn required_joins(schema: &SchemaModel, spec: &QuerySpec) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for name in candidates(spec) {
        if let Some(key) = join_key(schema, name) {
            if !keys.iter().any(|k| k == key) {
                keys.push(key.to_string());
            }
        }
    }
    keys
}

/// Returns `spec` with `joins` replaced by the inferred join set, or removed
/// when nothing needs joining. A caller-supplied `joins` never survives.
pub fn infer_joins(schema: &SchemaModel, spec: &QuerySpec) -> QuerySpec {
    let mut inferred = spec.clone();
    if spec.is_empty() {
        inferred.joins = None;
        return inferred;
    }

    let keys = required_joins(schema, spec);
    inferred.joins = (!keys.is_empty()).then_some(JoinsParam::Keys(keys));
    inferred
}

/// A flag lives wherever its carrier lives.
fn join_key<'a>(schema: &'a SchemaModel, name: &str) -> Option<&'a str> {
    match schema.join_key_of(name) {
        Some(key) => Some(key),
        None => schema
            .flag(name)
            .and_then(|flag| schema.join_key_of(flag.carrier)),
    }
}

fn candidates(spec: &QuerySpec) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();

    match &spec.fields {
        Some(FieldsParam::Names(fields)) => names.extend(fields.iter().map(String::as_str)),
        None => {
            if let Some(Value::Array(extra)) = &spec.extra_fields {
                names.extend(extra.iter().filter_map(Value::as_str));
            }
        }
        Some(_) => {}
    }

    for function in AggregateFn::ALL {
        match spec.aggregate(function.name()) {
            Some(AggregateParam::Field(field)) => names.push(field),
            Some(AggregateParam::Spec {
                field: Some(field), ..
            }) => names.push(field),
            _ => {}
        }
    }

    if let Some(filters) = &spec.filters {
        names.extend(filters.field_names());
    }

    match &spec.order {
        Some(OrderParam::Field(field)) => names.push(field),
        Some(OrderParam::Directions(map)) => names.extend(map.keys().map(String::as_str)),
        _ => {}
    }

    match &spec.group {
        Some(GroupParam::Field(field)) => names.push(field),
        Some(GroupParam::Fields(fields)) => names.extend(fields.iter().map(String::as_str)),
        _ => {}
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fixtures;
    use serde_json::json;

    fn joins_of(spec: serde_json::Value) -> Option<JoinsParam> {
        infer_joins(&fixtures::users_schema(), &fixtures::spec(spec)).joins
    }

    fn keys(keys: &[&str]) -> Option<JoinsParam> {
        Some(JoinsParam::Keys(keys.iter().map(|k| k.to_string()).collect()))
    }

    #[test]
    fn test_fields_drive_joins() {
        assert_eq!(
            joins_of(json!({ "fields": ["id", "profileName", "profileId"] })),
            keys(&["Profile"])
        );
    }

    #[test]
    fn test_every_clause_is_scanned() {
        assert_eq!(
            joins_of(json!({
                "fields": ["id"],
                "count": { "field": "photoUrl" },
                "filters": [{ "name": "x" }, { "profileName": "y" }],
                "order": { "id": "asc" },
                "group": "photoUrl",
            })),
            keys(&["Photos", "Profile"])
        );
        assert_eq!(joins_of(json!({ "order": "profileId" })), keys(&["Profile"]));
        assert_eq!(joins_of(json!({ "sum": "ownerId" })), keys(&["Photos"]));
    }

    #[test]
    fn test_extra_fields_only_without_fields() {
        assert_eq!(
            joins_of(json!({ "extraFields": ["profileName"] })),
            keys(&["Profile"])
        );
        assert_eq!(
            joins_of(json!({ "fields": ["id"], "extraFields": ["profileName"] })),
            None
        );
    }

    #[test]
    fn test_caller_joins_are_overwritten() {
        assert_eq!(
            joins_of(json!({ "fields": ["id"], "joins": ["Photos"] })),
            None
        );
        assert_eq!(
            joins_of(json!({ "filters": { "photoUrl": "a" }, "joins": ["Profile"] })),
            keys(&["Photos"])
        );
    }

    #[test]
    fn test_empty_spec_only_strips_joins() {
        let spec = fixtures::spec(json!({ "joins": ["Profile"] }));
        let inferred = infer_joins(&fixtures::users_schema(), &spec);
        assert_eq!(inferred, QuerySpec::default());
    }

    #[test]
    fn test_flag_follows_carrier_join() {
        let schema = fixtures::schema(json!({
            "table": "users",
            "fields": { "id": true, "state": { "table": "Profile" }, "isVerified": true },
            "flags": { "state": { "isVerified": 2 } },
            "joins": { "Profile": { "alias": "p", "on": ["id", "id"] } }
        }));
        let spec = fixtures::spec(json!({ "filters": { "isVerified": true } }));
        assert_eq!(required_joins(&schema, &spec), ["Profile"]);
    }

    #[test]
    fn test_inference_is_idempotent() {
        let schema = fixtures::users_schema();
        let spec = fixtures::spec(json!({
            "fields": ["photoUrl"],
            "filters": { "profileName": "x" },
        }));
        let once = infer_joins(&schema, &spec);
        let twice = infer_joins(&schema, &once);
        assert_eq!(once, twice);
        assert_eq!(once.joins, keys(&["Photos", "Profile"]));
    }
}
