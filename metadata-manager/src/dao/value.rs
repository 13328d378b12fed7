// Copyright (c) 2024-2025 Tsurugi Metadata Manager Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Value coercion and record validation shared by both backends

use super::schema::{FieldDef, FieldType, KindSchema, ID};
use crate::error::{CatalogError, CatalogResult};
use crate::message::{Message, MessageId};
use crate::model::{ObjectId, Record};
use serde_json::Value;

/// Normalize one value to the declared type of `field`
///
/// Null stays null. Integers accept integral numbers and numeric strings.
pub fn coerce(field: &FieldDef, value: &Value) -> CatalogResult<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    match field.ty {
        FieldType::Int => coerce_int(field, value).map(Value::from),
        FieldType::Text => match value {
            Value::String(_) => Ok(value.clone()),
            other => Err(CatalogError::conversion(
                field.name,
                format!("expected a string, got {}", other),
            )),
        },
        FieldType::Bool => match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
            other => Err(CatalogError::conversion(
                field.name,
                format!("expected a boolean, got {}", other),
            )),
        },
        FieldType::Json => Ok(value.clone()),
    }
}

fn coerce_int(field: &FieldDef, value: &Value) -> CatalogResult<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if n.is_u64() {
                Err(CatalogError::conversion(field.name, format!("{} overflows bigint", n)))
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                        Ok(f as i64)
                    }
                    _ => Err(CatalogError::conversion(
                        field.name,
                        format!("{} is not an integer", n),
                    )),
                }
            }
        }
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| {
            CatalogError::ValueConversionError(
                Message::new(MessageId::CONVERT_STRING_TO_INT_FAILURE)
                    .arg(format!("{}: \"{}\"", field.name, s)),
            )
        }),
        other => Err(CatalogError::conversion(
            field.name,
            format!("expected an integer, got {}", other),
        )),
    }
}

/// Validate a record for writing and lay it out in schema order
///
/// `id` is dropped (it is assigned by the backend) and re-added as null at
/// the front. Unknown keys are rejected, defaults filled, and required
/// fields checked.
pub fn normalize_record(schema: &KindSchema, record: &Record) -> CatalogResult<Record> {
    if let Some(unknown) = record
        .keys()
        .find(|k| k.as_str() != ID && schema.field(k).is_none())
    {
        return Err(CatalogError::InvalidParameter(
            Message::new(MessageId::METADATA_KEY_NOT_FOUND).arg(format!("{}.{}", schema.node, unknown)),
        ));
    }

    let mut out = Record::new();
    out.insert(ID.to_string(), Value::Null);
    for field in schema.writable_fields() {
        let mut value = match record.get(field.name) {
            Some(v) => coerce(field, v)?,
            None => Value::Null,
        };
        if value.is_null() {
            if let Some(default) = field.default {
                value = Value::from(default);
            }
        }
        if field.required {
            let missing = match &value {
                Value::Null => true,
                Value::String(s) => s.is_empty(),
                _ => false,
            };
            if missing {
                return Err(CatalogError::invalid_parameter(format!(
                    "{}.{} is required",
                    schema.node, field.name
                )));
            }
        }
        out.insert(field.name.to_string(), value);
    }
    Ok(out)
}

/// Resolve a filter key and normalize its value
pub fn filter_value(
    schema: &KindSchema,
    key: &str,
    value: &Value,
) -> CatalogResult<(&'static FieldDef, Value)> {
    let field = schema.field(key).ok_or_else(|| {
        CatalogError::InvalidParameter(
            Message::new(MessageId::METADATA_KEY_NOT_FOUND).arg(format!("{}.{}", schema.node, key)),
        )
    })?;
    if field.ty == FieldType::Json {
        return Err(CatalogError::invalid_parameter(format!(
            "{}.{} cannot be used as a filter",
            schema.node, key
        )));
    }
    if value.is_null() {
        return Err(CatalogError::invalid_parameter(format!(
            "{}.{} filter value is null",
            schema.node, key
        )));
    }
    Ok((field, coerce(field, value)?))
}

/// Check that `key_fields` is one of the declared unique keys
pub fn check_upsert_key(schema: &KindSchema, key_fields: &[&str]) -> CatalogResult<()> {
    if schema.is_unique_key(key_fields) {
        Ok(())
    } else {
        Err(CatalogError::invalid_parameter(format!(
            "{} is not a unique key of {}",
            key_fields.join(","),
            schema.node
        )))
    }
}

/// Values of `key` in `record`, or `None` when any of them is null
pub fn key_values(record: &Record, key: &[&str]) -> Option<Vec<Value>> {
    key.iter()
        .map(|f| match record.get(*f) {
            Some(Value::Null) | None => None,
            Some(v) => Some(v.clone()),
        })
        .collect()
}

pub fn record_id(record: &Record) -> Option<ObjectId> {
    record.get(ID).and_then(Value::as_i64)
}

/// Sort rows by ascending id
pub fn sort_by_id(rows: &mut [Record]) {
    rows.sort_by_key(|r| record_id(r).unwrap_or(i64::MAX));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::schema::schema;
    use crate::error::ErrorCode;
    use crate::model::MetadataKind;
    use serde_json::json;

    fn rec(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_coerce_int() {
        let s = schema(MetadataKind::Column);
        let f = s.field("columnNumber").unwrap();
        assert_eq!(coerce(f, &json!(3)).unwrap(), json!(3));
        assert_eq!(coerce(f, &json!("  7 ")).unwrap(), json!(7));
        assert_eq!(coerce(f, &json!(2.0)).unwrap(), json!(2));
        assert_eq!(
            coerce(f, &json!(2.5)).unwrap_err().code(),
            ErrorCode::ValueConversionError
        );
        assert_eq!(
            coerce(f, &json!(u64::MAX)).unwrap_err().code(),
            ErrorCode::ValueConversionError
        );
        assert_eq!(
            coerce(f, &json!("seven")).unwrap_err().message().id(),
            MessageId::CONVERT_STRING_TO_INT_FAILURE
        );
    }

    #[test]
    fn test_normalize_fills_defaults_and_orders_fields() {
        let s = schema(MetadataKind::Table);
        let out = normalize_record(s, &rec(json!({"name": "t1", "id": 99}))).unwrap();
        let keys: Vec<_> = out.keys().cloned().collect();
        assert_eq!(keys[0], "id");
        assert_eq!(keys[3], "name");
        assert_eq!(out["id"], Value::Null);
        assert_eq!(out["formatVersion"], json!(1));
        assert_eq!(out["namespace"], Value::Null);
    }

    #[test]
    fn test_normalize_rejects_unknown_and_missing() {
        let s = schema(MetadataKind::Table);
        let err = normalize_record(s, &rec(json!({"name": "t1", "bogus": 1}))).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParameter);
        assert_eq!(err.message().id(), MessageId::METADATA_KEY_NOT_FOUND);

        let err = normalize_record(s, &rec(json!({"name": ""}))).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParameter);
    }

    #[test]
    fn test_filter_value() {
        let s = schema(MetadataKind::Column);
        let (f, v) = filter_value(s, "tableId", &json!("12")).unwrap();
        assert_eq!(f.name, "tableId");
        assert_eq!(v, json!(12));

        for (key, value) in [("nope", json!(1)), ("dataLength", json!([1])), ("name", Value::Null)] {
            assert_eq!(
                filter_value(s, key, &value).unwrap_err().code(),
                ErrorCode::InvalidParameter,
                "{}",
                key
            );
        }
    }

    #[test]
    fn test_key_values_skip_null() {
        let r = rec(json!({"tableId": 1, "name": null}));
        assert_eq!(key_values(&r, &["tableId", "name"]), None);
        let r = rec(json!({"tableId": 1, "name": "c"}));
        assert_eq!(key_values(&r, &["tableId", "name"]), Some(vec![json!(1), json!("c")]));
    }
}
