//! Row transform: raw storage rows to typed records keyed by property name, and back.

use crate::error::DataIntegrityError;
use crate::model::{RawRow, Record, ResourceFieldDescriptor, ValueType, IDENTITY_FIELD};
use serde_json::{Number, Value};

#[derive(Clone, Debug)]
pub struct RowParser {
    fields: Vec<ResourceFieldDescriptor>,
}

impl RowParser {
    pub fn new(fields: Vec<ResourceFieldDescriptor>) -> Self {
        RowParser { fields }
    }

    /// `None` stays `None` (record not found). Missing or null columns become null;
    /// present values are strictly coerced to the declared type.
    pub fn parse_row(&self, raw: Option<&RawRow>) -> Result<Option<Record>, DataIntegrityError> {
        let Some(raw) = raw else { return Ok(None) };
        let mut out = Record::new();
        for field in &self.fields {
            let value = match raw.get(&field.storage_name) {
                None | Some(Value::Null) => Value::Null,
                Some(v) => coerce(field, v)?,
            };
            out.insert(field.property_name.clone(), value);
        }
        Ok(Some(out))
    }

    /// Map a request body (keyed by storage name) to a storage row. Unknown keys and
    /// the identity field are dropped; values are coerced to the declared type.
    pub fn to_storage(&self, body: &RawRow) -> Result<RawRow, DataIntegrityError> {
        let mut out = RawRow::new();
        for field in &self.fields {
            if field.property_name == IDENTITY_FIELD {
                continue;
            }
            let Some(v) = body.get(&field.storage_name) else { continue };
            let value = if v.is_null() { Value::Null } else { coerce(field, v)? };
            out.insert(field.storage_name.clone(), value);
        }
        Ok(out)
    }
}

fn expected_name(t: &ValueType) -> &'static str {
    match t {
        ValueType::Integer => "integer",
        ValueType::String => "string",
        ValueType::Boolean => "boolean",
        ValueType::Float => "float",
        ValueType::Unsupported(_) => "supported type",
    }
}

/// Strict cast of a non-null raw value to the field's declared type.
pub fn coerce(field: &ResourceFieldDescriptor, raw: &Value) -> Result<Value, DataIntegrityError> {
    let fail = || DataIntegrityError {
        field: field.property_name.clone(),
        expected: expected_name(&field.value_type),
        found: raw.to_string(),
    };
    match &field.value_type {
        ValueType::Integer => match raw {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::from(i))
                } else {
                    match n.as_f64() {
                        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Value::from(f as i64)),
                        _ => Err(fail()),
                    }
                }
            }
            Value::String(s) => s.trim().parse::<i64>().map(Value::from).map_err(|_| fail()),
            Value::Bool(b) => Ok(Value::from(i64::from(*b))),
            _ => Err(fail()),
        },
        ValueType::Float => match raw {
            Value::Number(n) => n.as_f64().and_then(Number::from_f64).map(Value::Number).ok_or_else(fail),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(fail),
            _ => Err(fail()),
        },
        ValueType::Boolean => match raw {
            Value::Bool(b) => Ok(Value::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(0) => Ok(Value::Bool(false)),
                Some(1) => Ok(Value::Bool(true)),
                _ => Err(fail()),
            },
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "1" | "true" => Ok(Value::Bool(true)),
                "0" | "false" => Ok(Value::Bool(false)),
                _ => Err(fail()),
            },
            _ => Err(fail()),
        },
        ValueType::String => match raw {
            Value::String(s) => Ok(Value::String(s.clone())),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            _ => Err(fail()),
        },
        ValueType::Unsupported(_) => Err(fail()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldAttribute;
    use serde_json::json;

    fn parser() -> RowParser {
        RowParser::new(vec![
            ResourceFieldDescriptor::new("id", ValueType::Integer, vec![]),
            ResourceFieldDescriptor::new(
                "display",
                ValueType::String,
                vec![FieldAttribute::FieldAlias("label".into())],
            ),
            ResourceFieldDescriptor::new("inactive", ValueType::Boolean, vec![]),
            ResourceFieldDescriptor::new("weight", ValueType::Float, vec![]),
        ])
    }

    fn row(v: Value) -> RawRow {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_null_row_stays_null() {
        assert_eq!(parser().parse_row(None).unwrap(), None);
    }

    #[test]
    fn test_empty_row_all_null() {
        let rec = parser().parse_row(Some(&RawRow::new())).unwrap().unwrap();
        assert_eq!(
            Value::Object(rec),
            json!({"id": null, "display": null, "inactive": null, "weight": null})
        );
    }

    #[test]
    fn test_string_columns_coerced_and_renamed() {
        let raw = row(json!({"id": "7", "label": "Red", "inactive": "0", "weight": "1.5", "extra": 1}));
        let rec = parser().parse_row(Some(&raw)).unwrap().unwrap();
        assert_eq!(
            Value::Object(rec),
            json!({"id": 7, "display": "Red", "inactive": false, "weight": 1.5})
        );
    }

    #[test]
    fn test_bad_value_is_integrity_error() {
        let raw = row(json!({"id": "seven"}));
        let err = parser().parse_row(Some(&raw)).unwrap_err();
        assert_eq!(err.field, "id");
        assert_eq!(err.expected, "integer");

        let raw = row(json!({"inactive": 2}));
        assert!(parser().parse_row(Some(&raw)).is_err());
    }

    #[test]
    fn test_to_storage_drops_identity_and_unknown() {
        let body = row(json!({"id": 3, "label": "Blue", "inactive": true, "color": "x", "weight": null}));
        let out = parser().to_storage(&body).unwrap();
        assert_eq!(Value::Object(out), json!({"label": "Blue", "inactive": true, "weight": null}));
    }
}
