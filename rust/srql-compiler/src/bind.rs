//! Parameter binding: tags literal values for the executor and validates them.

use crate::{ast::Value, error::BindError, schema::ColumnType};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// A typed parameter as handed to the executor, `{"type": tag, "value": ...}` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum BindParam {
    Text(String),
    TextArray(Vec<String>),
    IntArray(Vec<i64>),
    Bool(bool),
    Int(i64),
    Float(f64),
    /// RFC 3339, normalized to UTC.
    Timestamptz(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Text,
    TextArray,
    IntArray,
    Bool,
    Int,
    Float,
    Timestamptz,
}

impl ParamType {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::Text => "text",
            ParamType::TextArray => "text_array",
            ParamType::IntArray => "int_array",
            ParamType::Bool => "bool",
            ParamType::Int => "int",
            ParamType::Float => "float",
            ParamType::Timestamptz => "timestamptz",
        }
    }

    /// Chooses the tag for a literal compared against a column of type `column`, if known.
    pub fn infer(value: &Value, column: Option<ColumnType>) -> Result<Self, BindError> {
        let ty = match value {
            Value::String(_) => match column {
                Some(ColumnType::Timestamptz) => ParamType::Timestamptz,
                _ => ParamType::Text,
            },
            Value::Bool(_) => ParamType::Bool,
            Value::Int(_) => match column {
                Some(ColumnType::Float) => ParamType::Float,
                _ => ParamType::Int,
            },
            Value::Float(_) => ParamType::Float,
            Value::List(items) => {
                let first = items.first().ok_or(BindError::EmptyArray)?;
                match first {
                    Value::String(_) => ParamType::TextArray,
                    Value::Int(_) => ParamType::IntArray,
                    other => {
                        return Err(BindError::TypeMismatch {
                            expected: "text or int elements",
                            found: other.type_name(),
                        })
                    }
                }
            }
            Value::Keyword(_) => return Err(BindError::Unbindable("keyword")),
            Value::Null => return Err(BindError::Unbindable("null")),
        };
        Ok(ty)
    }
}

/// Validates `value` against `ty` and produces the tagged parameter.
pub fn bind(value: &Value, ty: ParamType) -> Result<BindParam, BindError> {
    match (value, ty) {
        (Value::String(text), ParamType::Text) => Ok(BindParam::Text(text.clone())),
        (Value::String(text), ParamType::Timestamptz) => parse_timestamp(text),
        (Value::Bool(flag), ParamType::Bool) => Ok(BindParam::Bool(*flag)),
        (Value::Int(number), ParamType::Int) => Ok(BindParam::Int(*number)),
        (Value::Int(number), ParamType::Float) => Ok(BindParam::Float(*number as f64)),
        (Value::Float(number), ParamType::Float) => Ok(BindParam::Float(*number)),
        (Value::List(items), ParamType::TextArray) => {
            ensure_homogeneous(items)?;
            items
                .iter()
                .map(|item| match item {
                    Value::String(text) => Ok(text.clone()),
                    other => Err(mismatch(ty, other)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(BindParam::TextArray)
        }
        (Value::List(items), ParamType::IntArray) => {
            ensure_homogeneous(items)?;
            items
                .iter()
                .map(|item| match item {
                    Value::Int(number) => Ok(*number),
                    other => Err(mismatch(ty, other)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(BindParam::IntArray)
        }
        (Value::Keyword(_), _) => Err(BindError::Unbindable("keyword")),
        (Value::Null, _) => Err(BindError::Unbindable("null")),
        (other, _) => Err(mismatch(ty, other)),
    }
}

/// Binds an `IN` operand as one array parameter. Against a timestamp column every
/// element must parse as RFC 3339 and is normalized to UTC.
pub fn bind_list(value: &Value, column: Option<ColumnType>) -> Result<BindParam, BindError> {
    let param = bind(value, ParamType::infer(value, column)?)?;
    match (param, column.map(ColumnType::element)) {
        (BindParam::TextArray(items), Some(ColumnType::Timestamptz)) => items
            .iter()
            .map(|item| normalize_timestamp(item))
            .collect::<Result<Vec<_>, _>>()
            .map(BindParam::TextArray),
        (param, _) => Ok(param),
    }
}

fn mismatch(expected: ParamType, found: &Value) -> BindError {
    BindError::TypeMismatch {
        expected: expected.as_str(),
        found: found.type_name(),
    }
}

fn ensure_homogeneous(items: &[Value]) -> Result<(), BindError> {
    let first = items.first().ok_or(BindError::EmptyArray)?.type_name();
    match items.iter().find(|item| item.type_name() != first) {
        Some(other) => Err(BindError::MixedArray {
            first,
            other: other.type_name(),
        }),
        None => Ok(()),
    }
}

fn parse_timestamp(raw: &str) -> Result<BindParam, BindError> {
    normalize_timestamp(raw).map(BindParam::Timestamptz)
}

fn normalize_timestamp(raw: &str) -> Result<String, BindError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|parsed| {
            parsed
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::AutoSi, true)
        })
        .map_err(|_| BindError::InvalidTimestamp {
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn integer_widens_to_float_but_not_back() {
        assert_eq!(
            bind(&Value::Int(3), ParamType::Float).unwrap(),
            BindParam::Float(3.0)
        );
        assert_eq!(
            bind(&Value::Float(3.5), ParamType::Int).unwrap_err(),
            BindError::TypeMismatch {
                expected: "int",
                found: "float"
            }
        );
    }

    #[test]
    fn mixed_arrays_are_rejected() {
        let value = Value::List(vec![Value::String("a".into()), Value::Int(1)]);
        assert_eq!(
            bind(&value, ParamType::TextArray).unwrap_err(),
            BindError::MixedArray {
                first: "string",
                other: "int"
            }
        );
    }

    #[test]
    fn empty_arrays_are_rejected() {
        assert_eq!(
            ParamType::infer(&Value::List(Vec::new()), None).unwrap_err(),
            BindError::EmptyArray
        );
    }

    #[test]
    fn timestamps_require_a_zone() {
        let err = bind(
            &Value::String("2025-01-01 10:00:00".into()),
            ParamType::Timestamptz,
        )
        .unwrap_err();
        assert!(matches!(err, BindError::InvalidTimestamp { .. }));

        let ok = bind(
            &Value::String("2025-01-01T12:00:00+02:00".into()),
            ParamType::Timestamptz,
        )
        .unwrap();
        assert_eq!(ok, BindParam::Timestamptz("2025-01-01T10:00:00Z".into()));
    }

    #[test]
    fn timestamp_lists_validate_every_element() {
        let value = Value::List(vec![
            Value::String("2025-01-01T12:00:00+02:00".into()),
            Value::String("garbage".into()),
        ]);
        assert_eq!(
            bind_list(&value, Some(ColumnType::Timestamptz)).unwrap_err(),
            BindError::InvalidTimestamp {
                value: "garbage".into()
            }
        );

        let value = Value::List(vec![Value::String("2025-01-01T12:00:00+02:00".into())]);
        assert_eq!(
            bind_list(&value, Some(ColumnType::Timestamptz)).unwrap(),
            BindParam::TextArray(vec!["2025-01-01T10:00:00Z".into()])
        );

        let value = Value::List(vec![Value::String("garbage".into())]);
        assert_eq!(
            bind_list(&value, Some(ColumnType::Text)).unwrap(),
            BindParam::TextArray(vec!["garbage".into()])
        );
    }

    #[test]
    fn infers_from_column_type() {
        assert_eq!(
            ParamType::infer(&Value::String("x".into()), Some(ColumnType::Timestamptz)).unwrap(),
            ParamType::Timestamptz
        );
        assert_eq!(
            ParamType::infer(&Value::Int(1), Some(ColumnType::Float)).unwrap(),
            ParamType::Float
        );
        assert_eq!(
            ParamType::infer(&Value::List(vec![Value::Int(1)]), None).unwrap(),
            ParamType::IntArray
        );
        assert_eq!(
            ParamType::infer(&Value::Null, None).unwrap_err(),
            BindError::Unbindable("null")
        );
    }

    #[test]
    fn serializes_with_type_tag() {
        let param = BindParam::IntArray(vec![22, 443]);
        assert_eq!(
            serde_json::to_value(&param).unwrap(),
            json!({"type": "int_array", "value": [22, 443]})
        );
    }
}
