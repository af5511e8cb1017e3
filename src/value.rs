//! Dynamic field values and the closed set of coercible kinds.

use crate::introspect::Record;
use indexmap::IndexMap;
use serde::Serialize;
use strum::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// A field value as moved through [`Introspectable`](crate::Introspectable)
/// accessors.
///
/// There is no "absent" variant: a never-assigned field reads back as
/// `None`, which is distinct from an explicit `Value::Null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    /// Untyped key/value bag, e.g. an `object`-documented field.
    Map(IndexMap<String, Value>),
    /// Instance of a registered model type.
    Object(Record),
}

impl Value {
    /// Kind name of the value, used as the runtime type of untyped fields.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) | Value::Object(_) => "object",
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::String(_)
        )
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Object(v)
    }
}

/// Documented types that assigned values are coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    #[strum(to_string = "string")]
    String,
    #[strum(to_string = "boolean", serialize = "bool")]
    Boolean,
    #[strum(to_string = "integer", serialize = "int")]
    Integer,
    #[strum(to_string = "float", serialize = "double")]
    Float,
    #[strum(to_string = "array")]
    Array,
    #[strum(to_string = "object")]
    Object,
}

/// A scalar that has no sensible conversion to the documented kind.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot coerce {value} to {kind}")]
pub struct CoercionError {
    pub kind: ScalarKind,
    pub value: String,
}

impl ScalarKind {
    /// Look up a documented type name, accepting the short aliases
    /// (`bool`, `int`, `double`).
    pub fn from_type_name(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    /// Convert a scalar value to this kind.
    ///
    /// Only scalars are accepted; arrays, maps, objects and null are
    /// rejected for the scalar kinds.
    ///
    /// Boolean conversion treats the strings `""`, `"0"` and `"false"` as
    /// false after trimming surrounding whitespace. A PHP
    /// `(bool)` cast only treats `""` and `"0"` as false, so
    /// `"false"` and `" 0 "` differ from it here.
    pub fn coerce(self, value: Value) -> Result<Value, CoercionError> {
        match self {
            ScalarKind::String => to_string(value).map(Value::String),
            ScalarKind::Boolean => to_bool(value).map(Value::Bool),
            ScalarKind::Integer => to_int(value).map(Value::Int),
            ScalarKind::Float => to_float(value).map(Value::Float),
            ScalarKind::Array => Ok(match value {
                Value::Array(items) => Value::Array(items),
                other => Value::Array(vec![other]),
            }),
            ScalarKind::Object => Ok(match value {
                v @ (Value::Map(_) | Value::Object(_)) => v,
                other => Value::Map(IndexMap::from([("scalar".to_string(), other)])),
            }),
        }
    }

    fn reject(self, value: &Value) -> CoercionError {
        CoercionError {
            kind: self,
            value: format!("{:?}", value),
        }
    }
}

fn to_string(value: Value) -> Result<String, CoercionError> {
    match value {
        Value::String(s) => Ok(s),
        Value::Int(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Bool(true) => Ok("1".to_string()),
        Value::Bool(false) => Ok(String::new()),
        other => Err(ScalarKind::String.reject(&other)),
    }
}

fn to_bool(value: Value) -> Result<bool, CoercionError> {
    match value {
        Value::Bool(b) => Ok(b),
        Value::Int(i) => Ok(i != 0),
        Value::Float(f) => Ok(f != 0.0),
        Value::String(s) => Ok(!matches!(s.trim(), "" | "0" | "false")),
        other => Err(ScalarKind::Boolean.reject(&other)),
    }
}

fn to_int(value: Value) -> Result<i64, CoercionError> {
    match value {
        Value::Int(i) => Ok(i),
        Value::Bool(b) => Ok(b.into()),
        Value::Float(f) if f.is_finite() => Ok(f.trunc() as i64),
        Value::String(ref s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f.trunc() as i64)
                })
                .ok_or_else(|| ScalarKind::Integer.reject(&value))
        }
        other => Err(ScalarKind::Integer.reject(&other)),
    }
}

fn to_float(value: Value) -> Result<f64, CoercionError> {
    match value {
        Value::Float(f) => Ok(f),
        Value::Int(i) => Ok(i as f64),
        Value::Bool(b) => Ok(if b { 1.0 } else { 0.0 }),
        Value::String(ref s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ScalarKind::Float.reject(&value)),
        other => Err(ScalarKind::Float.reject(&other)),
    }
}
