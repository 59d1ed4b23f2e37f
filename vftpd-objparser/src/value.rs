use std::collections::HashMap;

/// A single decoded value from the object format.
///
/// `Map` keys are always the "stringified" canonical text form of the
/// original key (see the grammar notes in the crate docs); compound keys
/// (arrays or maps) are parsed but dropped from the result.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    /// `bits` carries the exact `=HEXDIGITS` bit pattern when the source
    /// supplied one; it overrides the decimal for equality purposes.
    Float(f64, Option<u64>),
    Str(String),
    Array(Vec<Value>),
    Map(HashMap<String, Value>),
}

impl Value {
    /// Canonical text form used when a scalar appears as a map key.
    pub fn to_key_string(&self) -> Option<String> {
        match self {
            Value::Null => Some("nil".to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f, _) => Some(f.to_string()),
            Value::Str(s) => Some(s.clone()),
            Value::Array(_) | Value::Map(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }
}

// `Eq` is sound here even though `f64` isn't `Eq`: every `Float` that can
// reach this type came from a finite decimal literal, never NaN.
impl std::cmp::Eq for Value {}
