use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

/// Field carrying the debugger namespace
pub const NAMESPACE_KEY: &str = "namespace";
/// Field carrying the log message
pub const MESSAGE_KEY: &str = "msg";
/// Field carrying the UTC wall-clock time of the call
pub const TIME_KEY: &str = "time";
/// Field carrying the elapsed time since the previous call
pub const DELTA_KEY: &str = "delta";

/// Keys whose value is computed at format time.
pub const RESERVED_KEYS: [&str; 4] = [NAMESPACE_KEY, MESSAGE_KEY, TIME_KEY, DELTA_KEY];

/// Accumulated key/value pairs of a debugger, iterated in key order.
pub type Fields = BTreeMap<String, FieldValue>;

pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// A single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Stands in for a reserved key until an entry is formatted
    Placeholder,
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    /// Textual description of an error
    Error(String),
    Json(serde_json::Value),
}

impl FieldValue {
    /// Capture an error by its description.
    pub fn error<E: std::error::Error + ?Sized>(err: &E) -> Self {
        FieldValue::Error(err.to_string())
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, FieldValue::Placeholder)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Placeholder => serializer.serialize_unit(),
            FieldValue::Str(s) | FieldValue::Error(s) => serializer.serialize_str(s),
            FieldValue::Int(n) => serializer.serialize_i64(*n),
            FieldValue::UInt(n) => serializer.serialize_u64(*n),
            FieldValue::Float(n) => serializer.serialize_f64(*n),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Json(value) => value.serialize(serializer),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Placeholder => Ok(()),
            FieldValue::Str(s) | FieldValue::Error(s) => f.write_str(s),
            FieldValue::Int(n) => write!(f, "{}", n),
            FieldValue::UInt(n) => write!(f, "{}", n),
            FieldValue::Float(n) => write!(f, "{}", n),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Json(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        FieldValue::Str(s.clone())
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<f32> for FieldValue {
    fn from(n: f32) -> Self {
        FieldValue::Float(f64::from(n))
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Float(n)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        FieldValue::Json(value)
    }
}

macro_rules! impl_from_int {
    ($variant:ident, $target:ty: $($ty:ty),*) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(n: $ty) -> Self {
                    FieldValue::$variant(n as $target)
                }
            }
        )*
    };
}

impl_from_int!(Int, i64: i8, i16, i32, i64, isize);
impl_from_int!(UInt, u64: u8, u16, u32, u64, usize);
