//! SQL values and parameter handling.
//!
//! Values travel next to the rendered SQL as the ordered argument list; they
//! are only inlined into the text for explicit string literals.

use std::collections::HashMap;
use std::fmt::Write;

use crate::error::{RenderError, Result};

/// A SQL value that can be used as a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary value.
    Bytes(Vec<u8>),
    /// A placeholder whose value is bound by name after rendering.
    Unbound(String),
}

impl Value {
    /// Returns a short name for the variant.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Unbound(_) => "unbound",
        }
    }

    /// Returns the SQL representation for inline use (escaped).
    ///
    /// **Warning**: Prefer using parameterized queries instead.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null | Self::Unbound(_) => String::from("NULL"),
            Self::Bool(b) => {
                if *b {
                    String::from("TRUE")
                } else {
                    String::from("FALSE")
                }
            }
            Self::Int(n) => format!("{n}"),
            Self::Float(f) => format!("{f}"),
            Self::Text(s) => {
                // Escape single quotes by doubling them
                let escaped = s.replace('\'', "''");
                format!("'{escaped}'")
            }
            Self::Bytes(b) => {
                let mut hex = String::with_capacity(b.len() * 2);
                for byte in b {
                    let _ = write!(hex, "{byte:02x}");
                }
                format!("'\\x{hex}'")
            }
        }
    }

    /// Returns true for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Replaces every [`Value::Unbound`] in `args` with the named value.
///
/// # Errors
///
/// Returns [`RenderError::MissingNamedArg`] for a name absent from `named`.
pub fn bind(args: Vec<Value>, named: &HashMap<String, Value>) -> Result<Vec<Value>> {
    args.into_iter()
        .map(|arg| match arg {
            Value::Unbound(name) => named
                .get(&name)
                .cloned()
                .ok_or(RenderError::MissingNamedArg(name)),
            other => Ok(other),
        })
        .collect()
}

/// Trait for types that can be converted to SQL values.
pub trait ToValue {
    /// Converts the value to a [`Value`].
    fn to_value(self) -> Value;
}

impl ToValue for Value {
    fn to_value(self) -> Value {
        self
    }
}

impl ToValue for bool {
    fn to_value(self) -> Value {
        Value::Bool(self)
    }
}

impl ToValue for i64 {
    fn to_value(self) -> Value {
        Value::Int(self)
    }
}

impl ToValue for i32 {
    fn to_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl ToValue for i16 {
    fn to_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl ToValue for u32 {
    fn to_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl ToValue for u16 {
    fn to_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl ToValue for f64 {
    fn to_value(self) -> Value {
        Value::Float(self)
    }
}

impl ToValue for f32 {
    fn to_value(self) -> Value {
        Value::Float(f64::from(self))
    }
}

impl ToValue for String {
    fn to_value(self) -> Value {
        Value::Text(self)
    }
}

impl ToValue for &str {
    fn to_value(self) -> Value {
        Value::Text(String::from(self))
    }
}

impl ToValue for Vec<u8> {
    fn to_value(self) -> Value {
        Value::Bytes(self)
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(self) -> Value {
        self.map_or(Value::Null, ToValue::to_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_text_escapes_quotes() {
        assert_eq!(Value::Text("it's".into()).to_sql_inline(), "'it''s'");
        assert_eq!(Value::Bool(true).to_sql_inline(), "TRUE");
        assert_eq!(Value::Null.to_sql_inline(), "NULL");
        assert_eq!(Value::Bytes(vec![0xde, 0xad]).to_sql_inline(), "'\\xdead'");
    }

    #[test]
    fn test_to_value() {
        assert_eq!(5i32.to_value(), Value::Int(5));
        assert_eq!("x".to_value(), Value::Text("x".into()));
        assert_eq!(None::<i64>.to_value(), Value::Null);
        assert_eq!(Some(1.5f64).to_value(), Value::Float(1.5));
    }

    #[test]
    fn test_bind_unbound_values() {
        let named = HashMap::from([("id".to_string(), Value::Int(7))]);
        let args = vec![Value::Int(1), Value::Unbound("id".into())];
        assert_eq!(bind(args, &named).unwrap(), vec![Value::Int(1), Value::Int(7)]);

        let err = bind(vec![Value::Unbound("nope".into())], &named).unwrap_err();
        assert!(matches!(err, RenderError::MissingNamedArg(n) if n == "nope"));
    }
}
