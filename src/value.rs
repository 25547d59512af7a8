//! Option values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The value held by an option.
///
/// `Null` means "not set": it is the default for options without an explicit
/// default, and the raw argument passed to coercion when no argument was
/// supplied.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Whether the value counts as "on". Only `Null` and `false` are off.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }

    /// The value a `--no-` prefix turns this into.
    pub fn negated(&self) -> Value {
        match self {
            Value::Bool(b) => Value::Bool(!b),
            other => Value::Bool(!other.is_truthy()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Str(s) => f.write_str(s),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Option<String>> for Value {
    fn from(s: Option<String>) -> Self {
        s.map_or(Value::Null, Value::Str)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negation_follows_truthiness() {
        assert_eq!(Value::Bool(true).negated(), Value::Bool(false));
        assert_eq!(Value::Bool(false).negated(), Value::Bool(true));
        assert_eq!(Value::Null.negated(), Value::Bool(true));
        assert_eq!(Value::from("hoge").negated(), Value::Bool(false));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Int(110).to_string(), "110");
        assert_eq!(Value::from(vec!["a", "b"]).to_string(), "a,b");
    }

    #[test]
    fn test_json_shape() {
        let v = Value::from(vec![Value::Int(1), Value::from("x"), Value::Null]);
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"[1,"x",null]"#);

        let back: Value = serde_json::from_str("1").unwrap();
        assert_eq!(back, Value::Int(1));
        let back: Value = serde_json::from_str("null").unwrap();
        assert_eq!(back, Value::Null);
        let back: Value = serde_json::from_str(r#""abc""#).unwrap();
        assert_eq!(back, Value::from("abc"));
    }
}
