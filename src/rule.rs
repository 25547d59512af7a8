//! Validation rules for option arguments.
//!
//! A rule receives the raw argument string and either converts it into a
//! [`Value`] or rejects it with a short reason. Coercion wraps the reason into
//! [`Error::InvalidArgument`](crate::Error::InvalidArgument) together with the
//! option name and the offending value.

use crate::error::{Error, Result};
use crate::value::Value;
use regex::Regex;
use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;

/// Reason a rule rejected an argument.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct RuleError(pub String);

impl RuleError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Checks and converts a raw argument string.
pub trait Rule: fmt::Debug + Send + Sync {
    fn validate(&self, raw: &str) -> std::result::Result<Value, RuleError>;
}

/// Signed 64-bit integer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Integer;

impl Rule for Integer {
    fn validate(&self, raw: &str) -> std::result::Result<Value, RuleError> {
        raw.trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| RuleError::new("not integer"))
    }
}

/// Integer within an inclusive range, e.g. a port number `1..=65535`.
#[derive(Debug, Clone)]
pub struct IntRange(pub RangeInclusive<i64>);

impl Rule for IntRange {
    fn validate(&self, raw: &str) -> std::result::Result<Value, RuleError> {
        let n = Integer.validate(raw)?;
        match n.as_int() {
            Some(v) if self.0.contains(&v) => Ok(n),
            _ => Err(RuleError::new(format!(
                "out of range {}..{}",
                self.0.start(),
                self.0.end()
            ))),
        }
    }
}

/// Argument must contain a match of the regular expression.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|source| Error::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }
}

impl Rule for Pattern {
    fn validate(&self, raw: &str) -> std::result::Result<Value, RuleError> {
        if self.0.is_match(raw) {
            Ok(Value::from(raw))
        } else {
            Err(RuleError::new("regexp mismatch"))
        }
    }
}

/// Argument must equal the given string exactly.
#[derive(Debug, Clone)]
pub struct Literal(pub String);

impl Rule for Literal {
    fn validate(&self, raw: &str) -> std::result::Result<Value, RuleError> {
        if raw == self.0 {
            Ok(Value::from(raw))
        } else {
            Err(RuleError::new("invalid value"))
        }
    }
}

/// Argument must be one of a fixed set of strings.
#[derive(Debug, Clone)]
pub struct Choices(pub Vec<String>);

impl Rule for Choices {
    fn validate(&self, raw: &str) -> std::result::Result<Value, RuleError> {
        if self.0.iter().any(|c| c == raw) {
            Ok(Value::from(raw))
        } else {
            Err(RuleError::new(format!(
                "must be one of {}",
                self.0.join(", ")
            )))
        }
    }
}
