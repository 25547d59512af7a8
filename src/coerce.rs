//! Conversion of raw option arguments into typed values.

use crate::error::{Error, Result};
use crate::option::{ArgumentPolicy, Format, OptionDef};
use crate::value::Value;

const TRUE_WORDS: [&str; 6] = ["1", "true", "enable", "yes", "y", "on"];
const FALSE_WORDS: [&str; 6] = ["0", "false", "disable", "no", "n", "off"];

/// Check `raw` against the option's argument policy and format.
///
/// `raw` is `Value::Null` when no argument was supplied, otherwise a string.
/// `name` is the name the option was referred to by and is used in errors.
pub fn coerce(name: &str, def: &OptionDef, raw: Value) -> Result<Value> {
    if def.takes_no_argument() {
        return Err(Error::UnnecessaryArgument(name.to_string()));
    }

    let raw = match raw {
        Value::Null if def.argument() == ArgumentPolicy::Optional => return Ok(Value::Bool(true)),
        Value::Null => return Err(Error::ArgumentRequired(name.to_string())),
        Value::Str(s) => s,
        // Callbacks may hand back something other than a string.
        other => return Ok(other),
    };

    match def.format() {
        Format::None | Format::Free => Ok(Value::Str(raw)),
        Format::Boolean => parse_bool(&raw).map(Value::Bool).ok_or_else(|| Error::InvalidArgument {
            name: name.to_string(),
            value: raw.clone(),
            reason: None,
        }),
        Format::Rule(rule) => rule.validate(&raw).map_err(|e| Error::InvalidArgument {
            name: name.to_string(),
            value: raw.clone(),
            reason: Some(e.to_string()),
        }),
    }
}

/// Map a boolean word to its value, ignoring case.
pub fn parse_bool(word: &str) -> Option<bool> {
    let word = word.to_ascii_lowercase();
    if TRUE_WORDS.contains(&word.as_str()) {
        Some(true)
    } else if FALSE_WORDS.contains(&word.as_str()) {
        Some(false)
    } else {
        None
    }
}
