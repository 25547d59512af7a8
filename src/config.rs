//! JSON option schemas and session settings.
//!
//! A schema describes a whole option table so that it can be kept outside of
//! code, for example next to a shell script that calls the `optconfig` binary:
//!
//! ```json
//! {
//!   "settings": { "sections": ["client"] },
//!   "defaults": { "completion": false },
//!   "options": [
//!     { "names": ["p", "port=NUM"], "format": { "range": [1, 65535] },
//!       "default": 8080, "description": "port number (%s)" }
//!   ]
//! }
//! ```

use crate::error::{Error, Result};
use crate::option::{ArgumentPolicy, Format, Multiplicity, OptionAttrs, OptionDef};
use crate::parser::OptConfig;
use crate::rule::{Choices, IntRange, Integer, Literal, Pattern};
use crate::value::Value;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;

/// Settings for one parsing session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Configuration file read before the command line.
    pub file: Option<PathBuf>,
    /// Only apply file entries under these `[section]` headings. Empty
    /// means every entry applies.
    pub sections: Vec<String>,
    /// Skip file entries that name no known option instead of failing.
    pub ignore_unknown_file_option: bool,
    /// Treat everything from the first positional argument on as positional.
    pub stop_at_non_option_argument: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            file: None,
            sections: Vec::new(),
            ignore_unknown_file_option: true,
            stop_at_non_option_argument: false,
        }
    }
}

/// Argument format as written in a schema.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatSpec {
    None,
    Free,
    Boolean,
    Integer,
    /// Inclusive `[min, max]`.
    Range(i64, i64),
    /// Regular expression the argument must match somewhere.
    Pattern(String),
    Literal(String),
    Choices(Vec<String>),
}

impl FormatSpec {
    pub fn to_format(&self) -> Result<Format> {
        let format = match self {
            FormatSpec::None => Format::None,
            FormatSpec::Free => Format::Free,
            FormatSpec::Boolean => Format::Boolean,
            FormatSpec::Integer => Format::rule(Integer),
            FormatSpec::Range(min, max) => {
                if min > max {
                    return Err(Error::InvalidSchema(format!(
                        "empty range {}..{}",
                        min, max
                    )));
                }
                Format::rule(IntRange(*min..=*max))
            }
            FormatSpec::Pattern(pattern) => Format::rule(Pattern::new(pattern)?),
            FormatSpec::Literal(literal) => Format::rule(Literal(literal.clone())),
            FormatSpec::Choices(choices) => {
                if choices.is_empty() {
                    return Err(Error::InvalidSchema("'choices' is empty".to_string()));
                }
                Format::rule(Choices(choices.clone()))
            }
        };
        Ok(format)
    }
}

/// Option attributes as written in a schema. Unset fields fall back to the
/// schema defaults, then to the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttrSpec {
    #[serde(default)]
    pub argument: Option<ArgumentPolicy>,
    #[serde(default)]
    pub format: Option<FormatSpec>,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub multiple: Option<Multiplicity>,
    #[serde(default)]
    pub completion: Option<bool>,
    #[serde(default)]
    pub underscore_is_hyphen: Option<bool>,
    #[serde(default)]
    pub in_config: Option<bool>,
}

impl AttrSpec {
    pub fn to_attrs(&self) -> Result<OptionAttrs> {
        Ok(OptionAttrs {
            argument: self.argument,
            format: self.format.as_ref().map(FormatSpec::to_format).transpose()?,
            default: self.default.clone(),
            description: self.description.clone(),
            multiple: self.multiple,
            completion: self.completion,
            underscore_is_hyphen: self.underscore_is_hyphen,
            in_config: self.in_config,
            on_resolve: None,
            on_pre_validate: None,
        })
    }
}

/// One option entry of a schema.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionSpec {
    /// Short and long names, optionally with a `=ARG` or `[=ARG]` suffix.
    pub names: Vec<String>,
    #[serde(flatten)]
    pub attrs: AttrSpec,
}

/// A complete option table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub settings: Settings,
    /// Attributes shared by every option.
    #[serde(default)]
    pub defaults: AttrSpec,
    #[serde(default)]
    pub options: Vec<OptionSpec>,
}

impl Schema {
    /// Parse a JSON string into a Schema.
    pub fn from_json(json: &str) -> Result<Schema> {
        let schema: Schema = serde_json::from_str(json)?;
        Ok(schema)
    }

    /// Check names, formats and name collisions without building anything.
    pub fn validate(&self) -> Result<()> {
        let defaults = self.defaults.to_attrs()?;
        let mut seen = HashSet::new();

        for option in &self.options {
            let def = OptionDef::new(&option.names, option.attrs.to_attrs()?.or(&defaults))?;
            for name in def.names() {
                if !seen.insert(name.clone()) {
                    return Err(Error::DuplicateOption(name.clone()));
                }
            }
        }
        Ok(())
    }

    /// Build a parser with every option of the schema defined.
    pub fn build(&self) -> Result<OptConfig> {
        let mut opt =
            OptConfig::with_defaults(self.defaults.to_attrs()?).with_settings(self.settings.clone());
        for option in &self.options {
            opt.define(&option.names, option.attrs.to_attrs()?)?;
        }
        tracing::debug!(options = self.options.len(), "schema loaded");
        Ok(opt)
    }
}
