//! Option definitions and their attributes.

use crate::error::{Error, Result};
use crate::rule::Rule;
use crate::value::Value;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Hook invoked with the matched option name, the definition and a value.
///
/// The returned value replaces the one passed in.
pub type Callback = Arc<dyn Fn(&str, &OptionDef, Value) -> Value + Send + Sync + 'static>;

/// Whether an option takes an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentPolicy {
    Required,
    Forbidden,
    Optional,
    /// Required when a format is declared, forbidden otherwise.
    #[default]
    Implicit,
}

/// Expected shape of an option argument.
#[derive(Debug, Clone, Default)]
pub enum Format {
    /// The option takes no argument.
    #[default]
    None,
    /// Any string, passed through unchanged.
    Free,
    /// `yes`/`no` style words converted to a boolean.
    Boolean,
    /// Checked and converted by a validation rule.
    Rule(Arc<dyn Rule>),
}

impl Format {
    pub fn rule(rule: impl Rule + 'static) -> Self {
        Format::Rule(Arc::new(rule))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Format::None)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Format::Boolean)
    }
}

/// What happens when an option is given more than once in a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Multiplicity {
    /// The last occurrence wins.
    #[default]
    Last,
    /// Every occurrence is collected into a list.
    Accumulate,
    /// A second occurrence is an error.
    Forbid,
}

/// Attributes for a new option.
///
/// Every field is optional so that a set of attributes can be layered over
/// registry-wide defaults with [`OptionAttrs::or`].
#[derive(Clone, Default)]
pub struct OptionAttrs {
    pub argument: Option<ArgumentPolicy>,
    pub format: Option<Format>,
    pub default: Option<Value>,
    pub description: Option<String>,
    pub multiple: Option<Multiplicity>,
    pub completion: Option<bool>,
    pub underscore_is_hyphen: Option<bool>,
    pub in_config: Option<bool>,
    pub on_resolve: Option<Callback>,
    pub on_pre_validate: Option<Callback>,
}

impl OptionAttrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn argument(mut self, policy: ArgumentPolicy) -> Self {
        self.argument = Some(policy);
        self
    }

    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn multiple(mut self, multiple: Multiplicity) -> Self {
        self.multiple = Some(multiple);
        self
    }

    pub fn completion(mut self, enabled: bool) -> Self {
        self.completion = Some(enabled);
        self
    }

    pub fn underscore_is_hyphen(mut self, enabled: bool) -> Self {
        self.underscore_is_hyphen = Some(enabled);
        self
    }

    pub fn in_config(mut self, enabled: bool) -> Self {
        self.in_config = Some(enabled);
        self
    }

    /// Runs after the argument has been validated; the result becomes the
    /// option value.
    pub fn on_resolve<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &OptionDef, Value) -> Value + Send + Sync + 'static,
    {
        self.on_resolve = Some(Arc::new(f));
        self
    }

    /// Runs before validation; the result becomes the raw argument.
    pub fn on_pre_validate<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &OptionDef, Value) -> Value + Send + Sync + 'static,
    {
        self.on_pre_validate = Some(Arc::new(f));
        self
    }

    /// Fill every unset attribute from `defaults`.
    pub fn or(self, defaults: &OptionAttrs) -> OptionAttrs {
        OptionAttrs {
            argument: self.argument.or(defaults.argument),
            format: self.format.or_else(|| defaults.format.clone()),
            default: self.default.or_else(|| defaults.default.clone()),
            description: self.description.or_else(|| defaults.description.clone()),
            multiple: self.multiple.or(defaults.multiple),
            completion: self.completion.or(defaults.completion),
            underscore_is_hyphen: self.underscore_is_hyphen.or(defaults.underscore_is_hyphen),
            in_config: self.in_config.or(defaults.in_config),
            on_resolve: self.on_resolve.or_else(|| defaults.on_resolve.clone()),
            on_pre_validate: self
                .on_pre_validate
                .or_else(|| defaults.on_pre_validate.clone()),
        }
    }
}

impl fmt::Debug for OptionAttrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionAttrs")
            .field("argument", &self.argument)
            .field("format", &self.format)
            .field("default", &self.default)
            .field("description", &self.description)
            .field("multiple", &self.multiple)
            .field("completion", &self.completion)
            .field("underscore_is_hyphen", &self.underscore_is_hyphen)
            .field("in_config", &self.in_config)
            .field("on_resolve", &self.on_resolve.is_some())
            .field("on_pre_validate", &self.on_pre_validate.is_some())
            .finish()
    }
}

/// One logical option, reachable by any of its names.
#[derive(Clone)]
pub struct OptionDef {
    names: Vec<String>,
    usage_names: Vec<String>,
    argument: ArgumentPolicy,
    format: Format,
    default: Value,
    description: Option<String>,
    multiple: Multiplicity,
    completion: bool,
    underscore_is_hyphen: bool,
    in_config: bool,
    on_resolve: Option<Callback>,
    on_pre_validate: Option<Callback>,
    pub(crate) value: Value,
}

impl OptionDef {
    /// Build a definition from its names and attributes.
    ///
    /// A name may carry a `=arg` suffix (argument required) or `[=arg]`
    /// suffix (argument optional). The suffix is dropped from the name and
    /// only applies when `attrs.argument` is unset.
    pub fn new<S: AsRef<str>>(names: &[S], attrs: OptionAttrs) -> Result<Self> {
        if names.is_empty() {
            return Err(Error::NoOptionName);
        }

        let mut parsed = Vec::with_capacity(names.len());
        let mut suffix_policy = None;
        for raw in names {
            let (name, policy) = split_name(raw.as_ref())?;
            if parsed.iter().any(|n| n == name) {
                return Err(Error::DuplicateOption(name.to_string()));
            }
            parsed.push(name.to_string());
            if policy.is_some() {
                suffix_policy = policy;
            }
        }

        let argument = attrs
            .argument
            .or(suffix_policy)
            .unwrap_or(ArgumentPolicy::Implicit);
        let format = attrs.format.unwrap_or(match argument {
            ArgumentPolicy::Required | ArgumentPolicy::Optional => Format::Free,
            _ => Format::None,
        });
        let default = attrs.default.unwrap_or_default();

        Ok(OptionDef {
            names: parsed,
            usage_names: names.iter().map(|n| n.as_ref().to_string()).collect(),
            argument,
            format,
            value: default.clone(),
            default,
            description: attrs.description,
            multiple: attrs.multiple.unwrap_or_default(),
            completion: attrs.completion.unwrap_or(true),
            underscore_is_hyphen: attrs.underscore_is_hyphen.unwrap_or(false),
            in_config: attrs.in_config.unwrap_or(true),
            on_resolve: attrs.on_resolve,
            on_pre_validate: attrs.on_pre_validate,
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Names as they were declared, including any `=arg` suffix.
    pub fn usage_names(&self) -> &[String] {
        &self.usage_names
    }

    pub fn argument(&self) -> ArgumentPolicy {
        self.argument
    }

    pub fn format(&self) -> &Format {
        &self.format
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn multiple(&self) -> Multiplicity {
        self.multiple
    }

    pub fn completion(&self) -> bool {
        self.completion
    }

    pub fn underscore_is_hyphen(&self) -> bool {
        self.underscore_is_hyphen
    }

    pub fn in_config(&self) -> bool {
        self.in_config
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub(crate) fn on_resolve(&self) -> Option<&Callback> {
        self.on_resolve.as_ref()
    }

    pub(crate) fn on_pre_validate(&self) -> Option<&Callback> {
        self.on_pre_validate.as_ref()
    }

    /// True when the option never accepts an argument.
    pub fn takes_no_argument(&self) -> bool {
        match self.argument {
            ArgumentPolicy::Forbidden => true,
            ArgumentPolicy::Implicit => self.format.is_none(),
            _ => false,
        }
    }

    /// True when the option can be given without an argument.
    pub fn may_omit_argument(&self) -> bool {
        self.takes_no_argument() || self.argument == ArgumentPolicy::Optional
    }

    /// Whether a `--no-` form of a long name refers to this option.
    pub fn is_negatable(&self) -> bool {
        self.may_omit_argument() || self.format.is_boolean()
    }

    pub(crate) fn reset(&mut self) {
        self.value = self.default.clone();
    }
}

impl fmt::Debug for OptionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionDef")
            .field("names", &self.names)
            .field("argument", &self.argument)
            .field("format", &self.format)
            .field("default", &self.default)
            .field("multiple", &self.multiple)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

/// True for a short (`x`) or long (`long-name`) option name.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphanumeric() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        }
        _ => false,
    }
}

pub(crate) fn is_long_name(name: &str) -> bool {
    name.len() > 1
}

/// Split a declared name into the bare name and the argument policy implied
/// by its suffix.
fn split_name(raw: &str) -> Result<(&str, Option<ArgumentPolicy>)> {
    let (name, policy) = match raw.find(['=', '[']) {
        None => (raw, None),
        Some(i) => {
            let suffix = &raw[i..];
            let policy = if suffix.starts_with("[=") {
                ArgumentPolicy::Optional
            } else if suffix.starts_with('=') {
                ArgumentPolicy::Required
            } else {
                return Err(Error::InvalidOptionName(raw.to_string()));
            };
            (&raw[..i], Some(policy))
        }
    };
    if !is_valid_name(name) {
        return Err(Error::InvalidOptionName(raw.to_string()));
    }
    Ok((name, policy))
}
