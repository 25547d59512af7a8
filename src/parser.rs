//! Command-line parsing.
//!
//! [`OptConfig`] owns the option registry and the session settings. A parse
//! resets every option to its default, merges the configuration file (if
//! one is set) and then scans the command-line tokens, so command-line values
//! override file values.

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::file;
use crate::option::{ArgumentPolicy, OptionAttrs, OptionDef};
use crate::registry::Registry;
use crate::value::Value;
use std::path::{Path, PathBuf};

/// Option definitions plus the settings that control how they are parsed.
#[derive(Debug, Clone, Default)]
pub struct OptConfig {
    registry: Registry,
    settings: Settings,
    defaults: OptionAttrs,
    config_text: Option<String>,
}

impl OptConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every option defined later inherits the attributes it leaves unset
    /// from `defaults`.
    pub fn with_defaults(defaults: OptionAttrs) -> Self {
        Self {
            defaults,
            ..Self::default()
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Define an option. See [`OptionDef::new`] for the name syntax.
    pub fn define<S: AsRef<str>>(&mut self, names: &[S], attrs: OptionAttrs) -> Result<&OptionDef> {
        self.registry.define(names, attrs.or(&self.defaults))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// Read options from this file before the command line.
    pub fn set_file(&mut self, path: impl Into<PathBuf>) {
        self.settings.file = Some(path.into());
    }

    /// Use this text as configuration file contents when no file is set.
    pub fn set_config_text(&mut self, text: impl Into<String>) {
        self.config_text = Some(text.into());
    }

    /// Only apply file entries from these sections. Empty means all.
    pub fn set_sections<I, S>(&mut self, sections: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings.sections = sections.into_iter().map(Into::into).collect();
    }

    pub fn set_ignore_unknown_file_option(&mut self, ignore: bool) {
        self.settings.ignore_unknown_file_option = ignore;
    }

    pub fn set_stop_at_non_option_argument(&mut self, stop: bool) {
        self.settings.stop_at_non_option_argument = stop;
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Definitions in declaration order.
    pub fn options(&self) -> &[OptionDef] {
        self.registry.definitions()
    }

    pub fn option(&self, name: &str) -> Option<&OptionDef> {
        self.registry.get(name)
    }

    /// Current value of an option, by any of its names.
    pub fn value_of(&self, name: &str) -> Result<&Value> {
        self.registry.value_of(name)
    }

    /// Parse `args` and return the positional arguments.
    ///
    /// `args` itself is left untouched.
    pub fn parse<S: AsRef<str>>(&mut self, args: &[S]) -> Result<Vec<String>> {
        let tokens = args.iter().map(|s| s.as_ref().to_string()).collect();
        self.run(tokens)
    }

    /// Parse `args` and replace its contents with the positional arguments,
    /// which are also returned.
    ///
    /// On error `args` keeps its original contents.
    pub fn parse_in_place(&mut self, args: &mut Vec<String>) -> Result<Vec<String>> {
        let positional = self.run(args.clone())?;
        args.clone_from(&positional);
        Ok(positional)
    }

    /// Like [`parse_in_place`](Self::parse_in_place), but returns how many
    /// tokens were consumed as options and option arguments.
    pub fn parse_counted(&mut self, args: &mut Vec<String>) -> Result<usize> {
        let before = args.len();
        self.parse_in_place(args)?;
        Ok(before - args.len())
    }

    /// Apply configuration file lines on top of the current values.
    ///
    /// This is the file pass of [`parse`](Self::parse) without the reset
    /// that precedes it.
    pub fn merge_lines<I, S>(&mut self, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        file::merge_lines(
            &mut self.registry,
            lines,
            &self.settings.sections,
            self.settings.ignore_unknown_file_option,
        )
    }

    /// Read a configuration file and apply it like [`merge_lines`](Self::merge_lines).
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        tracing::debug!(path = %path.display(), "reading options file");
        let text = file::read(path)?;
        self.merge_lines(text.lines())
    }

    fn run(&mut self, tokens: Vec<String>) -> Result<Vec<String>> {
        self.registry.reset();
        if let Some(path) = self.settings.file.clone() {
            self.merge_file(&path)?;
        } else if let Some(text) = self.config_text.clone() {
            self.merge_lines(text.lines())?;
        }
        self.registry.clear_specified();

        let mut scanner = Scanner {
            registry: &mut self.registry,
            stop_at_non_option: self.settings.stop_at_non_option_argument,
        };
        scanner.scan(tokens)
    }
}

/// Walks the command-line tokens of one pass.
struct Scanner<'a> {
    registry: &'a mut Registry,
    stop_at_non_option: bool,
}

impl<'a> Scanner<'a> {
    fn scan(&mut self, tokens: Vec<String>) -> Result<Vec<String>> {
        let mut positional = Vec::new();
        let mut tokens = tokens.into_iter();

        while let Some(arg) = tokens.next() {
            if arg == "--" {
                positional.extend(tokens.by_ref());
                break;
            }

            if let Some(body) = long_body(&arg) {
                apply_long(self.registry, body, &mut tokens, true)?;
            } else if let Some(cluster) = short_cluster(&arg) {
                self.apply_short(cluster, &mut tokens)?;
            } else {
                positional.push(arg);
                if self.stop_at_non_option {
                    positional.extend(tokens.by_ref());
                    break;
                }
            }
        }

        Ok(positional)
    }

    /// Handle a cluster such as `abc` from `-abc`.
    ///
    /// Switches are set one by one until an option that takes an argument;
    /// that option swallows the rest of the cluster or the next token.
    fn apply_short(
        &mut self,
        cluster: &str,
        rest: &mut impl Iterator<Item = String>,
    ) -> Result<()> {
        for (i, c) in cluster.char_indices() {
            let name = c.to_string();
            let def = self
                .registry
                .get(&name)
                .ok_or_else(|| Error::UnknownOption(name.clone()))?;
            let takes_no_argument = def.takes_no_argument();
            let argument = def.argument();

            if takes_no_argument {
                self.registry.set(&name, Value::Bool(true))?;
                continue;
            }

            let attached = &cluster[i + c.len_utf8()..];
            let value = if !attached.is_empty() {
                Value::from(attached)
            } else if argument == ArgumentPolicy::Optional {
                Value::Bool(true)
            } else {
                Value::from(rest.next())
            };
            return self.registry.set(&name, value);
        }
        Ok(())
    }
}

/// Apply one long option, given without its leading `--`.
///
/// `body` is `name` or `name=value`. Without an attached value, an option
/// that needs an argument takes the next token from `rest`, whatever it looks
/// like. Returns the canonical name of the option.
pub(crate) fn apply_long(
    registry: &mut Registry,
    body: &str,
    rest: &mut impl Iterator<Item = String>,
    completion: bool,
) -> Result<String> {
    if let Some((name, attached)) = body.split_once('=') {
        let (canonical, negated) = registry.resolve_long(name, completion)?;
        registry.set(&canonical, Value::from(attached))?;
        if negated {
            registry.negate(&canonical);
        }
        return Ok(canonical);
    }

    let (canonical, negated) = registry.resolve_long(body, completion)?;
    let may_omit = registry
        .get(&canonical)
        .is_some_and(OptionDef::may_omit_argument);
    if may_omit {
        registry.set(&canonical, Value::Bool(!negated))?;
    } else {
        registry.set(&canonical, Value::from(rest.next()))?;
        if negated {
            registry.negate(&canonical);
        }
    }
    Ok(canonical)
}

fn long_body(arg: &str) -> Option<&str> {
    let body = arg.strip_prefix("--")?;
    body.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_')
        .then_some(body)
}

fn short_cluster(arg: &str) -> Option<&str> {
    let cluster = arg.strip_prefix('-')?;
    cluster
        .starts_with(|c: char| c.is_ascii_alphanumeric())
        .then_some(cluster)
}
