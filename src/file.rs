//! Configuration file merging.
//!
//! ```text
//! # comment
//! long-name = value
//! long-name value
//! [section]
//! ```
//!
//! Only long option names are accepted and they are never abbreviated.
//! Each entry goes through the same resolution and validation as a
//! `--name=value` token on the command line.

use crate::error::{Error, Result};
use crate::parser::apply_long;
use crate::registry::Registry;
use std::path::Path;

/// One classified configuration line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// Comment or blank line.
    Skip,
    /// `[name]` heading.
    Section(&'a str),
    /// `name = value` or `name value`. A bare `name` has an empty value.
    Entry { name: &'a str, value: &'a str },
}

/// Classify one line of a configuration file.
///
/// Leading whitespace and the whitespace around the separator are dropped.
/// The value keeps any trailing whitespace.
pub fn classify(line: &str) -> Line<'_> {
    let line = line.trim_start();
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);
    let heading = line.trim_end();
    if heading.is_empty() || line.starts_with('#') {
        return Line::Skip;
    }
    if let Some(section) = heading.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
        return Line::Section(section);
    }

    match line.find(|c: char| c == '=' || c.is_whitespace()) {
        None => Line::Entry { name: line, value: "" },
        Some(i) => {
            let rest = line[i..].trim_start();
            let value = rest.strip_prefix('=').map_or(rest, str::trim_start);
            Line::Entry {
                name: &line[..i],
                value,
            }
        }
    }
}

/// Apply configuration lines to the registry.
///
/// With a non-empty `sections` list, only entries under one of those headings
/// are applied; entries before the first heading belong to no section and are
/// skipped as well.
pub(crate) fn merge_lines<I, S>(
    registry: &mut Registry,
    lines: I,
    sections: &[String],
    ignore_unknown: bool,
) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut current: Option<String> = None;

    for line in lines {
        match classify(line.as_ref()) {
            Line::Skip => {}
            Line::Section(name) => {
                tracing::debug!(section = name, "entering section");
                current = Some(name.to_string());
            }
            Line::Entry { name, value } => {
                let wanted = sections.is_empty()
                    || current
                        .as_ref()
                        .is_some_and(|c| sections.iter().any(|s| s == c));
                if wanted {
                    apply_entry(registry, name, value, ignore_unknown)?;
                }
            }
        }
    }
    Ok(())
}

fn apply_entry(registry: &mut Registry, name: &str, value: &str, ignore_unknown: bool) -> Result<()> {
    let body = format!("{}={}", name, value);

    let canonical = match apply_long(registry, &body, &mut std::iter::empty::<String>(), false) {
        Ok(canonical) => canonical,
        Err(Error::UnknownOption(_)) if ignore_unknown => {
            tracing::debug!(option = name, "ignoring unknown option in file");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    if registry.get(&canonical).is_some_and(|def| !def.in_config()) {
        tracing::debug!(option = %canonical, "option not allowed in file, reset to default");
        registry.reset_option(&canonical);
    }
    Ok(())
}

pub(crate) fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::{ArgumentPolicy, Format, Multiplicity, OptionAttrs};
    use crate::value::Value;

    fn registry() -> Registry {
        let mut reg = Registry::new();
        reg.define(
            &["s", "long"],
            OptionAttrs::new().argument(ArgumentPolicy::Required),
        )
        .unwrap();
        reg.define(
            &["a", "long2"],
            OptionAttrs::new().argument(ArgumentPolicy::Required),
        )
        .unwrap();
        reg
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("# comment"), Line::Skip);
        assert_eq!(classify("   "), Line::Skip);
        assert_eq!(classify("[x]"), Line::Section("x"));
        assert_eq!(classify("long = hoge"), Line::Entry { name: "long", value: "hoge" });
        assert_eq!(classify("long=hoge"), Line::Entry { name: "long", value: "hoge" });
        assert_eq!(
            classify("long  hoge fuga"),
            Line::Entry { name: "long", value: "hoge fuga" }
        );
        assert_eq!(
            classify("long value = x"),
            Line::Entry { name: "long", value: "value = x" }
        );
        assert_eq!(classify("long ="), Line::Entry { name: "long", value: "" });
        assert_eq!(classify("long"), Line::Entry { name: "long", value: "" });
    }

    #[test]
    fn test_classify_keeps_trailing_whitespace_of_value() {
        assert_eq!(
            classify("  long = a b  \r\n"),
            Line::Entry { name: "long", value: "a b  " }
        );
        assert_eq!(classify("[x]  "), Line::Section("x"));
    }

    #[test]
    fn test_merge_sets_values() {
        let mut reg = registry();
        merge_lines(&mut reg, ["# comment", "long = hoge"], &[], true).unwrap();
        assert_eq!(reg.value_of("long").unwrap(), &Value::from("hoge"));
    }

    #[test]
    fn test_short_names_and_abbreviations_ignored() {
        let mut reg = registry();
        merge_lines(&mut reg, ["s = hoge", "lo = hoge"], &[], true).unwrap();
        assert!(reg.value_of("long").unwrap().is_null());
    }

    #[test]
    fn test_unknown_option_policy() {
        let mut reg = registry();
        merge_lines(&mut reg, ["long = hoge", "long3 = fuga"], &[], true).unwrap();
        assert_eq!(reg.value_of("long").unwrap(), &Value::from("hoge"));

        let err = merge_lines(&mut reg, ["long3 = fuga"], &[], false).unwrap_err();
        assert_eq!(err.to_string(), "unknown option: long3");
    }

    #[test]
    fn test_invalid_value_is_an_error_even_when_ignoring_unknown() {
        let mut reg = Registry::new();
        reg.define(&["flag"], OptionAttrs::new()).unwrap();
        assert!(matches!(
            merge_lines(&mut reg, ["flag = yes"], &[], true),
            Err(Error::UnnecessaryArgument(_))
        ));
    }

    #[test]
    fn test_bare_name_is_an_empty_value() {
        let mut reg = Registry::new();
        reg.define(&["verbose"], OptionAttrs::new()).unwrap();
        reg.define(&["output"], OptionAttrs::new().format(Format::Free))
            .unwrap();
        assert!(matches!(
            merge_lines(&mut reg, ["verbose"], &[], true),
            Err(Error::UnnecessaryArgument(name)) if name == "verbose"
        ));
        merge_lines(&mut reg, ["output"], &[], true).unwrap();
        assert_eq!(reg.value_of("output").unwrap(), &Value::from(""));
    }

    #[test]
    fn test_value_trailing_whitespace_reaches_option() {
        let mut reg = registry();
        merge_lines(&mut reg, ["long = hoge  "], &[], true).unwrap();
        assert_eq!(reg.value_of("long").unwrap(), &Value::from("hoge  "));
    }

    #[test]
    fn test_section_filter() {
        let lines = ["[x]", "long = hoge", "[y]", "long2 = fuga"];
        let mut reg = registry();
        merge_lines(&mut reg, lines, &["y".to_string()], true).unwrap();
        assert!(reg.value_of("long").unwrap().is_null());
        assert_eq!(reg.value_of("long2").unwrap(), &Value::from("fuga"));
    }

    #[test]
    fn test_no_filter_reads_every_section() {
        let lines = ["long = top", "[x]", "long2 = fuga"];
        let mut reg = registry();
        merge_lines(&mut reg, lines, &[], true).unwrap();
        assert_eq!(reg.value_of("long").unwrap(), &Value::from("top"));
        assert_eq!(reg.value_of("long2").unwrap(), &Value::from("fuga"));
    }

    #[test]
    fn test_lines_before_first_section_skipped_when_filtering() {
        let lines = ["long = top", "[opt1]", "long2 = def"];
        let mut reg = registry();
        merge_lines(&mut reg, lines, &["opt1".to_string()], true).unwrap();
        assert!(reg.value_of("long").unwrap().is_null());
        assert_eq!(reg.value_of("long2").unwrap(), &Value::from("def"));
    }

    #[test]
    fn test_in_config_false_keeps_default() {
        let mut reg = Registry::new();
        reg.define(
            &["long"],
            OptionAttrs::new()
                .format(Format::Free)
                .in_config(false)
                .default_value("dflt"),
        )
        .unwrap();
        merge_lines(&mut reg, ["long = hoge"], &[], true).unwrap();
        assert_eq!(reg.value_of("long").unwrap(), &Value::from("dflt"));
    }

    #[test]
    fn test_underscore_name_in_file() {
        let mut reg = Registry::new();
        reg.define(
            &["long-opt"],
            OptionAttrs::new()
                .format(Format::Free)
                .underscore_is_hyphen(true),
        )
        .unwrap();
        merge_lines(&mut reg, ["long_opt = hoge"], &[], true).unwrap();
        assert_eq!(reg.value_of("long-opt").unwrap(), &Value::from("hoge"));
    }

    #[test]
    fn test_file_repeats_follow_multiplicity() {
        let mut reg = Registry::new();
        reg.define(
            &["tag"],
            OptionAttrs::new()
                .format(Format::Free)
                .multiple(Multiplicity::Accumulate),
        )
        .unwrap();
        merge_lines(&mut reg, ["tag = a", "tag b"], &[], true).unwrap();
        assert_eq!(reg.value_of("tag").unwrap(), &Value::from(vec!["a", "b"]));
    }

    #[test]
    fn test_read_missing_file() {
        let err = read(Path::new("/nonexistent/optconfig.conf")).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}
