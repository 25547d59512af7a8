//! The option registry: definitions, name lookup and value storage.

use crate::coerce::coerce;
use crate::error::{Error, Result};
use crate::option::{is_long_name, is_valid_name, Multiplicity, OptionAttrs, OptionDef};
use crate::value::Value;
use std::collections::{HashMap, HashSet};

/// Option definitions indexed by every name that refers to them.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    defs: Vec<OptionDef>,
    by_name: HashMap<String, usize>,
    /// Names already set during the current pass.
    specified: HashSet<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new option under all of its names.
    ///
    /// Fails without registering anything if one of the names is taken.
    pub fn define<S: AsRef<str>>(&mut self, names: &[S], attrs: OptionAttrs) -> Result<&OptionDef> {
        let def = OptionDef::new(names, attrs)?;
        if let Some(taken) = def.names().iter().find(|n| self.by_name.contains_key(*n)) {
            return Err(Error::DuplicateOption(taken.clone()));
        }

        let idx = self.defs.len();
        for name in def.names() {
            self.by_name.insert(name.clone(), idx);
        }
        self.defs.push(def);
        Ok(&self.defs[idx])
    }

    /// Definitions in declaration order.
    pub fn definitions(&self) -> &[OptionDef] {
        &self.defs
    }

    pub fn get(&self, name: &str) -> Option<&OptionDef> {
        self.by_name.get(name).map(|&idx| &self.defs[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn value_of(&self, name: &str) -> Result<&Value> {
        self.get(name)
            .map(OptionDef::value)
            .ok_or_else(|| Error::UnknownOption(name.to_string()))
    }

    /// Put every option back to its default and forget what was specified.
    pub fn reset(&mut self) {
        for def in &mut self.defs {
            def.reset();
        }
        self.specified.clear();
    }

    /// Start a new pass: repeated options are counted from zero again.
    pub fn clear_specified(&mut self) {
        self.specified.clear();
    }

    /// Resolve a long option token to a canonical name.
    ///
    /// Returns the name and whether the token used the `no-` form. Candidate
    /// spellings are tried in this order, the first hit wins:
    ///
    /// 1. the token itself;
    /// 2. `no-<rest>`, if `<rest>` names a negatable option;
    /// 3. the token with `_` read as `-`, if the option allows it;
    /// 4. step 2 applied to the spelling from step 3.
    ///
    /// With `completion`, each spelling may also be the prefix of exactly
    /// one name, and a prefix shared by several names is ambiguous.
    pub fn resolve_long(&self, token: &str, completion: bool) -> Result<(String, bool)> {
        if let Some(name) = self.lookup_long(token, completion)? {
            return Ok((name, false));
        }
        if let Some(name) = self.lookup_negated(token, completion, |_| true)? {
            return Ok((name, true));
        }

        if token.contains('_') {
            let hyphenated = token.replace('_', "-");
            if let Some(name) = self.lookup_long(&hyphenated, completion)? {
                if self.defs[self.by_name[&name]].underscore_is_hyphen() {
                    return Ok((name, false));
                }
            }
            let negated =
                self.lookup_negated(&hyphenated, completion, OptionDef::underscore_is_hyphen)?;
            if let Some(name) = negated {
                return Ok((name, true));
            }
        }

        Err(Error::UnknownOption(token.to_string()))
    }

    fn lookup_negated(
        &self,
        token: &str,
        completion: bool,
        accept: impl Fn(&OptionDef) -> bool,
    ) -> Result<Option<String>> {
        let Some(rest) = token.strip_prefix("no-") else {
            return Ok(None);
        };
        if !is_valid_name(rest) || !is_long_name(rest) {
            return Ok(None);
        }
        Ok(self.lookup_long(rest, completion)?.filter(|name| {
            let def = &self.defs[self.by_name[name]];
            def.is_negatable() && accept(def)
        }))
    }

    /// Look up one spelling. Without `completion` only exact long names
    /// match. With it, any exact name matches, and otherwise every name
    /// starting with `name` is a candidate, aliases of one option included.
    fn lookup_long(&self, name: &str, completion: bool) -> Result<Option<String>> {
        if !completion {
            let found = is_long_name(name) && self.by_name.contains_key(name);
            return Ok(found.then(|| name.to_string()));
        }
        if self.by_name.contains_key(name) {
            return Ok(Some(name.to_string()));
        }

        let mut candidates: Vec<&String> = self
            .by_name
            .keys()
            .filter(|n| n.starts_with(name))
            .collect();
        candidates.sort();

        match candidates.as_slice() {
            [] => Ok(None),
            [only] if !self.defs[self.by_name[*only]].completion() => Ok(None),
            [only] => Ok(Some((*only).clone())),
            _ => Err(Error::AmbiguousOption {
                name: name.to_string(),
                candidates: candidates.iter().map(|n| (*n).clone()).collect(),
            }),
        }
    }

    /// Apply one occurrence of an option.
    ///
    /// `raw` is `Null` (no argument), a string argument, or a boolean for
    /// switches that need no coercion.
    pub fn set(&mut self, name: &str, raw: Value) -> Result<()> {
        let idx = *self
            .by_name
            .get(name)
            .ok_or_else(|| Error::UnknownOption(name.to_string()))?;
        let def = &self.defs[idx];

        let mut value = raw;
        if let Some(pre) = def.on_pre_validate() {
            value = pre(name, def, value);
        }
        if def.multiple() == Multiplicity::Forbid && self.specified.contains(name) {
            return Err(Error::DuplicatedOption(name.to_string()));
        }
        if !matches!(value, Value::Bool(_)) {
            value = coerce(name, def, value)?;
        }
        if let Some(post) = def.on_resolve() {
            value = post(name, def, value);
        }

        tracing::trace!(option = name, value = %value, "option set");
        let first = self.specified.insert(name.to_string());
        let def = &mut self.defs[idx];
        match def.multiple() {
            Multiplicity::Accumulate => match &mut def.value {
                Value::List(items) if !first => items.push(value),
                slot => *slot = Value::List(vec![value]),
            },
            Multiplicity::Last | Multiplicity::Forbid => def.value = value,
        }
        Ok(())
    }

    /// Replace an option's value with its `--no-` counterpart.
    pub(crate) fn negate(&mut self, name: &str) {
        if let Some(&idx) = self.by_name.get(name) {
            let def = &mut self.defs[idx];
            def.value = def.value.negated();
        }
    }

    pub(crate) fn reset_option(&mut self, name: &str) {
        if let Some(&idx) = self.by_name.get(name) {
            self.defs[idx].reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::{ArgumentPolicy, Format};

    fn registry(defs: &[&[&str]]) -> Registry {
        let mut reg = Registry::new();
        for names in defs {
            reg.define(*names, OptionAttrs::new()).unwrap();
        }
        reg
    }

    #[test]
    fn test_duplicate_definition() {
        let mut reg = registry(&[&["s"]]);
        let err = reg.define(&["x", "s"], OptionAttrs::new()).unwrap_err();
        assert_eq!(err.to_string(), "option s is already defined");
        assert!(!reg.contains("x"));
    }

    #[test]
    fn test_value_of_unknown() {
        let reg = Registry::new();
        assert_eq!(
            reg.value_of("hoge").unwrap_err().to_string(),
            "unknown option: hoge"
        );
    }

    #[test]
    fn test_completion() {
        let reg = registry(&[&["longhoge"], &["longfuga"]]);
        assert_eq!(reg.resolve_long("longh", true).unwrap(), ("longhoge".into(), false));
        assert!(matches!(
            reg.resolve_long("longh", false),
            Err(Error::UnknownOption(_))
        ));
    }

    #[test]
    fn test_ambiguous_candidates_sorted() {
        let reg = registry(&[&["longhoge"], &["longfuga"]]);
        match reg.resolve_long("long", true) {
            Err(Error::AmbiguousOption { name, candidates }) => {
                assert_eq!(name, "long");
                assert_eq!(candidates, ["longfuga", "longhoge"]);
            }
            other => panic!("expected AmbiguousOption, got {:?}", other),
        }
    }

    #[test]
    fn test_prefix_of_aliases_is_ambiguous() {
        let reg = registry(&[&["long1", "long2"]]);
        match reg.resolve_long("lon", true) {
            Err(Error::AmbiguousOption { name, candidates }) => {
                assert_eq!(name, "lon");
                assert_eq!(candidates, ["long1", "long2"]);
            }
            other => panic!("expected AmbiguousOption, got {:?}", other),
        }
        assert_eq!(reg.resolve_long("long2", true).unwrap().0, "long2");
    }

    #[test]
    fn test_single_character_prefix() {
        let reg = registry(&[&["long"]]);
        assert_eq!(reg.resolve_long("l", true).unwrap(), ("long".into(), false));
        assert!(reg.resolve_long("l", false).is_err());
    }

    #[test]
    fn test_exact_match_beats_prefix() {
        let reg = registry(&[&["long"], &["longer"]]);
        assert_eq!(reg.resolve_long("long", true).unwrap().0, "long");
    }

    #[test]
    fn test_completion_disabled_per_option() {
        let mut reg = Registry::new();
        reg.define(&["longhoge"], OptionAttrs::new().completion(false))
            .unwrap();
        reg.define(&["longfuga"], OptionAttrs::new()).unwrap();
        assert_eq!(
            reg.resolve_long("longh", true).unwrap_err().to_string(),
            "unknown option: longh"
        );
        assert_eq!(reg.resolve_long("longf", true).unwrap().0, "longfuga");
        assert_eq!(reg.resolve_long("longhoge", true).unwrap().0, "longhoge");
        // Options without completion still count as candidates.
        match reg.resolve_long("long", true) {
            Err(Error::AmbiguousOption { candidates, .. }) => {
                assert_eq!(candidates, ["longfuga", "longhoge"]);
            }
            other => panic!("expected AmbiguousOption, got {:?}", other),
        }
    }

    #[test]
    fn test_short_name_resolves_only_exactly() {
        let reg = registry(&[&["s", "long"]]);
        assert_eq!(reg.resolve_long("s", true).unwrap(), ("s".into(), false));
        assert!(reg.resolve_long("s", false).is_err());
        assert!(reg.resolve_long("no-s", true).is_err());
    }

    #[test]
    fn test_negation_requires_negatable_option() {
        let mut reg = Registry::new();
        reg.define(&["flag"], OptionAttrs::new()).unwrap();
        reg.define(&["name"], OptionAttrs::new().argument(ArgumentPolicy::Required))
            .unwrap();
        assert_eq!(reg.resolve_long("no-flag", true).unwrap(), ("flag".into(), true));
        assert!(matches!(
            reg.resolve_long("no-name", true),
            Err(Error::UnknownOption(n)) if n == "no-name"
        ));
    }

    #[test]
    fn test_underscore_equivalence() {
        let mut reg = Registry::new();
        reg.define(
            &["long-opt"],
            OptionAttrs::new()
                .format(Format::Boolean)
                .argument(ArgumentPolicy::Forbidden)
                .underscore_is_hyphen(true),
        )
        .unwrap();
        reg.define(&["other-opt"], OptionAttrs::new()).unwrap();

        assert_eq!(reg.resolve_long("long_opt", false).unwrap(), ("long-opt".into(), false));
        assert_eq!(reg.resolve_long("no_long_opt", true).unwrap(), ("long-opt".into(), true));
        assert!(reg.resolve_long("other_opt", true).is_err());
    }

    #[test]
    fn test_accumulate_restarts_after_reset() {
        let mut reg = Registry::new();
        reg.define(
            &["s"],
            OptionAttrs::new()
                .format(Format::Free)
                .multiple(Multiplicity::Accumulate),
        )
        .unwrap();
        reg.set("s", "1".into()).unwrap();
        reg.set("s", "2".into()).unwrap();
        assert_eq!(reg.value_of("s").unwrap(), &Value::from(vec!["1", "2"]));

        reg.clear_specified();
        reg.set("s", "3".into()).unwrap();
        assert_eq!(reg.value_of("s").unwrap(), &Value::from(vec!["3"]));
    }

    #[test]
    fn test_forbid_counts_each_name_separately() {
        let mut reg = Registry::new();
        reg.define(
            &["s", "long"],
            OptionAttrs::new()
                .format(Format::Free)
                .multiple(Multiplicity::Forbid),
        )
        .unwrap();
        reg.set("s", "1".into()).unwrap();
        reg.set("long", "2".into()).unwrap();
        assert_eq!(reg.value_of("s").unwrap(), &Value::from("2"));
        assert_eq!(
            reg.set("long", "3".into()).unwrap_err().to_string(),
            "duplicated option: long"
        );
    }

    #[test]
    fn test_accumulate_restarts_for_another_name() {
        let mut reg = Registry::new();
        reg.define(
            &["s", "long"],
            OptionAttrs::new()
                .format(Format::Free)
                .multiple(Multiplicity::Accumulate),
        )
        .unwrap();
        reg.set("s", "1".into()).unwrap();
        reg.set("long", "2".into()).unwrap();
        assert_eq!(reg.value_of("long").unwrap(), &Value::from(vec!["2"]));
        reg.set("long", "3".into()).unwrap();
        assert_eq!(reg.value_of("s").unwrap(), &Value::from(vec!["2", "3"]));
    }
}
