//! Named enum tables exposed to expressions
//!
//! Each table is a map-valued variable from a symbolic name to the integer code
//! used in the projected input, e.g. `pkg.ecosystem == Ecosystem.NPM`. Tables
//! are generated from the enum definitions themselves so they cannot drift.

use super::{EngineError, EngineResult};
use crate::models::{PolicyEcosystem, ProjectSourceType};
use cel_interpreter::Value;
use cel_interpreter::objects::{Key, Map};
use std::collections::HashMap;
use std::sync::Arc;
use strum::IntoEnumIterator;

/// A named enum table registered in the evaluation environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumTable {
    name: &'static str,
    prefix: &'static str,
    entries: Vec<(&'static str, i64)>,
}

impl EnumTable {
    #[must_use]
    pub const fn new(name: &'static str, prefix: &'static str, entries: Vec<(&'static str, i64)>) -> Self {
        Self { name, prefix, entries }
    }

    fn from_enum<E>(name: &'static str, prefix: &'static str, code: fn(E) -> i64) -> Self
    where
        E: IntoEnumIterator + Into<&'static str> + Copy,
    {
        let entries = E::iter().map(|variant| (variant.into(), code(variant))).collect();
        Self::new(name, prefix, entries)
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Build the map value bound under [`Self::name`], with the common prefix stripped from every constant.
    pub(super) fn to_value(&self, evaluator: &str) -> EngineResult<Value> {
        let mut map = HashMap::with_capacity(self.entries.len());

        for (constant, code) in &self.entries {
            let short = constant.strip_prefix(self.prefix).filter(|s| !s.is_empty()).ok_or_else(|| EngineError::Environment {
                evaluator: evaluator.to_string(),
                reason: format!("constant '{constant}' of enum table '{}' does not start with '{}'", self.name, self.prefix),
            })?;

            if map.insert(Key::String(Arc::new(short.to_string())), Value::Int(*code)).is_some() {
                return Err(EngineError::Environment {
                    evaluator: evaluator.to_string(),
                    reason: format!("enum table '{}' declares '{short}' more than once", self.name),
                });
            }
        }

        Ok(Value::Map(Map::from(map)))
    }
}

/// The tables every policy evaluator registers.
#[must_use]
pub fn registered_tables() -> Vec<EnumTable> {
    vec![
        EnumTable::from_enum::<ProjectSourceType>("ProjectSourceType", "PROJECT_SOURCE_TYPE_", ProjectSourceType::code),
        EnumTable::from_enum::<PolicyEcosystem>("Ecosystem", "ECOSYSTEM_", PolicyEcosystem::code),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(value: &Value, key: &str) -> Option<Value> {
        match value {
            Value::Map(map) => map.map.get(&Key::String(Arc::new(key.to_string()))).cloned(),
            _ => None,
        }
    }

    #[test]
    fn test_registered_tables_strip_prefixes() {
        let tables = registered_tables();
        let names: Vec<_> = tables.iter().map(EnumTable::name).collect();
        assert_eq!(names, vec!["ProjectSourceType", "Ecosystem"]);

        let source_types = tables[0].to_value("test").unwrap();
        assert_eq!(lookup(&source_types, "GITHUB"), Some(Value::Int(1)));
        assert_eq!(lookup(&source_types, "PROJECT_SOURCE_TYPE_GITHUB"), None);

        let ecosystems = tables[1].to_value("test").unwrap();
        assert_eq!(lookup(&ecosystems, "NPM"), Some(Value::Int(PolicyEcosystem::Npm.code())));
        assert_eq!(lookup(&ecosystems, "GITHUB_ACTIONS"), Some(Value::Int(PolicyEcosystem::GitHubActions.code())));
        assert_eq!(lookup(&ecosystems, "UNSPECIFIED"), Some(Value::Int(0)));
    }

    #[test]
    fn test_missing_prefix_is_an_environment_error() {
        let table = EnumTable::new("Broken", "BROKEN_", vec![("BROKEN_A", 0), ("OTHER_B", 1)]);
        let err = table.to_value("test").unwrap_err();
        assert!(matches!(err, EngineError::Environment { .. }));
    }

    #[test]
    fn test_bare_prefix_is_an_environment_error() {
        let table = EnumTable::new("Broken", "BROKEN_", vec![("BROKEN_", 0)]);
        let _ = table.to_value("test").unwrap_err();
    }

    #[test]
    fn test_duplicate_constant_is_an_environment_error() {
        let table = EnumTable::new("Dup", "DUP_", vec![("DUP_A", 0), ("DUP_A", 1)]);
        let err = table.to_value("test").unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }
}
