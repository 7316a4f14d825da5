//! Answer sets: the key/value mapping that drives a template render.
//!
//! Answers are kept in a `BTreeMap` so every serialisation is sorted by key,
//! which keeps diffs stable. Keys starting with [`INTERNAL_PREFIX`] are
//! bookkeeping written by the engine (`_src_path`, `_commit`, ...) and are
//! never part of a comparison.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::domain::error::DomainError;

/// Name of the answers file the engine persists in a rendered project.
pub const ANSWERS_FILE: &str = ".copier-answers.yml";

/// Prefix marking engine bookkeeping keys.
pub const INTERNAL_PREFIX: &str = "_";

/// Whether `key` is engine bookkeeping rather than a user answer.
pub fn is_internal(key: &str) -> bool {
    key.starts_with(INTERNAL_PREFIX)
}

/// An ordered mapping of answer keys to arbitrary YAML values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answers(BTreeMap<String, Value>);

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Parse an answers document.
    ///
    /// An empty document is an empty answer set; anything other than a
    /// mapping with string keys is rejected.
    ///
    /// Parsing follows YAML 1.2, while copier writes answers files with a
    /// YAML 1.1 dumper. Copier quotes strings that 1.1 would retype, so its
    /// own files read back unchanged, but a hand-written expected file must
    /// spell booleans `true`/`false`: a plain `yes`, `on` or `off` stays a
    /// string here.
    pub fn from_yaml(source: &str) -> Result<Self, DomainError> {
        let document: Value =
            serde_yaml::from_str(source).map_err(|e| DomainError::InvalidAnswers {
                reason: e.to_string(),
            })?;

        match document {
            Value::Null => Ok(Self::new()),
            Value::Mapping(mapping) => {
                let mut answers = Self::new();
                for (key, value) in mapping {
                    let Value::String(key) = key else {
                        return Err(DomainError::InvalidAnswers {
                            reason: format!("non-string key {key:?}"),
                        });
                    };
                    answers.insert(key, value);
                }
                Ok(answers)
            }
            other => Err(DomainError::InvalidAnswers {
                reason: format!("expected a mapping, found {}", kind_of(&other)),
            }),
        }
    }

    /// Serialise as YAML with sorted keys.
    pub fn to_yaml(&self) -> Result<String, DomainError> {
        if self.is_empty() {
            return Ok("{}\n".into());
        }
        serde_yaml::to_string(&self.0).map_err(|e| DomainError::InvalidAnswers {
            reason: e.to_string(),
        })
    }

    /// Copy of this set without internal keys.
    pub fn filtered(&self) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(key, _)| !is_internal(key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }

    /// `defaults` overlaid with `overrides`; override values win.
    pub fn merged(defaults: &Self, overrides: &Self) -> Self {
        let mut merged = defaults.clone();
        merged.extend(overrides.clone());
        merged
    }

    /// Sorted YAML lines of the filtered set, as shown in diffs.
    pub fn comparison_lines(&self) -> Vec<String> {
        let filtered = self.filtered();
        match filtered.to_yaml() {
            Ok(yaml) => yaml.lines().map(str::to_owned).collect(),
            // Fall back to a debug view rather than hiding the mismatch.
            Err(_) => filtered
                .iter()
                .map(|(key, value)| format!("{key}: {value:?}"))
                .collect(),
        }
    }
}

impl Extend<(String, Value)> for Answers {
    fn extend<T: IntoIterator<Item = (String, Value)>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Answers {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, Value)> for Answers {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<String, Value>> for Answers {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

impl fmt::Display for Answers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.comparison_lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_keys_are_detected() {
        assert!(is_internal("_src_path"));
        assert!(is_internal("_commit"));
        assert!(!is_internal("name"));
    }

    #[test]
    fn from_yaml_reads_mapping() {
        let answers =
            Answers::from_yaml("_commit: 99.99.99\n_src_path: /tmp/src\nname: world\ncount: 3\n")
                .unwrap();
        assert_eq!(answers.len(), 4);
        assert_eq!(answers.get("name"), Some(&Value::from("world")));
        assert_eq!(answers.get("count"), Some(&Value::from(3)));
    }

    #[test]
    fn from_yaml_keeps_yaml_1_1_booleans_as_strings() {
        let answers = Answers::from_yaml("plain: yes\nquoted: 'on'\nflag: true\n").unwrap();

        assert_eq!(answers.get("plain"), Some(&Value::from("yes")));
        assert_eq!(answers.get("quoted"), Some(&Value::from("on")));
        assert_eq!(answers.get("flag"), Some(&Value::Bool(true)));
    }

    #[test]
    fn from_yaml_empty_document_is_empty() {
        assert!(Answers::from_yaml("").unwrap().is_empty());
    }

    #[test]
    fn from_yaml_rejects_sequence() {
        let err = Answers::from_yaml("- a\n- b\n").unwrap_err();
        assert!(matches!(err, DomainError::InvalidAnswers { .. }));
        assert!(err.to_string().contains("a sequence"));
    }

    #[test]
    fn filtered_drops_internal_keys() {
        let answers = Answers::new()
            .with("_commit", "99.99.99")
            .with("name", "world");
        let filtered = answers.filtered();
        assert_eq!(filtered, Answers::new().with("name", "world"));
    }

    #[test]
    fn merged_prefers_overrides() {
        let defaults = Answers::new().with("name", "world").with("license", "MIT");
        let overrides = Answers::new().with("name", "other").with("year", 2024);
        let merged = Answers::merged(&defaults, &overrides);

        assert_eq!(merged.get("name"), Some(&Value::from("other")));
        assert_eq!(merged.get("license"), Some(&Value::from("MIT")));
        assert_eq!(merged.get("year"), Some(&Value::from(2024)));
    }

    #[test]
    fn comparison_lines_are_sorted_and_filtered() {
        let answers = Answers::new()
            .with("zeta", true)
            .with("_src_path", "/tmp")
            .with("alpha", "a");
        assert_eq!(answers.comparison_lines(), vec!["alpha: a", "zeta: true"]);
    }

    #[test]
    fn empty_answers_serialise_as_empty_mapping() {
        assert_eq!(Answers::new().to_yaml().unwrap(), "{}\n");
    }
}
