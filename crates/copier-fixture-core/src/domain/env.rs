//! Environment snapshot applied to every subprocess the fixtures spawn.
//!
//! The snapshot is taken once per session and then edited in isolation:
//! version-control variables are stripped and replaced by a sandboxed
//! gitconfig, so renders never depend on the invoking user's settings.

use std::collections::BTreeMap;
use std::path::Path;

/// Prefix of the variables git reads from the environment.
pub const GIT_ENV_PREFIX: &str = "GIT_";

/// Variable pointing git at its global configuration file.
pub const GIT_CONFIG_GLOBAL: &str = "GIT_CONFIG_GLOBAL";

/// A mutable copy of a process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellEnv {
    vars: BTreeMap<String, String>,
}

impl ShellEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment. Entries that are not
    /// valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Set `key`, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.vars.insert(key.into(), value.into())
    }

    /// Remove `key`, returning the previous value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.vars.remove(key)
    }

    /// Drop every variable whose name starts with `prefix`; returns the
    /// removed names.
    pub fn remove_prefixed(&mut self, prefix: &str) -> Vec<String> {
        let removed: Vec<String> = self
            .vars
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        for key in &removed {
            self.vars.remove(key);
        }
        removed
    }

    /// Strip all `GIT_*` variables and point git at `gitconfig`.
    pub fn isolate_git(&mut self, gitconfig: &Path) {
        self.remove_prefixed(GIT_ENV_PREFIX);
        self.set(GIT_CONFIG_GLOBAL, gitconfig.to_string_lossy());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ShellEnv {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
