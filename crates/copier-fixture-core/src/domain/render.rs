//! Render requests handed to the engine, and the context it resolves.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Answers, ShellEnv, TemplateLocation};

/// Engine switches applied to every copy and update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Overwrite existing files without asking.
    pub overwrite: bool,
    /// Remove the destination when rendering fails.
    pub cleanup_on_error: bool,
    /// Allow templates with tasks, migrations and extensions.
    pub unsafe_template: bool,
    /// Use defaults for every question not answered explicitly.
    pub defaults: bool,
}

impl RenderOptions {
    /// The fixed configuration used by the fixture. Cleanup is off so a
    /// failed render can be inspected afterwards.
    pub const FIXTURE: Self = Self {
        overwrite: true,
        cleanup_on_error: false,
        unsafe_template: true,
        defaults: true,
    };
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::FIXTURE
    }
}

/// Everything an engine needs for one copy, update or context resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub template: TemplateLocation,
    pub destination: PathBuf,
    pub data: Answers,
    pub options: RenderOptions,
    pub env: ShellEnv,
}

/// Variables visible to template expressions, computed ones included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderContext(BTreeMap<String, Value>);

impl RenderContext {
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

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

impl From<BTreeMap<String, Value>> for RenderContext {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for RenderContext {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
