//! The materialized template a session renders from.

use std::path::{Component, Path, PathBuf};

use crate::domain::error::DomainError;

/// Tag placed on the materialized template so the engine always resolves
/// it as the newest release.
pub const SENTINEL_VERSION: &str = "99.99.99";

/// Commit message of the single materialization commit.
pub const COMMIT_MESSAGE: &str = "test";

/// Location of a materialized template tree.
///
/// Built once per session by the materializer and never mutated afterwards;
/// tests only read from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateLocation {
    path: PathBuf,
    paths: Vec<PathBuf>,
}

impl TemplateLocation {
    pub fn new(path: impl Into<PathBuf>, paths: Vec<PathBuf>) -> Self {
        Self {
            path: path.into(),
            paths,
        }
    }

    /// Root of the materialized tree (a git repository).
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The restricted path list, empty when the whole tree was copied.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn is_subset(&self) -> bool {
        !self.paths.is_empty()
    }
}

/// Check that `path` stays inside the template root.
pub fn validate_relative(path: &Path) -> Result<(), DomainError> {
    if path.as_os_str().is_empty() {
        return Err(DomainError::InvalidTemplatePath {
            path: path.to_path_buf(),
            reason: "path is empty".into(),
        });
    }

    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => {
                return Err(DomainError::InvalidTemplatePath {
                    path: path.to_path_buf(),
                    reason: "path escapes the template root".into(),
                });
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(DomainError::InvalidTemplatePath {
                    path: path.to_path_buf(),
                    reason: "path must be relative".into(),
                });
            }
        }
    }

    Ok(())
}
