//! Session gitconfig.
//!
//! Renders and template commits must not depend on the invoking user's git
//! setup (signing, hooks paths, default branch, line endings). The sandbox
//! writes a minimal global config into the session workspace and points
//! the environment snapshot at it.

use std::fs;
use std::path::{Path, PathBuf};

use copier_fixture_core::{
    application::ApplicationError,
    domain::ShellEnv,
    error::FixtureResult,
};
use tracing::{debug, instrument};

const GITCONFIG: &str = "\
[user]
\tname = Copier Fixture
\temail = copier-fixture@example.com
[init]
\tdefaultBranch = main
[core]
\tautocrlf = input
[commit]
\tgpgsign = false
[tag]
\tgpgsign = false
";

/// An isolated global gitconfig file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitSandbox {
    path: PathBuf,
}

impl GitSandbox {
    pub const FILE_NAME: &'static str = "gitconfig";

    /// Write the sandbox config into `dir`.
    #[instrument(skip_all, fields(dir = %dir.display()))]
    pub fn create(dir: &Path) -> FixtureResult<Self> {
        let path = dir.join(Self::FILE_NAME);
        fs::write(&path, GITCONFIG).map_err(|e| ApplicationError::FilesystemError {
            path: path.clone(),
            reason: format!("Failed to write gitconfig: {e}"),
        })?;

        debug!(path = %path.display(), "Sandbox gitconfig written");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Strip `GIT_*` variables from `env` and point it at this config.
    pub fn isolate(&self, env: &mut ShellEnv) {
        env.isolate_git(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use copier_fixture_core::domain::GIT_CONFIG_GLOBAL;
    use tempfile::TempDir;

    #[test]
    fn create_writes_identity_and_line_endings() {
        let dir = TempDir::new().unwrap();
        let sandbox = GitSandbox::create(dir.path()).unwrap();

        assert_eq!(sandbox.path(), dir.path().join("gitconfig"));
        let written = fs::read_to_string(sandbox.path()).unwrap();
        assert!(written.contains("autocrlf = input"));
        assert!(written.contains("email = copier-fixture@example.com"));
        assert!(written.contains("gpgsign = false"));
    }

    #[test]
    fn isolate_replaces_git_variables() {
        let dir = TempDir::new().unwrap();
        let sandbox = GitSandbox::create(dir.path()).unwrap();
        let mut env: ShellEnv = [
            ("GIT_AUTHOR_NAME", "Someone"),
            ("GIT_DIR", "/elsewhere/.git"),
            ("HOME", "/home/someone"),
        ]
        .into_iter()
        .collect();

        sandbox.isolate(&mut env);

        assert!(!env.contains("GIT_AUTHOR_NAME"));
        assert!(!env.contains("GIT_DIR"));
        assert_eq!(env.get("HOME"), Some("/home/someone"));
        assert_eq!(
            env.get(GIT_CONFIG_GLOBAL).map(PathBuf::from),
            Some(sandbox.path().to_path_buf())
        );
    }

    #[test]
    fn create_fails_in_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = GitSandbox::create(&dir.path().join("missing")).unwrap_err();
        assert!(err.to_string().contains("Failed to write gitconfig"));
    }
}
