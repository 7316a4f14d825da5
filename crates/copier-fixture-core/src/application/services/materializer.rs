//! Template Materializer - prepares the template a session renders from.
//!
//! The engine resolves template versions from git tags, so the working tree
//! under test is copied into a scratch directory and committed there:
//! 1. Copy the whole root, or only the listed paths
//! 2. `git init`, `git add -A .`, `git commit -m test`
//! 3. Tag the commit with the sentinel version

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::{CommandRunner, Filesystem},
    },
    domain::{
        COMMIT_MESSAGE, CommandLine, IgnoreSet, RunOptions, SENTINEL_VERSION, ShellEnv,
        TemplateLocation, validate_relative,
    },
    error::{FixtureError, FixtureResult},
};

/// Copies a template root into a fresh, tagged git repository.
pub struct TemplateMaterializer {
    filesystem: Arc<dyn Filesystem>,
    runner: Arc<dyn CommandRunner>,
}

impl TemplateMaterializer {
    pub fn new(filesystem: Arc<dyn Filesystem>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { filesystem, runner }
    }

    /// Materialize `root` into `destination`.
    ///
    /// With an empty `paths` list the whole tree is copied, minus
    /// `exclude`. Otherwise exactly the listed files and subtrees are.
    #[instrument(
        skip_all,
        fields(root = %root.display(), destination = %destination.display())
    )]
    pub fn materialize(
        &self,
        root: &Path,
        paths: &[PathBuf],
        exclude: &IgnoreSet,
        destination: &Path,
        env: &ShellEnv,
    ) -> FixtureResult<TemplateLocation> {
        self.filesystem.create_dir_all(destination)?;

        if paths.is_empty() {
            self.filesystem.copy_tree(root, destination, exclude)?;
        } else {
            for path in paths {
                self.copy_entry(root, path, destination)?;
            }
        }

        self.commit_and_tag(destination, env)?;

        info!(
            tag = SENTINEL_VERSION,
            subset = !paths.is_empty(),
            "Template materialized"
        );
        Ok(TemplateLocation::new(destination, paths.to_vec()))
    }

    fn copy_entry(&self, root: &Path, path: &Path, destination: &Path) -> FixtureResult<()> {
        validate_relative(path)?;

        let source = root.join(path);
        let target = destination.join(path);

        if !self.filesystem.exists(&source) {
            return Err(ApplicationError::FilesystemError {
                path: source,
                reason: "template path does not exist".into(),
            }
            .into());
        }

        debug!(path = %path.display(), "Copying template path");
        if self.filesystem.is_dir(&source) {
            self.filesystem.copy_tree(&source, &target, &IgnoreSet::new())
        } else {
            self.filesystem.copy_file(&source, &target)
        }
    }

    fn commit_and_tag(&self, repo: &Path, env: &ShellEnv) -> FixtureResult<()> {
        let options = RunOptions::new().with_env(env.clone());
        let steps = [
            CommandLine::new("git").arg("init"),
            CommandLine::new("git").args(["add", "-A", "."]),
            CommandLine::new("git").args(["commit", "-m", COMMIT_MESSAGE]),
            CommandLine::new("git").args(["tag", SENTINEL_VERSION]),
        ];

        for step in &steps {
            self.runner
                .run(step, repo, &options)
                .map_err(|e| FixtureError::Application(ApplicationError::Run(e)))?;
        }
        Ok(())
    }
}
