//! Session-scoped template fixture.
//!
//! A test binary materializes its template once: the first call to
//! [`TemplateSession::shared`] loads the configuration, writes the sandbox
//! gitconfig, snapshots and isolates the environment, and commits a copy
//! of the template into a scratch repository. Every test then gets its own
//! [`CopierFixture`] over that shared, read-only template.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use copier_fixture_adapters::{
    CopierCli, GitSandbox, LocalFilesystem, ProcessRunner, WalkdirComparator,
};
use copier_fixture_core::{
    application::{CopierFixture, FixtureAdapters, TemplateMaterializer, ports::CommandRunner},
    domain::{ShellEnv, TemplateLocation},
    error::{Context as _, FixtureError, FixtureResult},
};
use tempfile::TempDir;
use tracing::{debug, info, instrument};

use crate::config::FixtureConfig;
use crate::logging::init_logging;

static SESSION: OnceLock<Result<TemplateSession, FixtureError>> = OnceLock::new();

/// The materialized template plus everything needed to render from it.
pub struct TemplateSession {
    config: FixtureConfig,
    template: TemplateLocation,
    env: ShellEnv,
    adapters: FixtureAdapters,
    gitconfig: GitSandbox,
    workspace: TempDir,
}

impl TemplateSession {
    /// The session of this test binary, built on first use.
    ///
    /// A failed build is kept, and every later call returns the same error.
    pub fn shared() -> FixtureResult<&'static TemplateSession> {
        SESSION
            .get_or_init(|| {
                if let Err(e) = init_logging() {
                    debug!(error = %e, "Keeping the existing tracing subscriber");
                }
                FixtureConfig::load().and_then(Self::start)
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Build a standalone session from `config`.
    #[instrument(skip_all, fields(root = %config.template.root.display()))]
    pub fn start(config: FixtureConfig) -> FixtureResult<Self> {
        let workspace = tempfile::Builder::new()
            .prefix("copier-fixture-")
            .tempdir()
            .context("creating session workspace")?;

        let gitconfig = GitSandbox::create(workspace.path())?;
        let mut env = ShellEnv::from_process();
        gitconfig.isolate(&mut env);
        debug!(variables = env.len(), "Environment isolated");

        let runner: Arc<dyn CommandRunner> = Arc::new(ProcessRunner::new());
        let filesystem = Arc::new(LocalFilesystem::new());
        let adapters = FixtureAdapters {
            engine: Arc::new(
                CopierCli::new(runner.clone())
                    .with_program(config.engine.program.as_str())
                    .with_python(config.engine.python.as_str()),
            ),
            runner: runner.clone(),
            comparator: Arc::new(WalkdirComparator::new()),
            filesystem: filesystem.clone(),
        };

        let template = TemplateMaterializer::new(filesystem, runner).materialize(
            &config.template.root,
            &config.template.paths,
            &config.exclude_set()?,
            &workspace.path().join("src"),
            &env,
        )?;

        info!(template = %template.path().display(), "Template session ready");
        Ok(Self {
            config,
            template,
            env,
            adapters,
            gitconfig,
            workspace,
        })
    }

    /// A fresh fixture over the session template, with the configured
    /// default answers.
    pub fn copier(&self) -> CopierFixture {
        CopierFixture::new(
            self.template.clone(),
            self.adapters.clone(),
            self.env.clone(),
        )
        .with_defaults(self.config.defaults.clone())
    }

    pub fn config(&self) -> &FixtureConfig {
        &self.config
    }

    pub fn template(&self) -> &TemplateLocation {
        &self.template
    }

    /// Isolated environment every subprocess starts from.
    pub fn env(&self) -> &ShellEnv {
        &self.env
    }

    pub fn gitconfig(&self) -> &GitSandbox {
        &self.gitconfig
    }

    /// Scratch directory holding the template copy and the gitconfig.
    pub fn workspace(&self) -> &Path {
        self.workspace.path()
    }
}
