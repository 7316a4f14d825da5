//! Copier Fixture - the per-test controller.
//!
//! Holds the session's template and default answers, renders projects
//! through the engine port, and owns the environment patches a test makes.
//! Patches are undone when the fixture is dropped at the end of the test.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info, instrument};

use crate::{
    application::{
        ApplicationError, EngineError, RunError,
        ports::{CommandRunner, Filesystem, TemplateEngine, TreeComparator},
        services::project::RenderedProject,
    },
    domain::{
        Answers, CommandLine, RenderContext, RenderOptions, RenderRequest, RunOptions, ShellEnv,
        TemplateLocation,
    },
    error::{FixtureError, FixtureResult},
};

/// The adapters a fixture delegates to.
#[derive(Clone)]
pub struct FixtureAdapters {
    pub engine: Arc<dyn TemplateEngine>,
    pub runner: Arc<dyn CommandRunner>,
    pub comparator: Arc<dyn TreeComparator>,
    pub filesystem: Arc<dyn Filesystem>,
}

struct EnvPatch {
    key: String,
    previous: Option<OsString>,
}

/// Renders projects from the session template.
pub struct CopierFixture {
    template: TemplateLocation,
    defaults: Answers,
    adapters: FixtureAdapters,
    env: RwLock<ShellEnv>,
    patches: Mutex<Vec<EnvPatch>>,
}

impl CopierFixture {
    /// Create a fixture for `template` whose subprocesses run with `env`.
    pub fn new(template: TemplateLocation, adapters: FixtureAdapters, env: ShellEnv) -> Self {
        Self {
            template,
            defaults: Answers::new(),
            adapters,
            env: RwLock::new(env),
            patches: Mutex::new(Vec::new()),
        }
    }

    /// Answers applied to every render unless overridden per call.
    pub fn with_defaults(mut self, defaults: Answers) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn template(&self) -> &TemplateLocation {
        &self.template
    }

    pub fn defaults(&self) -> &Answers {
        &self.defaults
    }

    /// Current environment snapshot used for subprocesses.
    pub fn env(&self) -> ShellEnv {
        self.env.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub(crate) fn adapters(&self) -> &FixtureAdapters {
        &self.adapters
    }

    /// Render a fresh project into `destination`.
    ///
    /// `answers` override the fixture defaults. A failing post-generation
    /// task becomes [`FixtureError::CopierTask`].
    #[instrument(skip_all, fields(destination = %destination.as_ref().display()))]
    pub fn copy(
        &self,
        destination: impl AsRef<Path>,
        answers: Answers,
    ) -> FixtureResult<RenderedProject<'_>> {
        let destination = destination.as_ref();
        let request = self.request(destination.to_path_buf(), &answers);

        self.adapters.engine.copy(&request).map_err(engine_failure)?;

        info!("Project copied");
        Ok(RenderedProject::new(self, destination))
    }

    /// Re-render the existing project at `destination`.
    #[instrument(skip_all, fields(destination = %destination.as_ref().display()))]
    pub fn update(
        &self,
        destination: impl AsRef<Path>,
        answers: Answers,
    ) -> FixtureResult<RenderedProject<'_>> {
        let destination = destination.as_ref();
        let request = self.request(destination.to_path_buf(), &answers);

        self.adapters
            .engine
            .update(&request)
            .map_err(engine_failure)?;

        info!("Project updated");
        Ok(RenderedProject::new(self, destination))
    }

    /// Resolve the template's render context for `answers` without
    /// rendering anything. Computed variables are included.
    #[instrument(skip_all)]
    pub fn context(&self, answers: &Answers) -> FixtureResult<RenderContext> {
        let request = self.request(std::env::temp_dir(), answers);
        let context = self
            .adapters
            .engine
            .context(&request)
            .map_err(engine_failure)?;

        debug!(variables = context.len(), "Render context resolved");
        Ok(context)
    }

    /// Run `command` in `cwd` with the fixture environment.
    pub(crate) fn run_in(
        &self,
        cwd: &Path,
        command: &CommandLine,
        options: RunOptions,
    ) -> Result<String, RunError> {
        let options = if options.env.is_some() {
            options
        } else {
            options.with_env(self.env())
        };
        self.adapters.runner.run(command, cwd, &options)
    }

    /// Set `key` in the process environment and in the fixture snapshot
    /// until the fixture is dropped.
    ///
    /// Tests calling this must not run concurrently with other tests that
    /// read the same variable (use `serial_test`).
    pub fn setenv(&self, key: &str, value: &str) {
        self.remember(key);
        // SAFETY: env-mutating tests are serialised by the caller; the
        // previous value is restored in `Drop`.
        unsafe { std::env::set_var(key, value) };
        self.env
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set(key, value);
        debug!(key, "Environment variable set");
    }

    /// Remove `key` from the process environment and the fixture snapshot
    /// until the fixture is dropped.
    pub fn delenv(&self, key: &str) {
        self.remember(key);
        // SAFETY: see `setenv`.
        unsafe { std::env::remove_var(key) };
        self.env
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        debug!(key, "Environment variable removed");
    }

    fn remember(&self, key: &str) {
        self.patches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(EnvPatch {
                key: key.to_string(),
                previous: std::env::var_os(key),
            });
    }

    fn request(&self, destination: PathBuf, answers: &Answers) -> RenderRequest {
        RenderRequest {
            template: self.template.clone(),
            destination,
            data: Answers::merged(&self.defaults, answers),
            options: RenderOptions::FIXTURE,
            env: self.env(),
        }
    }
}

impl Drop for CopierFixture {
    fn drop(&mut self) {
        let patches = std::mem::take(
            self.patches
                .get_mut()
                .unwrap_or_else(PoisonError::into_inner),
        );

        // Newest first, so a key patched twice ends at its original value.
        for patch in patches.into_iter().rev() {
            match &patch.previous {
                // SAFETY: see `setenv`.
                Some(value) => unsafe { std::env::set_var(&patch.key, value) },
                None => unsafe { std::env::remove_var(&patch.key) },
            }
            debug!(key = %patch.key, "Environment variable restored");
        }
    }
}

/// Translate an engine failure. Task failures keep only the formatted
/// report; the engine error itself is not chained.
fn engine_failure(err: EngineError) -> FixtureError {
    match err {
        EngineError::Task(run) => FixtureError::CopierTask {
            message: format!("❌ {run}"),
        },
        EngineError::Failed(run) => ApplicationError::Engine {
            reason: run.report(),
        }
        .into(),
        other => ApplicationError::Engine {
            reason: other.to_string(),
        }
        .into(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::application::error::ExitState;
    use crate::application::ports::output::{
        MockCommandRunner, MockFilesystem, MockTemplateEngine, MockTreeComparator,
    };
    use serde_json::json;
    use serial_test::serial;

    pub(crate) fn adapters_with(
        engine: MockTemplateEngine,
        runner: MockCommandRunner,
        comparator: MockTreeComparator,
        filesystem: MockFilesystem,
    ) -> FixtureAdapters {
        FixtureAdapters {
            engine: Arc::new(engine),
            runner: Arc::new(runner),
            comparator: Arc::new(comparator),
            filesystem: Arc::new(filesystem),
        }
    }

    pub(crate) fn fixture_with_engine(engine: MockTemplateEngine) -> CopierFixture {
        CopierFixture::new(
            TemplateLocation::new("/tmp/src", vec![]),
            adapters_with(
                engine,
                MockCommandRunner::new(),
                MockTreeComparator::new(),
                MockFilesystem::new(),
            ),
            ShellEnv::new(),
        )
    }

    fn task_failure() -> RunError {
        RunError::new(
            &CommandLine::new("copier").arg("copy"),
            "/tmp/src",
            ExitState::Code(1),
            "subprocess.CalledProcessError: Command 'exit 1' returned non-zero exit status 1.",
        )
    }

    #[test]
    fn copy_merges_defaults_with_call_answers() {
        let mut engine = MockTemplateEngine::new();
        engine
            .expect_copy()
            .withf(|request| {
                request.destination == Path::new("/tmp/dst")
                    && request.options == RenderOptions::FIXTURE
                    && request.data
                        == Answers::new()
                            .with("name", "override")
                            .with("license", "MIT")
            })
            .times(1)
            .returning(|_| Ok(()));

        let fixture = fixture_with_engine(engine).with_defaults(
            Answers::new()
                .with("name", "world")
                .with("license", "MIT"),
        );
        let project = fixture
            .copy("/tmp/dst", Answers::new().with("name", "override"))
            .unwrap();

        assert_eq!(project.path(), Path::new("/tmp/dst"));
    }

    #[test]
    fn copy_task_failure_becomes_copier_task_error() {
        let mut engine = MockTemplateEngine::new();
        engine
            .expect_copy()
            .returning(|_| Err(EngineError::Task(task_failure())));

        let fixture = fixture_with_engine(engine);
        let err = fixture.copy("/tmp/dst", Answers::new()).unwrap_err();

        let FixtureError::CopierTask { message } = &err else {
            panic!("expected a task error, got {err:?}");
        };
        assert!(message.starts_with("❌ Command `copier copy` failed"));
        assert!(message.contains("CalledProcessError"));
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn copy_engine_failure_is_not_a_task_error() {
        let mut engine = MockTemplateEngine::new();
        engine.expect_copy().returning(|_| {
            Err(EngineError::Failed(RunError::new(
                &CommandLine::new("copier").arg("copy"),
                "/tmp/src",
                ExitState::Code(2),
                "ValueError: Question \"name\" is required",
            )))
        });

        let err = fixture_with_engine(engine)
            .copy("/tmp/dst", Answers::new())
            .unwrap_err();
        assert!(matches!(
            err,
            FixtureError::Application(ApplicationError::Engine { .. })
        ));
    }

    #[test]
    fn update_uses_engine_update() {
        let mut engine = MockTemplateEngine::new();
        engine.expect_copy().never();
        engine
            .expect_update()
            .withf(|request| request.data.get("year") == Some(&2025.into()))
            .times(1)
            .returning(|_| Ok(()));

        let fixture = fixture_with_engine(engine);
        let project = fixture
            .update("/tmp/dst", Answers::new().with("year", 2025))
            .unwrap();
        assert_eq!(project.path(), Path::new("/tmp/dst"));
    }

    #[test]
    fn update_task_failure_becomes_copier_task_error() {
        let mut engine = MockTemplateEngine::new();
        engine
            .expect_update()
            .returning(|_| Err(EngineError::Task(task_failure())));

        let err = fixture_with_engine(engine)
            .update("/tmp/dst", Answers::new())
            .unwrap_err();
        assert!(matches!(err, FixtureError::CopierTask { .. }));
    }

    #[test]
    fn context_returns_engine_context() {
        let mut engine = MockTemplateEngine::new();
        engine
            .expect_context()
            .withf(|request| request.data.get("name") == Some(&"world".into()))
            .returning(|_| {
                Ok([("slug".to_string(), json!("hello-world"))]
                    .into_iter()
                    .collect())
            });

        let fixture = fixture_with_engine(engine);
        let context = fixture
            .context(&Answers::new().with("name", "world"))
            .unwrap();
        assert_eq!(context.get("slug"), Some(&json!("hello-world")));
    }

    #[test]
    #[serial(process_env)]
    fn env_patches_are_restored_on_drop() {
        const SET: &str = "COPIER_FIXTURE_TEST_SET";
        const UNSET: &str = "COPIER_FIXTURE_TEST_UNSET";
        unsafe {
            std::env::set_var(UNSET, "original");
            std::env::remove_var(SET);
        }

        {
            let fixture = fixture_with_engine(MockTemplateEngine::new());
            fixture.setenv(SET, "first");
            fixture.setenv(SET, "second");
            fixture.delenv(UNSET);

            assert_eq!(std::env::var(SET).unwrap(), "second");
            assert!(std::env::var(UNSET).is_err());
            assert_eq!(fixture.env().get(SET), Some("second"));
            assert_eq!(fixture.env().get(UNSET), None);
        }

        assert!(std::env::var(SET).is_err());
        assert_eq!(std::env::var(UNSET).unwrap(), "original");
        unsafe { std::env::remove_var(UNSET) };
    }

    #[test]
    fn run_in_applies_fixture_env() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|_, _, options| {
                options
                    .env
                    .as_ref()
                    .and_then(|env| env.get("GIT_CONFIG_GLOBAL"))
                    == Some("/tmp/gitconfig")
            })
            .returning(|_, _, _| Ok("ok".into()));

        let env: ShellEnv = [("GIT_CONFIG_GLOBAL", "/tmp/gitconfig")].into_iter().collect();
        let fixture = CopierFixture::new(
            TemplateLocation::new("/tmp/src", vec![]),
            adapters_with(
                MockTemplateEngine::new(),
                runner,
                MockTreeComparator::new(),
                MockFilesystem::new(),
            ),
            env,
        );

        let output = fixture
            .run_in(Path::new("/tmp"), &CommandLine::new("true"), RunOptions::new())
            .unwrap();
        assert_eq!(output, "ok");
    }
}
