//! Rendered Project - a handle on one output directory.
//!
//! Answers and context are read once per handle and cached; a handle never
//! notices later changes to its directory. Re-rendering through
//! [`RenderedProject::update`] hands back a new handle with empty caches.

use std::cell::OnceCell;
use std::fmt;
use std::ops::Div;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use crate::{
    application::{ApplicationError, services::fixture::CopierFixture},
    domain::{
        ANSWERS_FILE, Answers, AnswersDiff, CommandLine, IgnoreSet, RenderContext, RunOptions,
    },
    error::{FixtureError, FixtureResult},
};

/// A project rendered by a [`CopierFixture`].
pub struct RenderedProject<'f> {
    fixture: &'f CopierFixture,
    path: PathBuf,
    answers: OnceCell<Answers>,
    context: OnceCell<RenderContext>,
}

impl<'f> RenderedProject<'f> {
    pub(crate) fn new(fixture: &'f CopierFixture, path: impl Into<PathBuf>) -> Self {
        Self {
            fixture,
            path: path.into(),
            answers: OnceCell::new(),
            context: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `path` joined onto the project directory.
    pub fn join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.path.join(path)
    }

    /// Re-render this project in place with `answers` over the defaults.
    pub fn update(&self, answers: Answers) -> FixtureResult<RenderedProject<'f>> {
        self.fixture.update(&self.path, answers)
    }

    /// Recorded answers, without internal keys.
    pub fn answers(&self) -> FixtureResult<&Answers> {
        if let Some(answers) = self.answers.get() {
            return Ok(answers);
        }
        let loaded = self.load_answers(&self.path)?;
        Ok(self.answers.get_or_init(|| loaded))
    }

    /// Render context resolved from the recorded answers.
    pub fn context(&self) -> FixtureResult<&RenderContext> {
        if let Some(context) = self.context.get() {
            return Ok(context);
        }
        let resolved = self.fixture.context(self.answers()?)?;
        Ok(self.context.get_or_init(|| resolved))
    }

    /// Compare the recorded answers with those stored under `expected`.
    #[instrument(skip_all, fields(expected = %expected.as_ref().display()))]
    pub fn check_answers(&self, expected: impl AsRef<Path>) -> FixtureResult<()> {
        let expected = self.load_answers(expected.as_ref())?;
        let diff = AnswersDiff::new("Answers", expected, self.answers()?.clone());

        if diff.has_changes() {
            return Err(FixtureError::AnswersMismatch {
                report: diff.to_string(),
            });
        }
        Ok(())
    }

    /// Panicking form of [`check_answers`](Self::check_answers).
    #[track_caller]
    pub fn assert_answers(&self, expected: impl AsRef<Path>) {
        if let Err(err) = self.check_answers(expected) {
            panic!("{}", err.format_plain());
        }
    }

    /// Compare the project tree with `expected`.
    ///
    /// The default ignores and the answers file are always skipped;
    /// `extra_ignores` adds more patterns.
    #[instrument(skip_all, fields(expected = %expected.as_ref().display()))]
    pub fn check_equal(
        &self,
        expected: impl AsRef<Path>,
        extra_ignores: &[&str],
    ) -> FixtureResult<()> {
        let ignore = IgnoreSet::for_project(extra_ignores)?;
        let diff = self
            .fixture
            .adapters()
            .comparator
            .compare(&self.path, expected.as_ref(), &ignore)?;

        if !diff.is_empty() {
            return Err(FixtureError::TreeMismatch {
                report: diff.to_string(),
            });
        }
        Ok(())
    }

    /// Panicking form of [`check_equal`](Self::check_equal).
    #[track_caller]
    pub fn assert_equal(&self, expected: impl AsRef<Path>, extra_ignores: &[&str]) {
        if let Err(err) = self.check_equal(expected, extra_ignores) {
            panic!("{}", err.format_plain());
        }
    }

    /// Run a shell-split `command` inside the project.
    pub fn run(&self, command: &str) -> FixtureResult<String> {
        self.run_with(command, RunOptions::new())
    }

    /// [`run`](Self::run) with extra options (environment, variables).
    #[instrument(skip(self, options), fields(cwd = %self.path.display()))]
    pub fn run_with(&self, command: &str, options: RunOptions) -> FixtureResult<String> {
        let command = CommandLine::parse(command)?;
        self.fixture
            .run_in(&self.path, &command, options)
            .map_err(|e| FixtureError::ProjectRun {
                message: format!("❌ {e}"),
            })
    }

    fn load_answers(&self, root: &Path) -> FixtureResult<Answers> {
        let file = root.join(ANSWERS_FILE);
        let unreadable = |reason: String| ApplicationError::AnswersFile {
            path: file.clone(),
            reason,
        };

        let source = self
            .fixture
            .adapters()
            .filesystem
            .read_to_string(&file)
            .map_err(|e| unreadable(e.to_string()))?;
        let answers = Answers::from_yaml(&source).map_err(|e| unreadable(e.to_string()))?;

        debug!(path = %file.display(), keys = answers.len(), "Answers loaded");
        Ok(answers.filtered())
    }
}

impl fmt::Debug for RenderedProject<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedProject")
            .field("path", &self.path)
            .field("answers", &self.answers.get())
            .finish_non_exhaustive()
    }
}

impl<P: AsRef<Path>> Div<P> for &RenderedProject<'_> {
    type Output = PathBuf;

    fn div(self, rhs: P) -> PathBuf {
        self.join(rhs)
    }
}
