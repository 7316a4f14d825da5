//! Application layer errors.
//!
//! These errors represent failures in orchestration: a subprocess exited
//! badly, the engine refused to render, a file could not be read. Invalid
//! values are `DomainError` from `crate::domain`.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::CommandLine;
use crate::error::ErrorCategory;

/// How a failed command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitState {
    /// The process exited with a non-zero code.
    Code(i32),
    /// The process was killed by a signal.
    Signal,
    /// The process could not be spawned at all.
    NotStarted,
}

impl fmt::Display for ExitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "exit status {code}"),
            Self::Signal => f.write_str("terminated by signal"),
            Self::NotStarted => f.write_str("could not be started"),
        }
    }
}

/// A command that did not succeed, with everything it printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunError {
    pub command: String,
    pub cwd: PathBuf,
    pub state: ExitState,
    /// stdout followed by stderr.
    pub output: String,
}

impl RunError {
    pub fn new(
        command: &CommandLine,
        cwd: impl Into<PathBuf>,
        state: ExitState,
        output: impl Into<String>,
    ) -> Self {
        Self {
            command: command.to_string(),
            cwd: cwd.into(),
            state,
            output: output.into(),
        }
    }

    /// Headline plus the output, each line prefixed with `│ ` so it reads
    /// as one block inside a test failure.
    pub fn report(&self) -> String {
        let mut report = format!(
            "Command `{}` failed ({}) in {}",
            self.command,
            self.state,
            self.cwd.display()
        );
        for line in self.output.lines() {
            report.push_str("\n│ ");
            report.push_str(line);
        }
        report
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report())
    }
}

impl std::error::Error for RunError {}

/// Classification of an engine failure, decided by the engine adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A post-generation task failed.
    #[error("{0}")]
    Task(RunError),

    /// The engine itself failed (bad template, invalid answers, ...).
    #[error("{0}")]
    Failed(RunError),

    /// The engine ran but its output could not be understood.
    #[error("Unexpected engine output: {reason}")]
    InvalidOutput { reason: String },

    /// The invocation could not be prepared (data file, payload, ...).
    #[error("Could not prepare engine invocation: {reason}")]
    Setup { reason: String },
}

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// A command run by the fixtures failed.
    #[error("{0}")]
    Run(#[from] RunError),

    /// The rendering engine failed for a reason other than a task.
    #[error("Template engine failed: {reason}")]
    Engine { reason: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// An answers file could not be read or parsed.
    #[error("Cannot load answers from {path}: {reason}")]
    AnswersFile { path: PathBuf, reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Run(e) if e.state == ExitState::NotStarted => vec![
                format!("Is `{}` installed and on PATH?", e.command),
            ],
            Self::Engine { .. } => vec![
                "Render the template by hand with `copier copy` to see the full error".into(),
                "Check that every required question has a default or an answer".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have read and write permissions".into(),
            ],
            Self::AnswersFile { .. } => vec![
                "Does the template render its answers file?".into(),
                concat!(
                    "Add `{{ _copier_conf.answers_file }}.jinja` ",
                    "containing `{{ _copier_answers|to_nice_yaml }}`"
                )
                .into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Run(_) => ErrorCategory::Command,
            Self::Engine { .. } => ErrorCategory::Engine,
            Self::FilesystemError { .. } | Self::AnswersFile { .. } => ErrorCategory::Io,
        }
    }
}
