//! Unified error handling for the copier fixtures.
//!
//! [`FixtureError`] wraps domain and application errors and adds the
//! failures a test sees directly: a failed post-generation task, a failed
//! project command, and the two assertion mismatches.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for fixture operations.
///
/// `Clone` because the session caches its construction result and hands
/// the same error to every test.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FixtureError {
    /// Errors from the domain layer (invalid values).
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (orchestration failures).
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// A post-generation task failed during copy or update. The message is
    /// the formatted command report; the engine failure is not chained.
    #[error("{message}")]
    CopierTask { message: String },

    /// A command run in a rendered project failed.
    #[error("{message}")]
    ProjectRun { message: String },

    /// Recorded answers differ from the expected fixture.
    #[error("{report}")]
    AnswersMismatch { report: String },

    /// Project tree differs from the expected fixture.
    #[error("{report}")]
    TreeMismatch { report: String },

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl FixtureError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::CopierTask { .. } => vec![
                "A `_tasks` entry of the template exited with a non-zero status".into(),
                "The destination is kept for inspection".into(),
            ],
            Self::ProjectRun { .. } => {
                vec!["Run the command by hand in the project directory".into()]
            }
            Self::AnswersMismatch { .. } | Self::TreeMismatch { .. } => vec![
                "Update the expected fixture if the new output is correct".into(),
            ],
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Check copier-fixture.toml and COPIER_FIXTURE_* variables".into(),
            ],
            Self::Internal { .. } => vec!["This appears to be a bug in copier-fixture".into()],
        }
    }

    /// Get error category for display purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(_) => ErrorCategory::Validation,
            Self::Application(e) => e.category(),
            Self::CopierTask { .. } => ErrorCategory::Engine,
            Self::ProjectRun { .. } => ErrorCategory::Command,
            Self::AnswersMismatch { .. } | Self::TreeMismatch { .. } => ErrorCategory::Mismatch,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Plain-text report: the error followed by its suggestions.
    pub fn format_plain(&self) -> String {
        let mut out = self.to_string();
        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\n\nSuggestions:\n");
            for suggestion in &suggestions {
                out.push_str(&format!("  {suggestion}\n"));
            }
        }
        out
    }

    /// Whether this is an assertion mismatch rather than an operational failure.
    pub fn is_mismatch(&self) -> bool {
        self.category() == ErrorCategory::Mismatch
    }
}

/// Error categories for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Command,
    Engine,
    Io,
    Mismatch,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type FixtureResult<T> = Result<T, FixtureError>;

/// Extension trait for adding context to errors.
pub trait Context<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> FixtureResult<T>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: impl Into<String>) -> FixtureResult<T> {
        self.map_err(|e| FixtureError::Internal {
            message: format!("{}: {}", msg.into(), e),
        })
    }
}
