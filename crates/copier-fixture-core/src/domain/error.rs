// ============================================================================
// domain/error.rs - VALUE VALIDATION ERRORS
// ============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Root domain error type.
///
/// Raised while building domain values (answers, command lines, template
/// paths) from untrusted input. Cloneable so the session can cache it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid answers document: {reason}")]
    InvalidAnswers { reason: String },

    #[error("Invalid command '{command}': {reason}")]
    InvalidCommand { command: String, reason: String },

    #[error("Invalid template path '{}': {reason}", path.display())]
    InvalidTemplatePath { path: PathBuf, reason: String },

    #[error("Invalid ignore pattern '{pattern}'")]
    InvalidIgnorePattern { pattern: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidAnswers { .. } => vec![
                "Answers files must hold a YAML mapping at the top level".into(),
                "Check the expected fixture's .copier-answers.yml".into(),
            ],
            Self::InvalidCommand { .. } => vec![
                "Quote arguments containing spaces".into(),
                "Commands are split like a POSIX shell would".into(),
            ],
            Self::InvalidTemplatePath { .. } => vec![
                "Template paths are relative to the template root".into(),
                "Remove leading '/' and any '..' segments".into(),
            ],
            Self::InvalidIgnorePattern { .. } => vec!["Ignore patterns must not be empty".into()],
        }
    }
}
