//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `copier-fixture-adapters` crate provides implementations.

use std::path::Path;

use crate::application::error::{EngineError, RunError};
use crate::domain::{CommandLine, IgnoreSet, RenderContext, RenderRequest, RunOptions, TreeDiff};
use crate::error::FixtureResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `copier_fixture_adapters::filesystem::LocalFilesystem`
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> FixtureResult<()>;

    /// Recursively copy `src` into `dst`, skipping entries matched by
    /// `exclude` (relative to `src`). Existing files are overwritten.
    fn copy_tree(&self, src: &Path, dst: &Path, exclude: &IgnoreSet) -> FixtureResult<()>;

    /// Copy one file, creating the parent of `dst` when needed.
    fn copy_file(&self, src: &Path, dst: &Path) -> FixtureResult<()>;

    /// Read a UTF-8 file.
    fn read_to_string(&self, path: &Path) -> FixtureResult<String>;

    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Port for running commands.
///
/// Implemented by:
/// - `copier_fixture_adapters::process::ProcessRunner`
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner: Send + Sync {
    /// Run `command` in `cwd` and return its captured output.
    ///
    /// Any non-zero exit is an error carrying the output; nothing is retried.
    fn run(&self, command: &CommandLine, cwd: &Path, options: &RunOptions)
    -> Result<String, RunError>;
}

/// Port for the external rendering engine.
///
/// Implemented by:
/// - `copier_fixture_adapters::engine::CopierCli`
#[cfg_attr(test, mockall::automock)]
pub trait TemplateEngine: Send + Sync {
    /// Render a fresh project into `request.destination`.
    fn copy(&self, request: &RenderRequest) -> Result<(), EngineError>;

    /// Re-render the existing project at `request.destination`.
    fn update(&self, request: &RenderRequest) -> Result<(), EngineError>;

    /// Resolve answers and evaluate the render context without writing
    /// the destination.
    fn context(&self, request: &RenderRequest) -> Result<RenderContext, EngineError>;
}

/// Port for directory comparison.
///
/// Implemented by:
/// - `copier_fixture_adapters::compare::WalkdirComparator`
#[cfg_attr(test, mockall::automock)]
pub trait TreeComparator: Send + Sync {
    /// Compare `actual` against `expected`, skipping ignored entries.
    /// An empty diff means the trees match.
    fn compare(&self, actual: &Path, expected: &Path, ignore: &IgnoreSet)
    -> FixtureResult<TreeDiff>;
}
