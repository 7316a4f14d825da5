//! Application layer for the copier fixtures.
//!
//! This layer contains:
//! - **Services**: the copy/update/compare lifecycle (CopierFixture,
//!   RenderedProject) and template materialization
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types

pub mod error;
pub mod ports;
pub mod services;

pub use services::{CopierFixture, FixtureAdapters, RenderedProject, TemplateMaterializer};

// Re-export port traits (for adapter implementation)
pub use ports::{CommandRunner, Filesystem, TemplateEngine, TreeComparator};

pub use error::{ApplicationError, EngineError, ExitState, RunError};
