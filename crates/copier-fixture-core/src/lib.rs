//! Copier Fixture Core - Ports and Adapters for template tests
//!
//! This crate provides the domain and application layers for driving a
//! copier template from `cargo test`: render a project, update it, and
//! compare the result against expected fixtures on disk.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        copier-fixture (facade)          │
//! │   (config, logging, TemplateSession)    │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │ (CopierFixture, RenderedProject,        │
//! │  TemplateMaterializer)                  │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Engine, Runner, Comparator, Filesystem)│
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │   copier-fixture-adapters (Infra)       │
//! │ (CopierCli, ProcessRunner, Walkdir...)  │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Values)           │
//! │ (Answers, ShellEnv, IgnoreSet, diffs)   │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use copier_fixture_core::prelude::*;
//!
//! # fn demo(fixture: CopierFixture, dst: &std::path::Path) -> FixtureResult<()> {
//! let project = fixture.copy(dst, Answers::new().with("name", "world"))?;
//! project.assert_answers("tests/fixtures/expected/default");
//! project.assert_equal("tests/fixtures/expected/default", &[]);
//! # Ok(())
//! # }
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        CopierFixture, FixtureAdapters, RenderedProject, TemplateMaterializer,
        ports::{CommandRunner, Filesystem, TemplateEngine, TreeComparator},
    };
    pub use crate::domain::{
        ANSWERS_FILE, Answers, CommandLine, IgnoreSet, RenderContext, RenderOptions,
        RenderRequest, RunOptions, ShellEnv, TemplateLocation,
    };
    pub use crate::error::{FixtureError, FixtureResult};
}
