//! Copier Fixture - test a copier template from `cargo test`.
//!
//! The first fixture requested in a test binary copies the template into a
//! scratch git repository tagged `99.99.99`, with git isolated from the
//! invoking user's configuration. Each test then renders projects from it
//! and compares them against expected trees checked into the repository.
//!
//! ```rust,no_run
//! use copier_fixture::{Answers, FixtureResult};
//!
//! fn renders_default_project() -> FixtureResult<()> {
//!     let copier = copier_fixture::copier()?;
//!     let dst = tempfile::tempdir().unwrap();
//!
//!     let project = copier.copy(dst.path().join("dst"), Answers::new().with("name", "world"))?;
//!     project.assert_answers("tests/fixtures/expected/default");
//!     project.assert_equal("tests/fixtures/expected/default", &[]);
//!     Ok(())
//! }
//! ```
//!
//! Configuration lives in `copier-fixture.toml` next to the crate's
//! `Cargo.toml`; see [`config`].

pub mod config;
pub mod logging;
pub mod session;

pub use config::FixtureConfig;
pub use copier_fixture_core::prelude::*;
pub use session::TemplateSession;

/// Shorthand for `TemplateSession::shared()?.copier()`.
pub fn copier() -> FixtureResult<CopierFixture> {
    TemplateSession::shared().map(TemplateSession::copier)
}
