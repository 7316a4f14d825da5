//! Application services - orchestrate the fixture lifecycle.
//!
//! The materializer prepares the template once per session; the fixture
//! controller renders projects from it; the project handle answers the
//! assertions made against a rendered directory.

pub mod fixture;
pub mod materializer;
pub mod project;

pub use fixture::{CopierFixture, FixtureAdapters};
pub use materializer::TemplateMaterializer;
pub use project::RenderedProject;
