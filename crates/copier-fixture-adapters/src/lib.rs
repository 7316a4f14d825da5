//! Infrastructure adapters for copier-fixture.
//!
//! This crate implements the ports defined in
//! `copier_fixture_core::application::ports`. It owns every subprocess and
//! filesystem access the fixtures make.

pub mod compare;
pub mod engine;
pub mod filesystem;
pub mod gitconfig;
pub mod process;

// Re-export commonly used adapters
pub use compare::WalkdirComparator;
pub use engine::CopierCli;
pub use filesystem::LocalFilesystem;
pub use gitconfig::GitSandbox;
pub use process::ProcessRunner;
