//! Subprocess adapters.

mod runner;

pub use runner::ProcessRunner;
