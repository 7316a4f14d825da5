//! Shared helpers for the integration tests.
//!
//! These tests drive real `git` and `copier` executables. When one is
//! missing the test prints why and passes without doing anything.

#![allow(dead_code, unused_macros)]

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use copier_fixture::FixtureConfig;

/// Return early from a `FixtureResult` test when a tool is not installed.
macro_rules! require_tools {
    ($($tool:expr),+ $(,)?) => {
        $(
            if !$crate::support::tool_available($tool) {
                eprintln!("skipping: `{}` is not available", $tool);
                return Ok(());
            }
        )+
    };
}

/// Return early when copier's Python package cannot be imported.
macro_rules! require_copier_python {
    () => {
        if !$crate::support::copier_importable() {
            eprintln!("skipping: python3 cannot import copier");
            return Ok(());
        }
    };
}

pub fn tool_available(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

pub fn copier_importable() -> bool {
    Command::new("python3")
        .args(["-c", "import copier"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

pub fn manifest_dir() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
}

/// Expected project tree checked into `tests/fixtures/expected`.
pub fn expected(name: &str) -> PathBuf {
    manifest_dir().join("tests/fixtures/expected").join(name)
}

/// Configuration of this crate, as the shared session loads it.
pub fn config() -> FixtureConfig {
    FixtureConfig::load_from(manifest_dir()).expect("test configuration loads")
}
