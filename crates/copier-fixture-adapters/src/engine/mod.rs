//! Rendering engine adapters.

mod copier_cli;

pub use copier_cli::CopierCli;
