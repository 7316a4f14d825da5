//! Application ports (traits) for external dependencies.
//!
//! Ports define what the services need from the outside world. The
//! `copier-fixture-adapters` crate implements them.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: called by services, implemented by infrastructure
//!   - `Filesystem`: copies, reads and writes
//!   - `CommandRunner`: subprocess execution
//!   - `TemplateEngine`: the external renderer (copy, update, context)
//!   - `TreeComparator`: directory comparison

pub mod output;

pub use output::{CommandRunner, Filesystem, TemplateEngine, TreeComparator};
