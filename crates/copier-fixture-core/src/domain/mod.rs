//! Domain layer: plain values shared by services and adapters.
//!
//! Nothing in here performs I/O beyond reading the process environment
//! for [`ShellEnv::from_process`].

pub mod answers;
pub mod command;
pub mod diff;
pub mod env;
pub mod error;
pub mod ignore;
pub mod render;
pub mod template;

pub use answers::{ANSWERS_FILE, Answers, INTERNAL_PREFIX, is_internal};
pub use command::{CommandLine, RunOptions};
pub use diff::{AnswersDiff, TreeDiff, TreeDifference, unified};
pub use env::{GIT_CONFIG_GLOBAL, GIT_ENV_PREFIX, ShellEnv};
pub use error::DomainError;
pub use ignore::{DEFAULT_IGNORES, IgnoreSet};
pub use render::{RenderContext, RenderOptions, RenderRequest};
pub use template::{COMMIT_MESSAGE, SENTINEL_VERSION, TemplateLocation, validate_relative};
