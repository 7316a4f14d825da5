//! Commands run in a template or a rendered project.

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::{ShellEnv, error::DomainError};

/// A program plus its arguments, never interpreted by a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Split `command` into words the way a POSIX shell would.
    pub fn parse(command: &str) -> Result<Self, DomainError> {
        let words = shlex::split(command).ok_or_else(|| DomainError::InvalidCommand {
            command: command.to_string(),
            reason: "unbalanced quotes or trailing escape".into(),
        })?;

        let mut words = words.into_iter();
        let program = words.next().ok_or_else(|| DomainError::InvalidCommand {
            command: command.to_string(),
            reason: "command is empty".into(),
        })?;

        Ok(Self {
            program,
            args: words.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words =
            std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        match shlex::try_join(words.clone()) {
            Ok(joined) => f.write_str(&joined),
            Err(_) => f.write_str(&words.collect::<Vec<_>>().join(" ")),
        }
    }
}

/// Extra settings for one command invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// When set, the child starts from this environment instead of
    /// inheriting the process one.
    pub env: Option<ShellEnv>,
    /// Variables layered on top of the base environment.
    pub vars: BTreeMap<String, String>,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_env(mut self, env: ShellEnv) -> Self {
        self.env = Some(env);
        self
    }

    pub fn var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}
