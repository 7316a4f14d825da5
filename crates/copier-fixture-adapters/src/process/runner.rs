//! Subprocess runner using std::process.

use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use copier_fixture_core::{
    application::{ExitState, RunError, ports::CommandRunner},
    domain::{CommandLine, RunOptions},
};
use tracing::{debug, instrument};

/// Runs commands to completion and captures their output.
///
/// stdin is closed, so a command waiting for input fails instead of
/// hanging the test.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessRunner {
    #[instrument(skip_all, fields(command = %command, cwd = %cwd.display()))]
    fn run(
        &self,
        command: &CommandLine,
        cwd: &Path,
        options: &RunOptions,
    ) -> Result<String, RunError> {
        let mut process = Command::new(command.program());
        process
            .args(command.arguments())
            .current_dir(cwd)
            .stdin(Stdio::null());

        if let Some(env) = &options.env {
            process.env_clear().envs(env.iter());
        }
        process.envs(&options.vars);

        debug!("Running command");
        let output = process
            .output()
            .map_err(|e| RunError::new(command, cwd, ExitState::NotStarted, e.to_string()))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            debug!(bytes = combined.len(), "Command succeeded");
            Ok(combined)
        } else {
            debug!(status = %output.status, "Command failed");
            Err(RunError::new(command, cwd, exit_state(output.status), combined))
        }
    }
}

fn exit_state(status: ExitStatus) -> ExitState {
    status.code().map_or(ExitState::Signal, ExitState::Code)
}
