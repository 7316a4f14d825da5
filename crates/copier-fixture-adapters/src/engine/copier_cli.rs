//! Copier engine driven through its command line.
//!
//! `copy` and `update` run the `copier` executable with the fixture
//! switches; answers travel in a data file written as JSON, which copier's
//! YAML 1.1 loader reads back without retyping plain strings.
//! `context` has no CLI equivalent and runs a short probe through copier's
//! Python worker API instead.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use copier_fixture_core::{
    application::{
        EngineError, ExitState, RunError,
        ports::{CommandRunner, TemplateEngine},
    },
    domain::{Answers, CommandLine, RenderContext, RenderOptions, RenderRequest, RunOptions},
};
use serde::Serialize;
use tempfile::{NamedTempFile, TempDir};
use thiserror::Error;
use tracing::{debug, info, instrument};

const CONTEXT_PROBE: &str = include_str!("context_probe.py");

/// Output fragments showing that a `_tasks` command failed rather than
/// the render itself.
const TASK_FAILURE_MARKERS: &[&str] = &[
    "CalledProcessError",
    "TaskError",
    "returned non-zero exit status",
];

#[derive(Debug, Error)]
enum PrepareError {
    #[error("cannot write scratch file: {0}")]
    Io(#[from] io::Error),

    #[error("cannot encode answers or probe payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<PrepareError> for EngineError {
    fn from(err: PrepareError) -> Self {
        EngineError::Setup {
            reason: err.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ProbePayload<'a> {
    src_path: &'a Path,
    dst_path: &'a Path,
    data: &'a Answers,
    #[serde(rename = "unsafe")]
    unsafe_template: bool,
    defaults: bool,
    output: &'a Path,
}

/// [`TemplateEngine`] backed by the `copier` executable.
pub struct CopierCli {
    runner: Arc<dyn CommandRunner>,
    program: String,
    python: String,
}

impl CopierCli {
    pub const DEFAULT_PROGRAM: &'static str = "copier";
    pub const DEFAULT_PYTHON: &'static str = "python3";

    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            program: Self::DEFAULT_PROGRAM.into(),
            python: Self::DEFAULT_PYTHON.into(),
        }
    }

    /// Use another copier executable (a venv path, `pipx run copier`...).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Interpreter that has copier installed, used for context probes.
    pub fn with_python(mut self, python: impl Into<String>) -> Self {
        self.python = python.into();
        self
    }

    fn copy_command(
        &self,
        request: &RenderRequest,
        data_file: &Path,
        destination: &Path,
    ) -> CommandLine {
        CommandLine::new(&self.program)
            .arg("copy")
            .args(switches(&request.options, true))
            .args(["--quiet", "--data-file"])
            .arg(data_file.to_string_lossy())
            .arg(request.template.path().to_string_lossy())
            .arg(destination.to_string_lossy())
    }

    fn update_command(
        &self,
        request: &RenderRequest,
        data_file: &Path,
        destination: &Path,
    ) -> CommandLine {
        CommandLine::new(&self.program)
            .arg("update")
            .args(switches(&request.options, false))
            .args(["--quiet", "--data-file"])
            .arg(data_file.to_string_lossy())
            .arg(destination.to_string_lossy())
    }

    fn render(
        &self,
        command: &CommandLine,
        cwd: &Path,
        request: &RenderRequest,
    ) -> Result<(), EngineError> {
        let options = RunOptions::new().with_env(request.env.clone());
        self.runner
            .run(command, cwd, &options)
            .map(|output| debug!(bytes = output.len(), "Copier finished"))
            .map_err(classify)
    }
}

impl TemplateEngine for CopierCli {
    #[instrument(skip_all, fields(destination = %request.destination.display()))]
    fn copy(&self, request: &RenderRequest) -> Result<(), EngineError> {
        let data = data_file(&request.data)?;
        let destination = absolute(&request.destination)?;
        let command = self.copy_command(request, data.path(), &destination);

        self.render(&command, request.template.path(), request)?;
        info!("Copier copy completed");
        Ok(())
    }

    #[instrument(skip_all, fields(destination = %request.destination.display()))]
    fn update(&self, request: &RenderRequest) -> Result<(), EngineError> {
        let data = data_file(&request.data)?;
        let destination = absolute(&request.destination)?;
        let command = self.update_command(request, data.path(), &destination);

        self.render(&command, &destination, request)?;
        info!("Copier update completed");
        Ok(())
    }

    #[instrument(skip_all)]
    fn context(&self, request: &RenderRequest) -> Result<RenderContext, EngineError> {
        let scratch = TempDir::with_prefix("copier-context-").map_err(PrepareError::from)?;
        let payload_path = scratch.path().join("payload.json");
        let output_path = scratch.path().join("context.json");
        let destination = absolute(&request.destination)?;

        let payload = ProbePayload {
            src_path: request.template.path(),
            dst_path: &destination,
            data: &request.data,
            unsafe_template: request.options.unsafe_template,
            defaults: request.options.defaults,
            output: &output_path,
        };
        let encoded = serde_json::to_vec(&payload).map_err(PrepareError::from)?;
        fs::write(&payload_path, encoded).map_err(PrepareError::from)?;

        let command = CommandLine::new(&self.python)
            .args(["-c", CONTEXT_PROBE])
            .arg(payload_path.to_string_lossy());
        self.render(&command, scratch.path(), request)?;

        let raw = fs::read_to_string(&output_path).map_err(|e| EngineError::InvalidOutput {
            reason: format!("context probe wrote nothing: {e}"),
        })?;
        let context: RenderContext =
            serde_json::from_str(&raw).map_err(|e| EngineError::InvalidOutput {
                reason: format!("context is not a JSON object: {e}"),
            })?;

        debug!(variables = context.len(), "Context probe finished");
        Ok(context)
    }
}

/// CLI switches for `options`. `--overwrite` and `--no-cleanup` only
/// exist on `copy`; `update` always overwrites.
fn switches(options: &RenderOptions, copy: bool) -> Vec<&'static str> {
    let mut switches = Vec::new();
    if copy && options.overwrite {
        switches.push("--overwrite");
    }
    if copy && !options.cleanup_on_error {
        switches.push("--no-cleanup");
    }
    if options.unsafe_template {
        switches.push("--trust");
    }
    if options.defaults {
        switches.push("--defaults");
    }
    switches
}

fn classify(err: RunError) -> EngineError {
    let task_failed = err.state != ExitState::NotStarted
        && TASK_FAILURE_MARKERS
            .iter()
            .any(|marker| err.output.contains(marker));

    if task_failed {
        EngineError::Task(err)
    } else {
        EngineError::Failed(err)
    }
}

/// Answers as a JSON document. Every string is quoted, so `yes`, `on`,
/// `1_000` or `2024-01-01` stay strings under YAML 1.1.
fn data_file(answers: &Answers) -> Result<NamedTempFile, PrepareError> {
    let file = tempfile::Builder::new()
        .prefix("copier-data-")
        .suffix(".yml")
        .tempfile()?;
    fs::write(file.path(), serde_json::to_vec(answers)?)?;
    Ok(file)
}

fn absolute(path: &Path) -> Result<PathBuf, PrepareError> {
    Ok(std::path::absolute(path)?)
}
