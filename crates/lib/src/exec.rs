//! External process execution.
//!
//! Every tool the orchestrator drives (git, cmake, ninja, the Windows `hct`
//! scripts) is described as an [`Invocation`] and launched through a
//! [`CommandRunner`]. The exit status is the only success signal.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

use crate::consts::SOURCE_DATE_EPOCH;

#[derive(Debug, Error)]
pub enum ExecuteError {
  /// The process could not be started (missing binary, bad cwd, ...).
  #[error("failed to start '{program}': {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// The process ran and exited unsuccessfully.
  #[error("command failed with exit code {code:?}: {cmd}")]
  CmdFailed { cmd: String, code: Option<i32> },

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// One external program run: program, arguments and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
  pub program: String,
  pub args: Vec<String>,
  pub cwd: PathBuf,
  /// Pass arguments to the child verbatim instead of quoting them.
  /// Only meaningful on Windows, where `cmd /C` does its own parsing.
  pub raw_args: bool,
}

impl Invocation {
  pub fn new<I, S>(program: &str, args: I, cwd: &Path) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      program: program.to_string(),
      args: args.into_iter().map(Into::into).collect(),
      cwd: cwd.to_path_buf(),
      raw_args: false,
    }
  }

  /// Run `script` through `cmd.exe /C`.
  pub fn cmd_script(script: &str, cwd: &Path) -> Self {
    Self {
      program: "cmd".to_string(),
      args: vec!["/C".to_string(), script.to_string()],
      cwd: cwd.to_path_buf(),
      raw_args: true,
    }
  }

  /// The command line as a single display string.
  pub fn command_line(&self) -> String {
    let mut line = self.program.clone();
    for arg in &self.args {
      line.push(' ');
      line.push_str(arg);
    }
    line
  }
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.command_line())
  }
}

/// Runs invocations to completion.
pub trait CommandRunner {
  fn run(&self, invocation: &Invocation) -> impl Future<Output = Result<(), ExecuteError>> + Send;
}

/// Runs invocations as child processes.
///
/// By default child output is captured and only logged when the command
/// fails. With `stream_output` the child inherits stdout/stderr so long
/// builds show progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner {
  pub stream_output: bool,
}

impl ProcessRunner {
  pub fn new(stream_output: bool) -> Self {
    Self { stream_output }
  }

  fn command(&self, invocation: &Invocation) -> Command {
    let mut command = Command::new(&invocation.program);
    add_args(&mut command, invocation);
    command
      .current_dir(&invocation.cwd)
      .stdin(Stdio::null())
      // Reproducible timestamps for tools that honor it
      .env("SOURCE_DATE_EPOCH", SOURCE_DATE_EPOCH);
    command
  }
}

#[cfg(windows)]
fn add_args(command: &mut Command, invocation: &Invocation) {
  if invocation.raw_args {
    for arg in &invocation.args {
      command.raw_arg(arg);
    }
  } else {
    command.args(&invocation.args);
  }
}

#[cfg(not(windows))]
fn add_args(command: &mut Command, invocation: &Invocation) {
  command.args(&invocation.args);
}

impl CommandRunner for ProcessRunner {
  async fn run(&self, invocation: &Invocation) -> Result<(), ExecuteError> {
    info!(cmd = %invocation, cwd = %invocation.cwd.display(), "executing command");

    let mut command = self.command(invocation);
    let spawn_err = |source| ExecuteError::Spawn {
      program: invocation.program.clone(),
      source,
    };

    let status = if self.stream_output {
      command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
      command.status().await.map_err(spawn_err)?
    } else {
      let output = command.output().await.map_err(spawn_err)?;

      if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);

        if !stderr.is_empty() {
          debug!(stderr = %stderr, "command stderr");
        }
        if !stdout.is_empty() {
          debug!(stdout = %stdout, "command stdout");
        }
      }
      output.status
    };

    if !status.success() {
      return Err(ExecuteError::CmdFailed {
        cmd: invocation.command_line(),
        code: status.code(),
      });
    }

    Ok(())
  }
}

/// Run invocations in order, stopping at the first failure.
pub async fn run_all<R: CommandRunner>(runner: &R, invocations: &[Invocation]) -> Result<(), ExecuteError> {
  for invocation in invocations {
    runner.run(invocation).await?;
  }
  Ok(())
}
