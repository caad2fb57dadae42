//! Test utilities for dxcpkg-lib.
//!
//! `RecordingRunner` stands in for the real process runner: it records every
//! invocation and can simulate what a tool would leave on disk.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

use crate::exec::{CommandRunner, ExecuteError, Invocation};

type Effect = Box<dyn Fn(&Invocation) -> std::io::Result<()> + Send + Sync>;

#[derive(Default)]
pub struct RecordingRunner {
  calls: Mutex<Vec<Invocation>>,
  effects: HashMap<String, Effect>,
  failing: HashSet<String>,
}

impl RecordingRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// A runner where every invocation of `program` exits with status 1.
  pub fn failing_on(program: &str) -> Self {
    Self::new().failing_program(program)
  }

  pub fn failing_program(mut self, program: &str) -> Self {
    self.failing.insert(program.to_string());
    self
  }

  /// Run `effect` whenever `program` is invoked, before its exit status is decided.
  pub fn with_effect<F>(mut self, program: &str, effect: F) -> Self
  where
    F: Fn(&Invocation) -> std::io::Result<()> + Send + Sync + 'static,
  {
    self.effects.insert(program.to_string(), Box::new(effect));
    self
  }

  pub fn invocations(&self) -> Vec<Invocation> {
    self.calls.lock().unwrap().clone()
  }

  pub fn programs(&self) -> Vec<String> {
    self.invocations().into_iter().map(|i| i.program).collect()
  }
}

impl CommandRunner for RecordingRunner {
  async fn run(&self, invocation: &Invocation) -> Result<(), ExecuteError> {
    self.calls.lock().unwrap().push(invocation.clone());

    if let Some(effect) = self.effects.get(&invocation.program) {
      effect(invocation)?;
    }

    if self.failing.contains(&invocation.program) {
      return Err(ExecuteError::CmdFailed {
        cmd: invocation.command_line(),
        code: Some(1),
      });
    }
    Ok(())
  }
}

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// Write `content` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &str) {
  let path = root.join(relative);
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(path, content).unwrap();
}

/// Cross-platform symlink creation helper
pub fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
  #[cfg(unix)]
  {
    std::os::unix::fs::symlink(target, link)
  }
  #[cfg(windows)]
  {
    std::os::windows::fs::symlink_file(target, link)
  }
}

/// Lay out a fake upstream checkout with a small header tree.
pub fn fake_checkout(root: &Path) {
  write_file(root, "include/dxc/dxcapi.h", "// dxcapi");
  write_file(root, "include/dxc/dxcerrors.h", "// dxcerrors");
  write_file(root, "include/dxc/Support/WinAdapter.h", "// adapter");
  write_file(root, "include/dxc/Support/ErrorCodes.h", "// codes");
  write_file(root, "include/dxc/DxilContainer/DxilContainer.h", "// container");
  write_file(root, "include/dxc/README.txt", "not a header");
  write_file(root, "cmake/caches/PredefinedParams.cmake", "set(LLVM_TARGETS_TO_BUILD None CACHE STRING \"\")");
}

/// Run the git CLI in `dir` with a throwaway identity.
pub fn git(dir: &Path, args: &[&str]) -> String {
  let output = std::process::Command::new("git")
    .args([
      "-c",
      "user.name=dxcpkg",
      "-c",
      "user.email=dxcpkg@localhost",
      "-c",
      "commit.gpgsign=false",
      "-c",
      "tag.gpgsign=false",
      "-c",
      "init.defaultBranch=main",
    ])
    .args(args)
    .current_dir(dir)
    .output()
    .unwrap();
  assert!(
    output.status.success(),
    "git {args:?} failed: {}",
    String::from_utf8_lossy(&output.stderr)
  );
  String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Create a repository at `root` holding a fake checkout, with `tag` on HEAD.
/// Returns the tagged commit.
pub fn tagged_repo(root: &Path, tag: &str) -> String {
  fake_checkout(root);
  git(root, &["init", "-q"]);
  git(root, &["add", "."]);
  git(root, &["commit", "-q", "-m", "upstream"]);
  git(root, &["tag", tag]);
  git(root, &["rev-parse", "HEAD"])
}
