//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Isolated test environment.
///
/// Each test gets its own temporary directory holding the work tree, the
/// cache and any stand-in tools.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// Work directory passed with `--work-dir`.
  pub fn work_path(&self) -> PathBuf {
    let p = self.temp.path().join("work");
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  pub fn package_path(&self) -> PathBuf {
    self.work_path().join("package")
  }

  /// Cache path standing in for the user's cache directory.
  pub fn cache_path(&self) -> PathBuf {
    let p = self.temp.path().join("cache");
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  /// Lay out a checkout and a finished Linux build as the upstream tools would.
  pub fn seed_linux_build(&self) {
    for header in ["dxcapi.h", "dxcerrors.h", "Support/WinAdapter.h"] {
      self.write_file(&format!("work/source/include/dxc/{header}"), "// header");
    }
    self.write_file("work/build/lib/libdxcompiler.so", "elf");
    self.write_file("work/build/bin/dxc", "elf");
  }

  /// Get a pre-configured Command for the dxcpkg binary.
  ///
  /// Sets environment variables for isolated testing:
  /// - `XDG_CACHE_HOME`: Isolated cache path
  /// - `LOCALAPPDATA`: Isolated cache path (for Windows)
  ///
  /// and passes `--work-dir` for the per-test work tree.
  pub fn dxcpkg_cmd(&self) -> Command {
    self.dxcpkg_cmd_in(&self.work_path())
  }

  /// Like [`TestEnv::dxcpkg_cmd`] with an explicit work directory.
  pub fn dxcpkg_cmd_in(&self, work_dir: &Path) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("dxcpkg");
    cmd.env_remove("DXCPKG_WORK_DIR");
    cmd.env("XDG_CACHE_HOME", self.cache_path());
    cmd.env("LOCALAPPDATA", self.cache_path());
    cmd.arg("--work-dir").arg(work_dir);
    cmd
  }

  /// Install an executable shell script named `name` into `<temp>/bin`.
  #[cfg(unix)]
  pub fn install_tool(&self, name: &str, script: &str) {
    use std::os::unix::fs::PermissionsExt;

    let path = self.bin_path().join(name);
    std::fs::write(&path, format!("#!/bin/sh\nset -e\n{script}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  }

  pub fn bin_path(&self) -> PathBuf {
    let p = self.temp.path().join("bin");
    std::fs::create_dir_all(&p).unwrap();
    p
  }

  /// `PATH` with the stand-in tools first.
  pub fn path_with_tools(&self) -> std::ffi::OsString {
    let mut paths = vec![self.bin_path()];
    if let Some(existing) = std::env::var_os("PATH") {
      paths.extend(std::env::split_paths(&existing));
    }
    std::env::join_paths(paths).unwrap()
  }
}

pub fn read_json(path: &Path) -> serde_json::Value {
  let content = std::fs::read_to_string(path).unwrap();
  serde_json::from_str(&content).unwrap()
}
