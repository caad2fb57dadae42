//! Target identity: the OS/architecture/compiler/build-type tuple.
//!
//! A `Target` holds the settings exactly as the caller supplied them. Nothing
//! is validated until `Target::resolve`, which is the only place an unknown
//! OS or architecture turns into an error.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::platform::Platform;
use crate::platform::arch::Arch;
use crate::platform::os::Os;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
  #[error("unsupported OS: {0}")]
  UnsupportedOs(String),

  #[error("unsupported architecture: {0}")]
  UnsupportedArch(String),

  #[error("DXC cannot be built for {arch} on {os}")]
  UnsupportedPlatform { os: Os, arch: Arch },

  #[error("unknown build type '{0}' (expected Debug or Release)")]
  UnknownBuildType(String),
}

/// Build configuration handed to the upstream build scripts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildType {
  Debug,
  #[default]
  Release,
}

impl BuildType {
  pub fn parse(name: &str) -> Option<Self> {
    match name.trim().to_ascii_lowercase().as_str() {
      "debug" => Some(Self::Debug),
      "release" => Some(Self::Release),
      _ => None,
    }
  }

  /// Lowercase spelling, as passed to `CMAKE_BUILD_TYPE` and `hctbuild.cmd`.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Debug => "debug",
      Self::Release => "release",
    }
  }

  /// Name of the multi-config output directory MSBuild writes into.
  pub fn config_dir(&self) -> &'static str {
    match self {
      Self::Debug => "Debug",
      Self::Release => "Release",
    }
  }
}

impl fmt::Display for BuildType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.config_dir())
  }
}

/// Compiler identity. Reported in build summaries; the OS procedure decides
/// which compiler binaries are actually used.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Compiler {
  Msvc,
  Clang,
  AppleClang,
  Gcc,
  Other(String),
}

impl Compiler {
  pub fn parse(name: &str) -> Self {
    match name.trim().to_ascii_lowercase().as_str() {
      "msvc" | "visual studio" | "cl" => Self::Msvc,
      "clang" => Self::Clang,
      "apple-clang" | "apple_clang" => Self::AppleClang,
      "gcc" => Self::Gcc,
      other => Self::Other(other.to_string()),
    }
  }

  /// The toolchain each platform procedure drives when none is given.
  pub fn default_for(os: Os) -> Self {
    match os {
      Os::Windows => Self::Msvc,
      Os::Linux => Self::Clang,
      Os::MacOs => Self::AppleClang,
    }
  }

  pub fn as_str(&self) -> &str {
    match self {
      Self::Msvc => "msvc",
      Self::Clang => "clang",
      Self::AppleClang => "apple-clang",
      Self::Gcc => "gcc",
      Self::Other(name) => name,
    }
  }
}

impl fmt::Display for Compiler {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Raw target settings as supplied by the invoking tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
  pub os: String,
  pub arch: String,
  pub compiler: Option<String>,
  pub build_type: String,
}

impl Target {
  pub fn new(os: &str, arch: &str) -> Self {
    Self {
      os: os.to_string(),
      arch: arch.to_string(),
      compiler: None,
      build_type: BuildType::default().as_str().to_string(),
    }
  }

  pub fn with_build_type(mut self, build_type: &str) -> Self {
    self.build_type = build_type.to_string();
    self
  }

  pub fn with_compiler(mut self, compiler: &str) -> Self {
    self.compiler = Some(compiler.to_string());
    self
  }

  /// The machine this process runs on, as a release build.
  pub fn host() -> Self {
    Self::new(std::env::consts::OS, std::env::consts::ARCH)
  }

  /// Validate the settings against the supported set.
  pub fn resolve(&self) -> Result<ResolvedTarget, TargetError> {
    let os = Os::parse(&self.os).ok_or_else(|| TargetError::UnsupportedOs(self.os.clone()))?;
    let arch = Arch::parse(&self.arch).ok_or_else(|| TargetError::UnsupportedArch(self.arch.clone()))?;

    let platform = Platform::new(arch, os);
    if !platform.is_buildable() {
      return Err(TargetError::UnsupportedPlatform { os, arch });
    }

    let build_type =
      BuildType::parse(&self.build_type).ok_or_else(|| TargetError::UnknownBuildType(self.build_type.clone()))?;

    let compiler = self
      .compiler
      .as_deref()
      .map(Compiler::parse)
      .unwrap_or_else(|| Compiler::default_for(os));

    Ok(ResolvedTarget {
      platform,
      compiler,
      build_type,
    })
  }
}

impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}/{}", self.os, self.arch, self.build_type)
  }
}

/// A target whose every setting is known to be supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
  pub platform: Platform,
  pub compiler: Compiler,
  pub build_type: BuildType,
}

impl ResolvedTarget {
  pub fn os(&self) -> Os {
    self.platform.os
  }

  pub fn arch(&self) -> Arch {
    self.platform.arch
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn resolves_supported_targets() {
    let resolved = Target::new("Linux", "x86_64").resolve().unwrap();
    assert_eq!(resolved.os(), Os::Linux);
    assert_eq!(resolved.arch(), Arch::X86_64);
    assert_eq!(resolved.build_type, BuildType::Release);
    assert_eq!(resolved.compiler, Compiler::Clang);
  }

  #[test]
  fn unknown_os_is_unsupported() {
    let err = Target::new("FreeBSD", "x86_64").resolve().unwrap_err();
    assert_eq!(err, TargetError::UnsupportedOs("FreeBSD".to_string()));
  }

  #[test]
  fn unknown_arch_is_unsupported() {
    let err = Target::new("Linux", "sparc").resolve().unwrap_err();
    assert_eq!(err, TargetError::UnsupportedArch("sparc".to_string()));
  }

  #[test]
  fn known_pair_outside_build_matrix() {
    let err = Target::new("Macos", "x86").resolve().unwrap_err();
    assert_eq!(
      err,
      TargetError::UnsupportedPlatform {
        os: Os::MacOs,
        arch: Arch::X86
      }
    );
  }

  #[test]
  fn build_type_is_case_insensitive() {
    let resolved = Target::new("Windows", "x64").with_build_type("Debug").resolve().unwrap();
    assert_eq!(resolved.build_type, BuildType::Debug);

    let err = Target::new("Windows", "x64")
      .with_build_type("RelWithDebInfo")
      .resolve()
      .unwrap_err();
    assert_eq!(err, TargetError::UnknownBuildType("RelWithDebInfo".to_string()));
  }

  #[test]
  fn explicit_compiler_overrides_default() {
    let resolved = Target::new("Linux", "armv8").with_compiler("gcc").resolve().unwrap();
    assert_eq!(resolved.compiler, Compiler::Gcc);
    assert_eq!(resolved.arch(), Arch::Aarch64);
  }

  #[test]
  fn host_target_is_release() {
    assert_eq!(Target::host().build_type, "release");
  }
}
