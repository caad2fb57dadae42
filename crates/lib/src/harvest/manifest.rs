//! Static per-OS artifact manifest.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::platform::os::Os;
use crate::target::BuildType;

use super::pattern::Pattern;

/// Package subdirectory an artifact lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
  Include,
  Lib,
  Bin,
}

impl Destination {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Include => "include",
      Self::Lib => "lib",
      Self::Bin => "bin",
    }
  }
}

impl fmt::Display for Destination {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Directory a rule's pattern is matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRoot {
  /// The out-of-tree build directory.
  Build,
  /// A subdirectory of the upstream checkout.
  Checkout(PathBuf),
}

/// The concrete directories [`SourceRoot`]s resolve against.
#[derive(Debug, Clone, Copy)]
pub struct HarvestRoots<'a> {
  pub build_dir: &'a Path,
  pub source_dir: &'a Path,
}

impl SourceRoot {
  pub fn resolve(&self, roots: &HarvestRoots<'_>) -> PathBuf {
    match self {
      Self::Build => roots.build_dir.to_path_buf(),
      Self::Checkout(sub) => roots.source_dir.join(sub),
    }
  }
}

impl fmt::Display for SourceRoot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Build => write!(f, "build"),
      Self::Checkout(sub) => write!(f, "source/{}", sub.display()),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRule {
  pub pattern: Pattern,
  pub root: SourceRoot,
  pub dest: Destination,
  /// Keep the path relative to the root instead of flattening to the file name.
  pub keep_path: bool,
}

impl ArtifactRule {
  fn build(pattern: &str, dest: Destination) -> Self {
    Self {
      pattern: Pattern::new(pattern),
      root: SourceRoot::Build,
      dest,
      keep_path: false,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactManifest {
  pub os: Os,
  pub rules: Vec<ArtifactRule>,
}

impl ArtifactManifest {
  /// The manifest for `os`.
  ///
  /// Headers come from the checkout with their tree intact; the compiler
  /// library and the `dxc` driver come flattened from the build output.
  /// MSBuild writes into a per-configuration directory, so the Windows
  /// patterns carry the `Release`/`Debug` prefix.
  pub fn for_os(os: Os, build_type: BuildType, header_subdir: &Path) -> Self {
    let headers = ArtifactRule {
      pattern: Pattern::new("*.h"),
      root: SourceRoot::Checkout(header_subdir.to_path_buf()),
      dest: Destination::Include,
      keep_path: true,
    };

    let mut rules = vec![headers];
    match os {
      Os::Windows => {
        let cfg = build_type.config_dir();
        rules.push(ArtifactRule::build(&format!("{cfg}/lib/dxcompiler.lib"), Destination::Lib));
        rules.push(ArtifactRule::build(&format!("{cfg}/bin/dxcompiler.dll"), Destination::Bin));
        rules.push(ArtifactRule::build(&format!("{cfg}/bin/dxc.exe"), Destination::Bin));
      }
      Os::Linux => {
        rules.push(ArtifactRule::build("lib/libdxcompiler.so*", Destination::Lib));
        rules.push(ArtifactRule::build("bin/dxc", Destination::Bin));
      }
      Os::MacOs => {
        rules.push(ArtifactRule::build("lib/libdxcompiler.dylib*", Destination::Lib));
        rules.push(ArtifactRule::build("bin/dxc", Destination::Bin));
      }
    }

    Self { os, rules }
  }
}
