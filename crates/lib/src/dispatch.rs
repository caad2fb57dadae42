//! Platform build dispatch.
//!
//! [`BuildProcedure::resolve`] is the one place the target OS is matched.
//! Each variant expands to a fixed configure-then-build sequence:
//!
//! - Windows: the vendor `hctstart.cmd`/`hctbuild.cmd` pair, run as one
//!   `cmd /C` line since `hctbuild` relies on the environment `hctstart` sets.
//! - Linux: CMake with the Ninja generator and clang, then `ninja -j <jobs>`.
//! - macOS: CMake with the Ninja generator, then `ninja`. x86_64 hosts get an
//!   explicit `CMAKE_OSX_ARCHITECTURES` so Rosetta shells don't build arm64.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::exec::{CommandRunner, ExecuteError, Invocation, run_all};
use crate::layout::Layout;
use crate::platform::arch::Arch;
use crate::platform::os::Os;
use crate::recipe::Recipe;
use crate::target::{BuildType, ResolvedTarget, Target, TargetError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildProcedure {
  Windows {
    arch: Arch,
    build_type: BuildType,
    sdk_version: String,
  },
  Linux {
    build_type: BuildType,
    predefined_params: PathBuf,
    jobs: u32,
  },
  MacOs {
    arch: Arch,
    build_type: BuildType,
    predefined_params: PathBuf,
  },
}

impl BuildProcedure {
  /// Select the procedure for `target`. Unsupported targets fail here,
  /// before any tool is run.
  pub fn resolve(target: &Target, recipe: &Recipe) -> Result<Self, TargetError> {
    let resolved = target.resolve()?;
    Ok(Self::for_resolved(&resolved, recipe))
  }

  pub fn for_resolved(target: &ResolvedTarget, recipe: &Recipe) -> Self {
    let build_type = target.build_type;
    match target.os() {
      Os::Windows => Self::Windows {
        arch: target.arch(),
        build_type,
        sdk_version: recipe.windows_sdk_version.clone(),
      },
      Os::Linux => Self::Linux {
        build_type,
        predefined_params: recipe.predefined_params.clone(),
        jobs: recipe.jobs,
      },
      Os::MacOs => Self::MacOs {
        arch: target.arch(),
        build_type,
        predefined_params: recipe.predefined_params.clone(),
      },
    }
  }

  pub fn os(&self) -> Os {
    match self {
      Self::Windows { .. } => Os::Windows,
      Self::Linux { .. } => Os::Linux,
      Self::MacOs { .. } => Os::MacOs,
    }
  }

  pub fn build_type(&self) -> BuildType {
    match self {
      Self::Windows { build_type, .. } | Self::Linux { build_type, .. } | Self::MacOs { build_type, .. } => {
        *build_type
      }
    }
  }

  /// The ordered configure and build invocations.
  pub fn invocations(&self, layout: &Layout) -> Vec<Invocation> {
    let source_dir = layout.source_dir();
    let build_dir = layout.build_dir();

    match self {
      Self::Windows {
        arch,
        build_type,
        sdk_version,
      } => {
        let script = format!(
          "call utils/hct/hctstart.cmd . {} && call utils/hct/hctbuild.cmd -{} -{} -dxc-cmake-system-version {} -spirv -show-cmake-log",
          build_dir.display(),
          hct_arch(*arch),
          build_type.as_str(),
          sdk_version
        );
        vec![Invocation::cmd_script(&script, &source_dir)]
      }
      Self::Linux {
        build_type,
        predefined_params,
        jobs,
      } => {
        let mut configure = cmake_configure(&source_dir, &build_dir, *build_type, predefined_params);
        configure.args.splice(
          4..4,
          [
            "-DCMAKE_C_COMPILER=clang".to_string(),
            "-DCMAKE_CXX_COMPILER=clang++".to_string(),
          ],
        );
        let build = Invocation::new("ninja", ["-j".to_string(), jobs.to_string()], &build_dir);
        vec![configure, build]
      }
      Self::MacOs {
        arch,
        build_type,
        predefined_params,
      } => {
        let mut configure = cmake_configure(&source_dir, &build_dir, *build_type, predefined_params);
        if *arch == Arch::X86_64 {
          configure.args.insert(4, "-DCMAKE_OSX_ARCHITECTURES=x86_64".to_string());
        }
        let build = Invocation::new("ninja", Vec::<String>::new(), &build_dir);
        vec![configure, build]
      }
    }
  }

  /// Run the procedure's invocations in order. The first non-zero exit aborts.
  pub async fn run<R: CommandRunner>(&self, layout: &Layout, runner: &R) -> Result<(), ExecuteError> {
    let invocations = self.invocations(layout);
    info!(os = %self.os(), steps = invocations.len(), "dispatching build");
    run_all(runner, &invocations).await
  }
}

/// `cmake . -B<build> -GNinja -DCMAKE_BUILD_TYPE=<cfg> -C <params>`
///
/// Platform flags are inserted after `-DCMAKE_BUILD_TYPE`, before the cache
/// argument.
fn cmake_configure(source_dir: &Path, build_dir: &Path, build_type: BuildType, params: &Path) -> Invocation {
  Invocation::new(
    "cmake",
    [
      ".".to_string(),
      format!("-B{}", build_dir.display()),
      "-GNinja".to_string(),
      format!("-DCMAKE_BUILD_TYPE={}", build_type.as_str()),
      "-C".to_string(),
      source_dir.join(params).display().to_string(),
    ],
    source_dir,
  )
}

fn hct_arch(arch: Arch) -> &'static str {
  match arch {
    Arch::X86_64 => "x64",
    Arch::Aarch64 => "arm64",
    Arch::X86 => "x86",
  }
}
