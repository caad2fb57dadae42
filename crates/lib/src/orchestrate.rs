//! The build orchestrator.
//!
//! Runs Source Acquisition, Platform Build Dispatch and Artifact Harvest in
//! order for one target, then writes the package metadata. The target is
//! resolved before anything touches the filesystem, so an unsupported
//! platform leaves no trace. Every other failure is fatal and surfaces as
//! one of the [`OrchestrateError`] variants.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::dispatch::BuildProcedure;
use crate::exec::{CommandRunner, ExecuteError, Invocation};
use crate::harvest::{ArtifactManifest, HarvestError, HarvestReport, HarvestRoots, harvest};
use crate::layout::Layout;
use crate::package::PackageInfo;
use crate::recipe::{Recipe, RecipeError};
use crate::source::{AcquireError, CheckoutState, SourceRef, acquire, inspect};
use crate::target::{ResolvedTarget, Target, TargetError};
use crate::work_lock::{WorkLock, WorkLockError};

#[derive(Debug, Error)]
pub enum OrchestrateError {
  #[error("unsupported platform: {0}")]
  UnsupportedPlatform(#[from] TargetError),

  #[error("source acquisition failed: {0}")]
  Acquisition(#[from] AcquireError),

  #[error("build failed: {0}")]
  Build(#[source] ExecuteError),

  #[error("harvest failed: {0}")]
  Harvest(#[from] HarvestError),

  #[error(transparent)]
  Recipe(#[from] RecipeError),

  #[error(transparent)]
  Lock(#[from] WorkLockError),

  #[error("failed to {action} '{path}': {source}")]
  Io {
    action: &'static str,
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Immutable inputs shared by every step.
#[derive(Debug, Clone)]
pub struct Orchestrator {
  recipe: Recipe,
  layout: Layout,
}

/// Summary of a completed build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
  pub platform: String,
  pub compiler: String,
  pub build_type: String,
  pub source_reused: bool,
  pub commands: Vec<String>,
  pub harvest: HarvestReport,
  pub metadata_path: PathBuf,
  pub package: PackageInfo,
  #[serde(skip)]
  pub elapsed: Duration,
}

/// What a build would run, without running it.
#[derive(Debug, Clone)]
pub struct BuildPlan {
  pub target: ResolvedTarget,
  pub procedure: BuildProcedure,
  /// `None` when an existing checkout will be reused.
  pub clone: Option<Invocation>,
  pub build: Vec<Invocation>,
  pub manifest: ArtifactManifest,
}

impl BuildPlan {
  pub fn invocations(&self) -> impl Iterator<Item = &Invocation> {
    self.clone.iter().chain(self.build.iter())
  }
}

impl Orchestrator {
  pub fn new(recipe: Recipe, layout: Layout) -> Self {
    Self { recipe, layout }
  }

  /// Load the recipe at `config` (or the built-in one) and place the work
  /// tree at `work_dir`, falling back to the recipe's default location.
  pub fn configure(config: Option<&Path>, work_dir: Option<PathBuf>) -> Result<Self, OrchestrateError> {
    let recipe = Recipe::load_or_default(config)?;
    let layout = match work_dir {
      Some(dir) => Layout::new(dir),
      None => Layout::for_recipe(&recipe),
    };
    Ok(Self::new(recipe, layout))
  }

  pub fn recipe(&self) -> &Recipe {
    &self.recipe
  }

  pub fn layout(&self) -> &Layout {
    &self.layout
  }

  pub fn source_ref(&self) -> SourceRef {
    SourceRef::new(&self.recipe.url, &self.recipe.tag, self.layout.source_dir())
  }

  pub fn manifest(&self, target: &ResolvedTarget) -> ArtifactManifest {
    ArtifactManifest::for_os(target.os(), target.build_type, &self.recipe.header_subdir)
  }

  /// Resolve `target` and list the invocations a build would run.
  pub fn plan(&self, target: &Target) -> Result<BuildPlan, OrchestrateError> {
    let resolved = target.resolve()?;
    let procedure = BuildProcedure::for_resolved(&resolved, &self.recipe);

    let source = self.source_ref();
    let clone = match inspect(&source) {
      CheckoutState::Complete { .. } => None,
      _ => Some(source.clone_invocation()),
    };

    Ok(BuildPlan {
      build: procedure.invocations(&self.layout),
      manifest: self.manifest(&resolved),
      target: resolved,
      procedure,
      clone,
    })
  }

  /// Acquire the sources only.
  pub async fn fetch<R: CommandRunner>(&self, runner: &R) -> Result<bool, OrchestrateError> {
    let _lock = WorkLock::acquire(&self.layout, "source")?;
    let acquired = acquire(&self.source_ref(), runner).await?;
    Ok(acquired.reused)
  }

  /// Harvest an existing build and write the package metadata.
  pub fn package(&self, target: &Target) -> Result<(HarvestReport, PackageInfo), OrchestrateError> {
    let resolved = target.resolve()?;
    let _lock = WorkLock::acquire(&self.layout, "package")?;
    self.harvest_and_describe(&resolved)
  }

  /// Run the full pipeline for `target`.
  pub async fn build<R: CommandRunner>(&self, target: &Target, runner: &R) -> Result<BuildReport, OrchestrateError> {
    let start = Instant::now();

    let resolved = target.resolve()?;
    let procedure = BuildProcedure::for_resolved(&resolved, &self.recipe);
    info!(
      platform = %resolved.platform,
      compiler = %resolved.compiler,
      build_type = %resolved.build_type,
      "starting build"
    );

    let _lock = WorkLock::acquire(&self.layout, "build")?;
    self.discard_metadata()?;

    let acquired = acquire(&self.source_ref(), runner).await?;

    self.reset_build_dir()?;
    procedure
      .run(&self.layout, runner)
      .await
      .map_err(OrchestrateError::Build)?;

    let (harvest, package) = self.harvest_and_describe(&resolved)?;

    let elapsed = start.elapsed();
    info!(elapsed_ms = elapsed.as_millis() as u64, digest = %harvest.digest, "build complete");

    Ok(BuildReport {
      platform: resolved.platform.triple(),
      compiler: resolved.compiler.to_string(),
      build_type: resolved.build_type.to_string(),
      source_reused: acquired.reused,
      commands: procedure
        .invocations(&self.layout)
        .iter()
        .map(Invocation::command_line)
        .collect(),
      harvest,
      metadata_path: self.layout.metadata_path(),
      package,
      elapsed,
    })
  }

  fn harvest_and_describe(&self, target: &ResolvedTarget) -> Result<(HarvestReport, PackageInfo), OrchestrateError> {
    let manifest = self.manifest(target);
    let source_dir = self.layout.source_dir();
    let build_dir = self.layout.build_dir();
    let roots = HarvestRoots {
      build_dir: &build_dir,
      source_dir: &source_dir,
    };

    let report = harvest(&manifest, &roots, &self.layout.package_dir())?;

    let info = PackageInfo::for_build(&self.recipe, target.platform, target.build_type);
    let metadata_path = self.layout.metadata_path();
    info.write(&metadata_path).map_err(|source| OrchestrateError::Io {
      action: "write package metadata",
      path: metadata_path,
      source,
    })?;

    Ok((report, info))
  }

  /// Metadata from an earlier run must not describe a build that is about to
  /// be replaced, whether or not this one succeeds.
  fn discard_metadata(&self) -> Result<(), OrchestrateError> {
    let metadata_path = self.layout.metadata_path();
    match fs::remove_file(&metadata_path) {
      Ok(()) => {
        debug!(path = %metadata_path.display(), "removed previous package metadata");
        Ok(())
      }
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(source) => Err(OrchestrateError::Io {
        action: "remove previous package metadata",
        path: metadata_path,
        source,
      }),
    }
  }

  /// The build output location is disposable and recreated for every build.
  fn reset_build_dir(&self) -> Result<(), OrchestrateError> {
    let build_dir = self.layout.build_dir();
    let reset_err = |source| OrchestrateError::Io {
      action: "reset build directory",
      path: build_dir.clone(),
      source,
    };

    if build_dir.exists() {
      fs::remove_dir_all(&build_dir).map_err(reset_err)?;
    }
    fs::create_dir_all(&build_dir).map_err(reset_err)?;
    Ok(())
  }
}
