//! Work directory layout.
//!
//! Every path the orchestrator touches hangs off one work directory:
//!
//! ```text
//! <work>/
//!   source/        upstream checkout (Source Acquisition)
//!   build/         out-of-tree build output (Platform Build Dispatch)
//!   package/       include/, lib/, bin/ (Artifact Harvest)
//!   package.json   package metadata
//!   .lock          held while a step mutates the tree
//! ```

use std::path::{Path, PathBuf};

use crate::platform::paths::default_work_dir;
use crate::recipe::Recipe;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
  work_dir: PathBuf,
}

impl Layout {
  /// A relative `work_dir` is resolved against the current directory, since
  /// build steps run with other working directories.
  pub fn new(work_dir: impl Into<PathBuf>) -> Self {
    let work_dir = work_dir.into();
    Self {
      work_dir: std::path::absolute(&work_dir).unwrap_or(work_dir),
    }
  }

  /// The default layout for a recipe, honoring `DXCPKG_WORK_DIR`.
  pub fn for_recipe(recipe: &Recipe) -> Self {
    Self::new(default_work_dir(&recipe.name, &recipe.version))
  }

  pub fn work_dir(&self) -> &Path {
    &self.work_dir
  }

  pub fn source_dir(&self) -> PathBuf {
    self.work_dir.join("source")
  }

  pub fn build_dir(&self) -> PathBuf {
    self.work_dir.join("build")
  }

  pub fn package_dir(&self) -> PathBuf {
    self.work_dir.join("package")
  }

  pub fn metadata_path(&self) -> PathBuf {
    self.work_dir.join("package.json")
  }

  pub fn lock_path(&self) -> PathBuf {
    self.work_dir.join(".lock")
  }
}
