//! Package metadata for downstream consumers.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::harvest::Destination;
use crate::platform::Platform;
use crate::recipe::Recipe;
use crate::target::BuildType;

/// How to consume a harvested package: what to link and where the headers are.
///
/// Directory entries are relative to the package directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
  pub name: String,
  pub version: String,
  pub description: String,
  pub license: String,
  pub homepage: String,
  pub topics: Vec<String>,
  pub libs: Vec<String>,
  pub include_dirs: Vec<String>,
  pub lib_dirs: Vec<String>,
  pub bin_dirs: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub platform: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub build_type: Option<BuildType>,
}

impl PackageInfo {
  /// The OS-independent description of the package.
  pub fn new(recipe: &Recipe) -> Self {
    Self {
      name: recipe.name.clone(),
      version: recipe.version.clone(),
      description: recipe.description.clone(),
      license: recipe.license.clone(),
      homepage: recipe.homepage.clone(),
      topics: recipe.topics.clone(),
      libs: vec![recipe.link_name.clone()],
      include_dirs: vec![Destination::Include.as_str().to_string()],
      lib_dirs: vec![Destination::Lib.as_str().to_string()],
      bin_dirs: vec![Destination::Bin.as_str().to_string()],
      platform: None,
      build_type: None,
    }
  }

  /// Stamp the platform a concrete package was built for.
  pub fn for_build(recipe: &Recipe, platform: Platform, build_type: BuildType) -> Self {
    Self {
      platform: Some(platform.triple()),
      build_type: Some(build_type),
      ..Self::new(recipe)
    }
  }

  pub fn write(&self, path: &Path) -> io::Result<()> {
    let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
    fs::write(path, json)?;
    debug!(path = %path.display(), "wrote package metadata");
    Ok(())
  }

  pub fn read(path: &Path) -> io::Result<Self> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(io::Error::other)
  }
}
