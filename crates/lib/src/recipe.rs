//! Recipe configuration.
//!
//! A recipe pins everything about *what* is built: the upstream repository and
//! tag, the SDK version handed to the Windows scripts, the ninja job count and
//! the descriptive package fields. The defaults are the DXC 1.7.2308 release;
//! a TOML file can override any field.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{
  DEFAULT_NINJA_JOBS, HEADER_SUBDIR, LINK_NAME, PACKAGE_VERSION, PREDEFINED_PARAMS, UPSTREAM_TAG, UPSTREAM_URL,
  WINDOWS_SDK_VERSION,
};

#[derive(Debug, Error)]
pub enum RecipeError {
  #[error("failed to read recipe '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse recipe '{path}': {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: Box<toml::de::Error>,
  },

  #[error("invalid recipe: {0}")]
  Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Recipe {
  pub name: String,
  pub version: String,
  pub description: String,
  pub license: String,
  pub homepage: String,
  pub topics: Vec<String>,

  /// Git URL of the upstream repository.
  pub url: String,
  /// Tag (or branch) cloned with `--branch`.
  pub tag: String,

  pub windows_sdk_version: String,
  pub jobs: u32,
  pub predefined_params: PathBuf,
  pub header_subdir: PathBuf,
  pub link_name: String,
}

impl Default for Recipe {
  fn default() -> Self {
    Self {
      name: "dxc".to_string(),
      version: PACKAGE_VERSION.to_string(),
      description: "DirectX Shader Compiler".to_string(),
      license: "NCSA".to_string(),
      homepage: "https://github.com/microsoft/DirectXShaderCompiler".to_string(),
      topics: ["hlsl", "dxc", "compiler", "shader", "spirv"]
        .iter()
        .map(|t| t.to_string())
        .collect(),
      url: UPSTREAM_URL.to_string(),
      tag: UPSTREAM_TAG.to_string(),
      windows_sdk_version: WINDOWS_SDK_VERSION.to_string(),
      jobs: DEFAULT_NINJA_JOBS,
      predefined_params: PathBuf::from(PREDEFINED_PARAMS),
      header_subdir: PathBuf::from(HEADER_SUBDIR),
      link_name: LINK_NAME.to_string(),
    }
  }
}

impl Recipe {
  /// Load a recipe from a TOML file. Missing fields keep their defaults.
  pub fn load(path: &Path) -> Result<Self, RecipeError> {
    let content = fs::read_to_string(path).map_err(|source| RecipeError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    let recipe = Self::from_toml(&content).map_err(|e| match e {
      RecipeError::Parse { source, .. } => RecipeError::Parse {
        path: path.to_path_buf(),
        source,
      },
      other => other,
    })?;

    debug!(path = %path.display(), tag = %recipe.tag, "loaded recipe");
    Ok(recipe)
  }

  /// Load from `path` when given, otherwise return the built-in recipe.
  pub fn load_or_default(path: Option<&Path>) -> Result<Self, RecipeError> {
    match path {
      Some(path) => Self::load(path),
      None => Ok(Self::default()),
    }
  }

  pub fn from_toml(content: &str) -> Result<Self, RecipeError> {
    let recipe: Recipe = toml::from_str(content).map_err(|e| RecipeError::Parse {
      path: PathBuf::new(),
      source: Box::new(e),
    })?;
    recipe.validate()?;
    Ok(recipe)
  }

  pub fn validate(&self) -> Result<(), RecipeError> {
    if self.url.trim().is_empty() {
      return Err(RecipeError::Invalid("url must not be empty".to_string()));
    }
    if self.tag.trim().is_empty() {
      return Err(RecipeError::Invalid("tag must not be empty".to_string()));
    }
    if self.jobs == 0 {
      return Err(RecipeError::Invalid("jobs must be at least 1".to_string()));
    }
    if self.link_name.trim().is_empty() {
      return Err(RecipeError::Invalid("link_name must not be empty".to_string()));
    }
    for (field, path) in [
      ("predefined_params", &self.predefined_params),
      ("header_subdir", &self.header_subdir),
    ] {
      if path.is_absolute() {
        return Err(RecipeError::Invalid(format!(
          "{field} must be relative to the checkout, got '{}'",
          path.display()
        )));
      }
    }
    Ok(())
  }
}
