//! Artifact harvest.
//!
//! Copies every file an [`ArtifactManifest`] selects into the package
//! directory. The package is assembled in a staging directory beside the
//! target and renamed into place, so the result holds exactly the matched
//! files: nothing stale survives from an earlier run and a failure leaves no
//! partial package.

pub mod digest;
pub mod manifest;
pub mod pattern;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

pub use digest::{DigestError, PackageDigest};
pub use manifest::{ArtifactManifest, ArtifactRule, Destination, HarvestRoots, SourceRoot};
pub use pattern::Pattern;

#[derive(Debug, Error)]
pub enum HarvestError {
  #[error("artifact root '{0}' does not exist")]
  MissingRoot(PathBuf),

  #[error("pattern '{pattern}' matched no files under '{root}'")]
  NoMatch { pattern: String, root: PathBuf },

  #[error("'{first}' and '{second}' would both be packaged as '{dest}'")]
  Collision {
    first: PathBuf,
    second: PathBuf,
    dest: PathBuf,
  },

  #[error("failed to walk '{path}': {source}")]
  Walk {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error("failed to copy '{from}' to '{to}': {source}")]
  Copy {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to prepare package directory '{path}': {source}")]
  Prepare {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to digest package: {0}")]
  Digest(#[from] DigestError),
}

/// One packaged file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarvestedFile {
  pub source: PathBuf,
  /// Path relative to the package directory.
  pub dest: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct HarvestReport {
  pub package_dir: PathBuf,
  pub files: Vec<HarvestedFile>,
  /// Content hash of the finished package directory.
  pub digest: PackageDigest,
}

/// A file selected by a rule, before copying.
struct Match {
  source: PathBuf,
  relative: String,
  is_symlink: bool,
}

/// Populate `package_dir` from the manifest.
pub fn harvest(
  manifest: &ArtifactManifest,
  roots: &HarvestRoots<'_>,
  package_dir: &Path,
) -> Result<HarvestReport, HarvestError> {
  // Resolve every rule before anything is written.
  let mut planned: Vec<(Match, PathBuf)> = Vec::new();
  for rule in &manifest.rules {
    let root = rule.root.resolve(roots);
    let matches = collect_matches(rule, &root)?;
    if matches.is_empty() {
      return Err(HarvestError::NoMatch {
        pattern: rule.pattern.to_string(),
        root,
      });
    }

    debug!(pattern = %rule.pattern, dest = %rule.dest, count = matches.len(), "pattern matched");
    for m in matches {
      let dest = destination(rule, &m);
      if let Some((first, _)) = planned.iter().find(|(_, d)| *d == dest) {
        return Err(HarvestError::Collision {
          first: first.source.clone(),
          second: m.source,
          dest,
        });
      }
      planned.push((m, dest));
    }
  }
  resolve_links(&mut planned);

  let parent = package_dir.parent().unwrap_or_else(|| Path::new("."));
  fs::create_dir_all(parent).map_err(|e| HarvestError::Prepare {
    path: parent.to_path_buf(),
    source: e,
  })?;

  let staging = tempfile::Builder::new()
    .prefix(".package-")
    .tempdir_in(parent)
    .map_err(|e| HarvestError::Prepare {
      path: parent.to_path_buf(),
      source: e,
    })?;

  let mut files = Vec::with_capacity(planned.len());
  for (m, dest) in planned {
    copy_entry(&m, &staging.path().join(&dest))?;
    files.push(HarvestedFile { source: m.source, dest });
  }

  replace_dir(staging, package_dir)?;

  let digest = digest::package_digest(package_dir)?;
  info!(path = %package_dir.display(), files = files.len(), digest = %digest, "package assembled");

  Ok(HarvestReport {
    package_dir: package_dir.to_path_buf(),
    files,
    digest,
  })
}

fn collect_matches(rule: &ArtifactRule, root: &Path) -> Result<Vec<Match>, HarvestError> {
  if !root.is_dir() {
    return Err(HarvestError::MissingRoot(root.to_path_buf()));
  }

  let mut matches = Vec::new();
  for entry in WalkDir::new(root).sort_by_file_name() {
    let entry = entry.map_err(|e| HarvestError::Walk {
      path: root.to_path_buf(),
      source: e,
    })?;

    let file_type = entry.file_type();
    let is_symlink = file_type.is_symlink();
    // Links count when they resolve to a regular file.
    if !(file_type.is_file() || (is_symlink && entry.path().is_file())) {
      continue;
    }

    let Ok(relative) = entry.path().strip_prefix(root) else {
      continue;
    };
    let relative = relative
      .components()
      .map(|c| c.as_os_str().to_string_lossy())
      .collect::<Vec<_>>()
      .join("/");

    if rule.pattern.matches(&relative) {
      matches.push(Match {
        source: entry.path().to_path_buf(),
        relative,
        is_symlink,
      });
    }
  }

  Ok(matches)
}

/// Keep a link only when its target sits beside it in the package too.
///
/// Anything else would dangle once copied, so it is packaged as the file
/// it points to.
fn resolve_links(planned: &mut [(Match, PathBuf)]) {
  let view: &[(Match, PathBuf)] = planned;
  let keep: Vec<bool> = view
    .iter()
    .map(|(m, dest)| m.is_symlink && link_target_is_packaged(m, dest, view))
    .collect();

  for ((m, dest), keep) in planned.iter_mut().zip(keep) {
    if m.is_symlink && !keep {
      debug!(link = %m.source.display(), dest = %dest.display(), "copying link target");
    }
    m.is_symlink = keep;
  }
}

fn link_target_is_packaged(m: &Match, dest: &Path, planned: &[(Match, PathBuf)]) -> bool {
  let Ok(target) = fs::read_link(&m.source) else {
    return false;
  };
  if target.components().count() != 1 || target.is_absolute() {
    return false;
  }
  let Some(dir) = m.source.parent() else {
    return false;
  };

  let source = dir.join(&target);
  let expected_dest = dest.with_file_name(&target);
  planned
    .iter()
    .any(|(other, other_dest)| other.source == source && *other_dest == expected_dest)
}

fn destination(rule: &ArtifactRule, m: &Match) -> PathBuf {
  let base = PathBuf::from(rule.dest.as_str());
  if rule.keep_path {
    m.relative.split('/').fold(base, |path, part| path.join(part))
  } else {
    match m.source.file_name() {
      Some(name) => base.join(name),
      None => base.join(&m.relative),
    }
  }
}

fn copy_entry(m: &Match, to: &Path) -> Result<(), HarvestError> {
  let copy_err = |source| HarvestError::Copy {
    from: m.source.clone(),
    to: to.to_path_buf(),
    source,
  };

  if let Some(parent) = to.parent() {
    fs::create_dir_all(parent).map_err(copy_err)?;
  }

  // Keep soname chains (libdxcompiler.so -> libdxcompiler.so.3.7) as links.
  #[cfg(unix)]
  {
    if m.is_symlink {
      let target = fs::read_link(&m.source).map_err(copy_err)?;
      return std::os::unix::fs::symlink(target, to).map_err(copy_err);
    }
  }

  fs::copy(&m.source, to).map_err(copy_err)?;
  Ok(())
}

/// Swap the staged tree into `package_dir`.
fn replace_dir(staging: tempfile::TempDir, package_dir: &Path) -> Result<(), HarvestError> {
  let prepare_err = |source| HarvestError::Prepare {
    path: package_dir.to_path_buf(),
    source,
  };

  if package_dir.exists() {
    fs::remove_dir_all(package_dir).map_err(prepare_err)?;
  }

  let staged = staging.keep();
  if let Err(e) = fs::rename(&staged, package_dir) {
    let _ = fs::remove_dir_all(&staged);
    return Err(prepare_err(e));
  }
  Ok(())
}
