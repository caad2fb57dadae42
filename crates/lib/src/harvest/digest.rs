//! Content digest of an assembled package.
//!
//! Two packages with the same files, contents and link targets at the same
//! relative paths get the same digest. Timestamps and permissions are ignored.

use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use walkdir::WalkDir;

/// Lowercase hex SHA-256.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PackageDigest(String);

impl PackageDigest {
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for PackageDigest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

#[derive(Debug, Error)]
pub enum DigestError {
  #[error("failed to walk '{path}': {source}")]
  Walk {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error("failed to read '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Digest every entry under `root`, in file-name order.
///
/// Each entry contributes one record: `D <path>`, `F <path> <sha256>` or
/// `L <path> <target>`.
pub fn package_digest(root: &Path) -> Result<PackageDigest, DigestError> {
  let mut hasher = Sha256::new();

  for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
    let entry = entry.map_err(|source| DigestError::Walk {
      path: root.to_path_buf(),
      source,
    })?;
    let path = entry.path();
    let read_err = |source| DigestError::Read {
      path: path.to_path_buf(),
      source,
    };

    let relative = path
      .strip_prefix(root)
      .unwrap_or(path)
      .components()
      .map(|c| c.as_os_str().to_string_lossy())
      .collect::<Vec<_>>()
      .join("/");

    let file_type = entry.file_type();
    let record = if file_type.is_symlink() {
      let target = fs::read_link(path).map_err(read_err)?;
      format!("L {relative} {}", target.to_string_lossy())
    } else if file_type.is_dir() {
      format!("D {relative}")
    } else if file_type.is_file() {
      let mut file_hasher = Sha256::new();
      let mut file = File::open(path).map_err(read_err)?;
      io::copy(&mut file, &mut file_hasher).map_err(read_err)?;
      format!("F {relative} {}", hex::encode(file_hasher.finalize()))
    } else {
      continue;
    };

    hasher.update(record.as_bytes());
    hasher.update(b"\n");
  }

  Ok(PackageDigest(hex::encode(hasher.finalize())))
}
