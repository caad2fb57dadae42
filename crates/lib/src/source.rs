//! Source acquisition.
//!
//! The upstream tree is cloned shallowly with recursive submodules at a
//! pinned tag. The checkout path is either absent, or holds a complete
//! checkout of that tag: a failed clone removes whatever it left behind, and
//! an existing directory is only reused after `gix` confirms that `HEAD` is
//! the pinned tag's commit and the completion marker says the clone that
//! produced it finished.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::exec::{CommandRunner, ExecuteError, Invocation};

#[derive(Debug, Error)]
pub enum AcquireError {
  #[error("failed to clone '{url}' at '{tag}': {source}")]
  Clone {
    url: String,
    tag: String,
    #[source]
    source: ExecuteError,
  },

  #[error("'{path}' already holds a conflicting checkout: {reason}")]
  Conflict { path: PathBuf, reason: String },

  #[error("failed to prepare '{path}': {source}")]
  Prepare {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to remove partial checkout '{path}': {source}")]
  Cleanup {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Written into the checkout once `git clone` has exited successfully.
pub const CHECKOUT_COMPLETE_MARKER: &str = ".dxcpkg-complete";

const MARKER_VERSION: u32 = 1;

/// Contents of [`CHECKOUT_COMPLETE_MARKER`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutMarker {
  pub version: u32,
  pub url: String,
  pub tag: String,
}

/// Where the upstream sources come from and where they go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
  pub url: String,
  pub tag: String,
  pub checkout: PathBuf,
}

impl SourceRef {
  /// A relative `checkout` is resolved against the current directory.
  pub fn new(url: &str, tag: &str, checkout: impl Into<PathBuf>) -> Self {
    let checkout = checkout.into();
    Self {
      url: url.to_string(),
      tag: tag.to_string(),
      checkout: std::path::absolute(&checkout).unwrap_or(checkout),
    }
  }

  pub fn marker_path(&self) -> PathBuf {
    self.checkout.join(CHECKOUT_COMPLETE_MARKER)
  }

  fn read_marker(&self) -> Option<CheckoutMarker> {
    let content = fs::read_to_string(self.marker_path()).ok()?;
    serde_json::from_str(&content).ok()
  }

  /// Record that the checkout at `self.checkout` is a finished clone.
  pub fn mark_complete(&self) -> std::io::Result<()> {
    let marker = CheckoutMarker {
      version: MARKER_VERSION,
      url: self.url.clone(),
      tag: self.tag.clone(),
    };
    let content = serde_json::to_string_pretty(&marker).map_err(std::io::Error::other)?;
    fs::write(self.marker_path(), content)
  }

  /// `git clone --depth 1 --recursive --branch <tag> <url> <checkout>`
  pub fn clone_invocation(&self) -> Invocation {
    let cwd = self.checkout.parent().unwrap_or_else(|| Path::new("."));
    Invocation::new(
      "git",
      [
        "clone".to_string(),
        "--depth".to_string(),
        "1".to_string(),
        "--recursive".to_string(),
        "--branch".to_string(),
        self.tag.clone(),
        self.url.clone(),
        self.checkout.display().to_string(),
      ],
      cwd,
    )
  }
}

/// What is currently at the checkout path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutState {
  /// Nothing there yet, or an empty directory.
  Missing,
  /// A repository whose HEAD is the pinned tag, from a clone that finished.
  Complete { commit: String },
  /// HEAD is the pinned tag but the clone never recorded completion, e.g.
  /// it was interrupted while fetching submodules.
  Incomplete { reason: String },
  /// Anything else.
  Conflicting { reason: String },
}

/// Outcome of [`acquire`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquired {
  pub path: PathBuf,
  /// True when an existing checkout was reused instead of cloned.
  pub reused: bool,
}

/// Inspect the checkout path without touching the network.
pub fn inspect(source: &SourceRef) -> CheckoutState {
  let path = &source.checkout;

  match fs::read_dir(path) {
    Err(_) if !path.exists() => return CheckoutState::Missing,
    Err(e) => {
      return CheckoutState::Conflicting {
        reason: format!("cannot read directory: {e}"),
      };
    }
    Ok(mut entries) => {
      if entries.next().is_none() {
        return CheckoutState::Missing;
      }
    }
  }

  let repo = match gix::open(path) {
    Ok(repo) => repo,
    Err(e) => {
      return CheckoutState::Conflicting {
        reason: format!("not a git repository: {e}"),
      };
    }
  };

  let head = match repo.head_id() {
    Ok(id) => id.detach(),
    Err(e) => {
      return CheckoutState::Conflicting {
        reason: format!("HEAD does not point to a commit: {e}"),
      };
    }
  };

  let spec = format!("{}^{{commit}}", source.tag);
  let tagged = match repo.rev_parse_single(spec.as_str()) {
    Ok(id) => id.detach(),
    Err(_) => {
      return CheckoutState::Conflicting {
        reason: format!("revision '{}' not found", source.tag),
      };
    }
  };

  if head != tagged {
    return CheckoutState::Conflicting {
      reason: format!("HEAD is {head}, expected '{}' ({tagged})", source.tag),
    };
  }

  match source.read_marker() {
    Some(marker) if marker.version == MARKER_VERSION && marker.tag == source.tag => CheckoutState::Complete {
      commit: head.to_string(),
    },
    Some(marker) => CheckoutState::Incomplete {
      reason: format!("completion marker is for '{}' (version {})", marker.tag, marker.version),
    },
    None => CheckoutState::Incomplete {
      reason: format!("no readable {CHECKOUT_COMPLETE_MARKER}"),
    },
  }
}

/// Produce a populated checkout at `source.checkout`, or fail.
pub async fn acquire<R: CommandRunner>(source: &SourceRef, runner: &R) -> Result<Acquired, AcquireError> {
  match inspect(source) {
    CheckoutState::Complete { commit } => {
      info!(path = %source.checkout.display(), commit = %commit, "reusing existing checkout");
      return Ok(Acquired {
        path: source.checkout.clone(),
        reused: true,
      });
    }
    CheckoutState::Conflicting { reason } => {
      return Err(AcquireError::Conflict {
        path: source.checkout.clone(),
        reason,
      });
    }
    CheckoutState::Incomplete { reason } => {
      warn!(path = %source.checkout.display(), %reason, "discarding unfinished checkout");
      remove_partial(&source.checkout)?;
    }
    CheckoutState::Missing => {}
  }

  if let Some(parent) = source.checkout.parent() {
    fs::create_dir_all(parent).map_err(|e| AcquireError::Prepare {
      path: parent.to_path_buf(),
      source: e,
    })?;
  }
  // git refuses to clone into an existing non-empty directory, and an empty
  // one would only be left behind on failure.
  if source.checkout.exists() {
    fs::remove_dir(&source.checkout).map_err(|e| AcquireError::Prepare {
      path: source.checkout.clone(),
      source: e,
    })?;
  }

  info!(url = %source.url, tag = %source.tag, path = %source.checkout.display(), "cloning repository");

  if let Err(e) = runner.run(&source.clone_invocation()).await {
    warn!(path = %source.checkout.display(), "clone failed, removing partial checkout");
    remove_partial(&source.checkout)?;
    return Err(AcquireError::Clone {
      url: source.url.clone(),
      tag: source.tag.clone(),
      source: e,
    });
  }

  if let Err(e) = source.mark_complete() {
    remove_partial(&source.checkout)?;
    return Err(AcquireError::Prepare {
      path: source.marker_path(),
      source: e,
    });
  }

  debug!(path = %source.checkout.display(), "checkout complete");
  Ok(Acquired {
    path: source.checkout.clone(),
    reused: false,
  })
}

fn remove_partial(path: &Path) -> Result<(), AcquireError> {
  match fs::remove_dir_all(path) {
    Ok(()) => Ok(()),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
    Err(e) => Err(AcquireError::Cleanup {
      path: path.to_path_buf(),
      source: e,
    }),
  }
}
