//! Virtual root management.
//!
//! A virtual root is a merged tree in a well-known location that can be used
//! as the library root by ordinary tooling. It contains augmented sources for
//! the packages the overlay touches and links to the original root for the
//! rest. A stamp file records the fingerprint a root was built from, so an
//! up-to-date root is reused instead of merged again.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use super::merger::merge;
use super::types::{MergeConfig, MergeError, MergeStats, num_cpus};
use crate::consts::{APP_NAME, APP_VERSION, STAMP_FILE};
use crate::platform::base_dir;
use crate::util::hash::{ContentHash, Fingerprint, hash_source_tree};
use crate::vfs::SourceFs;

#[derive(Debug, Error)]
pub enum VirtualRootError {
  #[error("failed to fingerprint the overlay")]
  Fingerprint(#[source] io::Error),

  #[error("failed to delete stale virtual root {}", path.display())]
  RemoveStale {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to create virtual root {}", path.display())]
  Create {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to build virtual root")]
  Merge(#[from] MergeError),

  #[error("failed to write stamp {}", path.display())]
  Stamp {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("virtual root task panicked")]
  TaskPanicked(#[from] tokio::task::JoinError),
}

/// Configuration of a virtual root.
#[derive(Debug, Clone)]
pub struct VirtualRootConfig {
  /// The real library root the overlay is merged onto.
  pub goroot: PathBuf,

  /// Version of the toolchain owning `goroot`; part of the root's name.
  pub go_version: String,

  /// Directory virtual roots are created in.
  pub base_dir: PathBuf,

  /// Maximum number of directories augmented at the same time.
  pub parallelism: usize,

  /// Rebuild even if an up-to-date root exists.
  pub force: bool,
}

impl VirtualRootConfig {
  pub fn new(goroot: impl Into<PathBuf>, go_version: impl Into<String>) -> Self {
    Self {
      goroot: goroot.into(),
      go_version: go_version.into(),
      base_dir: base_dir(),
      parallelism: num_cpus(),
      force: false,
    }
  }
}

/// Result of [`VirtualRoot::build`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuiltRoot {
  pub path: PathBuf,
  pub fingerprint: ContentHash,
  /// False when an up-to-date root was reused.
  pub rebuilt: bool,
  /// Statistics of the merge, if one ran.
  pub stats: Option<MergeStats>,
}

#[derive(Debug, Clone)]
pub struct VirtualRoot {
  config: VirtualRootConfig,
  overlay: Arc<dyn SourceFs>,
}

impl VirtualRoot {
  pub fn new(config: VirtualRootConfig, overlay: Arc<dyn SourceFs>) -> Self {
    Self { config, overlay }
  }

  pub fn config(&self) -> &VirtualRootConfig {
    &self.config
  }

  /// Location of the root: `<base_dir>/goroot-vgoroot<version>-<go version>`.
  pub fn path(&self) -> PathBuf {
    self.config.base_dir.join(format!(
      "goroot-{}{}-{}",
      APP_NAME, APP_VERSION, self.config.go_version
    ))
  }

  /// Fingerprint of everything the merged content depends on.
  pub fn fingerprint(&self) -> Result<ContentHash, VirtualRootError> {
    let overlay = hash_source_tree(self.overlay.as_ref(), Path::new("")).map_err(VirtualRootError::Fingerprint)?;
    Ok(
      Fingerprint::new()
        .field("version", APP_VERSION)
        .field("go_version", &self.config.go_version)
        .field("goroot", self.config.goroot.to_string_lossy().as_bytes())
        .field("overlay", &overlay.0)
        .finish(),
    )
  }

  /// Set up the virtual root and return where it is.
  ///
  /// An existing root is reused when its stamp matches the current
  /// fingerprint. Otherwise it is deleted and merged again; the stamp is only
  /// written once the merge succeeded.
  pub async fn build(&self) -> Result<BuiltRoot, VirtualRootError> {
    let root = self.path();
    let stamp = root.join(STAMP_FILE);

    let this = self.clone();
    let fingerprint = tokio::task::spawn_blocking(move || this.fingerprint()).await??;

    if !self.config.force && read_stamp(&stamp).as_deref() == Some(fingerprint.0.as_str()) {
      info!(root = %root.display(), "reusing virtual root");
      return Ok(BuiltRoot {
        path: root,
        fingerprint,
        rebuilt: false,
        stats: None,
      });
    }

    let fresh = root.clone();
    tokio::task::spawn_blocking(move || recreate(&fresh)).await??;

    let merge_config = MergeConfig {
      parallelism: self.config.parallelism,
      ..MergeConfig::new(&self.config.goroot, &root)
    };
    let stats = merge(merge_config, Arc::clone(&self.overlay)).await?;

    fs::write(&stamp, &fingerprint.0).map_err(|source| VirtualRootError::Stamp {
      path: stamp.clone(),
      source,
    })?;
    info!(root = %root.display(), fingerprint = %fingerprint, "built virtual root");

    Ok(BuiltRoot {
      path: root,
      fingerprint,
      rebuilt: true,
      stats: Some(stats),
    })
  }
}

fn read_stamp(path: &Path) -> Option<String> {
  match fs::read_to_string(path) {
    Ok(content) => Some(content.trim().to_string()),
    Err(e) => {
      debug!(stamp = %path.display(), error = %e, "no usable stamp");
      None
    }
  }
}

fn recreate(root: &Path) -> Result<(), VirtualRootError> {
  match fs::remove_dir_all(root) {
    Ok(()) => debug!(root = %root.display(), "deleted stale virtual root"),
    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
    Err(source) => {
      return Err(VirtualRootError::RemoveStale {
        path: root.to_path_buf(),
        source,
      });
    }
  }
  fs::create_dir_all(root).map_err(|source| VirtualRootError::Create {
    path: root.to_path_buf(),
    source,
  })
}
