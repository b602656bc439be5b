//! Types for merging a vanilla tree with an overlay.
//!
//! This module defines the configuration, statistics and error types of a
//! merge.

use std::io;
use std::ops::AddAssign;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::file_filter::FileFilterTable;
use super::process::ProcessError;
use crate::consts::OVERLAY_PREFIX;

/// Configuration for one merge.
#[derive(Debug, Clone)]
pub struct MergeConfig {
  /// Root of the unmodified source tree.
  pub vanilla_root: PathBuf,

  /// Directory the merged tree is written to.
  pub merged_root: PathBuf,

  /// Prefix given to overlay files so they can't collide with vanilla files.
  pub overlay_prefix: String,

  /// Maximum number of directories augmented at the same time.
  pub parallelism: usize,

  /// Per-package allow-lists applied to vanilla files.
  pub filters: FileFilterTable,
}

impl MergeConfig {
  pub fn new(vanilla_root: impl Into<PathBuf>, merged_root: impl Into<PathBuf>) -> Self {
    Self {
      vanilla_root: vanilla_root.into(),
      merged_root: merged_root.into(),
      overlay_prefix: OVERLAY_PREFIX.to_string(),
      parallelism: num_cpus(),
      filters: FileFilterTable::default(),
    }
  }
}

/// Get the number of CPUs for default parallelism.
pub(crate) fn num_cpus() -> usize {
  std::thread::available_parallelism().map(|p| p.get()).unwrap_or(4)
}

/// What a merge produced, summed over the whole tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStats {
  /// Directories linked to the vanilla tree as a whole.
  pub linked_dirs: usize,
  /// Directories materialized in the merged tree.
  pub merged_dirs: usize,
  /// Overlay files added to merged directories.
  pub overlay_files: usize,
  /// Vanilla files carried into merged directories.
  pub vanilla_files: usize,
  /// Vanilla files that lost declarations to the overlay.
  pub rewritten_files: usize,
}

impl AddAssign for MergeStats {
  fn add_assign(&mut self, other: Self) {
    self.linked_dirs += other.linked_dirs;
    self.merged_dirs += other.merged_dirs;
    self.overlay_files += other.overlay_files;
    self.vanilla_files += other.vanilla_files;
    self.rewritten_files += other.rewritten_files;
  }
}

/// Errors that can occur while merging.
///
/// `dir` is always the slash-separated directory relative to the roots.
#[derive(Debug, Error)]
pub enum MergeError {
  #[error("vanilla root {} is not accessible", path.display())]
  VanillaRoot {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to symlink {dir} in the merged root")]
  Link {
    dir: String,
    #[source]
    source: io::Error,
  },

  #[error("failed to create {dir} in the merged root")]
  CreateDir {
    dir: String,
    #[source]
    source: io::Error,
  },

  #[error("failed to open {dir} in the overlay")]
  ReadOverlay {
    dir: String,
    #[source]
    source: io::Error,
  },

  #[error("failed to enumerate files in vanilla {dir}")]
  ReadVanilla {
    dir: String,
    #[source]
    source: io::Error,
  },

  #[error("failed to process augmentation source in {dir}")]
  AugmentationSource {
    dir: String,
    #[source]
    source: ProcessError,
  },

  #[error("failed to process original source in {dir}")]
  OriginalSource {
    dir: String,
    #[source]
    source: ProcessError,
  },

  #[error("merge task for {dir} panicked: {message}")]
  TaskPanicked { dir: String, message: String },

  #[error("merge worker pool was shut down")]
  WorkersClosed(#[from] tokio::sync::AcquireError),
}
