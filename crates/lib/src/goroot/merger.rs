//! Recursive merging of a vanilla tree with an overlay.
//!
//! Every directory the overlay doesn't know about is linked to the vanilla
//! tree in one go, so only the (few) augmented packages and their parents are
//! materialized. A materialized directory receives the overlay's files under
//! a prefixed name plus the vanilla files with the overlay's declarations
//! pruned out.
//!
//! Directories are merged concurrently: a directory's own augmentation and the
//! merge of each vanilla subdirectory are independent tasks writing disjoint
//! destinations. Recursion follows the vanilla tree, so a directory present
//! only in the overlay is never merged.

use std::fs;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info};

use super::file_filter::only_go_sources;
use super::filter::SymbolFilter;
use super::process::{Outcome, process_source};
use super::types::{MergeConfig, MergeError, MergeStats};
use crate::platform::link_dir;
use crate::vfs::{DirFs, FsEntry, SourceFs};

/// Relative path of the root directory.
pub const ROOT: &str = ".";

type MergeFuture = Pin<Box<dyn Future<Output = Result<MergeStats, MergeError>> + Send>>;

/// Merges one vanilla tree with one overlay into a merged root.
#[derive(Debug)]
pub struct Merger {
  config: MergeConfig,
  vanilla: DirFs,
  overlay: Arc<dyn SourceFs>,
  workers: Arc<Semaphore>,
}

/// A directory after its entries have been looked at.
enum Prepared {
  Linked,
  Merged {
    vanilla_files: Vec<String>,
    overlay_files: Vec<String>,
    subdirs: Vec<String>,
  },
}

impl Merger {
  pub fn new(config: MergeConfig, overlay: Arc<dyn SourceFs>) -> Result<Self, MergeError> {
    let vanilla = DirFs::new(&config.vanilla_root).map_err(|source| MergeError::VanillaRoot {
      path: config.vanilla_root.clone(),
      source,
    })?;
    let workers = Arc::new(Semaphore::new(config.parallelism.max(1)));
    Ok(Self {
      config,
      vanilla,
      overlay,
      workers,
    })
  }

  pub fn config(&self) -> &MergeConfig {
    &self.config
  }

  /// Merge the whole tree.
  pub async fn merge(self: Arc<Self>) -> Result<MergeStats, MergeError> {
    info!(
      vanilla = %self.vanilla.root().display(),
      merged = %self.config.merged_root.display(),
      "starting merge"
    );

    let stats = self.merge_dir(ROOT.to_string()).await?;

    info!(
      linked_dirs = stats.linked_dirs,
      merged_dirs = stats.merged_dirs,
      overlay_files = stats.overlay_files,
      vanilla_files = stats.vanilla_files,
      rewritten_files = stats.rewritten_files,
      "merge complete"
    );
    Ok(stats)
  }

  /// Merge the slash-separated relative directory `dir` and everything below.
  ///
  /// Completes once the directory's own augmentation and every child merge
  /// have finished. All of them run to completion even if some fail; the
  /// first failure collected is returned and nothing is rolled back.
  pub fn merge_dir(self: Arc<Self>, dir: String) -> MergeFuture {
    Box::pin(self.run_dir(dir))
  }

  async fn run_dir(self: Arc<Self>, dir: String) -> Result<MergeStats, MergeError> {
    let this = Arc::clone(&self);
    let task_dir = dir.clone();
    let prepared = tokio::task::spawn_blocking(move || this.prepare(&task_dir))
      .await
      .map_err(|e| panicked(&dir, e))??;

    let Prepared::Merged {
      vanilla_files,
      overlay_files,
      subdirs,
    } = prepared
    else {
      return Ok(MergeStats {
        linked_dirs: 1,
        ..Default::default()
      });
    };

    let mut join_set: JoinSet<Result<MergeStats, MergeError>> = JoinSet::new();

    let this = Arc::clone(&self);
    let task_dir = dir.clone();
    join_set.spawn(async move {
      let _permit = Arc::clone(&this.workers).acquire_owned().await?;
      let blocking_dir = task_dir.clone();
      tokio::task::spawn_blocking(move || this.augment(&blocking_dir, vanilla_files, overlay_files))
        .await
        .map_err(|e| panicked(&task_dir, e))?
    });

    for child in subdirs {
      join_set.spawn(Arc::clone(&self).merge_dir(join(&dir, &child)));
    }

    let mut stats = MergeStats {
      merged_dirs: 1,
      ..Default::default()
    };
    let mut first_error = None;

    while let Some(join_result) = join_set.join_next().await {
      match join_result {
        Ok(Ok(task_stats)) => stats += task_stats,
        Ok(Err(e)) => {
          error!(dir = %dir, error = %e, "merge task failed");
          first_error.get_or_insert(e);
        }
        Err(e) => {
          error!(dir = %dir, error = %e, "merge task panicked");
          first_error.get_or_insert(panicked(&dir, e));
        }
      }
    }

    match first_error {
      Some(e) => Err(e),
      None => Ok(stats),
    }
  }

  /// Link `dir` if the overlay doesn't have it, otherwise create it and list
  /// what has to go in.
  fn prepare(&self, dir: &str) -> Result<Prepared, MergeError> {
    let rel = native(dir);
    let merged_dir = self.config.merged_root.join(&rel);

    let overlay_entries = match self.overlay.read_dir(&rel) {
      Ok(entries) => entries,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        link_dir(&self.vanilla.join(&rel), &merged_dir).map_err(|source| MergeError::Link {
          dir: dir.to_string(),
          source,
        })?;
        debug!(dir = %dir, "linked vanilla directory");
        return Ok(Prepared::Linked);
      }
      Err(source) => {
        return Err(MergeError::ReadOverlay {
          dir: dir.to_string(),
          source,
        });
      }
    };

    fs::create_dir_all(&merged_dir).map_err(|source| MergeError::CreateDir {
      dir: dir.to_string(),
      source,
    })?;

    let vanilla_entries = self.vanilla.read_dir(&rel).map_err(|source| MergeError::ReadVanilla {
      dir: dir.to_string(),
      source,
    })?;

    let (vanilla_dirs, vanilla_files) = partition(vanilla_entries);
    let (_, overlay_files) = partition(overlay_entries);
    debug!(
      dir = %dir,
      vanilla_files = vanilla_files.len(),
      overlay_files = overlay_files.len(),
      subdirs = vanilla_dirs.len(),
      "materialized directory"
    );

    Ok(Prepared::Merged {
      vanilla_files,
      overlay_files,
      subdirs: vanilla_dirs,
    })
  }

  /// Write the overlay files of `dir`, then the vanilla files stripped of
  /// every declaration the overlay provides.
  fn augment(&self, dir: &str, vanilla_files: Vec<String>, overlay_files: Vec<String>) -> Result<MergeStats, MergeError> {
    let rel = native(dir);
    let merged_dir = self.config.merged_root.join(&rel);
    let mut stats = MergeStats::default();

    let mut filter = SymbolFilter::new();
    for name in overlay_files {
      let write_path = merged_dir.join(format!("{}{}", self.config.overlay_prefix, name));
      process_source(self.overlay.as_ref(), &rel.join(&name), &write_path, |f| filter.collect(f)).map_err(
        |source| MergeError::AugmentationSource {
          dir: dir.to_string(),
          source,
        },
      )?;
      stats.overlay_files += 1;
    }

    let vanilla_files = self.config.filters.apply(dir, only_go_sources(vanilla_files));
    for name in vanilla_files {
      let outcome = process_source(&self.vanilla, &rel.join(&name), &merged_dir.join(&name), |f| {
        filter.prune(f)
      })
      .map_err(|source| MergeError::OriginalSource {
        dir: dir.to_string(),
        source,
      })?;
      stats.vanilla_files += 1;
      if outcome == Outcome::Rewritten {
        stats.rewritten_files += 1;
      }
    }

    debug!(dir = %dir, symbols = filter.len(), rewritten = stats.rewritten_files, "augmented directory");
    Ok(stats)
  }
}

/// Merge `overlay` onto the vanilla tree described by `config`.
pub async fn merge(config: MergeConfig, overlay: Arc<dyn SourceFs>) -> Result<MergeStats, MergeError> {
  Arc::new(Merger::new(config, overlay)?).merge().await
}

fn partition(entries: Vec<FsEntry>) -> (Vec<String>, Vec<String>) {
  let (dirs, files): (Vec<_>, Vec<_>) = entries.into_iter().partition(|e| e.is_dir);
  (
    dirs.into_iter().map(|e| e.name).collect(),
    files.into_iter().map(|e| e.name).collect(),
  )
}

fn join(dir: &str, child: &str) -> String {
  if dir == ROOT {
    child.to_string()
  } else {
    format!("{dir}/{child}")
  }
}

/// Native relative path for a slash-separated directory; empty for the root.
fn native(dir: &str) -> PathBuf {
  dir.split('/').filter(|part| !part.is_empty() && *part != ".").collect()
}

fn panicked(dir: &str, e: JoinError) -> MergeError {
  MergeError::TaskPanicked {
    dir: dir.to_string(),
    message: e.to_string(),
  }
}

/// Whether `path` in a merged tree is a link back to the vanilla tree.
pub fn is_linked(path: &Path) -> bool {
  fs::symlink_metadata(path).map(|m| m.file_type().is_symlink()).unwrap_or(false)
}
