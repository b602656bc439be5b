//! File-level filtering of vanilla packages.
//!
//! Some vanilla packages carry sources that can never work on the target
//! platform. Rather than pruning them symbol by symbol, whole files are
//! excluded before parsing.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Reduces a package's vanilla file names to the ones that are kept.
pub type FileFilter = Arc<dyn Fn(Vec<String>) -> Vec<String> + Send + Sync>;

/// File filters keyed by package import path.
///
/// Directories are matched by their slash-separated path relative to the
/// root, or by the import path below `src/` when merging a whole library root.
#[derive(Clone)]
pub struct FileFilterTable {
  filters: HashMap<String, FileFilter>,
}

impl FileFilterTable {
  /// A table without any entries.
  pub fn empty() -> Self {
    Self {
      filters: HashMap::new(),
    }
  }

  pub fn insert(&mut self, dir: impl Into<String>, filter: FileFilter) {
    self.filters.insert(dir.into(), filter);
  }

  pub fn with(mut self, dir: impl Into<String>, filter: FileFilter) -> Self {
    self.insert(dir, filter);
    self
  }

  pub fn get(&self, dir: &str) -> Option<&FileFilter> {
    self
      .filters
      .get(dir)
      .or_else(|| dir.strip_prefix("src/").and_then(|pkg| self.filters.get(pkg)))
  }

  /// Apply the filter registered for `dir`, if any.
  pub fn apply(&self, dir: &str, files: Vec<String>) -> Vec<String> {
    match self.get(dir) {
      Some(filter) => filter(files),
      None => files,
    }
  }

  pub fn len(&self) -> usize {
    self.filters.len()
  }

  pub fn is_empty(&self) -> bool {
    self.filters.is_empty()
  }
}

impl Default for FileFilterTable {
  fn default() -> Self {
    Self::empty()
      .with("runtime", include_only(["typekind.go", "error.go"]))
      .with(
        "runtime/internal/sys",
        include_only(["zversion.go", "stubs.go", "zgoos_js.go", "arch.go"]),
      )
      .with("runtime/pprof", include_only::<[&str; 0]>([]))
      .with("crypto/rand", include_only(["rand.go", "util.go"]))
  }
}

impl fmt::Debug for FileFilterTable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut dirs: Vec<_> = self.filters.keys().collect();
    dirs.sort();
    f.debug_struct("FileFilterTable").field("dirs", &dirs).finish()
  }
}

/// A filter keeping only the listed file names.
pub fn include_only<I>(names: I) -> FileFilter
where
  I: IntoIterator,
  I::Item: Into<String>,
{
  let allowed: Vec<String> = names.into_iter().map(Into::into).collect();
  Arc::new(move |files: Vec<String>| -> Vec<String> {
    files.into_iter().filter(|f| allowed.contains(f)).collect()
  })
}

/// Keep only Go source files; other vanilla files (assembly etc.) never make
/// it into a merged package.
pub fn only_go_sources(files: Vec<String>) -> Vec<String> {
  files.into_iter().filter(|f| f.ends_with(".go")).collect()
}
