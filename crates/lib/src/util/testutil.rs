//! Test utilities for vgoroot-lib.
//!
//! Helpers for laying out source trees on disk and reading merged trees back
//! for comparison.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use walkdir::WalkDir;

/// Marker stored for directories by [`load_dir`], so empty ones show up.
pub const DIR_MARKER: &str = "directory exists";

/// Create every `(path, content)` file below `root`, with parent directories.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
  fs::create_dir_all(root).unwrap();
  for (path, content) in files {
    let path = root.join(path);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
  }
}

/// Read the tree below `root` into a map keyed by slash-separated relative
/// path. Files map to their content, directories to [`DIR_MARKER`].
///
/// Symlinks are followed, so a linked subtree compares equal to a copied one.
pub fn load_dir(root: &Path) -> BTreeMap<String, String> {
  let mut content = BTreeMap::new();
  for entry in WalkDir::new(root).follow_links(true).min_depth(1) {
    let entry = entry.unwrap();
    let rel = entry
      .path()
      .strip_prefix(root)
      .unwrap()
      .components()
      .map(|c| c.as_os_str().to_string_lossy().into_owned())
      .collect::<Vec<_>>()
      .join("/");
    let value = if entry.file_type().is_dir() {
      DIR_MARKER.to_string()
    } else {
      fs::read_to_string(entry.path()).unwrap()
    };
    content.insert(rel, value);
  }
  content
}
