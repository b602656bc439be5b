//! Shared helpers for library tests.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use walkdir::WalkDir;

/// A vanilla tree on disk and a location for the merged tree next to it.
pub struct Trees {
  pub temp: TempDir,
  pub vanilla: PathBuf,
  pub merged: PathBuf,
}

impl Trees {
  pub fn new(vanilla: &[(&str, &str)]) -> Self {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("vanilla");
    fs::create_dir_all(&root).unwrap();
    for (rel, content) in vanilla {
      let path = root.join(rel);
      fs::create_dir_all(path.parent().unwrap()).unwrap();
      fs::write(path, content).unwrap();
    }
    Self {
      vanilla: root,
      merged: temp.path().join("merged"),
      temp,
    }
  }

  pub fn read_merged(&self, rel: &str) -> String {
    fs::read_to_string(self.merged.join(rel)).unwrap_or_else(|e| panic!("Failed to read merged {}: {}", rel, e))
  }

  /// Every regular file below the merged root, following links.
  pub fn merged_files(&self) -> BTreeMap<String, String> {
    files_below(&self.merged)
  }
}

fn files_below(root: &Path) -> BTreeMap<String, String> {
  WalkDir::new(root)
    .follow_links(true)
    .into_iter()
    .map(|entry| entry.unwrap())
    .filter(|entry| !entry.file_type().is_dir())
    .map(|entry| {
      let key = entry
        .path()
        .strip_prefix(root)
        .unwrap()
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
      (key, fs::read_to_string(entry.path()).unwrap())
    })
    .collect()
}
