//! Hashing utilities for virtual root fingerprints.
//!
//! This module provides:
//! - `ContentHash`: A full 64-character SHA-256 hash
//! - `Fingerprint`: An incremental hasher over labelled fields
//! - `hash_source_tree()`: Deterministic hashing of a source filesystem

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::vfs::SourceFs;

/// A full 64-character SHA256 hash.
///
/// # Format
///
/// The hash is a lowercase hexadecimal string (64 characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Incremental SHA-256 over a sequence of labelled fields.
///
/// Every field is length-prefixed so that adjacent fields can't run into each
/// other (`"ab" + "c"` hashes differently from `"a" + "bc"`).
#[derive(Debug, Clone, Default)]
pub struct Fingerprint {
  hasher: Sha256,
}

impl Fingerprint {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn field(&mut self, label: &str, value: impl AsRef<[u8]>) -> &mut Self {
    let value = value.as_ref();
    self.hasher.update(label.as_bytes());
    self.hasher.update(b":");
    self.hasher.update((value.len() as u64).to_le_bytes());
    self.hasher.update(value);
    self
  }

  pub fn finish(&self) -> ContentHash {
    ContentHash(hex::encode(self.hasher.clone().finalize()))
  }
}

/// Hash every file of `fs` below `dir`: paths and contents, in name order.
///
/// Directories are included so that empty ones count.
pub fn hash_source_tree(fs: &dyn SourceFs, dir: &Path) -> io::Result<ContentHash> {
  let mut fingerprint = Fingerprint::new();
  let mut pending = vec![dir.to_path_buf()];

  while let Some(current) = pending.pop() {
    let rel = slash_path(&current);
    fingerprint.field("D", &rel);

    let entries = fs.read_dir(&current)?;
    // Reverse so that subdirectories pop in name order.
    for entry in entries.iter().rev().filter(|e| e.is_dir) {
      pending.push(current.join(&entry.name));
    }
    for entry in entries.iter().filter(|e| !e.is_dir) {
      let path = current.join(&entry.name);
      let data = fs.read(&path)?;
      fingerprint.field("F", slash_path(&path)).field("C", &data);
    }
  }

  Ok(fingerprint.finish())
}

fn slash_path(path: &Path) -> String {
  path
    .components()
    .map(|c| c.as_os_str().to_string_lossy().into_owned())
    .collect::<Vec<_>>()
    .join("/")
}
