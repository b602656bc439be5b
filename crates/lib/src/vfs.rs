//! Read-only source filesystems.
//!
//! Both the vanilla tree and the overlay are read through [`SourceFs`], keyed
//! by paths relative to the filesystem root (the empty path is the root).
//! [`DirFs`] serves a directory on disk; [`MemFs`] serves an in-memory tree,
//! e.g. overlay sources compiled into the binary.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::io::{self, Cursor, Read};
use std::path::{Component, Path, PathBuf};

/// A single directory entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FsEntry {
  pub name: String,
  pub is_dir: bool,
}

impl FsEntry {
  pub fn file(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      is_dir: false,
    }
  }

  pub fn dir(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      is_dir: true,
    }
  }
}

pub trait SourceFs: Send + Sync + fmt::Debug {
  /// List the entries of `dir`, sorted by name.
  ///
  /// Fails with [`io::ErrorKind::NotFound`] when `dir` does not exist.
  fn read_dir(&self, dir: &Path) -> io::Result<Vec<FsEntry>>;

  /// Open the file at `path` for reading.
  fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;

  /// Location of `path` on the local disk, if this filesystem is disk-backed.
  fn real_path(&self, _path: &Path) -> Option<PathBuf> {
    None
  }

  fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    self.open(path)?.read_to_end(&mut buf)?;
    Ok(buf)
  }
}

/// A directory on the local disk.
#[derive(Debug, Clone)]
pub struct DirFs {
  root: PathBuf,
}

impl DirFs {
  /// Serve `root`, which must exist. The root is canonicalized so that links
  /// pointing into it stay valid from anywhere.
  pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
    let root = dunce::canonicalize(root.as_ref())?;
    Ok(Self { root })
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn join(&self, rel: &Path) -> PathBuf {
    self.root.join(rel)
  }
}

impl SourceFs for DirFs {
  fn read_dir(&self, dir: &Path) -> io::Result<Vec<FsEntry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(self.join(dir))? {
      let entry = entry?;
      entries.push(FsEntry {
        name: entry.file_name().to_string_lossy().into_owned(),
        // Symlinked directories are reported as files, like lstat would.
        is_dir: entry.file_type()?.is_dir(),
      });
    }
    entries.sort();
    Ok(entries)
  }

  fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
    Ok(Box::new(fs::File::open(self.join(path))?))
  }

  fn real_path(&self, path: &Path) -> Option<PathBuf> {
    Some(self.join(path))
  }
}

/// An in-memory tree of files.
///
/// Directories are implied by the files they contain and can also be added
/// empty. The root directory always exists.
#[derive(Debug, Clone, Default)]
pub struct MemFs {
  files: BTreeMap<PathBuf, Vec<u8>>,
  dirs: BTreeSet<PathBuf>,
}

impl MemFs {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a file at a slash-separated relative path, creating parent directories.
  pub fn with_file(mut self, path: &str, data: impl Into<Vec<u8>>) -> Self {
    self.insert(path, data);
    self
  }

  pub fn with_dir(mut self, path: &str) -> Self {
    self.mkdir(path);
    self
  }

  pub fn insert(&mut self, path: &str, data: impl Into<Vec<u8>>) {
    let path = normalize(Path::new(path));
    if let Some(parent) = path.parent() {
      self.mkdir_path(parent.to_path_buf());
    }
    self.files.insert(path, data.into());
  }

  pub fn mkdir(&mut self, path: &str) {
    self.mkdir_path(normalize(Path::new(path)));
  }

  fn mkdir_path(&mut self, mut path: PathBuf) {
    loop {
      if path.as_os_str().is_empty() || !self.dirs.insert(path.clone()) {
        return;
      }
      if !path.pop() {
        return;
      }
    }
  }

  fn is_dir(&self, path: &Path) -> bool {
    path.as_os_str().is_empty() || self.dirs.contains(path)
  }
}

impl SourceFs for MemFs {
  fn read_dir(&self, dir: &Path) -> io::Result<Vec<FsEntry>> {
    let dir = normalize(dir);
    if !self.is_dir(&dir) {
      return Err(if self.files.contains_key(&dir) {
        io::Error::new(io::ErrorKind::NotADirectory, format!("{} is a file", dir.display()))
      } else {
        io::Error::new(io::ErrorKind::NotFound, format!("{} not found", dir.display()))
      });
    }

    let is_child = |p: &&PathBuf| p.parent() == Some(dir.as_path()) && !p.as_os_str().is_empty();
    let mut entries: Vec<FsEntry> = self
      .dirs
      .iter()
      .filter(is_child)
      .filter_map(|p| p.file_name())
      .map(|n| FsEntry::dir(n.to_string_lossy()))
      .chain(
        self
          .files
          .keys()
          .filter(is_child)
          .filter_map(|p| p.file_name())
          .map(|n| FsEntry::file(n.to_string_lossy())),
      )
      .collect();
    entries.sort();
    Ok(entries)
  }

  fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
    let path = normalize(path);
    match self.files.get(&path) {
      Some(data) => Ok(Box::new(Cursor::new(data.clone()))),
      None => Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} not found", path.display()),
      )),
    }
  }
}

/// Drop `.` components and leading separators.
fn normalize(path: &Path) -> PathBuf {
  path
    .components()
    .filter_map(|c| match c {
      Component::Normal(part) => Some(part),
      _ => None,
    })
    .collect()
}
